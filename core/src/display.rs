//! Display view-models: everything a renderer needs, already computed.
//!
//! RULE: no arithmetic on payment data happens here beyond formatting.
//! Renderers draw these structs as-is.

use crate::{
    aggregation::{MerchantStat, Summary},
    payment::{CodeItem, Merchant, Payment, PaymentTypeItem},
    types::{MerchantCode, PaymentCode},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Status categories ────────────────────────────────────────────────────────

/// Visual treatment of a payment status badge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Success,
    Pending,
    Failure,
    Neutral,
}

/// Exact status code → category. Codes not in the map are `Neutral`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCategoryMap {
    map: HashMap<String, StatusCategory>,
}

impl Default for StatusCategoryMap {
    fn default() -> Self {
        let map = [
            ("SUCCESS", StatusCategory::Success),
            ("PENDING", StatusCategory::Pending),
            ("FAIL", StatusCategory::Failure),
            ("FAILED", StatusCategory::Failure),
            ("CANCEL", StatusCategory::Failure),
            ("CANCELED", StatusCategory::Failure),
            ("CANCELLED", StatusCategory::Failure),
        ]
        .into_iter()
        .map(|(code, cat)| (code.to_string(), cat))
        .collect();
        Self { map }
    }
}

impl From<HashMap<String, StatusCategory>> for StatusCategoryMap {
    fn from(map: HashMap<String, StatusCategory>) -> Self {
        Self { map }
    }
}

impl StatusCategoryMap {
    pub fn category(&self, status: &str) -> StatusCategory {
        self.map
            .get(status)
            .copied()
            .unwrap_or(StatusCategory::Neutral)
    }

    pub fn insert(&mut self, status: impl Into<String>, category: StatusCategory) {
        self.map.insert(status.into(), category);
    }

    pub fn into_inner(self) -> HashMap<String, StatusCategory> {
        self.map
    }
}

// ── Labels ───────────────────────────────────────────────────────────────────

/// Resolves codes to human-readable labels, falling back to the code itself.
#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    merchants: HashMap<String, String>,
    statuses:  HashMap<String, String>,
    pay_types: HashMap<String, String>,
}

impl LabelResolver {
    pub fn new(
        merchants: &[Merchant],
        status_codes: &[CodeItem],
        type_codes: &[PaymentTypeItem],
    ) -> Self {
        Self {
            merchants: merchants
                .iter()
                .map(|m| (m.mcht_code.clone(), m.mcht_name.clone()))
                .collect(),
            statuses: status_codes
                .iter()
                .map(|s| (s.code.clone(), or_code(&s.description, &s.code)))
                .collect(),
            pay_types: type_codes
                .iter()
                .map(|t| (t.pay_type.clone(), or_code(&t.description, &t.pay_type)))
                .collect(),
        }
    }

    pub fn merchant_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.merchants.get(code).map_or(code, String::as_str)
    }

    pub fn status_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.statuses.get(code).map_or(code, String::as_str)
    }

    pub fn pay_type_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.pay_types.get(code).map_or(code, String::as_str)
    }
}

fn or_code(description: &str, code: &str) -> String {
    if description.is_empty() {
        code.to_string()
    } else {
        description.to_string()
    }
}

// ── Payment list rows ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_code:    PaymentCode,
    /// `YYYY-MM-DD HH:MM:SS`
    pub paid_at:         String,
    pub merchant:        String,
    pub amount:          String,
    pub currency:        String,
    pub pay_type:        String,
    pub status:          String,
    pub status_category: StatusCategory,
}

/// Copy of `payments` ordered newest first. Ties keep input order.
///
/// Sort before windowing: a scroll window over this list only ever
/// appends older rows below the ones already shown.
pub fn newest_first(payments: &[Payment]) -> Vec<Payment> {
    let mut sorted = payments.to_vec();
    sorted.sort_by(|a, b| b.payment_at.cmp(&a.payment_at));
    sorted
}

/// List-table rows, newest first, truncated to `max_rows` when given.
pub fn payment_rows(
    payments: &[Payment],
    labels: &LabelResolver,
    categories: &StatusCategoryMap,
    max_rows: Option<usize>,
) -> Vec<PaymentRow> {
    let mut sorted: Vec<&Payment> = payments.iter().collect();
    sorted.sort_by(|a, b| b.payment_at.cmp(&a.payment_at));

    sorted
        .into_iter()
        .take(max_rows.unwrap_or(usize::MAX))
        .map(|p| PaymentRow {
            payment_code: p.payment_code.clone(),
            paid_at: p.payment_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            merchant: labels.merchant_name(&p.mcht_code).to_string(),
            amount: format_thousands(p.amount),
            currency: p.currency.clone(),
            pay_type: labels.pay_type_label(&p.pay_type).to_string(),
            status: labels.status_label(&p.status).to_string(),
            status_category: categories.category(&p.status),
        })
        .collect()
}

// ── Summary cards ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub label: String,
    pub value: String,
    pub unit:  Option<String>,
    pub sub:   Option<String>,
}

/// The four KPI cards, in display order.
pub fn summary_cards(summary: &Summary) -> Vec<SummaryCard> {
    let avg = if summary.success_count == 0 {
        "-".to_string()
    } else {
        format_thousands(summary.avg_ticket)
    };

    vec![
        SummaryCard {
            label: "Total approved amount".into(),
            value: format_thousands(summary.total_success_amount),
            unit: Some("KRW".into()),
            sub: None,
        },
        SummaryCard {
            label: "Total payments".into(),
            value: format_thousands(summary.total_count as f64),
            unit: Some("payments".into()),
            sub: None,
        },
        SummaryCard {
            label: "Success rate".into(),
            value: format!("{:.1}%", summary.success_rate * 100.0),
            unit: None,
            sub: Some(format!(
                "{} succeeded",
                format_thousands(summary.success_count as f64)
            )),
        },
        SummaryCard {
            label: "Average ticket".into(),
            value: avg,
            unit: Some("KRW/payment".into()),
            sub: None,
        },
    ]
}

// ── Top merchants ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMerchantRow {
    /// 1-based.
    pub rank:         usize,
    pub mcht_code:    MerchantCode,
    pub mcht_name:    String,
    pub total_amount: f64,
    pub total_count:  usize,
    pub avg_ticket:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMerchantsTable {
    pub rows:           Vec<TopMerchantRow>,
    /// Number of merchants in the full ranking, not just `rows`.
    pub merchant_count: usize,
    /// Sum over the full ranking, not just `rows`.
    pub grand_total:    f64,
}

impl TopMerchantsTable {
    pub fn build(stats: &[MerchantStat], max_rows: usize) -> Self {
        let rows = stats
            .iter()
            .take(max_rows)
            .enumerate()
            .map(|(i, s)| TopMerchantRow {
                rank: i + 1,
                mcht_code: s.mcht_code.clone(),
                mcht_name: s.mcht_name.clone(),
                total_amount: s.total_amount,
                total_count: s.total_count,
                avg_ticket: s.avg_ticket,
            })
            .collect();
        Self {
            rows,
            merchant_count: stats.len(),
            grand_total: stats.iter().map(|s| s.total_amount).sum(),
        }
    }
}

// ── Number formatting ────────────────────────────────────────────────────────

/// Round to an integer and group thousands with `,`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Chart axis label in whole `M` / `K` units.
pub fn compact_amount(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", (value / 1_000_000.0).round())
    } else if value >= 1_000.0 {
        format!("{}K", (value / 1_000.0).round())
    } else {
        format!("{value}")
    }
}
