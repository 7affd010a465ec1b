//! Dashboard assembly: fetched data in, every derived view out.
//!
//! PIPELINE (fixed order):
//!   1. Normalize raw payments   (policy from config)
//!   2. Apply the active filter
//!   3. Summary, daily trend, status and pay-type distributions
//!   4. Merchant ranking + top-N table
//!   5. Display view-models (cards, recent rows)
//!
//! RULES:
//!   - Fetch state is passed in explicitly as `DashboardData`.
//!   - Nothing here holds state between calls; recompute on every change.

use crate::{
    aggregation::{
        calc_merchant_stats, calc_summary, group_by_date, group_by_pay_type, group_by_status,
        Bucket, MerchantStat, Summary,
    },
    api::DashboardSource,
    config::DashConfig,
    display::{payment_rows, summary_cards, LabelResolver, PaymentRow, SummaryCard, TopMerchantsTable},
    error::{DashError, DashResult},
    filter::{apply_filter, DashboardFilter},
    normalize::{Normalizer, Rejection},
    payment::{CodeItem, Merchant, Payment, PaymentDto, PaymentTypeItem},
};
use serde::{Deserialize, Serialize};

// ── Query state ──────────────────────────────────────────────────────────────

/// Settlement state of one independent fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum QueryState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn from_result(result: DashResult<T>) -> Self {
        match result {
            Ok(v) => QueryState::Ready(v),
            Err(e) => QueryState::Failed(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryState::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Loading,
    Ready,
    Error,
}

/// The four fetches the dashboard depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub payments:     QueryState<Vec<PaymentDto>>,
    pub merchants:    QueryState<Vec<Merchant>>,
    pub status_codes: QueryState<Vec<CodeItem>>,
    pub type_codes:   QueryState<Vec<PaymentTypeItem>>,
}

impl Default for DashboardData {
    fn default() -> Self {
        Self {
            payments:     QueryState::Loading,
            merchants:    QueryState::Loading,
            status_codes: QueryState::Loading,
            type_codes:   QueryState::Loading,
        }
    }
}

impl DashboardData {
    /// Error if any fetch failed; otherwise loading until all four settle.
    pub fn page_state(&self) -> PageState {
        if self.payments.is_failed()
            || self.merchants.is_failed()
            || self.status_codes.is_failed()
            || self.type_codes.is_failed()
        {
            PageState::Error
        } else if self.payments.is_loading()
            || self.merchants.is_loading()
            || self.status_codes.is_loading()
            || self.type_codes.is_loading()
        {
            PageState::Loading
        } else {
            PageState::Ready
        }
    }

    /// Messages of every failed fetch, in a fixed order.
    pub fn errors(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, failed) in [
            ("payments", failure(&self.payments)),
            ("merchants", failure(&self.merchants)),
            ("status_codes", failure(&self.status_codes)),
            ("type_codes", failure(&self.type_codes)),
        ] {
            if let Some(msg) = failed {
                out.push(format!("{name}: {msg}"));
            }
        }
        out
    }
}

fn failure<T>(state: &QueryState<T>) -> Option<&str> {
    match state {
        QueryState::Failed(msg) => Some(msg),
        _ => None,
    }
}

/// Run the four fetches concurrently. Each settles into its own state;
/// one failure does not cancel the others.
pub async fn fetch_dashboard_data(
    source: &dyn DashboardSource,
    filter: &DashboardFilter,
) -> DashboardData {
    let (payments, merchants, status_codes, type_codes) = tokio::join!(
        source.fetch_payments(filter),
        source.fetch_merchants(),
        source.fetch_payment_status_codes(),
        source.fetch_payment_type_codes(),
    );

    let data = DashboardData {
        payments:     QueryState::from_result(payments),
        merchants:    QueryState::from_result(merchants),
        status_codes: QueryState::from_result(status_codes),
        type_codes:   QueryState::from_result(type_codes),
    };
    log::info!(
        "fetch[{}]: page state {:?}, errors {:?}",
        source.name(),
        data.page_state(),
        data.errors()
    );
    data
}

// ── Derived view ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter:         DashboardFilter,
    pub filtered:       Vec<Payment>,
    pub rejected:       Vec<Rejection>,
    pub summary:        Summary,
    pub cards:          Vec<SummaryCard>,
    pub daily_trend:    Vec<Bucket>,
    pub by_status:      Vec<Bucket>,
    pub by_pay_type:    Vec<Bucket>,
    pub merchant_stats: Vec<MerchantStat>,
    pub top_merchants:  TopMerchantsTable,
    pub recent:         Vec<PaymentRow>,
}

impl DashboardView {
    /// Derive every dashboard section from settled data.
    /// Call only when `data.page_state()` is `Ready`.
    pub fn compute(
        data: &DashboardData,
        filter: &DashboardFilter,
        config: &DashConfig,
    ) -> DashResult<Self> {
        let raw = data.payments.ready().ok_or_else(not_ready)?;
        let merchants = data.merchants.ready().ok_or_else(not_ready)?;
        let status_codes = data.status_codes.ready().ok_or_else(not_ready)?;
        let type_codes = data.type_codes.ready().ok_or_else(not_ready)?;

        let offset = config.utc_offset().ok_or_else(|| {
            anyhow::anyhow!("utc_offset_minutes out of range: {}", config.utc_offset_minutes)
        })?;
        let normalized = Normalizer::new(offset, config.normalize_policy).normalize(raw)?;
        let filtered = apply_filter(&normalized.payments, filter);

        let summary = calc_summary(&filtered);
        let merchant_stats = calc_merchant_stats(&filtered, merchants);
        let labels = LabelResolver::new(merchants, status_codes, type_codes);
        let recent = payment_rows(
            &filtered,
            &labels,
            &config.status_category_map(),
            Some(config.recent_rows),
        );

        log::debug!(
            "view: {} normalized, {} after filter, {} merchants ranked",
            normalized.payments.len(),
            filtered.len(),
            merchant_stats.len()
        );

        Ok(Self {
            filter: filter.clone(),
            cards: summary_cards(&summary),
            daily_trend: group_by_date(&filtered),
            by_status: group_by_status(&filtered),
            by_pay_type: group_by_pay_type(&filtered),
            top_merchants: TopMerchantsTable::build(&merchant_stats, config.top_merchants),
            rejected: normalized.rejected,
            summary,
            merchant_stats,
            recent,
            filtered,
        })
    }
}

fn not_ready() -> DashError {
    DashError::Other(anyhow::anyhow!("dashboard data has not settled"))
}
