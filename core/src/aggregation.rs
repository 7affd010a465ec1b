//! Aggregation: KPI summary, chart series and merchant ranking.
//!
//! The summary and merchant stats count amounts of SUCCESS payments only.
//! The three group-bys bucket every payment regardless of status.

use crate::{
    payment::{Merchant, Payment},
    types::{DateKey, MerchantCode, DATE_FORMAT},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_count:          usize,
    pub total_success_amount: f64,
    pub success_count:        usize,
    /// In [0, 1]; 0 for an empty set.
    pub success_rate:         f64,
    /// 0 when there are no successful payments.
    pub avg_ticket:           f64,
}

/// One chart bucket: a date, status or pay-type key with its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key:    String,
    pub amount: f64,
    pub count:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantStat {
    pub mcht_code:    MerchantCode,
    pub mcht_name:    String,
    pub total_amount: f64,
    pub total_count:  usize,
    pub avg_ticket:   f64,
}

// ── Summary ──────────────────────────────────────────────────────────────────

pub fn calc_summary(payments: &[Payment]) -> Summary {
    let total_count = payments.len();
    let (success_count, total_success_amount) = payments
        .iter()
        .filter(|p| p.is_success())
        .fold((0usize, 0.0f64), |(n, sum), p| (n + 1, sum + p.amount));

    Summary {
        total_count,
        total_success_amount,
        success_count,
        success_rate: ratio(success_count as f64, total_count),
        avg_ticket: ratio(total_success_amount, success_count),
    }
}

// ── Grouping ─────────────────────────────────────────────────────────────────

/// Daily trend, ascending by `YYYY-MM-DD` key.
pub fn group_by_date(payments: &[Payment]) -> Vec<Bucket> {
    let mut days: BTreeMap<DateKey, (f64, usize)> = BTreeMap::new();
    for p in payments {
        let key = p.payment_at.date().format(DATE_FORMAT).to_string();
        let entry = days.entry(key).or_insert((0.0, 0));
        entry.0 += p.amount;
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(key, (amount, count))| Bucket { key, amount, count })
        .collect()
}

/// Status distribution, in first-seen order.
pub fn group_by_status(payments: &[Payment]) -> Vec<Bucket> {
    group_first_seen(payments, |p| &p.status)
}

/// Pay-type distribution, in first-seen order.
pub fn group_by_pay_type(payments: &[Payment]) -> Vec<Bucket> {
    group_first_seen(payments, |p| &p.pay_type)
}

fn group_first_seen<F>(payments: &[Payment], key_of: F) -> Vec<Bucket>
where
    F: Fn(&Payment) -> &str,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for p in payments {
        let key = key_of(p);
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket {
                key: key.to_string(),
                amount: 0.0,
                count: 0,
            });
            buckets.len() - 1
        });
        buckets[slot].amount += p.amount;
        buckets[slot].count += 1;
    }
    buckets
}

// ── Merchant statistics ──────────────────────────────────────────────────────

/// Per-merchant totals over SUCCESS payments, descending by total amount.
/// Ties keep first-seen order. Unknown merchants are named by their code.
pub fn calc_merchant_stats(payments: &[Payment], merchants: &[Merchant]) -> Vec<MerchantStat> {
    let names: HashMap<&str, &str> = merchants
        .iter()
        .map(|m| (m.mcht_code.as_str(), m.mcht_name.as_str()))
        .collect();

    let success: Vec<&Payment> = payments.iter().filter(|p| p.is_success()).collect();
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for p in success {
        let entry = totals.entry(p.mcht_code.as_str()).or_insert_with(|| {
            order.push(p.mcht_code.as_str());
            (0.0, 0)
        });
        entry.0 += p.amount;
        entry.1 += 1;
    }

    let mut stats: Vec<MerchantStat> = order
        .into_iter()
        .map(|code| {
            let (total_amount, total_count) = totals[code];
            MerchantStat {
                mcht_code: code.to_string(),
                mcht_name: names.get(code).copied().unwrap_or(code).to_string(),
                total_amount,
                total_count,
                avg_ticket: ratio(total_amount, total_count),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    stats
}

/// The first `n` rows of an already ranked stats list.
pub fn top_merchants(stats: &[MerchantStat], n: usize) -> Vec<MerchantStat> {
    stats.iter().take(n).cloned().collect()
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
