//! Merchant ranking tests: success-only totals, name lookup with code
//! fallback, descending order, and the top-N table.

use chrono::NaiveDateTime;
use paydash_core::{
    aggregation::{calc_merchant_stats, top_merchants},
    display::TopMerchantsTable,
    payment::{Merchant, Payment},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn payment(mcht: &str, status: &str, amount: f64) -> Payment {
    Payment {
        payment_code: format!("{mcht}-{status}-{amount}"),
        mcht_code: mcht.into(),
        amount,
        currency: "KRW".into(),
        pay_type: "CARD".into(),
        status: status.into(),
        payment_at: NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap(),
    }
}

fn merchant(code: &str, name: &str) -> Merchant {
    Merchant {
        mcht_code: code.into(),
        mcht_name: name.into(),
        status: "ACTIVE".into(),
        biz_type: "RETAIL".into(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// M1: two successes (100, 200) and a failed 9999 that must be ignored.
#[test]
fn failed_payments_are_excluded() {
    let records = vec![
        payment("M1", "SUCCESS", 100.0),
        payment("M1", "FAILED", 9999.0),
        payment("M1", "SUCCESS", 200.0),
    ];
    let stats = calc_merchant_stats(&records, &[merchant("M1", "Blue Bottle")]);

    assert_eq!(stats.len(), 1);
    let m1 = &stats[0];
    assert_eq!(m1.mcht_code, "M1");
    assert_eq!(m1.mcht_name, "Blue Bottle");
    assert_eq!(m1.total_amount, 300.0);
    assert_eq!(m1.total_count, 2);
    assert_eq!(m1.avg_ticket, 150.0);
}

/// A merchant with only failed payments does not appear at all.
#[test]
fn merchant_without_successes_is_absent() {
    let records = vec![payment("M1", "SUCCESS", 10.0), payment("M2", "FAILED", 500.0)];
    let stats = calc_merchant_stats(&records, &[]);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].mcht_code, "M1");
}

#[test]
fn unknown_merchant_named_by_code() {
    let records = vec![payment("M404", "SUCCESS", 10.0)];
    let stats = calc_merchant_stats(&records, &[merchant("M1", "Blue Bottle")]);
    assert_eq!(stats[0].mcht_name, "M404");
}

#[test]
fn ranked_descending_by_total_amount() {
    let records = vec![
        payment("M1", "SUCCESS", 100.0),
        payment("M2", "SUCCESS", 500.0),
        payment("M3", "SUCCESS", 250.0),
        payment("M1", "SUCCESS", 300.0),
    ];
    let stats = calc_merchant_stats(&records, &[]);
    let order: Vec<&str> = stats.iter().map(|s| s.mcht_code.as_str()).collect();
    assert_eq!(order, vec!["M2", "M1", "M3"]);
    assert!(stats.windows(2).all(|w| w[0].total_amount >= w[1].total_amount));
}

#[test]
fn top_n_truncates_ranking() {
    let records: Vec<Payment> = (1..=15)
        .map(|i| payment(&format!("M{i}"), "SUCCESS", f64::from(i) * 10.0))
        .collect();
    let stats = calc_merchant_stats(&records, &[]);
    let top = top_merchants(&stats, 10);

    assert_eq!(top.len(), 10);
    assert_eq!(top[0].mcht_code, "M15");
    assert_eq!(top[9].mcht_code, "M6");
    assert_eq!(top_merchants(&stats, 100).len(), 15);
}

/// The table footer total covers all merchants, not only the shown rows.
#[test]
fn table_grand_total_covers_full_ranking() {
    let records = vec![
        payment("M1", "SUCCESS", 100.0),
        payment("M2", "SUCCESS", 200.0),
        payment("M3", "SUCCESS", 300.0),
    ];
    let stats = calc_merchant_stats(&records, &[merchant("M3", "Seoul Taxi")]);
    let table = TopMerchantsTable::build(&stats, 2);

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].rank, 1);
    assert_eq!(table.rows[0].mcht_name, "Seoul Taxi");
    assert_eq!(table.rows[1].rank, 2);
    assert_eq!(table.merchant_count, 3);
    assert_eq!(table.grand_total, 600.0);
}
