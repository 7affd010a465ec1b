//! Shipped config and fixture files parse and drive a full offline run.

use paydash_core::{
    api::{Fixture, StaticSource},
    config::DashConfig,
    dashboard::{fetch_dashboard_data, DashboardView, PageState},
    filter::DashboardFilter,
    normalize::NormalizePolicy,
};

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/dashboard.json");
const FIXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/fixtures/sample.json");

#[test]
fn shipped_config_loads() {
    let cfg = DashConfig::load(CONFIG_PATH).unwrap();
    assert_eq!(cfg.utc_offset_minutes, 540);
    assert_eq!(cfg.normalize_policy, NormalizePolicy::SkipInvalid);
    assert_eq!(cfg.top_merchants, 10);
    // not in the file: defaulted
    assert!(!cfg.status_categories.is_empty());
}

#[test]
fn missing_config_is_an_error() {
    assert!(DashConfig::load("/nonexistent/dashboard.json").is_err());
}

#[tokio::test]
async fn sample_fixture_renders_dashboard() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cfg = DashConfig::load(CONFIG_PATH).unwrap();
    let fixture = Fixture::load(FIXTURE_PATH).unwrap();
    let source = StaticSource::new(fixture).with_offset(cfg.utc_offset().unwrap());

    let filter = DashboardFilter::default();
    let data = fetch_dashboard_data(&source, &filter).await;
    assert_eq!(data.page_state(), PageState::Ready);

    let view = DashboardView::compute(&data, &filter, &cfg).unwrap();
    assert_eq!(view.summary.total_count, 7);
    assert_eq!(view.summary.success_count, 4);
    assert_eq!(view.summary.total_success_amount, 93_900.0);

    // M9 is not in the merchant list and keeps its code as name
    let m9 = view
        .merchant_stats
        .iter()
        .find(|s| s.mcht_code == "M9")
        .unwrap();
    assert_eq!(m9.mcht_name, "M9");
    assert_eq!(view.merchant_stats[0].mcht_code, "M1");
    assert_eq!(view.merchant_stats[0].total_amount, 57_000.0);

    assert_eq!(view.daily_trend.len(), 4);
    assert_eq!(view.recent.len(), 7);
    assert_eq!(view.recent[0].payment_code, "PAY-0007");
}
