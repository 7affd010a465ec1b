//! dash-runner: headless runner for the payments & merchants dashboard.
//!
//! Usage:
//!   dash-runner --base-url http://localhost:8080/api/v1 --from 2024-01-01 --to 2024-01-31
//!   dash-runner --fixture data/fixtures/sample.json --merchant M1 --json
//!   dash-runner --fixture data/fixtures/sample.json --ipc-mode

use anyhow::Result;
use chrono::Utc;
use paydash_core::{
    api::{DashboardSource, Fixture, HttpDashboardSource, StaticSource},
    config::DashConfig,
    dashboard::{fetch_dashboard_data, DashboardData, DashboardView, PageState},
    display::{newest_first, payment_rows, LabelResolver, PaymentRow},
    filter::{parse_date, DashboardFilter},
    pagination::{InfiniteScroll, ListFooter},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetFilter { filter: DashboardFilter },
    LoadMore,
    MerchantDetail { mcht_code: String },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    page_state: PageState,
    errors: Vec<String>,
    view: Option<DashboardView>,
    list_rows: Vec<PaymentRow>,
    list_total: usize,
    footer: ListFooter,
}

struct Session {
    config: DashConfig,
    source: Box<dyn DashboardSource>,
    filter: DashboardFilter,
    data: DashboardData,
    scroll: InfiniteScroll,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let as_json = has_flag(&args, "--json");

    let mut config = match str_arg(&args, "--config") {
        Some(path) => DashConfig::load(path)?,
        None => DashConfig::default(),
    };
    if let Some(url) = str_arg(&args, "--base-url") {
        config.api_base_url = url.to_string();
    }
    config.top_merchants = parse_arg(&args, "--top", config.top_merchants);
    config.validate()?;

    let offset = config
        .utc_offset()
        .ok_or_else(|| anyhow::anyhow!("invalid utc_offset_minutes"))?;
    let source: Box<dyn DashboardSource> = match str_arg(&args, "--fixture") {
        Some(path) => Box::new(StaticSource::new(Fixture::load(path)?).with_offset(offset)),
        None => Box::new(HttpDashboardSource::from_config(&config)?),
    };

    let filter = build_filter(&args, &config)?;

    if !ipc_mode && !as_json {
        println!("Payments & Merchants - dash-runner");
        println!("  source:   {}", source.name());
        println!("  base url: {}", config.api_base_url);
        println!("  filter:   {}", serde_json::to_string(&filter)?);
        println!();
    }

    let data = fetch_dashboard_data(source.as_ref(), &filter).await;
    let mut session = Session {
        scroll: InfiniteScroll::new(config.page_initial_rows, config.page_step_rows),
        config,
        source,
        filter,
        data,
    };

    if ipc_mode {
        run_ipc_loop(&mut session).await?;
    } else if as_json {
        let state = build_ui_state(&session);
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_report(&session)?;
    }

    Ok(())
}

async fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unknown command: {} ({e})", buffer.trim_end());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match handle_command(session, cmd).await? {
            Some(reply) => {
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
            }
            None => break,
        }
    }
    Ok(())
}

/// Apply one IPC command. `None` means quit.
async fn handle_command(
    session: &mut Session,
    cmd: IpcCommand,
) -> Result<Option<serde_json::Value>> {
    match cmd {
        IpcCommand::Quit => return Ok(None),
        IpcCommand::GetState => {}
        IpcCommand::SetFilter { filter } => {
            session.data = fetch_dashboard_data(session.source.as_ref(), &filter).await;
            session.filter = filter;
            session.scroll.reset();
        }
        IpcCommand::LoadMore => {
            // A view that fails to compute has nothing to scroll.
            let total = current_view(session)
                .ok()
                .flatten()
                .map_or(0, |v| v.filtered.len());
            session.scroll.on_sentinel_visible(total);
        }
        IpcCommand::MerchantDetail { mcht_code } => {
            let reply = match session.source.fetch_merchant_detail(&mcht_code).await {
                Ok(detail) => serde_json::to_value(detail)?,
                Err(e) => {
                    log::warn!("merchant detail {mcht_code}: {e}");
                    serde_json::json!({ "error": e.to_string() })
                }
            };
            return Ok(Some(reply));
        }
    }

    Ok(Some(serde_json::to_value(build_ui_state(session))?))
}

fn current_view(session: &Session) -> Result<Option<DashboardView>> {
    if session.data.page_state() != PageState::Ready {
        return Ok(None);
    }
    Ok(Some(DashboardView::compute(
        &session.data,
        &session.filter,
        &session.config,
    )?))
}

/// Snapshot for the UI. A view that fails to compute (e.g. a malformed
/// amount under strict normalization) turns the page into an error state.
fn build_ui_state(session: &Session) -> UiState {
    let mut page_state = session.data.page_state();
    let mut errors = session.data.errors();
    let view = match current_view(session) {
        Ok(view) => view,
        Err(e) => {
            log::warn!("dashboard view: {e}");
            page_state = PageState::Error;
            errors.push(format!("view: {e}"));
            None
        }
    };

    let (list_rows, list_total) = match &view {
        Some(v) => {
            let labels = LabelResolver::new(
                session.data.merchants.ready().map_or(&[][..], Vec::as_slice),
                session.data.status_codes.ready().map_or(&[][..], Vec::as_slice),
                session.data.type_codes.ready().map_or(&[][..], Vec::as_slice),
            );
            let ordered = newest_first(&v.filtered);
            let rows = payment_rows(
                session.scroll.window(&ordered),
                &labels,
                &session.config.status_category_map(),
                None,
            );
            (rows, ordered.len())
        }
        None => (Vec::new(), 0),
    };

    UiState {
        page_state,
        errors,
        footer: session
            .scroll
            .status_line(list_total, page_state == PageState::Loading),
        view,
        list_rows,
        list_total,
    }
}

fn print_report(session: &Session) -> Result<()> {
    match session.data.page_state() {
        PageState::Loading => {
            println!("(still loading)");
            return Ok(());
        }
        PageState::Error => {
            println!("=== ERROR ===");
            for e in session.data.errors() {
                println!("  {e}");
            }
            return Ok(());
        }
        PageState::Ready => {}
    }

    let view = match DashboardView::compute(&session.data, &session.filter, &session.config) {
        Ok(view) => view,
        Err(e) => {
            log::warn!("dashboard view: {e}");
            println!("=== ERROR ===");
            println!("  {e}");
            return Ok(());
        }
    };

    println!("=== SUMMARY ===");
    for card in &view.cards {
        let unit = card.unit.as_deref().unwrap_or("");
        match &card.sub {
            Some(sub) => println!("  {:<22} {} {unit} ({sub})", card.label, card.value),
            None => println!("  {:<22} {} {unit}", card.label, card.value),
        }
    }
    if !view.rejected.is_empty() {
        println!("  skipped records:       {}", view.rejected.len());
    }

    println!();
    println!("=== DAILY TREND ===");
    if view.daily_trend.is_empty() {
        println!("  (no payments in range)");
    }
    for b in &view.daily_trend {
        println!("  {} | {:>14.0} | {:>5}", b.key, b.amount, b.count);
    }

    println!();
    println!("=== BY STATUS ===");
    for b in &view.by_status {
        println!("  {:<12} | {:>14.0} | {:>5}", b.key, b.amount, b.count);
    }

    println!();
    println!("=== BY PAY TYPE ===");
    for b in &view.by_pay_type {
        println!("  {:<12} | {:>14.0} | {:>5}", b.key, b.amount, b.count);
    }

    println!();
    println!(
        "=== TOP {} MERCHANTS (of {}) ===",
        session.config.top_merchants, view.top_merchants.merchant_count
    );
    for r in &view.top_merchants.rows {
        println!(
            "  {:>2}. {:<20} {:<8} | {:>14.0} | {:>5} | avg {:.0}",
            r.rank, r.mcht_name, r.mcht_code, r.total_amount, r.total_count, r.avg_ticket
        );
    }
    println!("  grand total: {:.0}", view.top_merchants.grand_total);

    println!();
    println!("=== RECENT PAYMENTS ===");
    for row in &view.recent {
        println!(
            "  {} | {:<14} | {:<16} | {:>12} {} | {:<10} | {} ({:?})",
            row.paid_at,
            row.payment_code,
            row.merchant,
            row.amount,
            row.currency,
            row.pay_type,
            row.status,
            row.status_category
        );
    }
    Ok(())
}

fn build_filter(args: &[String], config: &DashConfig) -> Result<DashboardFilter> {
    let mut filter = if has_flag(args, "--all-dates") {
        DashboardFilter::default()
    } else {
        let offset = config
            .utc_offset()
            .ok_or_else(|| anyhow::anyhow!("invalid utc_offset_minutes"))?;
        let today = Utc::now().with_timezone(&offset).date_naive();
        DashboardFilter::last_days(today, config.default_lookback_days)
    };

    if let Some(raw) = str_arg(args, "--from") {
        filter.from_date = Some(parse_date(raw)?);
    }
    if let Some(raw) = str_arg(args, "--to") {
        filter.to_date = Some(parse_date(raw)?);
    }
    filter.mcht_code = str_arg(args, "--merchant").map(str::to_string);
    filter.status = str_arg(args, "--status").map(str::to_string);
    filter.pay_type = str_arg(args, "--pay-type").map(str::to_string);
    Ok(filter)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paydash_core::payment::PaymentDto;

    fn dto(code: &str, amount: &str, at: &str) -> PaymentDto {
        PaymentDto {
            payment_code: code.into(),
            mcht_code: "M1".into(),
            amount: amount.into(),
            currency: "KRW".into(),
            pay_type: "CARD".into(),
            status: "SUCCESS".into(),
            payment_at: at.into(),
        }
    }

    /// Strict config (3 rows, then steps of 2) over a static fixture.
    fn session(payments: Vec<PaymentDto>) -> Session {
        let config = DashConfig::default_test();
        Session {
            scroll: InfiniteScroll::new(config.page_initial_rows, config.page_step_rows),
            source: Box::new(StaticSource::new(Fixture {
                payments,
                ..Fixture::default()
            })),
            filter: DashboardFilter::default(),
            data: DashboardData::default(),
            config,
        }
    }

    fn set_filter() -> IpcCommand {
        IpcCommand::SetFilter {
            filter: DashboardFilter::default(),
        }
    }

    fn row_codes(state: &serde_json::Value) -> Vec<String> {
        state["list_rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["payment_code"].as_str().unwrap().to_string())
            .collect()
    }

    /// A malformed amount under strict normalization is reported as an
    /// error state; the session keeps answering commands.
    #[tokio::test]
    async fn malformed_amount_is_an_error_state_not_a_crash() {
        let mut s = session(vec![
            dto("P1", "12a", "2024-01-01T09:00:00"),
            dto("P2", "100", "2024-01-02T09:00:00"),
        ]);

        let state = handle_command(&mut s, set_filter()).await.unwrap().unwrap();
        assert_eq!(state["page_state"], "error");
        assert!(state["view"].is_null());
        let errors = state["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().contains("12a"));

        let state = handle_command(&mut s, IpcCommand::LoadMore).await.unwrap().unwrap();
        assert_eq!(state["page_state"], "error");
        assert_eq!(state["list_total"], 0);

        let state = handle_command(&mut s, IpcCommand::GetState).await.unwrap().unwrap();
        assert_eq!(state["page_state"], "error");

        assert!(handle_command(&mut s, IpcCommand::Quit).await.unwrap().is_none());
    }

    /// Rows are ordered newest first before the scroll window is cut, so
    /// `load_more` only appends older rows.
    #[tokio::test]
    async fn load_more_appends_older_rows() {
        let mut s = session(vec![
            dto("P3", "1", "2024-01-03T09:00:00"),
            dto("P1", "1", "2024-01-01T09:00:00"),
            dto("P5", "1", "2024-01-05T09:00:00"),
            dto("P2", "1", "2024-01-02T09:00:00"),
            dto("P4", "1", "2024-01-04T09:00:00"),
        ]);

        let state = handle_command(&mut s, set_filter()).await.unwrap().unwrap();
        assert_eq!(state["page_state"], "ready");
        assert_eq!(row_codes(&state), vec!["P5", "P4", "P3"]);
        assert_eq!(state["footer"], "more_available");

        let state = handle_command(&mut s, IpcCommand::LoadMore).await.unwrap().unwrap();
        assert_eq!(row_codes(&state), vec!["P5", "P4", "P3", "P2", "P1"]);
        assert_eq!(state["list_total"], 5);
        assert_eq!(state["footer"], "all_shown");
    }

    #[tokio::test]
    async fn unknown_merchant_detail_replies_with_error() {
        let mut s = session(Vec::new());
        let reply = handle_command(
            &mut s,
            IpcCommand::MerchantDetail {
                mcht_code: "M404".into(),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(reply["error"].as_str().unwrap().contains("M404"));
    }
}
