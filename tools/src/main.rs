//! dash-runner: headless runner for the portfolio dashboard.
//!
//! Usage:
//!   dash-runner --db fintech.db --load-csv data/accounts_sample.csv
//!   dash-runner --db fintech.db --risk High,Medium --region North
//!   dash-runner --synthetic 1000 --seed 42 --json
//!   dash-runner --db fintech.db --ipc-mode

use anyhow::Result;
use portfolio_core::{
    config::DashConfig,
    dashboard::{Dashboard, DashboardView},
    filter::{FilterColumn, FilterSet},
    format::{decile_label, fmt_count, fmt_money, fmt_pct, fmt_pct_from_rate},
    ingest,
    store::MetricsStore,
    synthetic::SyntheticSpec,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

const BAR_WIDTH: usize = 40;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetFilters {
        #[serde(default)]
        risk_tolerance: Vec<String>,
        #[serde(default)]
        region: Vec<String>,
        #[serde(default)]
        account_type: Vec<String>,
    },
    ClearFilters,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = arg_value(&args, "--config").unwrap_or("./data/dashboard.json");
    let mut config = if Path::new(config_path).exists() {
        DashConfig::load(config_path)?
    } else {
        log::warn!("No config at {config_path}; using defaults");
        DashConfig::default_test()
    };
    if let Some(db) = arg_value(&args, "--db") {
        config.db_path = db.to_string();
    }

    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json_mode = args.iter().any(|a| a == "--json");
    let synthetic = arg_value(&args, "--synthetic").and_then(|v| v.parse::<usize>().ok());
    let seed = parse_arg(&args, "--seed", 42u64);

    let store = if let Some(accounts) = synthetic {
        let store = MetricsStore::in_memory()?;
        store.migrate()?;
        store.insert_many(&SyntheticSpec::new(accounts, seed).generate())?;
        log::info!("Generated {accounts} synthetic accounts (seed {seed})");
        store
    } else if let Some(csv_path) = arg_value(&args, "--load-csv") {
        let store = MetricsStore::open(&config.db_path)?;
        store.migrate()?;
        let loaded = ingest::load_csv(csv_path, &store)?;
        if !ipc_mode && !json_mode {
            println!("Loaded {loaded} accounts from {csv_path} into {}", config.db_path);
        }
        store
    } else {
        MetricsStore::open_read_only(&config.db_path)?
    };

    let dashboard = Dashboard::new(store, config);
    let mut filters = dashboard.default_filters()?;
    apply_cli_filters(&args, &mut filters);

    if ipc_mode {
        run_ipc_loop(&dashboard, filters)?;
    } else {
        let view = dashboard.refresh(&filters)?;
        if json_mode {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print_report(&view, dashboard.config());
        }
    }

    Ok(())
}

fn apply_cli_filters(args: &[String], filters: &mut FilterSet) {
    for (flag, column) in [
        ("--risk", FilterColumn::RiskTolerance),
        ("--region", FilterColumn::Region),
        ("--account-type", FilterColumn::AccountType),
    ] {
        if let Some(list) = arg_value(args, flag) {
            filters.set(
                column,
                list.split(',').map(str::trim).filter(|v| !v.is_empty()),
            );
        }
    }
}

fn run_ipc_loop(dashboard: &Dashboard, mut filters: FilterSet) -> Result<()> {
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
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::ClearFilters => filters.clear(),
            IpcCommand::SetFilters {
                risk_tolerance,
                region,
                account_type,
            } => {
                filters = FilterSet::new()
                    .with(FilterColumn::RiskTolerance, risk_tolerance)
                    .with(FilterColumn::Region, region)
                    .with(FilterColumn::AccountType, account_type);
            }
        }

        // A failed refresh is reported to the client; the session stays up.
        match dashboard.refresh(&filters) {
            Ok(view) => writeln!(stdout, "{}", serde_json::to_string(&view)?)?,
            Err(e) => {
                log::warn!("Refresh failed: {e}");
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_report(view: &DashboardView, config: &DashConfig) {
    let money = |x: Option<f64>| fmt_money(x, &config.currency);
    let o = &view.overview;

    println!("Fintech Portfolio Dashboard");
    println!("  db:        {}", config.db_path);
    println!("  generated: {}", chrono::Utc::now().to_rfc3339());
    for column in FilterColumn::ALL {
        let selected = view
            .filters
            .values(column)
            .filter(|v| !v.is_empty())
            .map(|v| v.iter().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "(all)".into());
        println!("  {:<15} {selected}", format!("{column}:"));
    }
    println!();

    println!("=== PORTFOLIO OVERVIEW ===");
    println!("  accounts:            {}", fmt_count(o.accounts));
    println!("  total balance:       {}", money(o.total_balance));
    println!("  total loan amount:   {}", money(o.total_loan_amount));
    println!(
        "  wtd avg interest:    {}",
        fmt_pct_from_rate(o.weighted_avg_interest_rate, config.rate_decimals)
    );
    println!("  avg net flow:        {}", money(o.avg_net_flow));
    println!();

    for breakdown in &view.breakdowns {
        println!("=== SEGMENTATION BY {} ===", breakdown.dimension.column().to_uppercase());
        println!(
            "  {:<12} {:>9} {:>16} {:>14} {:>14} {:>14} {:>10}",
            "segment", "accounts", "total balance", "avg balance", "total loan", "avg net flow", "wtd rate"
        );
        for r in &breakdown.rows {
            println!(
                "  {:<12} {:>9} {:>16} {:>14} {:>14} {:>14} {:>10}",
                r.segment,
                fmt_count(r.accounts),
                money(Some(r.total_balance)),
                money(Some(r.avg_balance)),
                money(Some(r.total_loan_amount)),
                money(Some(r.avg_net_flow)),
                fmt_pct_from_rate(r.weighted_avg_interest_rate, config.rate_decimals),
            );
        }
        println!();
    }

    println!("=== WEALTH CONCENTRATION ===");
    match &view.concentration {
        None => println!("  (no accounts after filters)"),
        Some(report) => {
            let t = &report.top_share;
            println!("  total balance:    {}", money(Some(t.total_balance)));
            println!("  top 10% balance:  {}", money(Some(t.top_10_balance)));
            println!(
                "  top 10% share:    {}",
                fmt_pct(Some(t.top_10_share), config.share_decimals)
            );
            println!();
            println!(
                "  {:<6} {:>9} {:>14} {:>14} {:>14} {:>16}",
                "decile", "accounts", "min", "avg", "max", "total"
            );
            let max_total = report
                .deciles
                .buckets
                .iter()
                .map(|b| b.total_balance)
                .fold(0.0_f64, f64::max);
            for b in &report.deciles.buckets {
                let bar_len = if max_total > 0.0 {
                    ((b.total_balance / max_total) * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                println!(
                    "  {:<6} {:>9} {:>14} {:>14} {:>14} {:>16} {}",
                    decile_label(b.bucket_number),
                    b.accounts,
                    money(Some(b.min_balance)),
                    money(Some(b.avg_balance)),
                    money(Some(b.max_balance)),
                    money(Some(b.total_balance)),
                    "#".repeat(bar_len),
                );
            }
            println!();
            println!(
                "  gini coefficient: {:.3} ({})",
                report.summary.gini,
                report.summary.label.as_str()
            );
            println!("  lorenz points:    {}", report.summary.lorenz.points().len());
        }
    }
    println!();

    for line in &view.narrative {
        println!("{line}");
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    arg_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
