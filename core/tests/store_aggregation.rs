use portfolio_core::{
    aggregation::AggregationEngine,
    concentration::{decile_table, BalanceEntry},
    error::DashError,
    filter::{FilterColumn, FilterSet},
    metrics::{AccountMetrics, RawAccountRow},
    store::MetricsStore,
    synthetic::SyntheticSpec,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn account(
    id: &str,
    risk: &str,
    region: &str,
    account_type: &str,
    balance: f64,
    deposits: f64,
    withdrawals: f64,
    loan: f64,
    rate: f64,
) -> AccountMetrics {
    AccountMetrics::from_raw(RawAccountRow {
        account_id: id.into(),
        customer_id: format!("cust-{id}"),
        risk_tolerance: risk.into(),
        region: region.into(),
        account_type: account_type.into(),
        balance,
        total_deposits: deposits,
        total_withdrawals: withdrawals,
        loan_amount: loan,
        interest_rate: rate,
    })
}

/// Five accounts, total balance 2000, total loans 6000.
fn fixture_store() -> MetricsStore {
    let store = MetricsStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let rows = vec![
        account("A1", "Low", "North", "Savings", 100.0, 200.0, 100.0, 0.0, 0.01),
        account("A2", "Low", "South", "Checking", 300.0, 500.0, 100.0, 1000.0, 0.03),
        account("A3", "Medium", "North", "Savings", 600.0, 600.0, 0.0, 0.0, 0.02),
        account("A4", "High", "East", "Investment", 1000.0, 1500.0, 700.0, 5000.0, 0.05),
        account("A5", "High", "North", "Checking", 0.0, 100.0, 100.0, 0.0, 0.0),
    ];
    store.insert_many(&rows).expect("insert fixture");
    store
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Store ────────────────────────────────────────────────────────────────────

#[test]
fn insert_and_read_back_staged_row() {
    let store = fixture_store();
    assert_eq!(store.account_count().unwrap(), 5);

    let a4 = store.account_metrics("A4").unwrap().expect("A4 exists");
    assert_eq!(a4.net_flow, 800.0);
    assert_eq!(a4.loan_to_balance, Some(5.0));

    let a5 = store.account_metrics("A5").unwrap().expect("A5 exists");
    assert_eq!(a5.loan_to_balance, None);

    assert!(store.account_metrics("missing").unwrap().is_none());
}

#[test]
fn duplicate_account_rolls_back_whole_batch() {
    let store = fixture_store();
    let batch = vec![
        account("B1", "Low", "West", "Savings", 10.0, 0.0, 0.0, 0.0, 0.0),
        account("A1", "Low", "West", "Savings", 10.0, 0.0, 0.0, 0.0, 0.0),
    ];
    let err = store.insert_many(&batch).unwrap_err();
    assert!(matches!(err, DashError::Database(_)));
    assert_eq!(store.account_count().unwrap(), 5, "partial batch must not land");
}

#[test]
fn filter_options_are_distinct_and_sorted() {
    let store = fixture_store();
    let options = store.filter_options().unwrap();

    assert_eq!(options.risk_tolerance, vec!["High", "Low", "Medium"]);
    assert_eq!(options.region, vec!["East", "North", "South"]);
    assert_eq!(options.account_type, vec!["Checking", "Investment", "Savings"]);

    let everything = options.select_all();
    assert_eq!(store.account_balances(&everything).unwrap().len(), 5);
}

#[test]
fn balances_respect_filters() {
    let store = fixture_store();
    let north = FilterSet::new().with(FilterColumn::Region, ["North"]);
    let ids: Vec<String> = store
        .account_balances(&north)
        .unwrap()
        .into_iter()
        .map(|e| e.account_id)
        .collect();
    assert_eq!(ids, vec!["A1", "A3", "A5"]);

    let high_north = north.clone().with(FilterColumn::RiskTolerance, ["High"]);
    assert_eq!(
        store.account_balances(&high_north).unwrap(),
        vec![BalanceEntry::new("A5", 0.0)]
    );
}

#[test]
fn injected_quote_is_just_a_value() {
    let store = fixture_store();
    let hostile = FilterSet::new().with(
        FilterColumn::Region,
        ["North' OR '1'='1", "x'); DROP TABLE account_metrics; --"],
    );

    assert!(store.account_balances(&hostile).unwrap().is_empty());
    assert_eq!(store.portfolio_overview(&hostile).unwrap().accounts, 0);
    assert_eq!(store.account_count().unwrap(), 5, "table must survive");
}

// ── Aggregation ──────────────────────────────────────────────────────────────

#[test]
fn overview_over_whole_portfolio() {
    let store = fixture_store();
    let engine = AggregationEngine::new(&store);
    let o = engine.overview(&FilterSet::new()).unwrap();

    assert_eq!(o.accounts, 5);
    assert_eq!(o.total_balance, Some(2000.0));
    assert_eq!(o.total_loan_amount, Some(6000.0));
    // (1 + 9 + 12 + 50 + 0) / 2000
    assert!(approx(o.weighted_avg_interest_rate.unwrap(), 0.036));
    assert!(approx(o.avg_net_flow.unwrap(), 380.0));
}

#[test]
fn overview_of_empty_selection_has_no_totals() {
    let store = fixture_store();
    let engine = AggregationEngine::new(&store);
    let nowhere = FilterSet::new().with(FilterColumn::Region, ["Atlantis"]);
    let o = engine.overview(&nowhere).unwrap();

    assert!(o.is_empty());
    assert_eq!(o.total_balance, None);
    assert_eq!(o.total_loan_amount, None);
    assert_eq!(o.weighted_avg_interest_rate, None);
    assert_eq!(o.avg_net_flow, None);
}

#[test]
fn weighted_rate_is_undefined_for_zero_balance() {
    let store = fixture_store();
    let engine = AggregationEngine::new(&store);
    let only_empty = FilterSet::new()
        .with(FilterColumn::RiskTolerance, ["High"])
        .with(FilterColumn::Region, ["North"]);
    let o = engine.overview(&only_empty).unwrap();

    assert_eq!(o.accounts, 1);
    assert_eq!(o.total_balance, Some(0.0));
    assert_eq!(o.weighted_avg_interest_rate, None);
}

#[test]
fn risk_segmentation_rows() {
    let store = fixture_store();
    let engine = AggregationEngine::new(&store);
    let breakdown = engine.risk_segments(&FilterSet::new()).unwrap();

    assert_eq!(breakdown.dimension, FilterColumn::RiskTolerance);
    assert_eq!(breakdown.total_accounts(), 5);
    let names: Vec<&str> = breakdown.rows.iter().map(|r| r.segment.as_str()).collect();
    assert_eq!(names, vec!["High", "Low", "Medium"]);

    let high = &breakdown.rows[0];
    assert_eq!(high.accounts, 2);
    assert_eq!(high.total_balance, 1000.0);
    assert_eq!(high.avg_balance, 500.0);
    assert_eq!(high.total_loan_amount, 5000.0);
    assert!(approx(high.avg_net_flow, 400.0));
    assert!(approx(high.weighted_avg_interest_rate.unwrap(), 0.05));

    let low = &breakdown.rows[1];
    assert_eq!(low.accounts, 2);
    assert_eq!(low.total_balance, 400.0);
    assert!(approx(low.weighted_avg_interest_rate.unwrap(), 0.025));
}

#[test]
fn breakdown_by_region_honours_filter() {
    let store = fixture_store();
    let engine = AggregationEngine::new(&store);
    let savings = FilterSet::new().with(FilterColumn::AccountType, ["Savings"]);
    let breakdown = engine.breakdown(FilterColumn::Region, &savings).unwrap();

    assert_eq!(breakdown.rows.len(), 1);
    assert_eq!(breakdown.rows[0].segment, "North");
    assert_eq!(breakdown.rows[0].accounts, 2);
    assert_eq!(breakdown.rows[0].total_balance, 700.0);
}

// ── SQL reconciliation ───────────────────────────────────────────────────────

/// SQLite's NTILE must put every account in the same decile as the
/// in-process partitioner, including at tie boundaries.
#[test]
fn sql_deciles_match_engine_deciles() {
    let store = MetricsStore::in_memory().unwrap();
    store.migrate().unwrap();
    let mut rows = SyntheticSpec::new(137, 99).generate();
    // Force a run of ties across a decile boundary.
    for row in rows.iter_mut().take(20) {
        row.balance = 1_000.0;
    }
    store.insert_many(&rows).unwrap();

    for filter in [
        FilterSet::new(),
        FilterSet::new().with(FilterColumn::Region, ["North", "South"]),
    ] {
        let balances = store.account_balances(&filter).unwrap();
        let engine = decile_table(&balances).unwrap();
        let sql = store.decile_table_sql(&filter).unwrap();

        let filled: Vec<_> = engine.buckets.iter().filter(|b| !b.is_empty()).collect();
        assert_eq!(sql.len(), filled.len());
        for (s, e) in sql.iter().zip(filled) {
            assert_eq!(s.bucket_number, e.bucket_number);
            assert_eq!(s.accounts, e.accounts);
            assert_eq!(s.min_balance, e.min_balance);
            assert_eq!(s.max_balance, e.max_balance);
            assert!((s.total_balance - e.total_balance).abs() < 1e-6);
        }
    }
}
