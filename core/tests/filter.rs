use portfolio_core::{
    error::DashError,
    filter::{FilterColumn, FilterOptions, FilterSet},
};

#[test]
fn unfiltered_set_renders_no_clause() {
    let (clause, params) = FilterSet::new().to_sql();
    assert!(clause.is_empty());
    assert!(params.is_empty());
}

#[test]
fn constraints_render_as_numbered_placeholders() {
    let filters = FilterSet::new()
        .with(FilterColumn::RiskTolerance, ["Medium", "Low"])
        .with(FilterColumn::Region, ["North"]);
    let (clause, params) = filters.to_sql();

    assert_eq!(clause, "WHERE risk_tolerance IN (?1, ?2) AND region IN (?3)");
    // Values within a column are bound in sorted order.
    assert_eq!(params, vec!["Low", "Medium", "North"]);
}

#[test]
fn empty_selection_means_no_constraint() {
    let filters = FilterSet::new()
        .with(FilterColumn::RiskTolerance, Vec::<String>::new())
        .with(FilterColumn::AccountType, ["Savings"]);

    assert!(!filters.is_unfiltered());
    assert_eq!(filters.active().count(), 1);
    let (clause, params) = filters.to_sql();
    assert_eq!(clause, "WHERE account_type IN (?1)");
    assert_eq!(params, vec!["Savings"]);

    let cleared = FilterSet::new().with(FilterColumn::Region, Vec::<String>::new());
    assert!(cleared.is_unfiltered());
}

#[test]
fn set_replaces_previous_selection() {
    let mut filters = FilterSet::new().with(FilterColumn::Region, ["North", "South"]);
    filters.set(FilterColumn::Region, ["East"]);

    let values: Vec<&String> = filters.values(FilterColumn::Region).unwrap().iter().collect();
    assert_eq!(values, vec!["East"]);
    assert_eq!(filters.active().count(), 1);

    filters.clear();
    assert!(filters.is_unfiltered());
    assert!(filters.values(FilterColumn::Region).is_none());
}

#[test]
fn hostile_values_never_reach_the_clause() {
    let filters = FilterSet::new().with(FilterColumn::Region, ["'; DROP TABLE account_metrics; --"]);
    let (clause, params) = filters.to_sql();

    assert_eq!(clause, "WHERE region IN (?1)");
    assert_eq!(params, vec!["'; DROP TABLE account_metrics; --"]);
}

#[test]
fn column_names_parse_from_known_names_only() {
    assert_eq!("risk_tolerance".parse::<FilterColumn>().unwrap(), FilterColumn::RiskTolerance);
    assert_eq!("region".parse::<FilterColumn>().unwrap(), FilterColumn::Region);
    assert_eq!("account_type".parse::<FilterColumn>().unwrap(), FilterColumn::AccountType);

    match "balance; --".parse::<FilterColumn>() {
        Err(DashError::UnknownFilterColumn { name }) => assert_eq!(name, "balance; --"),
        other => panic!("expected UnknownFilterColumn, got {other:?}"),
    }
}

#[test]
fn select_all_covers_every_option() {
    let options = FilterOptions {
        risk_tolerance: vec!["High".into(), "Low".into()],
        region: vec!["North".into()],
        account_type: vec![],
    };
    let filters = options.select_all();

    assert_eq!(filters.values(FilterColumn::RiskTolerance).unwrap().len(), 2);
    assert_eq!(filters.values(FilterColumn::Region).unwrap().len(), 1);
    // No account types to pick from means no constraint at all.
    assert_eq!(filters.active().count(), 2);
}

#[test]
fn filter_set_round_trips_through_json() {
    let filters = FilterSet::new().with(FilterColumn::AccountType, ["Checking"]);
    let json = serde_json::to_string(&filters).unwrap();
    assert!(json.contains("account_type"));
    let back: FilterSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, filters);
}
