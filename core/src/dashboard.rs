//! Dashboard session: one store handle, one config, full recompute per refresh.
//!
//! The session owns the only connection and is passed explicitly to whatever
//! needs to query. A filter change calls `refresh()` again; nothing is
//! cached between refreshes.

use crate::{
    aggregation::{AggregationEngine, PortfolioOverview, SegmentBreakdown},
    concentration::{ConcentrationReport, LorenzCurve},
    config::DashConfig,
    error::{DashError, DashResult},
    filter::{FilterColumn, FilterOptions, FilterSet},
    format::{fmt_count, fmt_money, fmt_pct},
    store::MetricsStore,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const NOT_ENOUGH_DATA: &str =
    "Not enough data after filters to compute Lorenz curve / Gini.";

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub filters: FilterSet,
    pub overview: PortfolioOverview,
    /// Risk first, then region, then account type.
    pub breakdowns: Vec<SegmentBreakdown>,
    /// None when the filters match no accounts.
    pub concentration: Option<ConcentrationReport>,
    pub narrative: Vec<String>,
}

impl DashboardView {
    pub fn breakdown(&self, dimension: FilterColumn) -> Option<&SegmentBreakdown> {
        self.breakdowns.iter().find(|b| b.dimension == dimension)
    }
}

pub struct Dashboard {
    store: MetricsStore,
    config: DashConfig,
}

impl Dashboard {
    pub fn new(store: MetricsStore, config: DashConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// Close the session and hand back the connection.
    pub fn into_store(self) -> MetricsStore {
        self.store
    }

    pub fn filter_options(&self) -> DashResult<FilterOptions> {
        self.store.filter_options()
    }

    /// Every available option selected.
    pub fn default_filters(&self) -> DashResult<FilterSet> {
        Ok(self.filter_options()?.select_all())
    }

    /// Full-resolution concentration report, or None for an empty selection.
    pub fn concentration(&self, filters: &FilterSet) -> DashResult<Option<ConcentrationReport>> {
        let balances = self.store.account_balances(filters)?;
        match ConcentrationReport::compute(&balances) {
            Ok(report) => Ok(Some(report)),
            Err(DashError::EmptyInput) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn refresh(&self, filters: &FilterSet) -> DashResult<DashboardView> {
        let started = Instant::now();
        let aggregation = AggregationEngine::new(&self.store);

        let overview = aggregation.overview(filters)?;
        let breakdowns = FilterColumn::ALL
            .into_iter()
            .map(|dimension| aggregation.breakdown(dimension, filters))
            .collect::<DashResult<Vec<_>>>()?;

        let concentration = self.concentration(filters)?.map(|mut report| {
            report.summary.lorenz = report.summary.lorenz.sampled(self.config.max_lorenz_points);
            report
        });

        let narrative = narrative(&overview, concentration.as_ref(), &self.config);

        log::debug!(
            "Refreshed dashboard: {} accounts, {} filter constraints, {:?}",
            overview.accounts,
            filters.active().count(),
            started.elapsed()
        );

        Ok(DashboardView {
            filters: filters.clone(),
            overview,
            breakdowns,
            concentration,
            narrative,
        })
    }
}

/// Plain-language summary lines shown under the charts.
pub fn narrative(
    overview: &PortfolioOverview,
    concentration: Option<&ConcentrationReport>,
    config: &DashConfig,
) -> Vec<String> {
    if overview.is_empty() {
        return vec![
            "No accounts match the current filters.".to_string(),
            NOT_ENOUGH_DATA.to_string(),
        ];
    }

    let mut lines = vec![format!(
        "{} accounts hold {} in total balance.",
        fmt_count(overview.accounts),
        fmt_money(overview.total_balance, &config.currency)
    )];

    let Some(report) = concentration else {
        lines.push(NOT_ENOUGH_DATA.to_string());
        return lines;
    };

    if let LorenzCurve::Degenerate = report.summary.lorenz {
        lines.push(
            "Total balance is zero, so there is no wealth to concentrate; \
             top-10% share and Gini are reported as 0."
                .to_string(),
        );
        return lines;
    }

    lines.push(format!(
        "The richest 10% of accounts hold {} of total balance.",
        fmt_pct(Some(report.top_share.top_10_share), config.share_decimals)
    ));
    lines.push(format!(
        "Gini coefficient {:.3} indicates {} concentration.",
        report.summary.gini,
        report.summary.label.as_str()
    ));
    lines
}
