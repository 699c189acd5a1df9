//! Aggregation engine: whole-set and grouped roll-ups over the filtered base view.
//!
//! Sums, counts and a balance-weighted interest rate. The SQL lives in the
//! store; this module owns the result types and their invariants.

use crate::{
    error::DashResult,
    filter::{FilterColumn, FilterSet},
    store::MetricsStore,
    types::Money,
};
use serde::{Deserialize, Serialize};

/// Headline numbers for the filtered portfolio.
///
/// Totals are None when the filter matches nothing, so the display can
/// show a placeholder instead of a misleading zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioOverview {
    pub accounts: i64,
    pub total_balance: Option<Money>,
    pub total_loan_amount: Option<Money>,
    /// `Σ(rate · balance) / Σ(balance)`; None when `Σ(balance) = 0`.
    pub weighted_avg_interest_rate: Option<f64>,
    pub avg_net_flow: Option<Money>,
}

impl PortfolioOverview {
    pub fn is_empty(&self) -> bool {
        self.accounts == 0
    }
}

/// One row of a segmentation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentRow {
    pub segment: String,
    pub accounts: i64,
    pub total_balance: Money,
    pub avg_balance: Money,
    pub total_loan_amount: Money,
    pub avg_net_flow: Money,
    pub weighted_avg_interest_rate: Option<f64>,
}

/// A segmentation table grouped by one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentBreakdown {
    pub dimension: FilterColumn,
    pub rows: Vec<SegmentRow>,
}

impl SegmentBreakdown {
    pub fn total_accounts(&self) -> i64 {
        self.rows.iter().map(|r| r.accounts).sum()
    }
}

pub struct AggregationEngine<'a> {
    store: &'a MetricsStore,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(store: &'a MetricsStore) -> Self {
        Self { store }
    }

    pub fn overview(&self, filter: &FilterSet) -> DashResult<PortfolioOverview> {
        self.store.portfolio_overview(filter)
    }

    /// Grouped roll-up by `dimension`, ordered by segment value.
    pub fn breakdown(
        &self,
        dimension: FilterColumn,
        filter: &FilterSet,
    ) -> DashResult<SegmentBreakdown> {
        let rows = self.store.segment_breakdown(dimension, filter)?;
        Ok(SegmentBreakdown { dimension, rows })
    }

    /// Risk segmentation: the breakdown the dashboard always shows.
    pub fn risk_segments(&self, filter: &FilterSet) -> DashResult<SegmentBreakdown> {
        self.breakdown(FilterColumn::RiskTolerance, filter)
    }
}
