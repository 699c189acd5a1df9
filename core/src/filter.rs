//! Filter predicate builder.
//!
//! RULE: column names come from `FilterColumn`, never from user input.
//! Selected values are always bound as query parameters.

use crate::error::{DashError, DashResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A categorical column of `account_metrics` that the dashboard can filter on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterColumn {
    RiskTolerance,
    Region,
    AccountType,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [
        FilterColumn::RiskTolerance,
        FilterColumn::Region,
        FilterColumn::AccountType,
    ];

    /// The SQL column this filter constrains.
    pub fn column(self) -> &'static str {
        match self {
            FilterColumn::RiskTolerance => "risk_tolerance",
            FilterColumn::Region        => "region",
            FilterColumn::AccountType   => "account_type",
        }
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for FilterColumn {
    type Err = DashError;

    fn from_str(s: &str) -> DashResult<Self> {
        match s.trim() {
            "risk_tolerance" | "risk" => Ok(FilterColumn::RiskTolerance),
            "region"                  => Ok(FilterColumn::Region),
            "account_type"            => Ok(FilterColumn::AccountType),
            other => Err(DashError::UnknownFilterColumn { name: other.to_string() }),
        }
    }
}

/// One `column IN (...)` constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraint {
    pub column: FilterColumn,
    pub values: BTreeSet<String>,
}

/// A conjunction of constraints over the base row set.
///
/// An empty value set means "no constraint on that column": clearing a
/// selection shows every account rather than none.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSet {
    constraints: Vec<Constraint>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for `column`. Constraints keep the order in
    /// which their columns were first added.
    pub fn with<I, S>(mut self, column: FilterColumn, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(column, values);
        self
    }

    pub fn set<I, S>(&mut self, column: FilterColumn, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        match self.constraints.iter_mut().find(|c| c.column == column) {
            Some(existing) => existing.values = values,
            None => self.constraints.push(Constraint { column, values }),
        }
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    pub fn values(&self, column: FilterColumn) -> Option<&BTreeSet<String>> {
        self.constraints
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.values)
    }

    /// Constraints that actually restrict rows.
    pub fn active(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| !c.values.is_empty())
    }

    pub fn is_unfiltered(&self) -> bool {
        self.active().next().is_none()
    }

    /// Render as a `WHERE` clause with numbered placeholders, plus the
    /// values to bind in order. Returns an empty clause when unfiltered.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for constraint in self.active() {
            let placeholders: Vec<String> = constraint
                .values
                .iter()
                .map(|v| {
                    params.push(v.clone());
                    format!("?{}", params.len())
                })
                .collect();
            clauses.push(format!(
                "{} IN ({})",
                constraint.column.column(),
                placeholders.join(", ")
            ));
        }

        if clauses.is_empty() {
            return (String::new(), params);
        }
        (format!("WHERE {}", clauses.join(" AND ")), params)
    }
}

/// The values a user can pick from, per filter column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOptions {
    pub risk_tolerance: Vec<String>,
    pub region: Vec<String>,
    pub account_type: Vec<String>,
}

impl FilterOptions {
    pub fn insert(&mut self, column: FilterColumn, values: Vec<String>) {
        match column {
            FilterColumn::RiskTolerance => self.risk_tolerance = values,
            FilterColumn::Region        => self.region = values,
            FilterColumn::AccountType   => self.account_type = values,
        }
    }

    pub fn get(&self, column: FilterColumn) -> &[String] {
        match column {
            FilterColumn::RiskTolerance => &self.risk_tolerance,
            FilterColumn::Region        => &self.region,
            FilterColumn::AccountType   => &self.account_type,
        }
    }

    /// Every option selected: the dashboard's initial state.
    pub fn select_all(&self) -> FilterSet {
        FilterColumn::ALL
            .into_iter()
            .fold(FilterSet::new(), |set, column| {
                set.with(column, self.get(column).iter().cloned())
            })
    }
}
