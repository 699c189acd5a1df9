//! Shared primitive types used across the dashboard.

/// A stable, unique account identifier.
pub type AccountId = String;

/// Currency amount. Balances, deposits and loans are all plain doubles.
pub type Money = f64;

/// Number of equal-population groups the concentration engine partitions into.
pub const DECILE_COUNT: usize = 10;
