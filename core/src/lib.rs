//! Portfolio dashboard core.
//!
//! Layers, leaf first:
//!   1. filter         typed predicates over categorical columns
//!   2. store          the only code that talks to SQLite
//!   3. aggregation    overview and segment roll-ups
//!   4. concentration  deciles, top-10% share, Lorenz curve, Gini
//!   5. dashboard      session context, refresh, narrative

pub mod aggregation;
pub mod concentration;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod metrics;
pub mod rng;
pub mod store;
pub mod synthetic;
pub mod types;
