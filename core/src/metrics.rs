//! The base metrics view: one row per account.
//!
//! Rows arrive raw (CSV or synthetic) and are staged here: text columns
//! trimmed, net flow and leverage derived. Nothing downstream recomputes them.

use crate::types::{AccountId, Money};
use serde::{Deserialize, Serialize};

/// An account exactly as it appears in the source extract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawAccountRow {
    pub account_id: String,
    pub customer_id: String,
    pub risk_tolerance: String,
    pub region: String,
    pub account_type: String,
    pub balance: f64,
    #[serde(default)]
    pub total_deposits: f64,
    #[serde(default)]
    pub total_withdrawals: f64,
    #[serde(default)]
    pub loan_amount: f64,
    #[serde(default)]
    pub interest_rate: f64,
}

/// A staged account row as stored in `account_metrics`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountMetrics {
    pub account_id: AccountId,
    pub customer_id: String,
    pub risk_tolerance: String,
    pub region: String,
    pub account_type: String,
    pub balance: Money,
    pub total_deposits: Money,
    pub total_withdrawals: Money,
    pub net_flow: Money,
    pub loan_amount: Money,
    pub interest_rate: f64,
    /// `loan_amount / balance`; None when the balance is zero.
    pub loan_to_balance: Option<f64>,
}

impl AccountMetrics {
    pub fn from_raw(raw: RawAccountRow) -> Self {
        let loan_to_balance = if raw.balance != 0.0 {
            Some(raw.loan_amount / raw.balance)
        } else {
            None
        };
        Self {
            account_id: raw.account_id.trim().to_string(),
            customer_id: raw.customer_id.trim().to_string(),
            risk_tolerance: raw.risk_tolerance.trim().to_string(),
            region: raw.region.trim().to_string(),
            account_type: raw.account_type.trim().to_string(),
            balance: raw.balance,
            total_deposits: raw.total_deposits,
            total_withdrawals: raw.total_withdrawals,
            net_flow: raw.total_deposits - raw.total_withdrawals,
            loan_amount: raw.loan_amount,
            interest_rate: raw.interest_rate,
            loan_to_balance,
        }
    }
}
