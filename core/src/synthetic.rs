//! Seeded synthetic portfolios for demos and property tests.
//!
//! Balances are Pareto-distributed, so concentration is realistic: a few
//! accounts hold most of the money. Same seed, same portfolio, every time.

use crate::{
    metrics::{AccountMetrics, RawAccountRow},
    rng::{Stream, StreamRng},
};
use serde::{Deserialize, Serialize};

pub const RISK_TOLERANCES: [&str; 3] = ["High", "Low", "Medium"];
pub const REGIONS: [&str; 4] = ["East", "North", "South", "West"];
pub const ACCOUNT_TYPES: [&str; 3] = ["Checking", "Investment", "Savings"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticSpec {
    pub accounts: usize,
    pub seed: u64,
    pub balance_x_min: f64,
    pub balance_alpha: f64,
    /// Probability an account is empty (balance exactly 0).
    pub zero_balance_probability: f64,
    pub loan_probability: f64,
}

impl SyntheticSpec {
    pub fn new(accounts: usize, seed: u64) -> Self {
        Self {
            accounts,
            seed,
            balance_x_min: 500.0,
            balance_alpha: 1.6,
            zero_balance_probability: 0.02,
            loan_probability: 0.35,
        }
    }

    pub fn generate(&self) -> Vec<AccountMetrics> {
        let mut balance_rng = StreamRng::new(self.seed, Stream::Balance);
        let mut attr_rng = StreamRng::new(self.seed, Stream::Attributes);
        let mut flow_rng = StreamRng::new(self.seed, Stream::Flows);
        let mut loan_rng = StreamRng::new(self.seed, Stream::Lending);

        (0..self.accounts)
            .map(|i| {
                let balance = if balance_rng.chance(self.zero_balance_probability) {
                    0.0
                } else {
                    (balance_rng.pareto(self.balance_x_min, self.balance_alpha) * 100.0).round()
                        / 100.0
                };
                let deposits = (balance * flow_rng.uniform(0.2, 1.5)).round();
                let withdrawals = (deposits * flow_rng.uniform(0.5, 1.2)).round();
                let (loan_amount, interest_rate) = if loan_rng.chance(self.loan_probability) {
                    (
                        loan_rng.pareto(2_000.0, 2.0).round(),
                        loan_rng.uniform(0.02, 0.12),
                    )
                } else {
                    (0.0, loan_rng.uniform(0.001, 0.04))
                };

                AccountMetrics::from_raw(RawAccountRow {
                    account_id: format!("ACC-{:06}", i + 1),
                    customer_id: format!("CUST-{:06}", i / 2 + 1),
                    risk_tolerance: attr_rng.pick(&RISK_TOLERANCES).to_string(),
                    region: attr_rng.pick(&REGIONS).to_string(),
                    account_type: attr_rng.pick(&ACCOUNT_TYPES).to_string(),
                    balance,
                    total_deposits: deposits,
                    total_withdrawals: withdrawals,
                    loan_amount,
                    interest_rate,
                })
            })
            .collect()
    }
}
