//! Wealth concentration engine.
//!
//! Given `(account_id, balance)` pairs, produces three independent products
//! from a single sort:
//!   1. Decile table  (ntile split of accounts ranked by balance, richest first)
//!   2. Top-10% share (balance held by decile 1 over total balance)
//!   3. Lorenz curve + Gini coefficient (poorest first)
//!
//! RULES:
//!   - Negative or non-finite balances are rejected, never skipped.
//!     Every product sees exactly the same account set.
//!   - Ties in balance are broken by account_id ascending, so decile
//!     membership is reproducible run to run.
//!   - Zero total balance is not an error: share and Gini are 0 and the
//!     Lorenz curve is `Degenerate`. No NaN ever leaves this module.

use crate::{
    error::{DashError, DashResult},
    types::{AccountId, Money, DECILE_COUNT},
};
use serde::{Deserialize, Serialize};

/// Integration slack absorbed by clamping. Anything further out is a bug.
pub const GINI_TOLERANCE: f64 = 1e-9;

// ── Public types ─────────────────────────────────────────────────────────────

/// Engine input: one account and its balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceEntry {
    pub account_id: AccountId,
    pub balance: Money,
}

impl BalanceEntry {
    pub fn new(account_id: impl Into<AccountId>, balance: Money) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedAccount {
    /// 1-based; rank 1 holds the highest balance.
    pub rank: usize,
    pub account_id: AccountId,
    pub balance: Money,
    /// 1..=10; decile 1 holds the highest balances.
    pub decile: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecileBucket {
    pub bucket_number: u8,
    pub accounts: usize,
    pub total_balance: Money,
    /// 0.0 for an empty bucket.
    pub avg_balance: Money,
    pub min_balance: Money,
    pub max_balance: Money,
}

impl DecileBucket {
    fn empty(bucket_number: u8) -> Self {
        Self {
            bucket_number,
            accounts: 0,
            total_balance: 0.0,
            avg_balance: 0.0,
            min_balance: 0.0,
            max_balance: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accounts == 0
    }
}

/// Always exactly ten buckets, bucket 1 first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecileTable {
    pub buckets: Vec<DecileBucket>,
}

impl DecileTable {
    /// Look up a bucket by its 1-based number.
    pub fn bucket(&self, bucket_number: u8) -> Option<&DecileBucket> {
        self.buckets.iter().find(|b| b.bucket_number == bucket_number)
    }

    pub fn total_accounts(&self) -> usize {
        self.buckets.iter().map(|b| b.accounts).sum()
    }

    pub fn total_balance(&self) -> Money {
        self.buckets.iter().map(|b| b.total_balance).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopShareResult {
    pub top_10_balance: Money,
    pub total_balance: Money,
    /// In [0, 1]; 0.0 when total balance is 0.
    pub top_10_share: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LorenzPoint {
    /// Cumulative share of accounts, poorest first.
    pub x: f64,
    /// Cumulative share of total balance.
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum LorenzCurve {
    /// Origin first, then one point per account, ending at (1, 1).
    Points(Vec<LorenzPoint>),
    /// Total balance is zero; every share would divide by zero.
    Degenerate,
}

impl LorenzCurve {
    pub fn points(&self) -> &[LorenzPoint] {
        match self {
            LorenzCurve::Points(points) => points,
            LorenzCurve::Degenerate => &[],
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, LorenzCurve::Degenerate)
    }

    /// Trapezoidal area under the curve. Points need not be evenly spaced.
    pub fn area(&self) -> f64 {
        self.points()
            .windows(2)
            .map(|w| (w[1].x - w[0].x) * (w[1].y + w[0].y) / 2.0)
            .sum()
    }

    /// Thin the curve to at most `max_points` for charting.
    /// The origin and the (1, 1) endpoint are always kept.
    pub fn sampled(&self, max_points: usize) -> LorenzCurve {
        let points = match self {
            LorenzCurve::Degenerate => return LorenzCurve::Degenerate,
            LorenzCurve::Points(points) => points,
        };
        let max_points = max_points.max(2);
        if points.len() <= max_points {
            return self.clone();
        }

        let last = points.len() - 1;
        let mut picked: Vec<LorenzPoint> = Vec::with_capacity(max_points);
        let mut prev_index = None;
        for k in 0..max_points {
            let index = ((k * last) as f64 / (max_points - 1) as f64).round() as usize;
            if prev_index != Some(index) {
                picked.push(points[index]);
                prev_index = Some(index);
            }
        }
        LorenzCurve::Points(picked)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GiniLabel {
    Even,
    Moderate,
    High,
    Extreme,
}

impl GiniLabel {
    /// Bands are inclusive on their lower bound.
    pub fn from_gini(gini: f64) -> Self {
        if gini < 0.35 {
            GiniLabel::Even
        } else if gini < 0.55 {
            GiniLabel::Moderate
        } else if gini < 0.70 {
            GiniLabel::High
        } else {
            GiniLabel::Extreme
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GiniLabel::Even     => "even",
            GiniLabel::Moderate => "moderate",
            GiniLabel::High     => "high",
            GiniLabel::Extreme  => "extreme",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcentrationSummary {
    pub gini: f64,
    pub label: GiniLabel,
    pub lorenz: LorenzCurve,
}

/// Everything the concentration section of the dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcentrationReport {
    pub accounts: usize,
    pub top_share: TopShareResult,
    pub deciles: DecileTable,
    pub summary: ConcentrationSummary,
}

impl ConcentrationReport {
    /// Validate, sort once, and derive all three products.
    pub fn compute(entries: &[BalanceEntry]) -> DashResult<Self> {
        let ranked = RankedPortfolio::rank(entries)?;
        let report = Self {
            accounts: ranked.len(),
            top_share: ranked.top_share(),
            deciles: ranked.deciles(),
            summary: ranked.summary()?,
        };
        log::debug!(
            "Concentration over {} accounts: top-10% share {:.4}, gini {:.4} ({})",
            report.accounts,
            report.top_share.top_10_share,
            report.summary.gini,
            report.summary.label.as_str(),
        );
        Ok(report)
    }
}

// ── Ranking ──────────────────────────────────────────────────────────────────

/// Accounts sorted by balance descending, ties by account_id ascending,
/// each tagged with its rank and decile.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPortfolio {
    accounts: Vec<RankedAccount>,
    total_balance: Money,
}

impl RankedPortfolio {
    pub fn rank(entries: &[BalanceEntry]) -> DashResult<Self> {
        if entries.is_empty() {
            return Err(DashError::EmptyInput);
        }
        for entry in entries {
            if !entry.balance.is_finite() {
                return Err(DashError::NonFiniteBalance {
                    account_id: entry.account_id.clone(),
                });
            }
            if entry.balance < 0.0 {
                return Err(DashError::NegativeBalance {
                    account_id: entry.account_id.clone(),
                    balance: entry.balance,
                });
            }
        }

        let mut sorted: Vec<&BalanceEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| {
            b.balance
                .total_cmp(&a.balance)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        let sizes = ntile_sizes(sorted.len(), DECILE_COUNT);
        let deciles = sizes
            .iter()
            .enumerate()
            .flat_map(|(i, &size)| std::iter::repeat(i as u8 + 1).take(size));

        let accounts: Vec<RankedAccount> = sorted
            .into_iter()
            .zip(deciles)
            .enumerate()
            .map(|(i, (entry, decile))| RankedAccount {
                rank: i + 1,
                account_id: entry.account_id.clone(),
                balance: entry.balance,
                decile,
            })
            .collect();
        let total_balance: Money = accounts.iter().map(|a| a.balance).sum();

        Ok(Self {
            accounts,
            total_balance,
        })
    }

    pub fn accounts(&self) -> &[RankedAccount] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn total_balance(&self) -> Money {
        self.total_balance
    }

    pub fn deciles(&self) -> DecileTable {
        let mut buckets = Vec::with_capacity(DECILE_COUNT);
        let mut start = 0;
        for (i, size) in ntile_sizes(self.accounts.len(), DECILE_COUNT)
            .into_iter()
            .enumerate()
        {
            let bucket_number = i as u8 + 1;
            let members = &self.accounts[start..start + size];
            start += size;

            let (first, last) = match (members.first(), members.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    buckets.push(DecileBucket::empty(bucket_number));
                    continue;
                }
            };
            let total: Money = members.iter().map(|a| a.balance).sum();
            buckets.push(DecileBucket {
                bucket_number,
                accounts: size,
                total_balance: total,
                avg_balance: total / size as f64,
                // Members are in descending balance order.
                min_balance: last.balance,
                max_balance: first.balance,
            });
        }
        DecileTable { buckets }
    }

    pub fn top_share(&self) -> TopShareResult {
        let top_size = ntile_sizes(self.accounts.len(), DECILE_COUNT)[0];
        let top_10_balance: Money = self.accounts[..top_size].iter().map(|a| a.balance).sum();
        let top_10_share = if self.total_balance > 0.0 {
            top_10_balance / self.total_balance
        } else {
            0.0
        };
        TopShareResult {
            top_10_balance,
            total_balance: self.total_balance,
            top_10_share,
        }
    }

    /// Lorenz curve, built in ASCENDING balance order (the reverse of ranking).
    pub fn lorenz_curve(&self) -> LorenzCurve {
        let n = self.accounts.len();
        let cumulative: Vec<Money> = self
            .accounts
            .iter()
            .rev()
            .scan(0.0, |running, a| {
                *running += a.balance;
                Some(*running)
            })
            .collect();

        // The last running sum is the total in this summation order, so the
        // final point is exactly (1, 1).
        let total = match cumulative.last() {
            Some(&total) if total > 0.0 => total,
            _ => return LorenzCurve::Degenerate,
        };

        let mut points = Vec::with_capacity(n + 1);
        points.push(LorenzPoint { x: 0.0, y: 0.0 });
        points.extend(cumulative.iter().enumerate().map(|(i, cum)| LorenzPoint {
            x: (i + 1) as f64 / n as f64,
            y: cum / total,
        }));
        LorenzCurve::Points(points)
    }

    pub fn summary(&self) -> DashResult<ConcentrationSummary> {
        let lorenz = self.lorenz_curve();
        let gini = gini_from_lorenz(&lorenz)?;
        Ok(ConcentrationSummary {
            gini,
            label: GiniLabel::from_gini(gini),
            lorenz,
        })
    }
}

// ── Standalone entry points ──────────────────────────────────────────────────

pub fn decile_table(entries: &[BalanceEntry]) -> DashResult<DecileTable> {
    Ok(RankedPortfolio::rank(entries)?.deciles())
}

pub fn top_share(entries: &[BalanceEntry]) -> DashResult<TopShareResult> {
    Ok(RankedPortfolio::rank(entries)?.top_share())
}

pub fn lorenz_curve(entries: &[BalanceEntry]) -> DashResult<LorenzCurve> {
    Ok(RankedPortfolio::rank(entries)?.lorenz_curve())
}

/// `1 - 2 × area`, clamped into [0, 1]. A degenerate curve has Gini 0.
pub fn gini_from_lorenz(curve: &LorenzCurve) -> DashResult<f64> {
    if curve.is_degenerate() {
        return Ok(0.0);
    }
    let raw = 1.0 - 2.0 * curve.area();
    if !(-GINI_TOLERANCE..=1.0 + GINI_TOLERANCE).contains(&raw) {
        return Err(DashError::GiniOutOfRange { raw });
    }
    if raw.abs() < GINI_TOLERANCE {
        return Ok(0.0);
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Group sizes for an ntile split of `n` items into `groups`.
/// The first `n % groups` groups get one extra item.
pub fn ntile_sizes(n: usize, groups: usize) -> Vec<usize> {
    let base = n / groups;
    let remainder = n % groups;
    (0..groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
