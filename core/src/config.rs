//! Dashboard configuration loaded from `data/dashboard.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashConfig {
    /// Path of the SQLite file holding `account_metrics`.
    pub db_path: String,
    /// Symbol prefixed to every money amount.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Decimals used when rendering interest rates.
    #[serde(default = "default_decimals")]
    pub rate_decimals: usize,
    /// Decimals used when rendering shares (top-10% share).
    #[serde(default = "default_decimals")]
    pub share_decimals: usize,
    /// Upper bound on Lorenz points shipped to the chart.
    #[serde(default = "default_max_lorenz_points")]
    pub max_lorenz_points: usize,
}

fn default_currency() -> String {
    "$".into()
}

fn default_decimals() -> usize {
    2
}

fn default_max_lorenz_points() -> usize {
    200
}

impl DashConfig {
    /// Load from a JSON file.
    /// In tests, use DashConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.max_lorenz_points < 2 {
            anyhow::bail!("max_lorenz_points must be at least 2, got {}", config.max_lorenz_points);
        }
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self {
            db_path: ":memory:".into(),
            currency: default_currency(),
            rate_decimals: 2,
            share_decimals: 2,
            max_lorenz_points: default_max_lorenz_points(),
        }
    }
}
