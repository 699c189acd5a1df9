use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Account set is empty: concentration metrics are undefined")]
    EmptyInput,

    #[error("Account '{account_id}' has negative balance {balance}")]
    NegativeBalance { account_id: String, balance: f64 },

    #[error("Account '{account_id}' has a non-finite balance")]
    NonFiniteBalance { account_id: String },

    #[error("Gini integration produced {raw}, outside [0, 1] beyond tolerance")]
    GiniOutOfRange { raw: f64 },

    #[error("Unknown filter column '{name}'")]
    UnknownFilterColumn { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
