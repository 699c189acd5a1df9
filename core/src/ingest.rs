//! CSV ingestion into `account_metrics`.
//!
//! Rows are staged (trimmed, derived columns filled) and written in one
//! transaction. Negative balances are loaded as-is and only warned about:
//! rejecting them is the concentration engine's job.

use crate::{
    error::DashResult,
    metrics::{AccountMetrics, RawAccountRow},
    store::MetricsStore,
};
use std::io::Read;
use std::path::Path;

/// Parse and stage every row of a CSV extract with a header line.
pub fn read_accounts<R: Read>(reader: R) -> DashResult<Vec<AccountMetrics>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawAccountRow>() {
        let staged = AccountMetrics::from_raw(record?);
        if staged.balance < 0.0 {
            log::warn!(
                "Account {} has negative balance {:.2}; concentration queries covering it will fail",
                staged.account_id,
                staged.balance
            );
        }
        rows.push(staged);
    }
    Ok(rows)
}

/// Load a CSV file into the store. Returns the number of rows inserted.
pub fn load_csv(path: impl AsRef<Path>, store: &MetricsStore) -> DashResult<usize> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let rows = read_accounts(file)?;
    let inserted = store.insert_many(&rows)?;
    log::info!("Loaded {inserted} accounts from {}", path.display());
    Ok(inserted)
}
