use super::MetricsStore;
use crate::{
    concentration::BalanceEntry,
    error::DashResult,
    filter::FilterSet,
    metrics::AccountMetrics,
};
use rusqlite::{params, params_from_iter};

const INSERT_ACCOUNT: &str =
    "INSERT INTO account_metrics (
        account_id, customer_id, risk_tolerance, region, account_type, balance,
        total_deposits, total_withdrawals, net_flow, loan_amount, interest_rate,
        loan_to_balance
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

impl MetricsStore {
    // ── Account metrics ───────────────────────────────────────────

    pub fn insert_account_metrics(&self, m: &AccountMetrics) -> DashResult<()> {
        self.conn.execute(
            INSERT_ACCOUNT,
            params![
                &m.account_id,
                &m.customer_id,
                &m.risk_tolerance,
                &m.region,
                &m.account_type,
                m.balance,
                m.total_deposits,
                m.total_withdrawals,
                m.net_flow,
                m.loan_amount,
                m.interest_rate,
                m.loan_to_balance,
            ],
        )?;
        Ok(())
    }

    /// Insert every row in one transaction. Either all rows land or none do.
    pub fn insert_many(&self, rows: &[AccountMetrics]) -> DashResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_ACCOUNT)?;
            for m in rows {
                stmt.execute(params![
                    &m.account_id,
                    &m.customer_id,
                    &m.risk_tolerance,
                    &m.region,
                    &m.account_type,
                    m.balance,
                    m.total_deposits,
                    m.total_withdrawals,
                    m.net_flow,
                    m.loan_amount,
                    m.interest_rate,
                    m.loan_to_balance,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn account_count(&self) -> DashResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM account_metrics",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn account_metrics(&self, account_id: &str) -> DashResult<Option<AccountMetrics>> {
        use rusqlite::OptionalExtension;
        let row = self
            .conn
            .query_row(
                "SELECT account_id, customer_id, risk_tolerance, region, account_type, balance,
                        total_deposits, total_withdrawals, net_flow, loan_amount, interest_rate,
                        loan_to_balance
                 FROM account_metrics WHERE account_id = ?1",
                params![account_id],
                |row| {
                    Ok(AccountMetrics {
                        account_id: row.get(0)?,
                        customer_id: row.get(1)?,
                        risk_tolerance: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        region: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        account_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        balance: row.get(5)?,
                        total_deposits: row.get(6)?,
                        total_withdrawals: row.get(7)?,
                        net_flow: row.get(8)?,
                        loan_amount: row.get(9)?,
                        interest_rate: row.get(10)?,
                        loan_to_balance: row.get(11)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// `(account_id, balance)` for every account matching `filter`, ordered
    /// by account id. This is the only input the concentration engine sees.
    pub fn account_balances(&self, filter: &FilterSet) -> DashResult<Vec<BalanceEntry>> {
        let (where_clause, values) = filter.to_sql();
        let sql = format!(
            "SELECT account_id, balance
             FROM account_metrics
             {where_clause}
             ORDER BY account_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(BalanceEntry {
                account_id: row.get(0)?,
                balance: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
