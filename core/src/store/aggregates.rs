use super::MetricsStore;
use crate::{
    aggregation::{PortfolioOverview, SegmentRow},
    concentration::DecileBucket,
    error::DashResult,
    filter::{FilterColumn, FilterOptions, FilterSet},
};
use rusqlite::params_from_iter;

impl MetricsStore {
    // ── Filter options ────────────────────────────────────────────

    /// Distinct, non-null, sorted values for every filter column.
    pub fn filter_options(&self) -> DashResult<FilterOptions> {
        let mut options = FilterOptions::default();
        for column in FilterColumn::ALL {
            let sql = format!(
                "SELECT DISTINCT {col} FROM account_metrics
                 WHERE {col} IS NOT NULL
                 ORDER BY {col} ASC",
                col = column.column()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            options.insert(column, values);
        }
        Ok(options)
    }

    // ── Aggregates ────────────────────────────────────────────────

    pub fn portfolio_overview(&self, filter: &FilterSet) -> DashResult<PortfolioOverview> {
        let (where_clause, values) = filter.to_sql();
        let sql = format!(
            "SELECT
                COUNT(*),
                SUM(balance),
                SUM(loan_amount),
                CASE
                    WHEN SUM(balance) IS NULL OR SUM(balance) = 0 THEN NULL
                    ELSE SUM(interest_rate * balance) / SUM(balance)
                END,
                AVG(net_flow)
             FROM account_metrics
             {where_clause}"
        );
        let overview = self
            .conn
            .query_row(&sql, params_from_iter(values.iter()), |row| {
                Ok(PortfolioOverview {
                    accounts: row.get(0)?,
                    total_balance: row.get(1)?,
                    total_loan_amount: row.get(2)?,
                    weighted_avg_interest_rate: row.get(3)?,
                    avg_net_flow: row.get(4)?,
                })
            })?;
        Ok(overview)
    }

    pub fn segment_breakdown(
        &self,
        dimension: FilterColumn,
        filter: &FilterSet,
    ) -> DashResult<Vec<SegmentRow>> {
        let (where_clause, values) = filter.to_sql();
        let sql = format!(
            "SELECT
                COALESCE({col}, '(unknown)'),
                COUNT(*),
                SUM(balance),
                AVG(balance),
                SUM(loan_amount),
                AVG(net_flow),
                CASE
                    WHEN SUM(balance) = 0 THEN NULL
                    ELSE SUM(interest_rate * balance) / SUM(balance)
                END
             FROM account_metrics
             {where_clause}
             GROUP BY 1
             ORDER BY 1",
            col = dimension.column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(SegmentRow {
                segment: row.get(0)?,
                accounts: row.get(1)?,
                total_balance: row.get(2)?,
                avg_balance: row.get(3)?,
                total_loan_amount: row.get(4)?,
                avg_net_flow: row.get(5)?,
                weighted_avg_interest_rate: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Decile table computed inside SQLite with `NTILE(10)`.
    ///
    /// Ordered by `balance DESC, account_id ASC` so membership matches the
    /// in-process partitioner. Only non-empty deciles are returned.
    pub fn decile_table_sql(&self, filter: &FilterSet) -> DashResult<Vec<DecileBucket>> {
        let (where_clause, values) = filter.to_sql();
        let sql = format!(
            "WITH deciled AS (
                SELECT
                    balance,
                    NTILE(10) OVER (ORDER BY balance DESC, account_id ASC) AS decile
                FROM account_metrics
                {where_clause}
             )
             SELECT
                decile,
                COUNT(*),
                SUM(balance),
                AVG(balance),
                MIN(balance),
                MAX(balance)
             FROM deciled
             GROUP BY decile
             ORDER BY decile"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(DecileBucket {
                bucket_number: row.get::<_, i64>(0)? as u8,
                accounts: row.get::<_, i64>(1)? as usize,
                total_balance: row.get(2)?,
                avg_balance: row.get(3)?,
                min_balance: row.get(4)?,
                max_balance: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
