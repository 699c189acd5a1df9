//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The aggregation engine and the dashboard call store methods. They never
//! execute SQL directly, and every user-selected value reaches SQLite as a
//! bound parameter.

use crate::error::DashResult;
use rusqlite::{Connection, OpenFlags};

mod account;
mod aggregates;

pub struct MetricsStore {
    conn: Connection,
    read_only: bool,
}

impl MetricsStore {
    /// Open (or create) the metrics database at `path`. Used for loading.
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn, read_only: false })
    }

    /// Open an existing database for a dashboard session.
    /// The session never writes; SQLite enforces that.
    pub fn open_read_only(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        log::debug!("Opened {path} read-only");
        Ok(Self { conn, read_only: true })
    }

    /// Open an in-memory database (used in tests and synthetic runs).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, read_only: false })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_account_metrics.sql"))?;
        Ok(())
    }
}
