//! Durable slot persistence.
//!
//! RULE: Only the store module talks to the database.
//! The ledger is persisted as one JSON payload under a single slot key;
//! everything else reads and writes members through `LedgerStore`.

mod ledger_store;

pub use ledger_store::LedgerStore;

use crate::error::{LedgerError, LedgerResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// A named key-value location that survives process restarts.
pub trait DurableSlot: Send {
    fn read(&self, key: &str) -> LedgerResult<Option<String>>;
    fn write(&self, key: &str, payload: &str) -> LedgerResult<()>;
}

/// Outcome of the write that follows every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    Durable,
    /// The in-memory ledger changed but the slot could not be written.
    BestEffort { reason: String },
}

impl Persistence {
    pub fn is_durable(&self) -> bool {
        matches!(self, Persistence::Durable)
    }
}

pub struct SqliteSlot {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file or URI
}

impl SqliteSlot {
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open a private in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same database.
    /// A private in-memory database cannot be shared, so this yields a fresh one.
    pub fn reopen(&self) -> LedgerResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger_slot.sql"))?;
        Ok(())
    }

    /// Number of populated slots (for tests).
    pub fn slot_count(&self) -> LedgerResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ledger_slot", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl DurableSlot for SqliteSlot {
    fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM ledger_slot WHERE slot_key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write(&self, key: &str, payload: &str) -> LedgerResult<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT OR REPLACE INTO ledger_slot (slot_key, payload, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, payload, updated_at],
            )
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        Ok(())
    }
}
