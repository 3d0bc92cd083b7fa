//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Pipeline stages call store methods; they never execute SQL directly.
//!
//! A WarehouseStore owns exactly one connection. Dropping the store closes
//! it, so each stage scopes its store to the block that uses it.

mod financials;

use crate::error::{PipelineError, PipelineResult};
use rusqlite::Connection;
use std::path::Path;

pub struct WarehouseStore {
    conn: Connection,
}

impl WarehouseStore {
    /// Open (or create) the warehouse file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        log::debug!("Opened warehouse at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Names of all user tables, sorted.
    pub fn table_names(&self) -> PipelineResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> PipelineResult<i64> {
        let table = quoted_identifier(table)?;
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn quoted_identifier(name: &str) -> PipelineResult<String> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(PipelineError::InvalidTableName(name.to_string()))
    }
}
