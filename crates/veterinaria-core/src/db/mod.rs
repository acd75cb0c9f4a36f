//! Database layer for the clinic records.

mod appointments;
mod pets;
mod products;
mod schema;
mod species;
mod veterinarians;

pub use appointments::*;
pub use schema::*;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid decimal value: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DbError {
    /// Whether SQLite rejected the write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Stored form of an instant: RFC 3339, whole seconds, `Z` suffix.
///
/// The fixed width keeps lexicographic order equal to chronological order,
/// which the range queries rely on.
pub(crate) fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_instant(s: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub(crate) fn parse_decimal(s: &str) -> DbResult<Decimal> {
    Ok(Decimal::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"animal_types".to_string()));
        assert!(tables.contains(&"categories".to_string()));
        assert!(tables.contains(&"pets".to_string()));
        assert!(tables.contains(&"products".to_string()));
        assert!(tables.contains(&"appointments".to_string()));
    }

    #[test]
    fn test_instant_format_roundtrip() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        let stored = format_instant(&instant);
        assert_eq!(stored, "2026-10-19T14:00:00Z");
        assert_eq!(parse_instant(&stored).unwrap(), instant);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");

        Database::open(&path).unwrap();
        // Schema is applied idempotently on every open
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM pets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
