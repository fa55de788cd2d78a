//! Database module - SQLite key-value storage for drafts

pub mod draft;

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

pub use draft::{clear_draft, load_draft, save_draft, store_outcome};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal local storage capability
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// RFC 3339 time of the last write to `key`
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        let ts = self
            .conn
            .query_row("SELECT updated_at FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(ts)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-process store, nothing survives the run
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(store: &mut dyn KeyValueStore) {
        assert_eq!(store.get("exercises").unwrap(), None);
        store.set("exercises", "[1]").unwrap();
        store.set("exercises", "[1,2]").unwrap();
        assert_eq!(store.get("exercises").unwrap().as_deref(), Some("[1,2]"));
        store.remove("exercises").unwrap();
        assert_eq!(store.get("exercises").unwrap(), None);
        // removing a missing key is fine
        store.remove("exercises").unwrap();
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        exercise_store(&mut db);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        exercise_store(&mut store);
    }

    #[test]
    fn test_updated_at_is_recorded() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.updated_at("currentWorkoutId").unwrap().is_none());
        db.set("currentWorkoutId", "12").unwrap();
        let ts = db.updated_at("currentWorkoutId").unwrap().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_file_database_persists() {
        let path = std::env::temp_dir().join(format!("vigil-test-{}.db", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        {
            let mut db = Database::open(&path_str).unwrap();
            db.set("exercises", "[]").unwrap();
        }
        let db = Database::open(&path_str).unwrap();
        assert_eq!(db.get("exercises").unwrap().as_deref(), Some("[]"));
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
