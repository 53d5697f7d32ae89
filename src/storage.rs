use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::{self, Db};
use crate::error::AppError;

pub const KEY_PREFERENCES: &str = "notification_preferences";
pub const KEY_DISMISSALS: &str = "tax_alert_dismissals";

/// Device-local key/value storage. Values are opaque strings.
pub trait LocalStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, AppError>;
  fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
  fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub struct SqliteLocalStore {
  db: Arc<Db>,
}

impl SqliteLocalStore {
  pub fn new(db: Arc<Db>) -> Self {
    Self { db }
  }
}

impl LocalStore for SqliteLocalStore {
  fn get(&self, key: &str) -> Result<Option<String>, AppError> {
    db::with_conn(&self.db, |conn| {
      let value = conn
        .query_row(
          "SELECT value FROM local_storage WHERE key = ?1",
          params![key],
          |row| row.get::<_, String>(0),
        )
        .optional()?;
      Ok(value)
    })
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    db::with_conn(&self.db, |conn| {
      conn.execute(
        "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)",
        params![key, value, Utc::now().to_rfc3339()],
      )?;
      Ok(())
    })
  }

  fn remove(&self, key: &str) -> Result<(), AppError> {
    db::with_conn(&self.db, |conn| {
      conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
      Ok(())
    })
  }
}

#[derive(Debug, Default)]
pub struct MemoryLocalStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl LocalStore for MemoryLocalStore {
  fn get(&self, key: &str) -> Result<Option<String>, AppError> {
    let entries = self.entries.lock()?;
    Ok(entries.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    let mut entries = self.entries.lock()?;
    entries.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), AppError> {
    let mut entries = self.entries.lock()?;
    entries.remove(key);
    Ok(())
  }
}
