use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::domain::period::format_date;
use crate::domain::validation::parse_date;
use crate::error::AppError;
use crate::storage::{LocalStore, KEY_DISMISSALS};

/// Per-item "dismiss for today" records, keyed by tax item id.
///
/// Dates are local calendar days. A record only suppresses on the exact day
/// it was written.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DismissMap {
  entries: BTreeMap<String, NaiveDate>,
}

impl DismissMap {
  pub fn load(store: &dyn LocalStore) -> Result<Self, AppError> {
    let Some(raw) = store.get(KEY_DISMISSALS)? else {
      return Ok(Self::default());
    };
    if raw.trim().is_empty() {
      return Ok(Self::default());
    }

    let stored: BTreeMap<String, String> = serde_json::from_str(&raw)?;
    let mut entries = BTreeMap::new();
    for (id, date) in stored {
      match parse_date(&date) {
        Ok(date) => {
          entries.insert(id, date);
        }
        Err(err) => tracing::warn!(tax_item = %id, error = %err, "ignoring unreadable dismissal"),
      }
    }
    Ok(Self { entries })
  }

  /// Writes the map, dropping records from days before `today`.
  pub fn persist(&mut self, store: &dyn LocalStore, today: NaiveDate) -> Result<(), AppError> {
    self.entries.retain(|_, date| *date >= today);
    if self.entries.is_empty() {
      return store.remove(KEY_DISMISSALS);
    }
    let stored: BTreeMap<&str, String> = self
      .entries
      .iter()
      .map(|(id, date)| (id.as_str(), format_date(*date)))
      .collect();
    store.set(KEY_DISMISSALS, &serde_json::to_string(&stored)?)
  }

  pub fn dismiss(&mut self, id: &str, today: NaiveDate) {
    self.entries.insert(id.to_string(), today);
  }

  pub fn is_dismissed_on(&self, id: &str, today: NaiveDate) -> bool {
    self.entries.get(id) == Some(&today)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Items closed during this session. Never persisted.
#[derive(Debug, Default, Clone)]
pub struct SessionSuppression {
  ids: HashSet<String>,
}

impl SessionSuppression {
  pub fn insert(&mut self, id: &str) -> bool {
    self.ids.insert(id.to_string())
  }

  pub fn contains(&self, id: &str) -> bool {
    self.ids.contains(id)
  }

  pub fn clear(&mut self) {
    self.ids.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }
}
