pub mod codec;
pub mod remote;
pub mod store;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::domain::recurrence::DueDate;
use crate::domain::validation;
use crate::error::AppError;

pub use remote::{HttpPreferencesClient, RemotePreferences};
pub use store::PreferenceStore;

const TAX_ITEM_ID_LEN: usize = 12;
const DEFAULT_LOW_BALANCE: f64 = 100.0;
const DEFAULT_LARGE_TRANSACTION: f64 = 1000.0;

/// A recurring obligation due once a year on `due`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxItem {
  pub id: String,
  pub label: String,
  pub enabled: bool,
  pub due: Option<DueDate>,
}

impl TaxItem {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      id: generate_id(),
      label: label.into(),
      enabled: true,
      due: None,
    }
  }

  pub fn due_on(mut self, day: u32, month: u32) -> Result<Self, AppError> {
    self.due = Some(DueDate::new(day, month)?);
    Ok(self)
  }

  pub fn is_eligible(&self) -> bool {
    self.enabled && self.due.is_some()
  }

  pub fn validate(&self) -> Result<(), AppError> {
    validation::ensure_label(&self.label)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
  pub enabled: bool,
  pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPreferences {
  pub tax_items: Vec<TaxItem>,
  pub low_balance: ThresholdConfig,
  pub large_transaction: ThresholdConfig,
}

impl Default for NotificationPreferences {
  fn default() -> Self {
    Self {
      tax_items: Vec::new(),
      low_balance: ThresholdConfig {
        enabled: false,
        threshold: DEFAULT_LOW_BALANCE,
      },
      large_transaction: ThresholdConfig {
        enabled: false,
        threshold: DEFAULT_LARGE_TRANSACTION,
      },
    }
  }
}

impl NotificationPreferences {
  pub fn tax_item(&self, id: &str) -> Option<&TaxItem> {
    self.tax_items.iter().find(|item| item.id == id)
  }

  pub fn upsert_tax_item(&mut self, item: TaxItem) {
    match self.tax_items.iter_mut().find(|existing| existing.id == item.id) {
      Some(existing) => *existing = item,
      None => self.tax_items.push(item),
    }
  }

  pub fn remove_tax_item(&mut self, id: &str) -> bool {
    let before = self.tax_items.len();
    self.tax_items.retain(|item| item.id != id);
    self.tax_items.len() != before
  }

  /// Coerces values that cannot be stored as given. Never rejects.
  pub fn normalized(mut self) -> Self {
    for item in &mut self.tax_items {
      item.label = item.label.trim().to_string();
      if let Err(err) = item.validate() {
        tracing::warn!(tax_item = %item.id, error = %err, "saving tax item with blank label");
      }
    }
    self.low_balance = clamp_threshold(self.low_balance, DEFAULT_LOW_BALANCE);
    self.large_transaction = clamp_threshold(self.large_transaction, DEFAULT_LARGE_TRANSACTION);
    self
  }
}

fn clamp_threshold(config: ThresholdConfig, fallback: f64) -> ThresholdConfig {
  match validation::ensure_threshold(config.threshold) {
    Ok(()) => config,
    Err(err) => {
      tracing::warn!(threshold = config.threshold, error = %err, "threshold reset to default");
      ThresholdConfig {
        threshold: fallback,
        ..config
      }
    }
  }
}

pub(crate) fn generate_id() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(TAX_ITEM_ID_LEN)
    .map(char::from)
    .collect()
}
