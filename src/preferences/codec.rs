//! Persistence boundary for [`NotificationPreferences`].
//!
//! Everything written uses one tagged schema (`schema_version` plus snake_case
//! fields). Reading also accepts the older camelCase spellings and numbers
//! encoded as strings, and coerces them into the typed model here so the
//! rest of the crate never sees the loose shapes.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{generate_id, NotificationPreferences, TaxItem, ThresholdConfig};
use crate::domain::recurrence::DueDate;
use crate::error::AppError;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct StoredPreferences {
  schema_version: u32,
  tax_items: Vec<StoredTaxItem>,
  low_balance: ThresholdConfig,
  large_transaction: ThresholdConfig,
}

#[derive(Debug, Serialize)]
struct StoredTaxItem {
  id: String,
  label: String,
  enabled: bool,
  due_day: Option<u32>,
  due_month: Option<u32>,
}

// Accepted spellings per field, first present wins.
const TAX_ITEMS_KEYS: &[&str] = &["tax_items", "taxItems", "tax_alerts", "taxAlerts"];
const SCHEMA_VERSION_KEYS: &[&str] = &["schema_version", "schemaVersion"];
const LOW_BALANCE_KEYS: &[&str] = &["low_balance", "lowBalance"];
const LARGE_TRANSACTION_KEYS: &[&str] = &["large_transaction", "largeTransaction"];
const LABEL_KEYS: &[&str] = &["label", "name"];
const DUE_DAY_KEYS: &[&str] = &["due_day", "dueDay", "day"];
const DUE_MONTH_KEYS: &[&str] = &["due_month", "dueMonth", "month"];
const THRESHOLD_KEYS: &[&str] = &["threshold", "amount", "value"];

pub fn encode(prefs: &NotificationPreferences) -> Result<String, AppError> {
  Ok(serde_json::to_string(&stored(prefs))?)
}

pub fn to_value(prefs: &NotificationPreferences) -> Result<Value, AppError> {
  Ok(serde_json::to_value(stored(prefs))?)
}

pub fn decode(raw: &str) -> Result<NotificationPreferences, AppError> {
  let value: Value = serde_json::from_str(raw)?;
  from_value(value)
}

pub fn from_value(value: Value) -> Result<NotificationPreferences, AppError> {
  let Value::Object(map) = value else {
    return Err(AppError::new("JSON_ERROR", "preferences must be a JSON object"));
  };
  if let Some(version) = field(&map, SCHEMA_VERSION_KEYS).and_then(coerce_u32) {
    if version > SCHEMA_VERSION {
      tracing::warn!(version, "preferences written by a newer schema, reading known fields only");
    }
  }

  let tax_items = match field(&map, TAX_ITEMS_KEYS) {
    None => Vec::new(),
    Some(Value::Array(items)) => items.iter().filter_map(normalize_tax_item).collect(),
    Some(_) => return Err(AppError::new("JSON_ERROR", "tax_items must be an array")),
  };

  let defaults = NotificationPreferences::default();
  Ok(NotificationPreferences {
    tax_items,
    low_balance: normalize_threshold(field(&map, LOW_BALANCE_KEYS), defaults.low_balance),
    large_transaction: normalize_threshold(field(&map, LARGE_TRANSACTION_KEYS), defaults.large_transaction),
  })
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
  keys
    .iter()
    .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

fn stored(prefs: &NotificationPreferences) -> StoredPreferences {
  StoredPreferences {
    schema_version: SCHEMA_VERSION,
    tax_items: prefs
      .tax_items
      .iter()
      .map(|item| StoredTaxItem {
        id: item.id.clone(),
        label: item.label.clone(),
        enabled: item.enabled,
        due_day: item.due.map(|due| due.day()),
        due_month: item.due.map(|due| due.month()),
      })
      .collect(),
    low_balance: prefs.low_balance,
    large_transaction: prefs.large_transaction,
  }
}

fn normalize_tax_item(value: &Value) -> Option<TaxItem> {
  let Value::Object(raw) = value else {
    tracing::warn!("skipping tax item that is not an object");
    return None;
  };
  let id = field(raw, &["id"]).and_then(coerce_id).unwrap_or_else(generate_id);
  let label = field(raw, LABEL_KEYS)
    .and_then(Value::as_str)
    .map(|label| label.trim().to_string())
    .unwrap_or_default();

  let day = field(raw, DUE_DAY_KEYS).and_then(coerce_u32);
  let month = field(raw, DUE_MONTH_KEYS).and_then(coerce_u32);
  let due = match (day, month) {
    (Some(day), Some(month)) => match DueDate::new(day, month) {
      Ok(due) => Some(due),
      Err(err) => {
        tracing::warn!(tax_item = %id, error = %err, "dropping invalid due date");
        None
      }
    },
    _ => None,
  };

  let enabled = field(raw, &["enabled"]).and_then(coerce_bool).unwrap_or(false);
  Some(TaxItem { id, label, enabled, due })
}

fn normalize_threshold(raw: Option<&Value>, fallback: ThresholdConfig) -> ThresholdConfig {
  let Some(Value::Object(raw)) = raw else {
    return fallback;
  };
  ThresholdConfig {
    enabled: field(raw, &["enabled"]).and_then(coerce_bool).unwrap_or(fallback.enabled),
    threshold: field(raw, THRESHOLD_KEYS)
      .and_then(coerce_f64)
      .filter(|value| *value >= 0.0)
      .unwrap_or(fallback.threshold),
  }
}

fn coerce_id(value: &Value) -> Option<String> {
  match value {
    Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
    Value::Number(number) => Some(number.to_string()),
    _ => None,
  }
}

fn coerce_u32(value: &Value) -> Option<u32> {
  match value {
    Value::Number(number) => number
      .as_u64()
      .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
      .and_then(|n| u32::try_from(n).ok()),
    Value::String(text) => text.trim().parse().ok(),
    _ => None,
  }
}

fn coerce_f64(value: &Value) -> Option<f64> {
  let parsed = match value {
    Value::Number(number) => number.as_f64(),
    Value::String(text) => text.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed.filter(|f| f.is_finite())
}

fn coerce_bool(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(flag) => Some(*flag),
    Value::Number(number) => number.as_i64().map(|n| n != 0),
    Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
      "true" | "1" | "yes" => Some(true),
      "false" | "0" | "no" => Some(false),
      _ => None,
    },
    _ => None,
  }
}
