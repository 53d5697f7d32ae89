use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::limits::EXCEEDED_PERCENT;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
  Income,
  Expense,
}

impl EntryType {
  pub fn as_str(&self) -> &'static str {
    match self {
      EntryType::Income => "income",
      EntryType::Expense => "expense",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value.trim().to_ascii_lowercase().as_str() {
      "income" => Some(EntryType::Income),
      "expense" => Some(EntryType::Expense),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
  pub id: i64,
  pub user_id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub category_type: EntryType,
  pub spending_limit: Option<f64>,
  pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transaction {
  pub id: i64,
  pub user_id: String,
  pub category_id: Option<i64>,
  pub account_id: Option<i64>,
  #[serde(rename = "type")]
  pub tx_type: EntryType,
  pub amount: f64,
  pub date: NaiveDate,
  pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
  pub id: i64,
  pub user_id: String,
  pub name: String,
  pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryInput {
  pub user_id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub category_type: EntryType,
  pub spending_limit: Option<f64>,
  pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccountInput {
  pub user_id: String,
  pub name: String,
  pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransactionInput {
  pub user_id: String,
  pub category_id: Option<i64>,
  pub account_id: Option<i64>,
  #[serde(rename = "type")]
  pub tx_type: EntryType,
  pub amount: f64,
  pub date: NaiveDate,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQuery {
  pub user_id: String,
  pub category_type: Option<EntryType>,
  pub with_spending_limit: bool,
}

/// Date bounds are inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
  pub user_id: String,
  pub category_id: Option<i64>,
  pub tx_type: Option<EntryType>,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
  Approaching,
  Exceeded,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpendingAlert {
  pub category_id: i64,
  pub category_name: String,
  pub limit: f64,
  pub spent: f64,
  pub percentage: f64,
}

impl SpendingAlert {
  pub fn severity(&self) -> AlertSeverity {
    if self.percentage >= EXCEEDED_PERCENT {
      AlertSeverity::Exceeded
    } else {
      AlertSeverity::Approaching
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DueAlert {
  pub tax_item_id: String,
  pub label: String,
  pub due_on: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdAlert {
  LowBalance {
    account_id: i64,
    account_name: String,
    balance: f64,
    threshold: f64,
  },
  LargeTransaction {
    transaction_id: i64,
    amount: f64,
    date: NaiveDate,
    threshold: f64,
  },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteSync {
  Synced,
  Skipped,
  Failed,
}

/// Local writes always count as saved; `remote` reports the mirror attempt.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
  pub saved: bool,
  pub remote: RemoteSync,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alert(percentage: f64) -> SpendingAlert {
    SpendingAlert {
      category_id: 1,
      category_name: "Food".to_string(),
      limit: 1000.0,
      spent: percentage * 10.0,
      percentage,
    }
  }

  #[test]
  fn severity_bands() {
    assert_eq!(alert(80.0).severity(), AlertSeverity::Approaching);
    assert_eq!(alert(99.9).severity(), AlertSeverity::Approaching);
    assert_eq!(alert(100.0).severity(), AlertSeverity::Exceeded);
    assert_eq!(alert(120.0).severity(), AlertSeverity::Exceeded);
  }

  #[test]
  fn entry_type_parse_is_case_insensitive() {
    assert_eq!(EntryType::parse("Expense"), Some(EntryType::Expense));
    assert_eq!(EntryType::parse(" income "), Some(EntryType::Income));
    assert_eq!(EntryType::parse("transfer"), None);
  }

  #[test]
  fn transaction_type_serializes_as_type() {
    let tx = Transaction {
      id: 7,
      user_id: "u1".to_string(),
      category_id: Some(1),
      account_id: None,
      tx_type: EntryType::Expense,
      amount: -12.5,
      date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
      description: None,
    };
    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["type"], "expense");
    assert_eq!(json["date"], "2024-03-15");
  }
}
