use std::sync::Arc;

use chrono::{Datelike, Local};
use rand::Rng;

use finance_alerts::config::AppConfig;
use finance_alerts::db;
use finance_alerts::domain::period::month_range;
use finance_alerts::error::AppError;
use finance_alerts::ledger::SqliteLedger;
use finance_alerts::logging;
use finance_alerts::models::{AccountInput, CategoryInput, EntryType, TransactionInput};
use finance_alerts::preferences::{NotificationPreferences, TaxItem};
use finance_alerts::AlertCenter;

const DEMO_USER: &str = "demo-user";

fn main() -> Result<(), Box<dyn std::error::Error>> {
  logging::init();

  let count = std::env::args()
    .nth(1)
    .and_then(|value| value.parse::<usize>().ok())
    .unwrap_or(200);

  let mut config = AppConfig::from_env()?;
  if config.user_id.is_none() {
    config.user_id = Some(DEMO_USER.to_string());
  }
  let user_id = config.user_id.clone().unwrap_or_default();

  let db = Arc::new(db::init_db(&config.data_dir)?);
  let ledger = SqliteLedger::new(db.clone());
  let created = seed_mock_data(&ledger, &user_id, count)?;
  println!("Seeded {} transactions in {}", created, config.data_dir.display());

  let center = AlertCenter::from_db(db, &config)?;
  center.on_mount()?;

  let today = Local::now().date_naive();
  let mut prefs = center.due().preferences();
  if prefs.tax_items.is_empty() {
    prefs = demo_preferences(today.day(), today.month())?;
    let outcome = center.save_preferences(prefs)?;
    println!("Saved demo preferences (remote: {:?})", outcome.remote);
  }

  println!("{}", serde_json::to_string_pretty(&center.snapshot())?);
  Ok(())
}

fn seed_mock_data(ledger: &SqliteLedger, user_id: &str, count: usize) -> Result<usize, AppError> {
  let limits = [("Food", 600.0), ("Transport", 150.0), ("Leisure", 250.0), ("Utilities", 300.0)];
  let mut categories = Vec::new();
  for (name, limit) in limits {
    categories.push(ledger.create_category(CategoryInput {
      user_id: user_id.to_string(),
      name: name.to_string(),
      category_type: EntryType::Expense,
      spending_limit: Some(limit),
      color: None,
    })?);
  }
  ledger.create_category(CategoryInput {
    user_id: user_id.to_string(),
    name: "Salary".to_string(),
    category_type: EntryType::Income,
    spending_limit: None,
    color: None,
  })?;

  let checking = ledger.create_account(AccountInput {
    user_id: user_id.to_string(),
    name: "Checking".to_string(),
    balance: 1250.0,
  })?;
  ledger.create_account(AccountInput {
    user_id: user_id.to_string(),
    name: "Cash".to_string(),
    balance: 40.0,
  })?;

  let (start, end) = month_range(Local::now().date_naive());
  let days = (end - start).num_days() + 1;
  let descriptions = ["Groceries", "Bus pass", "Cinema", "Electricity", "Lunch", "Fuel"];
  let mut rng = rand::thread_rng();

  for _ in 0..count {
    let category = &categories[rng.gen_range(0..categories.len())];
    let amount: f64 = rng.gen_range(2.0..60.0);
    ledger.create_transaction(TransactionInput {
      user_id: user_id.to_string(),
      category_id: Some(category.id),
      account_id: Some(checking.id),
      tx_type: EntryType::Expense,
      amount: -((amount * 100.0).round() / 100.0),
      date: start + chrono::Duration::days(rng.gen_range(0..days)),
      description: Some(descriptions[rng.gen_range(0..descriptions.len())].to_string()),
    })?;
  }

  Ok(count)
}

fn demo_preferences(day: u32, month: u32) -> Result<NotificationPreferences, AppError> {
  let mut prefs = NotificationPreferences::default();
  prefs.tax_items.push(TaxItem::new("Property tax").due_on(day, month)?);
  prefs.tax_items.push(TaxItem::new("Annual VAT return").due_on(31, 12)?);
  prefs.low_balance.enabled = true;
  prefs.large_transaction.enabled = true;
  Ok(prefs)
}
