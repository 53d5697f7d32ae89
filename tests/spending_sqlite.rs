mod common;

use std::sync::Arc;

use common::ymd;
use finance_alerts::clock::FixedClock;
use finance_alerts::db;
use finance_alerts::ledger::SqliteLedger;
use finance_alerts::models::{AlertSeverity, CategoryInput, EntryType, TransactionInput};
use finance_alerts::session::StaticSession;
use finance_alerts::spending::SpendingMonitor;
use tempfile::tempdir;

fn expense(ledger: &SqliteLedger, category_id: i64, amount: f64, date: chrono::NaiveDate) {
  ledger
    .create_transaction(TransactionInput {
      user_id: "u1".to_string(),
      category_id: Some(category_id),
      account_id: None,
      tx_type: EntryType::Expense,
      amount,
      date,
      description: None,
    })
    .unwrap();
}

fn limited(ledger: &SqliteLedger, name: &str, limit: f64) -> i64 {
  ledger
    .create_category(CategoryInput {
      user_id: "u1".to_string(),
      name: name.to_string(),
      category_type: EntryType::Expense,
      spending_limit: Some(limit),
      color: Some("#e11d48".to_string()),
    })
    .unwrap()
    .id
}

#[test]
fn monitor_reads_limits_and_month_totals_from_sqlite() {
  let dir = tempdir().unwrap();
  let db = Arc::new(db::init_db(dir.path()).unwrap());
  let ledger = Arc::new(SqliteLedger::new(db));

  let food = limited(&ledger, "Food", 1000.0);
  let rent = limited(&ledger, "Rent", 1000.0);
  let fun = limited(&ledger, "Fun", 1000.0);
  expense(&ledger, food, -500.0, ymd(2024, 2, 1));
  expense(&ledger, food, -350.0, ymd(2024, 2, 29));
  expense(&ledger, rent, -1200.0, ymd(2024, 2, 3));
  expense(&ledger, fun, -100.0, ymd(2024, 2, 3));
  expense(&ledger, fun, -900.0, ymd(2024, 3, 1));

  let clock = Arc::new(FixedClock::new(ymd(2024, 2, 20)));
  let monitor = SpendingMonitor::new(
    ledger.clone(),
    ledger,
    Arc::new(StaticSession::new(Some("u1".to_string()), None)),
    clock.clone(),
  );
  monitor.check_spending_limits();

  let alerts = monitor.alerts();
  assert_eq!(alerts.len(), 2);
  let food_alert = alerts.iter().find(|a| a.category_name == "Food").unwrap();
  assert!((food_alert.percentage - 85.0).abs() < 1e-9);
  assert_eq!(food_alert.severity(), AlertSeverity::Approaching);
  let rent_alert = alerts.iter().find(|a| a.category_name == "Rent").unwrap();
  assert!((rent_alert.percentage - 120.0).abs() < 1e-9);
  assert_eq!(rent_alert.severity(), AlertSeverity::Exceeded);

  clock.set(ymd(2024, 3, 2));
  monitor.check_spending_limits();
  let alerts = monitor.alerts();
  assert_eq!(alerts.len(), 1);
  assert_eq!(alerts[0].category_name, "Fun");
  assert!((alerts[0].percentage - 90.0).abs() < 1e-9);
}

#[test]
fn database_survives_reopen() {
  let dir = tempdir().unwrap();
  {
    let db = Arc::new(db::init_db(dir.path()).unwrap());
    let ledger = SqliteLedger::new(db);
    let food = limited(&ledger, "Food", 100.0);
    expense(&ledger, food, -95.0, ymd(2024, 4, 30));
  }

  let db = Arc::new(db::init_db(dir.path()).unwrap());
  let ledger = Arc::new(SqliteLedger::new(db));
  let monitor = SpendingMonitor::new(
    ledger.clone(),
    ledger,
    Arc::new(StaticSession::new(Some("u1".to_string()), None)),
    Arc::new(FixedClock::new(ymd(2024, 4, 1))),
  );
  monitor.check_spending_limits();
  assert_eq!(monitor.alerts().len(), 1);
}
