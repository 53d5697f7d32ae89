use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::clock::Clock;
use crate::domain::period::month_range;
use crate::error::AppError;
use crate::instrumentation::{AlertInstrumentation, NoopInstrumentation};
use crate::ledger::{AccountStore, TransactionStore};
use crate::models::{Account, ThresholdAlert, Transaction, TransactionQuery};
use crate::preferences::{NotificationPreferences, ThresholdConfig};
use crate::session::SessionProvider;

pub fn low_balance_alerts(accounts: &[Account], config: &ThresholdConfig) -> Vec<ThresholdAlert> {
  if !config.enabled {
    return Vec::new();
  }
  accounts
    .iter()
    .filter(|account| account.balance < config.threshold)
    .map(|account| ThresholdAlert::LowBalance {
      account_id: account.id,
      account_name: account.name.clone(),
      balance: account.balance,
      threshold: config.threshold,
    })
    .collect()
}

pub fn large_transaction_alerts(transactions: &[Transaction], config: &ThresholdConfig) -> Vec<ThresholdAlert> {
  if !config.enabled {
    return Vec::new();
  }
  transactions
    .iter()
    .filter(|tx| tx.amount.abs() >= config.threshold)
    .map(|tx| ThresholdAlert::LargeTransaction {
      transaction_id: tx.id,
      amount: tx.amount,
      date: tx.date,
      threshold: config.threshold,
    })
    .collect()
}

pub struct ThresholdMonitor {
  accounts: Arc<dyn AccountStore>,
  transactions: Arc<dyn TransactionStore>,
  session: Arc<dyn SessionProvider>,
  clock: Arc<dyn Clock>,
  instrumentation: Arc<dyn AlertInstrumentation>,
  alerts: Mutex<Vec<ThresholdAlert>>,
}

impl ThresholdMonitor {
  pub fn new(
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    session: Arc<dyn SessionProvider>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      accounts,
      transactions,
      session,
      clock,
      instrumentation: Arc::new(NoopInstrumentation),
      alerts: Mutex::new(Vec::new()),
    }
  }

  #[must_use]
  pub fn with_instrumentation(mut self, instrumentation: Arc<dyn AlertInstrumentation>) -> Self {
    self.instrumentation = instrumentation;
    self
  }

  pub fn check(&self, preferences: &NotificationPreferences) {
    let Some(user_id) = self.session.user_id() else {
      match self.alerts.lock() {
        Ok(mut guard) => guard.clear(),
        Err(err) => tracing::error!(error = %err, "threshold monitor state poisoned"),
      }
      return;
    };
    let started = Instant::now();
    match self.evaluate(&user_id, preferences) {
      Ok(alerts) => {
        self.instrumentation.observe_threshold_pass(alerts.len(), started.elapsed());
        match self.alerts.lock() {
          Ok(mut guard) => *guard = alerts,
          Err(err) => tracing::error!(error = %err, "threshold monitor state poisoned"),
        }
      }
      Err(err) => {
        self.instrumentation.observe_error("check_thresholds", &err);
        tracing::error!(user_id = %user_id, error = %err, "threshold check failed");
      }
    }
  }

  pub fn alerts(&self) -> Vec<ThresholdAlert> {
    self.alerts.lock().map(|guard| guard.clone()).unwrap_or_default()
  }

  fn evaluate(&self, user_id: &str, preferences: &NotificationPreferences) -> Result<Vec<ThresholdAlert>, AppError> {
    let mut alerts = Vec::new();

    if preferences.low_balance.enabled {
      let accounts = self.accounts.accounts(user_id)?;
      alerts.extend(low_balance_alerts(&accounts, &preferences.low_balance));
    }

    if preferences.large_transaction.enabled {
      let (start_date, end_date) = month_range(self.clock.today());
      let transactions = self.transactions.transactions(&TransactionQuery {
        user_id: user_id.to_string(),
        category_id: None,
        tx_type: None,
        start_date,
        end_date,
      })?;
      alerts.extend(large_transaction_alerts(&transactions, &preferences.large_transaction));
    }

    Ok(alerts)
  }
}
