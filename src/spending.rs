use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::clock::Clock;
use crate::domain::limits::{reaches_warning, sum_abs, utilization_percent};
use crate::domain::period::month_range;
use crate::error::AppError;
use crate::instrumentation::{AlertInstrumentation, NoopInstrumentation};
use crate::ledger::{CategoryStore, TransactionStore};
use crate::models::{CategoryQuery, EntryType, SpendingAlert, TransactionQuery};
use crate::session::SessionProvider;

#[derive(Debug, Default)]
struct MonitorState {
  alerts: Vec<SpendingAlert>,
  dismissed: HashSet<i64>,
  applied_generation: u64,
  revision: u64,
}

/// Evaluates per-category spending limits for the current month.
pub struct SpendingMonitor {
  categories: Arc<dyn CategoryStore>,
  transactions: Arc<dyn TransactionStore>,
  session: Arc<dyn SessionProvider>,
  clock: Arc<dyn Clock>,
  instrumentation: Arc<dyn AlertInstrumentation>,
  next_generation: AtomicU64,
  state: Mutex<MonitorState>,
}

impl SpendingMonitor {
  pub fn new(
    categories: Arc<dyn CategoryStore>,
    transactions: Arc<dyn TransactionStore>,
    session: Arc<dyn SessionProvider>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      categories,
      transactions,
      session,
      clock,
      instrumentation: Arc::new(NoopInstrumentation),
      next_generation: AtomicU64::new(0),
      state: Mutex::new(MonitorState::default()),
    }
  }

  #[must_use]
  pub fn with_instrumentation(mut self, instrumentation: Arc<dyn AlertInstrumentation>) -> Self {
    self.instrumentation = instrumentation;
    self
  }

  /// Runs one evaluation pass and replaces the alert list with its result.
  ///
  /// Without a signed-in user this is a no-op. Fetch failures are logged and
  /// leave the previous list in place.
  pub fn check_spending_limits(&self) {
    let Some(user_id) = self.session.user_id() else {
      tracing::debug!("spending check skipped: no user");
      return;
    };

    let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
    let started = Instant::now();

    match self.evaluate(&user_id) {
      Ok(alerts) => {
        let count = alerts.len();
        if self.apply(generation, alerts) {
          self.instrumentation.observe_spending_pass(count, started.elapsed());
          tracing::debug!(user_id = %user_id, alerts = count, "spending check applied");
        }
      }
      Err(err) => {
        self.instrumentation.observe_error("check_spending_limits", &err);
        tracing::error!(user_id = %user_id, error = %err, "spending check failed");
      }
    }
  }

  /// Clears dismissals and re-evaluates.
  pub fn force_check(&self) {
    if let Ok(mut state) = self.state.lock() {
      if !state.dismissed.is_empty() {
        state.dismissed.clear();
        state.revision += 1;
      }
    }
    self.check_spending_limits();
  }

  /// Hides one alert until the next applied pass.
  pub fn dismiss(&self, category_id: i64) {
    match self.state.lock() {
      Ok(mut state) => {
        if state.alerts.iter().any(|alert| alert.category_id == category_id) && state.dismissed.insert(category_id) {
          state.revision += 1;
        }
      }
      Err(err) => tracing::error!(error = %err, "spending monitor state poisoned"),
    }
  }

  pub fn alerts(&self) -> Vec<SpendingAlert> {
    self.state.lock().map(|state| state.alerts.clone()).unwrap_or_default()
  }

  pub fn visible_alerts(&self) -> Vec<SpendingAlert> {
    self
      .state
      .lock()
      .map(|state| {
        state
          .alerts
          .iter()
          .filter(|alert| !state.dismissed.contains(&alert.category_id))
          .cloned()
          .collect()
      })
      .unwrap_or_default()
  }

  /// Bumped whenever the visible list may have changed.
  pub fn revision(&self) -> u64 {
    self.state.lock().map(|state| state.revision).unwrap_or_default()
  }

  fn evaluate(&self, user_id: &str) -> Result<Vec<SpendingAlert>, AppError> {
    let categories = self.categories.categories(&CategoryQuery {
      user_id: user_id.to_string(),
      category_type: Some(EntryType::Expense),
      with_spending_limit: true,
    })?;
    if categories.is_empty() {
      return Ok(Vec::new());
    }

    let (start_date, end_date) = month_range(self.clock.today());
    let mut alerts = Vec::new();

    for category in categories {
      let Some(limit) = category.spending_limit else {
        continue;
      };
      let transactions = self.transactions.transactions(&TransactionQuery {
        user_id: user_id.to_string(),
        category_id: Some(category.id),
        tx_type: Some(EntryType::Expense),
        start_date,
        end_date,
      })?;
      let spent = sum_abs(transactions.iter().map(|tx| tx.amount));

      let Some(percentage) = utilization_percent(spent, limit) else {
        tracing::warn!(category_id = category.id, limit, "spending limit is not positive, skipped");
        continue;
      };
      if reaches_warning(percentage) {
        alerts.push(SpendingAlert {
          category_id: category.id,
          category_name: category.name,
          limit,
          spent,
          percentage,
        });
      }
    }

    Ok(alerts)
  }

  fn apply(&self, generation: u64, alerts: Vec<SpendingAlert>) -> bool {
    let mut state = match self.state.lock() {
      Ok(state) => state,
      Err(err) => {
        tracing::error!(error = %err, "spending monitor state poisoned");
        return false;
      }
    };
    if generation < state.applied_generation {
      tracing::debug!(generation, applied = state.applied_generation, "stale spending pass discarded");
      return false;
    }
    state.applied_generation = generation;
    state.alerts = alerts;
    state.dismissed.clear();
    state.revision += 1;
    true
  }
}
