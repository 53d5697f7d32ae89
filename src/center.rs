use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db::{self, Db};
use crate::due::DueNotifier;
use crate::error::AppError;
use crate::instrumentation::{AlertInstrumentation, NoopInstrumentation};
use crate::layout::{AlertRegion, StackLayout};
use crate::ledger::{AccountStore, CategoryStore, SqliteLedger, TransactionStore};
use crate::models::{DueAlert, SaveOutcome, SpendingAlert, ThresholdAlert};
use crate::preferences::{HttpPreferencesClient, NotificationPreferences, PreferenceStore, RemotePreferences};
use crate::session::{SessionProvider, StaticSession};
use crate::spending::SpendingMonitor;
use crate::storage::{LocalStore, SqliteLocalStore};
use crate::thresholds::ThresholdMonitor;

pub struct Collaborators {
  pub categories: Arc<dyn CategoryStore>,
  pub transactions: Arc<dyn TransactionStore>,
  pub accounts: Arc<dyn AccountStore>,
  pub local: Arc<dyn LocalStore>,
  pub remote: Option<Arc<dyn RemotePreferences>>,
  pub session: Arc<dyn SessionProvider>,
  pub clock: Arc<dyn Clock>,
  pub instrumentation: Arc<dyn AlertInstrumentation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertSnapshot {
  pub spending: Vec<SpendingAlert>,
  pub due: Vec<DueAlert>,
  pub thresholds: Vec<ThresholdAlert>,
}

pub struct AlertCenter {
  spending: SpendingMonitor,
  due: DueNotifier,
  thresholds: ThresholdMonitor,
  layout: Mutex<StackLayout>,
}

impl AlertCenter {
  pub fn new(parts: Collaborators) -> Self {
    let spending = SpendingMonitor::new(
      parts.categories,
      parts.transactions.clone(),
      parts.session.clone(),
      parts.clock.clone(),
    )
    .with_instrumentation(parts.instrumentation.clone());

    let thresholds = ThresholdMonitor::new(
      parts.accounts,
      parts.transactions,
      parts.session.clone(),
      parts.clock.clone(),
    )
    .with_instrumentation(parts.instrumentation.clone());

    let store = PreferenceStore::new(parts.local.clone(), parts.remote, parts.session);
    let due = DueNotifier::new(store, parts.local, parts.clock).with_instrumentation(parts.instrumentation);

    Self {
      spending,
      due,
      thresholds,
      layout: Mutex::new(StackLayout::default()),
    }
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
    let db = Arc::new(db::init_db(&config.data_dir)?);
    Self::from_db(db, config)
  }

  /// SQLite ledger and local storage, remote preferences when an API URL is configured.
  pub fn from_db(db: Arc<Db>, config: &AppConfig) -> Result<Self, AppError> {
    let ledger = Arc::new(SqliteLedger::new(db.clone()));
    let remote = match &config.api_base_url {
      Some(url) => {
        let client: Arc<dyn RemotePreferences> =
          Arc::new(HttpPreferencesClient::new(url.clone(), config.http_timeout)?);
        Some(client)
      }
      None => None,
    };

    Ok(Self::new(Collaborators {
      categories: ledger.clone(),
      transactions: ledger.clone(),
      accounts: ledger,
      local: Arc::new(SqliteLocalStore::new(db)),
      remote,
      session: Arc::new(StaticSession::new(config.user_id.clone(), config.access_token.clone())),
      clock: Arc::new(SystemClock),
      instrumentation: Arc::new(NoopInstrumentation),
    }))
  }

  pub fn on_mount(&self) -> Result<(), AppError> {
    self.spending.check_spending_limits();
    self.due.load()?;
    self.thresholds.check(&self.due.preferences());
    Ok(())
  }

  pub fn force_check(&self) -> Result<(), AppError> {
    self.spending.force_check();
    self.due.force_recheck()?;
    self.thresholds.check(&self.due.preferences());
    Ok(())
  }

  pub fn save_preferences(&self, preferences: NotificationPreferences) -> Result<SaveOutcome, AppError> {
    let outcome = self.due.save_preferences(preferences)?;
    self.thresholds.check(&self.due.preferences());
    Ok(outcome)
  }

  pub fn spending(&self) -> &SpendingMonitor {
    &self.spending
  }

  pub fn due(&self) -> &DueNotifier {
    &self.due
  }

  pub fn thresholds(&self) -> &ThresholdMonitor {
    &self.thresholds
  }

  pub fn snapshot(&self) -> AlertSnapshot {
    AlertSnapshot {
      spending: self.spending.visible_alerts(),
      due: self.due.due_alerts(),
      thresholds: self.thresholds.alerts(),
    }
  }

  pub fn report_region_height(&self, region: AlertRegion, height: f32) -> bool {
    match self.layout.lock() {
      Ok(mut layout) => layout.report_height(region, height),
      Err(err) => {
        tracing::error!(error = %err, "layout state poisoned");
        false
      }
    }
  }

  pub fn offset_for(&self, region: AlertRegion) -> f32 {
    self
      .layout
      .lock()
      .map(|layout| layout.offset_for(region))
      .unwrap_or_default()
  }
}
