use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate};

use crate::clock::Clock;
use crate::error::AppError;
use crate::instrumentation::{AlertInstrumentation, NoopInstrumentation};
use crate::models::{DueAlert, SaveOutcome};
use crate::preferences::{NotificationPreferences, PreferenceStore, TaxItem};
use crate::storage::LocalStore;
use crate::suppression::{DismissMap, SessionSuppression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
  Ineligible,
  NotDue,
  SuppressedToday,
  SuppressedSession,
  Due,
}

pub fn classify(item: &TaxItem, today: NaiveDate, dismissed: &DismissMap, session: &SessionSuppression) -> DueState {
  let Some(due) = item.due.filter(|_| item.enabled) else {
    return DueState::Ineligible;
  };
  if !due.matches(today) {
    DueState::NotDue
  } else if dismissed.is_dismissed_on(&item.id, today) {
    DueState::SuppressedToday
  } else if session.contains(&item.id) {
    DueState::SuppressedSession
  } else {
    DueState::Due
  }
}

#[derive(Debug, Default)]
struct NotifierState {
  preferences: NotificationPreferences,
  dismissed: DismissMap,
  session: SessionSuppression,
  due: Vec<DueAlert>,
}

/// Emits tax items that fall due today.
///
/// Lifecycle: construct, `load()`, then react to user actions. Session
/// suppression lives as long as this value.
pub struct DueNotifier {
  store: PreferenceStore,
  local: Arc<dyn LocalStore>,
  clock: Arc<dyn Clock>,
  instrumentation: Arc<dyn AlertInstrumentation>,
  state: Mutex<NotifierState>,
}

impl DueNotifier {
  pub fn new(store: PreferenceStore, local: Arc<dyn LocalStore>, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      local,
      clock,
      instrumentation: Arc::new(NoopInstrumentation),
      state: Mutex::new(NotifierState::default()),
    }
  }

  #[must_use]
  pub fn with_instrumentation(mut self, instrumentation: Arc<dyn AlertInstrumentation>) -> Self {
    self.instrumentation = instrumentation;
    self
  }

  pub fn load(&self) -> Result<(), AppError> {
    let preferences = self.store.load();
    let dismissed = DismissMap::load(self.local.as_ref()).unwrap_or_else(|err| {
      tracing::warn!(error = %err, "dismissals unreadable, starting empty");
      DismissMap::default()
    });

    let mut state = self.lock()?;
    state.preferences = preferences;
    state.dismissed = dismissed;
    self.evaluate(&mut state);
    Ok(())
  }

  pub fn due_alerts(&self) -> Vec<DueAlert> {
    self.state.lock().map(|state| state.due.clone()).unwrap_or_default()
  }

  pub fn preferences(&self) -> NotificationPreferences {
    self
      .state
      .lock()
      .map(|state| state.preferences.clone())
      .unwrap_or_default()
  }

  pub fn state_of(&self, id: &str) -> Option<DueState> {
    let state = self.state.lock().ok()?;
    let item = state.preferences.tax_item(id)?;
    Some(classify(item, self.clock.today(), &state.dismissed, &state.session))
  }

  /// Hides the item for the rest of this session only.
  pub fn close(&self, id: &str) -> Result<(), AppError> {
    let mut state = self.lock()?;
    state.session.insert(id);
    self.evaluate(&mut state);
    Ok(())
  }

  /// Hides the item until the calendar day changes, across reloads.
  pub fn dismiss_for_today(&self, id: &str) -> Result<(), AppError> {
    let today = self.clock.today();
    let mut state = self.lock()?;
    state.dismissed.dismiss(id, today);
    if let Err(err) = state.dismissed.persist(self.local.as_ref(), today) {
      tracing::error!(tax_item = %id, error = %err, "could not persist dismissal");
      self.instrumentation.observe_error("dismiss_for_today", &err);
    }
    self.evaluate(&mut state);
    Ok(())
  }

  /// Drops every suppression, persisted and in-memory, then re-evaluates.
  pub fn force_recheck(&self) -> Result<(), AppError> {
    let today = self.clock.today();
    let mut state = self.lock()?;
    state.dismissed.clear();
    state.session.clear();
    if let Err(err) = state.dismissed.persist(self.local.as_ref(), today) {
      tracing::error!(error = %err, "could not clear persisted dismissals");
      self.instrumentation.observe_error("force_recheck", &err);
    }
    self.evaluate(&mut state);
    Ok(())
  }

  pub fn save_preferences(&self, preferences: NotificationPreferences) -> Result<SaveOutcome, AppError> {
    let preferences = preferences.normalized();
    let outcome = self.store.save(&preferences);

    let mut state = self.lock()?;
    state.preferences = preferences;
    state.session.clear();
    self.evaluate(&mut state);
    tracing::debug!(remote = ?outcome.remote, "notification preferences saved");
    Ok(outcome)
  }

  pub fn upsert_tax_item(&self, item: TaxItem) -> Result<SaveOutcome, AppError> {
    let mut preferences = self.preferences();
    preferences.upsert_tax_item(item);
    self.save_preferences(preferences)
  }

  pub fn set_tax_item_enabled(&self, id: &str, enabled: bool) -> Result<SaveOutcome, AppError> {
    let mut preferences = self.preferences();
    let item = preferences
      .tax_items
      .iter_mut()
      .find(|item| item.id == id)
      .ok_or_else(|| AppError::new("NOT_FOUND", format!("tax item {id} not found")))?;
    item.enabled = enabled;
    self.save_preferences(preferences)
  }

  pub fn remove_tax_item(&self, id: &str) -> Result<SaveOutcome, AppError> {
    let mut preferences = self.preferences();
    if !preferences.remove_tax_item(id) {
      return Err(AppError::new("NOT_FOUND", format!("tax item {id} not found")));
    }
    self.save_preferences(preferences)
  }

  fn evaluate(&self, state: &mut NotifierState) {
    let today = self.clock.today();
    let due: Vec<DueAlert> = state
      .preferences
      .tax_items
      .iter()
      .filter(|item| classify(item, today, &state.dismissed, &state.session) == DueState::Due)
      .filter_map(|item| {
        let due_on = item.due?.occurrence_in(today.year())?;
        Some(DueAlert {
          tax_item_id: item.id.clone(),
          label: item.label.clone(),
          due_on,
        })
      })
      .collect();
    self.instrumentation.observe_due_pass(due.len());
    state.due = due;
  }

  fn lock(&self) -> Result<MutexGuard<'_, NotifierState>, AppError> {
    Ok(self.state.lock()?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::FixedClock;
  use crate::session::StaticSession;
  use crate::storage::{MemoryLocalStore, KEY_DISMISSALS};

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn iusi() -> TaxItem {
    let mut item = TaxItem::new("IUSI").due_on(15, 3).unwrap();
    item.id = "iusi".to_string();
    item
  }

  struct Fixture {
    local: Arc<MemoryLocalStore>,
    clock: Arc<FixedClock>,
  }

  impl Fixture {
    fn new(today: NaiveDate) -> Self {
      Self {
        local: Arc::new(MemoryLocalStore::new()),
        clock: Arc::new(FixedClock::new(today)),
      }
    }

    fn notifier(&self) -> DueNotifier {
      let store = PreferenceStore::new(self.local.clone(), None, Arc::new(StaticSession::anonymous()));
      DueNotifier::new(store, self.local.clone(), self.clock.clone())
    }

    fn loaded_with(&self, items: Vec<TaxItem>) -> DueNotifier {
      let notifier = self.notifier();
      notifier.load().unwrap();
      let mut prefs = NotificationPreferences::default();
      prefs.tax_items = items;
      notifier.save_preferences(prefs).unwrap();
      notifier
    }
  }

  fn due_ids(notifier: &DueNotifier) -> Vec<String> {
    notifier.due_alerts().into_iter().map(|alert| alert.tax_item_id).collect()
  }

  #[test]
  fn classify_walks_every_state() {
    let today = ymd(2024, 3, 15);
    let mut dismissed = DismissMap::default();
    let mut session = SessionSuppression::default();

    let mut disabled = iusi();
    disabled.enabled = false;
    assert_eq!(classify(&disabled, today, &dismissed, &session), DueState::Ineligible);
    assert_eq!(classify(&TaxItem::new("no date"), today, &dismissed, &session), DueState::Ineligible);
    assert_eq!(classify(&iusi(), ymd(2024, 3, 16), &dismissed, &session), DueState::NotDue);
    assert_eq!(classify(&iusi(), today, &dismissed, &session), DueState::Due);

    session.insert("iusi");
    assert_eq!(classify(&iusi(), today, &dismissed, &session), DueState::SuppressedSession);
    dismissed.dismiss("iusi", today);
    assert_eq!(classify(&iusi(), today, &dismissed, &session), DueState::SuppressedToday);
  }

  #[test]
  fn iusi_is_due_on_march_15_only() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);
    let alerts = notifier.due_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].label, "IUSI");
    assert_eq!(alerts[0].due_on, ymd(2024, 3, 15));

    fixture.clock.set(ymd(2024, 3, 16));
    notifier.load().unwrap();
    assert!(notifier.due_alerts().is_empty());
  }

  #[test]
  fn dismiss_for_today_survives_reevaluation_and_reload() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);

    notifier.dismiss_for_today("iusi").unwrap();
    assert!(notifier.due_alerts().is_empty());
    notifier.load().unwrap();
    assert!(notifier.due_alerts().is_empty());
    assert_eq!(notifier.state_of("iusi"), Some(DueState::SuppressedToday));

    let reloaded = fixture.notifier();
    reloaded.load().unwrap();
    assert!(reloaded.due_alerts().is_empty());
  }

  #[test]
  fn dismissed_item_returns_next_year() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);
    notifier.dismiss_for_today("iusi").unwrap();

    fixture.clock.set(ymd(2025, 3, 15));
    notifier.load().unwrap();
    assert_eq!(due_ids(&notifier), vec!["iusi"]);
  }

  #[test]
  fn close_is_session_only() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);

    notifier.close("iusi").unwrap();
    assert!(notifier.due_alerts().is_empty());
    notifier.load().unwrap();
    assert!(notifier.due_alerts().is_empty());
    assert_eq!(fixture.local.get(KEY_DISMISSALS).unwrap(), None);

    let reloaded = fixture.notifier();
    reloaded.load().unwrap();
    assert_eq!(due_ids(&reloaded), vec!["iusi"]);
  }

  #[test]
  fn saving_preferences_clears_session_closes() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);
    notifier.close("iusi").unwrap();

    notifier.save_preferences(notifier.preferences()).unwrap();
    assert_eq!(due_ids(&notifier), vec!["iusi"]);
  }

  #[test]
  fn force_recheck_clears_both_suppressions() {
    let mut vat = TaxItem::new("VAT").due_on(15, 3).unwrap();
    vat.id = "vat".to_string();
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi(), vat]);

    notifier.dismiss_for_today("iusi").unwrap();
    notifier.close("vat").unwrap();
    assert!(notifier.due_alerts().is_empty());

    notifier.force_recheck().unwrap();
    assert_eq!(due_ids(&notifier), vec!["iusi", "vat"]);
    assert_eq!(fixture.local.get(KEY_DISMISSALS).unwrap(), None);
  }

  #[test]
  fn disabling_an_item_removes_it() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(vec![iusi()]);
    notifier.set_tax_item_enabled("iusi", false).unwrap();
    assert!(notifier.due_alerts().is_empty());
    assert_eq!(notifier.state_of("iusi"), Some(DueState::Ineligible));
    assert_eq!(notifier.set_tax_item_enabled("missing", true).unwrap_err().code, "NOT_FOUND");
  }

  #[test]
  fn upsert_and_remove_go_through_save() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.loaded_with(Vec::new());
    notifier.upsert_tax_item(iusi()).unwrap();
    assert_eq!(due_ids(&notifier), vec!["iusi"]);

    notifier.remove_tax_item("iusi").unwrap();
    assert!(notifier.due_alerts().is_empty());
    assert!(notifier.remove_tax_item("iusi").is_err());

    let reloaded = fixture.notifier();
    reloaded.load().unwrap();
    assert!(reloaded.preferences().tax_items.is_empty());
  }

  #[test]
  fn leap_day_item_fires_only_in_leap_years() {
    let mut leap = TaxItem::new("Leap").due_on(29, 2).unwrap();
    leap.id = "leap".to_string();
    let fixture = Fixture::new(ymd(2024, 2, 29));
    let notifier = fixture.loaded_with(vec![leap]);
    assert_eq!(due_ids(&notifier), vec!["leap"]);

    fixture.clock.set(ymd(2025, 2, 28));
    notifier.load().unwrap();
    assert!(notifier.due_alerts().is_empty());
  }

  #[test]
  fn odd_preferences_are_coerced_and_still_saved() {
    let fixture = Fixture::new(ymd(2024, 3, 15));
    let notifier = fixture.notifier();
    let mut prefs = NotificationPreferences::default();
    let mut blank = iusi();
    blank.label = "   ".to_string();
    prefs.tax_items.push(blank);
    prefs.low_balance.threshold = -50.0;

    let outcome = notifier.save_preferences(prefs).unwrap();
    assert!(outcome.saved);
    assert!(fixture.local.get(crate::storage::KEY_PREFERENCES).unwrap().is_some());
    assert_eq!(due_ids(&notifier), vec!["iusi"]);

    let reloaded = fixture.notifier();
    reloaded.load().unwrap();
    let saved = reloaded.preferences();
    assert_eq!(saved.tax_items[0].label, "");
    assert_eq!(saved.low_balance.threshold, 100.0);
  }
}
