use std::sync::Arc;

use super::{codec, NotificationPreferences, RemotePreferences};
use crate::error::AppError;
use crate::models::{RemoteSync, SaveOutcome};
use crate::session::SessionProvider;
use crate::storage::{LocalStore, KEY_PREFERENCES};

/// Preferences kept in local storage and mirrored to the remote API.
///
/// Local storage is the durable copy. The remote is tried first on load and
/// written best-effort on save, and only when a session token exists.
pub struct PreferenceStore {
  local: Arc<dyn LocalStore>,
  remote: Option<Arc<dyn RemotePreferences>>,
  session: Arc<dyn SessionProvider>,
}

impl PreferenceStore {
  pub fn new(
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemotePreferences>>,
    session: Arc<dyn SessionProvider>,
  ) -> Self {
    Self { local, remote, session }
  }

  pub fn load(&self) -> NotificationPreferences {
    if let Some(prefs) = self.load_remote() {
      if let Err(err) = self.write_local(&prefs) {
        tracing::warn!(error = %err, "could not cache remote preferences locally");
      }
      return prefs;
    }

    match self.load_local() {
      Ok(Some(prefs)) => prefs,
      Ok(None) => NotificationPreferences::default(),
      Err(err) => {
        tracing::warn!(error = %err, "local preferences unreadable, using defaults");
        NotificationPreferences::default()
      }
    }
  }

  pub fn load_local(&self) -> Result<Option<NotificationPreferences>, AppError> {
    match self.local.get(KEY_PREFERENCES)? {
      Some(raw) if !raw.trim().is_empty() => codec::decode(&raw).map(Some),
      _ => Ok(None),
    }
  }

  /// Always reports `saved`; `remote` tells how the mirror write went.
  pub fn save(&self, prefs: &NotificationPreferences) -> SaveOutcome {
    if let Err(err) = self.write_local(prefs) {
      tracing::error!(error = %err, "local preferences write failed");
    }

    let remote = match (&self.remote, self.session.access_token()) {
      (Some(remote), Some(token)) => match remote.push(&token, prefs) {
        Ok(_) => RemoteSync::Synced,
        Err(err) => {
          tracing::warn!(error = %err, "remote preferences save failed, kept local copy");
          RemoteSync::Failed
        }
      },
      _ => RemoteSync::Skipped,
    };

    SaveOutcome { saved: true, remote }
  }

  fn load_remote(&self) -> Option<NotificationPreferences> {
    let remote = self.remote.as_ref()?;
    let token = self.session.access_token()?;
    match remote.fetch(&token) {
      Ok(prefs) => prefs,
      Err(err) => {
        tracing::warn!(error = %err, "remote preferences unavailable, falling back to local");
        None
      }
    }
  }

  fn write_local(&self, prefs: &NotificationPreferences) -> Result<(), AppError> {
    let raw = codec::encode(prefs)?;
    self.local.set(KEY_PREFERENCES, &raw)
  }
}
