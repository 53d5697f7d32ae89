use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{codec, NotificationPreferences};
use crate::error::AppError;

const PREFERENCES_PATH: &str = "notifications/preferences";

pub trait RemotePreferences: Send + Sync {
  /// `Ok(None)` when the server has nothing stored for this user.
  fn fetch(&self, token: &str) -> Result<Option<NotificationPreferences>, AppError>;
  fn push(&self, token: &str, prefs: &NotificationPreferences) -> Result<Option<NotificationPreferences>, AppError>;
}

#[derive(Debug, Deserialize)]
struct PreferencesEnvelope {
  #[serde(default)]
  preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
struct PreferencesBody {
  preferences: Value,
}

pub struct HttpPreferencesClient {
  base_url: String,
  client: Client,
}

impl HttpPreferencesClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
    let client = Client::builder()
      .timeout(timeout)
      .redirect(reqwest::redirect::Policy::none())
      .build()?;
    Ok(Self {
      base_url: base_url.into(),
      client,
    })
  }

  fn url(&self) -> String {
    format!("{}/{}", self.base_url.trim_end_matches('/'), PREFERENCES_PATH)
  }
}

impl RemotePreferences for HttpPreferencesClient {
  fn fetch(&self, token: &str) -> Result<Option<NotificationPreferences>, AppError> {
    let envelope: PreferencesEnvelope = self
      .client
      .get(self.url())
      .bearer_auth(token)
      .send()?
      .error_for_status()?
      .json()?;
    decode_envelope(envelope)
  }

  fn push(&self, token: &str, prefs: &NotificationPreferences) -> Result<Option<NotificationPreferences>, AppError> {
    let body = PreferencesBody {
      preferences: codec::to_value(prefs)?,
    };
    let envelope: PreferencesEnvelope = self
      .client
      .post(self.url())
      .bearer_auth(token)
      .json(&body)
      .send()?
      .error_for_status()?
      .json()?;
    decode_envelope(envelope)
  }
}

fn decode_envelope(envelope: PreferencesEnvelope) -> Result<Option<NotificationPreferences>, AppError> {
  match envelope.preferences {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Object(map)) if map.is_empty() => Ok(None),
    Some(value) => codec::from_value(value).map(Some),
  }
}
