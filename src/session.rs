use std::sync::RwLock;

pub trait SessionProvider: Send + Sync {
  fn user_id(&self) -> Option<String>;
  fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct StaticSession {
  inner: RwLock<SessionData>,
}

#[derive(Debug, Default, Clone)]
struct SessionData {
  user_id: Option<String>,
  access_token: Option<String>,
}

impl StaticSession {
  pub fn new(user_id: Option<String>, access_token: Option<String>) -> Self {
    Self {
      inner: RwLock::new(SessionData { user_id, access_token }),
    }
  }

  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn sign_in(&self, user_id: impl Into<String>, access_token: Option<String>) {
    if let Ok(mut guard) = self.inner.write() {
      guard.user_id = Some(user_id.into());
      guard.access_token = access_token;
    }
  }

  pub fn sign_out(&self) {
    if let Ok(mut guard) = self.inner.write() {
      *guard = SessionData::default();
    }
  }
}

impl SessionProvider for StaticSession {
  fn user_id(&self) -> Option<String> {
    self
      .inner
      .read()
      .ok()
      .and_then(|guard| guard.user_id.clone())
      .filter(|id| !id.trim().is_empty())
  }

  fn access_token(&self) -> Option<String> {
    self
      .inner
      .read()
      .ok()
      .and_then(|guard| guard.access_token.clone())
      .filter(|token| !token.trim().is_empty())
  }
}
