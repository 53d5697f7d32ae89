use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const ENV_DATA_DIR: &str = "FINANCE_ALERTS_DATA_DIR";
const ENV_PORTABLE: &str = "FINANCE_ALERTS_PORTABLE";
const ENV_API_URL: &str = "FINANCE_ALERTS_API_URL";
const ENV_HTTP_TIMEOUT: &str = "FINANCE_ALERTS_HTTP_TIMEOUT_SECS";
const ENV_USER_ID: &str = "FINANCE_ALERTS_USER_ID";
const ENV_TOKEN: &str = "FINANCE_ALERTS_TOKEN";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const APP_DIR_NAME: &str = "FinanceAlerts";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub data_dir: PathBuf,
  pub api_base_url: Option<String>,
  pub http_timeout: Duration,
  pub user_id: Option<String>,
  pub access_token: Option<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, AppError> {
    let data_dir = match non_empty_env(ENV_DATA_DIR) {
      Some(path) => PathBuf::from(path),
      None => resolve_app_dir()?,
    };

    let http_timeout = match non_empty_env(ENV_HTTP_TIMEOUT) {
      Some(value) => {
        let secs: u64 = value
          .parse()
          .map_err(|_| AppError::new("CONFIG", format!("{ENV_HTTP_TIMEOUT} must be a number of seconds")))?;
        Duration::from_secs(secs)
      }
      None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
    };

    Ok(Self {
      data_dir,
      api_base_url: non_empty_env(ENV_API_URL).map(|url| url.trim_end_matches('/').to_string()),
      http_timeout,
      user_id: non_empty_env(ENV_USER_ID),
      access_token: non_empty_env(ENV_TOKEN),
    })
  }

  pub fn for_dir(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      data_dir: data_dir.into(),
      api_base_url: None,
      http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
      user_id: None,
      access_token: None,
    }
  }
}

pub fn resolve_app_dir() -> Result<PathBuf, AppError> {
  if let Some(portable) = resolve_portable_dir()? {
    return Ok(portable);
  }

  let base = dirs_next::data_local_dir()
    .ok_or_else(|| AppError::new("CONFIG", "local data directory not found"))?;
  Ok(base.join(APP_DIR_NAME))
}

fn resolve_portable_dir() -> Result<Option<PathBuf>, AppError> {
  let env_enabled = std::env::var(ENV_PORTABLE)
    .ok()
    .map(|value| {
      let value = value.to_ascii_lowercase();
      value == "1" || value == "true" || value == "yes"
    })
    .unwrap_or(false);

  let exe_dir = std::env::current_exe()
    .ok()
    .and_then(|path| path.parent().map(|parent| parent.to_path_buf()));

  if let Some(exe_dir) = exe_dir {
    let flag = exe_dir.join("portable.flag");
    let data_dir = exe_dir.join("data");
    if env_enabled || flag.exists() {
      fs::create_dir_all(&data_dir)?;
      return Ok(Some(data_dir));
    }
  }

  Ok(None)
}

fn non_empty_env(key: &str) -> Option<String> {
  std::env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}
