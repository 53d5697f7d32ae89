use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default level: INFO, debug for this crate. Override via `RUST_LOG`.
/// Safe to call more than once; later calls are ignored.
pub fn init() {
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info,finance_alerts=debug"));

  let stdout_layer = fmt::layer()
    .with_target(true)
    .with_thread_ids(false)
    .with_file(true)
    .with_line_number(true)
    .compact();

  let installed = tracing_subscriber::registry()
    .with(env_filter)
    .with(stdout_layer)
    .try_init();

  if installed.is_ok() {
    tracing::debug!("Tracing initialized");
  }
}
