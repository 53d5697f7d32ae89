use std::time::Duration;

use crate::error::AppError;

/// Observability hook injected into the monitors. All methods default to no-ops.
pub trait AlertInstrumentation: Send + Sync + 'static {
  fn observe_spending_pass(&self, _alerts: usize, _latency: Duration) {}
  fn observe_due_pass(&self, _due: usize) {}
  fn observe_threshold_pass(&self, _alerts: usize, _latency: Duration) {}
  fn observe_error(&self, _operation: &str, _error: &AppError) {}
}

#[derive(Debug, Default)]
pub struct NoopInstrumentation;

impl AlertInstrumentation for NoopInstrumentation {}
