pub const WARN_PERCENT: f64 = 80.0;
pub const EXCEEDED_PERCENT: f64 = 100.0;

/// Returns `None` for a non-positive limit, which cannot be utilized.
pub fn utilization_percent(spent: f64, limit: f64) -> Option<f64> {
  if limit <= 0.0 || !limit.is_finite() {
    None
  } else {
    Some(spent / limit * 100.0)
  }
}

pub fn sum_abs(amounts: impl IntoIterator<Item = f64>) -> f64 {
  amounts.into_iter().map(f64::abs).sum()
}

pub fn reaches_warning(percentage: f64) -> bool {
  percentage >= WARN_PERCENT
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utilization_is_spent_over_limit() {
    let pct = utilization_percent(850.0, 1000.0).unwrap();
    assert!((pct - 85.0).abs() < 1e-9);
    let pct = utilization_percent(1200.0, 1000.0).unwrap();
    assert!((pct - 120.0).abs() < 1e-9);
  }

  #[test]
  fn zero_limit_has_no_utilization() {
    assert_eq!(utilization_percent(10.0, 0.0), None);
    assert_eq!(utilization_percent(10.0, -5.0), None);
  }

  #[test]
  fn sum_abs_ignores_sign() {
    assert_eq!(sum_abs([-500.0, 300.0, -50.0]), 850.0);
  }

  #[test]
  fn warning_threshold_is_inclusive() {
    assert!(reaches_warning(80.0));
    assert!(!reaches_warning(79.999));
  }
}
