use chrono::NaiveDate;

use crate::domain::period::DATE_FORMAT;
use crate::error::AppError;

pub fn parse_date(date: &str) -> Result<NaiveDate, AppError> {
  NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
    .map_err(|_| AppError::new("INVALID_DATE", format!("date must be YYYY-MM-DD, got '{date}'")))
}

pub fn ensure_threshold(threshold: f64) -> Result<(), AppError> {
  if !threshold.is_finite() || threshold < 0.0 {
    Err(AppError::new("INVALID_THRESHOLD", "threshold must be a non-negative amount"))
  } else {
    Ok(())
  }
}

pub fn ensure_label(label: &str) -> Result<(), AppError> {
  if label.trim().is_empty() {
    Err(AppError::new("INVALID_LABEL", "tax item label must not be empty"))
  } else {
    Ok(())
  }
}
