use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

// Leap year, so Feb 29 counts as a real calendar day.
const REFERENCE_YEAR: i32 = 2000;

/// Annual due date: matches on (day, month) only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DueDate {
  day: u32,
  month: u32,
}

impl DueDate {
  pub fn new(day: u32, month: u32) -> Result<Self, AppError> {
    if NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).is_none() {
      return Err(AppError::new(
        "INVALID_DUE_DATE",
        format!("day {day} does not exist in month {month}"),
      ));
    }
    Ok(Self { day, month })
  }

  pub fn day(&self) -> u32 {
    self.day
  }

  pub fn month(&self) -> u32 {
    self.month
  }

  pub fn matches(&self, today: NaiveDate) -> bool {
    today.day() == self.day && today.month() == self.month
  }

  /// `None` for Feb 29 in a common year.
  pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, self.month, self.day)
  }
}
