use chrono::{Datelike, Months, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First and last calendar day of the month containing `today`.
pub fn month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let start = today.with_day(1).unwrap_or(today);
  let end = start
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .unwrap_or(start);
  (start, end)
}

pub fn format_date(date: NaiveDate) -> String {
  date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn leap_february_ends_on_29th() {
    assert_eq!(month_range(ymd(2024, 2, 10)), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
  }

  #[test]
  fn common_february_ends_on_28th() {
    assert_eq!(month_range(ymd(2023, 2, 28)).1, ymd(2023, 2, 28));
  }

  #[test]
  fn thirty_day_month_ends_on_30th() {
    assert_eq!(month_range(ymd(2024, 4, 30)), (ymd(2024, 4, 1), ymd(2024, 4, 30)));
  }

  #[test]
  fn december_does_not_spill_into_next_year() {
    assert_eq!(month_range(ymd(2024, 12, 1)), (ymd(2024, 12, 1), ymd(2024, 12, 31)));
  }

  #[test]
  fn formats_iso_dates() {
    assert_eq!(format_date(ymd(2024, 3, 5)), "2024-03-05");
  }
}
