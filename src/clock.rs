use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate};

pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate {
    Local::now().date_naive()
  }
}

/// Settable clock for hosts that replay a given day, and for tests.
#[derive(Debug)]
pub struct FixedClock {
  today: Mutex<NaiveDate>,
}

impl FixedClock {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      today: Mutex::new(today),
    }
  }

  pub fn set(&self, date: NaiveDate) {
    if let Ok(mut guard) = self.today.lock() {
      *guard = date;
    }
  }

  pub fn advance_days(&self, days: i64) {
    if let Ok(mut guard) = self.today.lock() {
      *guard += Duration::days(days);
    }
  }
}

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    match self.today.lock() {
      Ok(guard) => *guard,
      Err(poisoned) => *poisoned.into_inner(),
    }
  }
}
