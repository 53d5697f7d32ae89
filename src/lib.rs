//! Spending-limit and recurring tax-due alerts for a personal finance tracker.

pub mod center;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod due;
pub mod error;
pub mod instrumentation;
pub mod layout;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod session;
pub mod spending;
pub mod storage;
pub mod suppression;
pub mod thresholds;

pub use center::{AlertCenter, AlertSnapshot, Collaborators};
pub use error::AppError;
