pub mod limits;
pub mod period;
pub mod recurrence;
pub mod validation;
