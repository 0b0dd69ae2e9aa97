pub mod availability;
pub mod overlap;
pub mod recurrence;
