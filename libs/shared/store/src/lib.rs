pub mod records;
pub mod schedule;

pub use records::*;
pub use schedule::{ScheduleStore, StoreError};
