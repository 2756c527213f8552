//! Per-day capacity calendar: which hours a workshop opens, how many concurrent appointments
//! each hour holds and how many are already booked.

pub mod calendar;
pub mod domain;
pub mod repository;
pub mod router;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use calendar::CalendarError;
pub use domain::{
    AvailableSlot, ClosedReason, DaySchedule, DayUpdate, HourSlot, InvalidHour, NewDay,
    ReleaseOutcome, ScheduleTemplate, SlotConfig, SlotHour, SlotUpdate, CLOSING_HOUR,
    HOURS_CATALOG, OPENING_HOUR,
};
pub use repository::ScheduleRepository;
pub use router::schedule_router;
pub use store::{ScheduleStore, ScheduleStoreError};
pub use summary::MonthSummary;
