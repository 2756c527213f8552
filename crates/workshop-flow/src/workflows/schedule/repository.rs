use chrono::NaiveDate;

use super::domain::DaySchedule;
use crate::workflows::domain::WorkshopId;
use crate::workflows::repository::RepositoryError;

/// Storage abstraction for day schedules, one record per (workshop, date).
pub trait ScheduleRepository: Send + Sync {
    fn fetch(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Option<DaySchedule>, RepositoryError>;
    fn insert(&self, day: DaySchedule) -> Result<DaySchedule, RepositoryError>;
    fn update(&self, day: DaySchedule) -> Result<(), RepositoryError>;
    fn remove(&self, workshop_id: &WorkshopId, date: NaiveDate) -> Result<(), RepositoryError>;
    /// Days within `from..=to`, ordered by date.
    fn between(
        &self,
        workshop_id: &WorkshopId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DaySchedule>, RepositoryError>;
}
