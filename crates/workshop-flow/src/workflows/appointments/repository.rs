use chrono::NaiveDate;

use super::domain::{Appointment, AppointmentId};
use crate::workflows::domain::WorkshopId;
use crate::workflows::repository::RepositoryError;

/// Storage abstraction for appointments. Records are never deleted.
pub trait AppointmentRepository: Send + Sync {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;
    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError>;
    fn for_workshop(&self, workshop_id: &WorkshopId) -> Result<Vec<Appointment>, RepositoryError>;
    fn on_date(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError>;
}
