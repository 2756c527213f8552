use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::calendar::CalendarError;
use super::domain::{
    AvailableSlot, ClosedReason, DaySchedule, DayUpdate, NewDay, ReleaseOutcome,
    ScheduleTemplate, SlotHour,
};
use super::repository::ScheduleRepository;
use super::summary::{month_bounds, MonthSummary};
use crate::workflows::clock::Clock;
use crate::workflows::domain::WorkshopId;
use crate::workflows::locks::WorkshopLocks;
use crate::workflows::rejection::ErrorKind;
use crate::workflows::repository::RepositoryError;

/// Per-workshop calendar of bookable hours.
pub struct ScheduleStore<R> {
    repository: Arc<R>,
    locks: Arc<WorkshopLocks>,
    clock: Arc<dyn Clock>,
}

impl<R> ScheduleStore<R>
where
    R: ScheduleRepository + 'static,
{
    pub fn new(repository: Arc<R>, locks: Arc<WorkshopLocks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            locks,
            clock,
        }
    }

    pub fn locks(&self) -> Arc<WorkshopLocks> {
        self.locks.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn create_day(
        &self,
        workshop_id: &WorkshopId,
        request: NewDay,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.ensure_not_past(request.date)?;
        self.locks.with_workshop(workshop_id, || {
            if self.repository.fetch(workshop_id, request.date)?.is_some() {
                return Err(ScheduleStoreError::AlreadyExists { date: request.date });
            }

            let day = DaySchedule::configure(
                workshop_id.clone(),
                request.date,
                &request.slots,
                request.blocked,
                request.block_reason,
            )?;
            let stored = self.repository.insert(day)?;
            info!(workshop = %workshop_id, date = %stored.date, "day schedule created");
            Ok(stored)
        })
    }

    pub fn update_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        update: DayUpdate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.ensure_not_past(date)?;
        self.locks.with_workshop(workshop_id, || {
            let current = self.existing_day(workshop_id, date)?;
            let next = current.apply_update(&update)?;
            self.warn_if_blocking_booked_day(&current, &next);
            self.repository.update(next.clone())?;
            info!(workshop = %workshop_id, %date, "day schedule updated");
            Ok(next)
        })
    }

    /// Clear a day back to the unconfigured state. Refused while any seat is booked.
    pub fn delete_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.ensure_not_past(date)?;
        self.locks.with_workshop(workshop_id, || {
            let current = self.existing_day(workshop_id, date)?;
            if let Some(slot) = current.first_booked_slot() {
                return Err(CalendarError::SlotInUse {
                    date,
                    hour: slot.hour,
                    booked: slot.booked,
                }
                .into());
            }
            self.repository.remove(workshop_id, date)?;
            info!(workshop = %workshop_id, %date, "day schedule cleared");
            Ok(current)
        })
    }

    /// Copy active flags and capacities from `source` onto `destination`.
    pub fn copy_day(
        &self,
        workshop_id: &WorkshopId,
        source: NaiveDate,
        destination: NaiveDate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.ensure_not_past(destination)?;
        self.locks.with_workshop(workshop_id, || {
            let template = self.existing_day(workshop_id, source)?;
            let stored = match self.repository.fetch(workshop_id, destination)? {
                Some(existing) => {
                    let next = existing.with_configuration_of(&template)?;
                    self.repository.update(next.clone())?;
                    next
                }
                None => {
                    let fresh = DaySchedule::unconfigured(workshop_id.clone(), destination)
                        .with_configuration_of(&template)?;
                    self.repository.insert(fresh)?
                }
            };
            info!(workshop = %workshop_id, %source, %destination, "day schedule copied");
            Ok(stored)
        })
    }

    pub fn apply_template(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        template: &ScheduleTemplate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.edit_or_create(workshop_id, date, |day| day.apply_template(template))
    }

    pub fn apply_range(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        start: SlotHour,
        end: SlotHour,
        capacity: u32,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.edit_or_create(workshop_id, date, |day| day.apply_range(start, end, capacity))
    }

    pub fn block_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        let update = DayUpdate {
            blocked: Some(true),
            block_reason: reason,
            ..DayUpdate::default()
        };
        self.edit_or_create(workshop_id, date, |day| day.apply_update(&update))
    }

    pub fn unblock_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.update_day(
            workshop_id,
            date,
            DayUpdate {
                blocked: Some(false),
                ..DayUpdate::default()
            },
        )
    }

    pub fn get_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.existing_day(workshop_id, date)
    }

    pub fn list_days_in_month(
        &self,
        workshop_id: &WorkshopId,
        year: i32,
        month: u32,
    ) -> Result<Vec<DaySchedule>, ScheduleStoreError> {
        let (first, last) =
            month_bounds(year, month).ok_or(ScheduleStoreError::InvalidMonth { year, month })?;
        Ok(self.repository.between(workshop_id, first, last)?)
    }

    pub fn month_summary(
        &self,
        workshop_id: &WorkshopId,
        year: i32,
        month: u32,
    ) -> Result<MonthSummary, ScheduleStoreError> {
        let days = self.list_days_in_month(workshop_id, year, month)?;
        Ok(MonthSummary::fold(year, month, &days))
    }

    /// Bookable hours for a date; an unconfigured day has none.
    pub fn available_slots(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>, ScheduleStoreError> {
        Ok(self
            .repository
            .fetch(workshop_id, date)?
            .map(|day| day.available_slots())
            .unwrap_or_default())
    }

    pub fn reserve(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        hour: SlotHour,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.locks
            .with_workshop(workshop_id, || self.reserve_locked(workshop_id, date, hour))
    }

    pub fn release(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        hour: SlotHour,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.locks
            .with_workshop(workshop_id, || self.release_locked(workshop_id, date, hour))
    }

    /// Reserve without taking the workshop lock. Callers must already hold it.
    pub(crate) fn reserve_locked(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        hour: SlotHour,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        let mut day = self.repository.fetch(workshop_id, date)?.ok_or(
            CalendarError::SlotClosed {
                date,
                hour,
                reason: ClosedReason::DayNotConfigured,
            },
        )?;

        if let Err(err) = day.reserve(hour) {
            debug!(workshop = %workshop_id, %date, %hour, error = %err, "reservation rejected");
            return Err(err.into());
        }
        self.repository.update(day.clone())?;
        Ok(day)
    }

    /// Release without taking the workshop lock. Callers must already hold it.
    pub(crate) fn release_locked(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        hour: SlotHour,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        let mut day = self.existing_day(workshop_id, date)?;
        match day.release(hour) {
            ReleaseOutcome::Released { remaining_booked } => {
                self.repository.update(day.clone())?;
                debug!(workshop = %workshop_id, %date, %hour, remaining_booked, "seat released");
            }
            ReleaseOutcome::AlreadyEmpty => {
                warn!(
                    workshop = %workshop_id,
                    %date,
                    %hour,
                    "release requested on a slot with no bookings; ignoring"
                );
            }
        }
        Ok(day)
    }

    fn edit_or_create<F>(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        edit: F,
    ) -> Result<DaySchedule, ScheduleStoreError>
    where
        F: FnOnce(&DaySchedule) -> Result<DaySchedule, CalendarError>,
    {
        self.ensure_not_past(date)?;
        self.locks.with_workshop(workshop_id, || {
            match self.repository.fetch(workshop_id, date)? {
                Some(current) => {
                    let next = edit(&current)?;
                    self.warn_if_blocking_booked_day(&current, &next);
                    self.repository.update(next.clone())?;
                    info!(workshop = %workshop_id, %date, "day schedule updated");
                    Ok(next)
                }
                None => {
                    let next = edit(&DaySchedule::unconfigured(workshop_id.clone(), date))?;
                    let stored = self.repository.insert(next)?;
                    info!(workshop = %workshop_id, %date, "day schedule created");
                    Ok(stored)
                }
            }
        })
    }

    fn existing_day(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<DaySchedule, ScheduleStoreError> {
        self.repository
            .fetch(workshop_id, date)?
            .ok_or(ScheduleStoreError::DayNotFound { date })
    }

    fn ensure_not_past(&self, date: NaiveDate) -> Result<(), ScheduleStoreError> {
        let today = self.clock.today();
        if date < today {
            debug!(%date, %today, "rejecting edit of a past date");
            return Err(ScheduleStoreError::PastDate { date, today });
        }
        Ok(())
    }

    fn warn_if_blocking_booked_day(&self, current: &DaySchedule, next: &DaySchedule) {
        if !current.blocked && next.blocked && current.booked_total() > 0 {
            warn!(
                workshop = %next.workshop_id,
                date = %next.date,
                booked = current.booked_total(),
                "blocking a day that still holds bookings"
            );
        }
    }
}

/// Error raised by the schedule store.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleStoreError {
    #[error("{date} is before today ({today}); past days cannot be configured")]
    PastDate { date: NaiveDate, today: NaiveDate },
    #[error("a schedule for {date} already exists")]
    AlreadyExists { date: NaiveDate },
    #[error("no schedule configured for {date}")]
    DayNotFound { date: NaiveDate },
    #[error("{year}-{month:02} is not a valid month")]
    InvalidMonth { year: i32, month: u32 },
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScheduleStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleStoreError::PastDate { .. } => ErrorKind::PastDate,
            ScheduleStoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            ScheduleStoreError::DayNotFound { .. } => ErrorKind::NotFound,
            ScheduleStoreError::InvalidMonth { .. } => ErrorKind::InvalidRequest,
            ScheduleStoreError::Calendar(err) => err.kind(),
            ScheduleStoreError::Repository(err) => err.kind(),
        }
    }
}
