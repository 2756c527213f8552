use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::clock::FixedClock;
use crate::workflows::domain::WorkshopId;
use crate::workflows::locks::WorkshopLocks;
use crate::workflows::memory::InMemoryScheduleRepository;
use crate::workflows::repository::RepositoryError;
use crate::workflows::schedule::{
    DaySchedule, NewDay, ScheduleRepository, ScheduleStore, SlotConfig, SlotHour,
};

pub(super) fn workshop() -> WorkshopId {
    WorkshopId::new("taller-centro")
}

/// The pinned "today" every store in these tests sees.
pub(super) fn today() -> NaiveDate {
    date(1)
}

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

pub(super) fn hour(value: u8) -> SlotHour {
    SlotHour::new(value).expect("catalog hour")
}

pub(super) fn open_slots(slots: &[(u8, u32)]) -> Vec<SlotConfig> {
    slots
        .iter()
        .map(|(value, capacity)| SlotConfig {
            hour: hour(*value),
            active: true,
            capacity: *capacity,
        })
        .collect()
}

pub(super) fn new_day(day: NaiveDate, slots: &[(u8, u32)]) -> NewDay {
    NewDay {
        date: day,
        slots: open_slots(slots),
        blocked: false,
        block_reason: None,
    }
}

pub(super) fn configured_day(slots: &[(u8, u32)]) -> DaySchedule {
    DaySchedule::configure(workshop(), date(10), &open_slots(slots), false, None)
        .expect("valid configuration")
}

pub(super) fn build_store() -> (
    ScheduleStore<InMemoryScheduleRepository>,
    Arc<InMemoryScheduleRepository>,
) {
    let repository = Arc::new(InMemoryScheduleRepository::new());
    let store = ScheduleStore::new(
        repository.clone(),
        Arc::new(WorkshopLocks::new()),
        Arc::new(FixedClock::new(today())),
    );
    (store, repository)
}

pub(super) fn unavailable_store() -> ScheduleStore<UnavailableRepository> {
    ScheduleStore::new(
        Arc::new(UnavailableRepository),
        Arc::new(WorkshopLocks::new()),
        Arc::new(FixedClock::new(today())),
    )
}

pub(super) struct UnavailableRepository;

impl ScheduleRepository for UnavailableRepository {
    fn fetch(
        &self,
        _workshop_id: &WorkshopId,
        _date: NaiveDate,
    ) -> Result<Option<DaySchedule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _day: DaySchedule) -> Result<DaySchedule, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _day: DaySchedule) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _workshop_id: &WorkshopId, _date: NaiveDate) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn between(
        &self,
        _workshop_id: &WorkshopId,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<DaySchedule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
