use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::appointments::{
    Appointment, AppointmentId, AppointmentRepository, NewAppointment,
};
use crate::workflows::clock::FixedClock;
use crate::workflows::domain::{
    ClientId, PhotoHandle, TechnicianId, VehicleId, VehicleSnapshot, WorkshopId,
};
use crate::workflows::inspection::{
    ConditionRating, EntryEvaluation, FinalEvaluationSubmission, RepairDraft, RepairPriority,
    SubsystemCheck, TechnicalTests,
};
use crate::workflows::locks::WorkshopLocks;
use crate::workflows::memory::{
    InMemoryAppointmentRepository, InMemoryEvaluationRepository, InMemoryScheduleRepository,
    InMemoryVehicleDirectory,
};
use crate::workflows::repository::{DirectoryError, RepositoryError, VehicleDirectory};
use crate::workflows::schedule::{NewDay, ScheduleStore, SlotConfig, SlotHour};
use crate::workflows::store::{EntrySubmission, WorkflowStore};

pub(super) type MemoryStore<A = InMemoryAppointmentRepository> =
    WorkflowStore<InMemoryEvaluationRepository, A, InMemoryScheduleRepository>;

pub(super) fn workshop() -> WorkshopId {
    WorkshopId::new("taller-centro")
}

pub(super) fn today() -> NaiveDate {
    date(1)
}

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

pub(super) fn nine() -> SlotHour {
    SlotHour::new(9).expect("catalog hour")
}

pub(super) fn vehicle(id: &str, plate: &str) -> VehicleSnapshot {
    VehicleSnapshot {
        vehicle_id: VehicleId::new(id),
        brand: "Toyota".to_string(),
        model: "Hilux".to_string(),
        year: 2020,
        plate: plate.to_string(),
        mileage: 61_000,
        color: None,
    }
}

pub(super) fn directory() -> Arc<InMemoryVehicleDirectory> {
    Arc::new(InMemoryVehicleDirectory::with_vehicles([
        vehicle("veh-1", "ABC-101"),
        vehicle("veh-2", "ABC-202"),
    ]))
}

pub(super) fn build_store_with<A>(appointments: Arc<A>) -> MemoryStore<A>
where
    A: AppointmentRepository + 'static,
{
    let schedule = Arc::new(ScheduleStore::new(
        Arc::new(InMemoryScheduleRepository::new()),
        Arc::new(WorkshopLocks::new()),
        Arc::new(FixedClock::new(today())),
    ));
    WorkflowStore::new(
        Arc::new(InMemoryEvaluationRepository::new()),
        appointments,
        schedule,
        directory(),
    )
}

pub(super) fn build_store() -> MemoryStore {
    build_store_with(Arc::new(InMemoryAppointmentRepository::new()))
}

/// Opens 09:00 on `day` with `capacity` seats.
pub(super) fn open_nine<A>(store: &MemoryStore<A>, day: NaiveDate, capacity: u32)
where
    A: AppointmentRepository + 'static,
{
    store
        .schedule()
        .create_day(
            &workshop(),
            NewDay {
                date: day,
                slots: vec![SlotConfig {
                    hour: nine(),
                    active: true,
                    capacity,
                }],
                blocked: false,
                block_reason: None,
            },
        )
        .expect("create day");
}

pub(super) fn booked_at_nine<A>(store: &MemoryStore<A>, day: NaiveDate) -> u32
where
    A: AppointmentRepository + 'static,
{
    store
        .schedule()
        .get_day(&workshop(), day)
        .expect("day")
        .slot(nine())
        .map(|slot| slot.booked)
        .unwrap_or_default()
}

pub(super) fn booking(vehicle_id: &str, day: NaiveDate) -> NewAppointment {
    NewAppointment {
        vehicle_id: VehicleId::new(vehicle_id),
        client_id: ClientId::new("cli-1"),
        date: day,
        time_slot: nine(),
        description: "Annual service".to_string(),
        notes: Some("Customer waits on site".to_string()),
    }
}

pub(super) fn entry_submission(vehicle_id: &str) -> EntrySubmission {
    EntrySubmission {
        vehicle_id: VehicleId::new(vehicle_id),
        appointment_id: None,
        entry: EntryEvaluation {
            mileage_at_entry: 61_020,
            exterior_condition: ConditionRating::Good,
            interior_condition: ConditionRating::Good,
            notes: String::new(),
            technician: TechnicianId::new("tec-1"),
            entry_photos: vec![PhotoHandle::new("media://entry/1.jpg")],
        },
    }
}

pub(super) fn technical_tests() -> TechnicalTests {
    let rated = SubsystemCheck::rated;
    TechnicalTests {
        engine: rated(ConditionRating::Good),
        brakes: rated(ConditionRating::Bad),
        suspension: rated(ConditionRating::Good),
        steering: rated(ConditionRating::Good),
        lights: rated(ConditionRating::Good),
        tires: rated(ConditionRating::Regular),
        electrical: rated(ConditionRating::Good),
        transmission: rated(ConditionRating::Good),
        air_conditioning: rated(ConditionRating::Excellent),
        fluids: rated(ConditionRating::Good),
        technical_notes: String::new(),
        photos: Vec::new(),
    }
}

pub(super) fn final_submission() -> FinalEvaluationSubmission {
    let repair = |name: &str, priority, estimated_cost| RepairDraft {
        name: name.to_string(),
        description: String::new(),
        priority,
        category: "chassis".to_string(),
        estimated_cost,
        estimated_hours: 2.0,
    };
    FinalEvaluationSubmission {
        findings_summary: "Brake pads worn, tires uneven".to_string(),
        repair_priority: RepairPriority::Critical,
        estimated_repair_hours: 4.0,
        final_notes: String::new(),
        evaluating_technician: TechnicianId::new("tec-2"),
        final_photos: Vec::new(),
        recommended_repairs: vec![
            repair("Replace brake pads", RepairPriority::Critical, 200.0),
            repair("Balance tires", RepairPriority::Preventive, 50.0),
        ],
    }
}

/// Appointment repository whose writes can be switched off mid-test.
#[derive(Default)]
pub(super) struct FlakyAppointments {
    inner: InMemoryAppointmentRepository,
    pub(super) fail_inserts: AtomicBool,
    pub(super) fail_updates: AtomicBool,
}

impl AppointmentRepository for FlakyAppointments {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.inner.insert(appointment)
    }

    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write timeout".to_string()));
        }
        self.inner.update(appointment)
    }

    fn fetch(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn for_workshop(&self, workshop_id: &WorkshopId) -> Result<Vec<Appointment>, RepositoryError> {
        self.inner.for_workshop(workshop_id)
    }

    fn on_date(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        self.inner.on_date(workshop_id, date)
    }
}

pub(super) struct UnavailableDirectory;

impl VehicleDirectory for UnavailableDirectory {
    fn vehicle(&self, _id: &VehicleId) -> Result<Option<VehicleSnapshot>, DirectoryError> {
        Err(DirectoryError::Unavailable("catalog service offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
