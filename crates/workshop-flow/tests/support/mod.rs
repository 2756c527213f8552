#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use workshop_flow::workflows::appointments::NewAppointment;
use workshop_flow::workflows::schedule::{NewDay, ScheduleStore, SlotConfig, SlotHour};
use workshop_flow::workflows::{
    ClientId, FixedClock, InMemoryAppointmentRepository, InMemoryEvaluationRepository,
    InMemoryScheduleRepository, InMemoryVehicleDirectory, VehicleId, VehicleSnapshot,
    WorkflowStore, WorkshopId, WorkshopLocks,
};

pub type Store = WorkflowStore<
    InMemoryEvaluationRepository,
    InMemoryAppointmentRepository,
    InMemoryScheduleRepository,
>;

pub fn workshop() -> WorkshopId {
    WorkshopId::new("taller-sur")
}

pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid June date")
}

pub fn hour(value: u8) -> SlotHour {
    SlotHour::new(value).expect("catalog hour")
}

pub fn vehicle(id: &str) -> VehicleSnapshot {
    VehicleSnapshot {
        vehicle_id: VehicleId::new(id),
        brand: "Nissan".to_string(),
        model: "Versa".to_string(),
        year: 2019,
        plate: format!("PLT-{id}"),
        mileage: 84_500,
        color: Some("silver".to_string()),
    }
}

/// Store pinned to 2025-06-01 with vehicles `V1` and `V2` registered.
pub fn store() -> Store {
    let schedule = Arc::new(ScheduleStore::new(
        Arc::new(InMemoryScheduleRepository::new()),
        Arc::new(WorkshopLocks::new()),
        Arc::new(FixedClock::new(june(1))),
    ));
    WorkflowStore::new(
        Arc::new(InMemoryEvaluationRepository::new()),
        Arc::new(InMemoryAppointmentRepository::new()),
        schedule,
        Arc::new(InMemoryVehicleDirectory::with_vehicles([
            vehicle("V1"),
            vehicle("V2"),
        ])),
    )
}

pub fn single_slot_day(date: NaiveDate, at: SlotHour, capacity: u32) -> NewDay {
    NewDay {
        date,
        slots: vec![SlotConfig {
            hour: at,
            active: true,
            capacity,
        }],
        blocked: false,
        block_reason: None,
    }
}

pub fn appointment(vehicle_id: &str, date: NaiveDate, at: SlotHour) -> NewAppointment {
    NewAppointment {
        vehicle_id: VehicleId::new(vehicle_id),
        client_id: ClientId::new("cliente-7"),
        date,
        time_slot: at,
        description: "Check engine light".to_string(),
        notes: None,
    }
}
