use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use workshop_flow::workflows::schedule::ScheduleStore;
use workshop_flow::workflows::{
    Clock, InMemoryAppointmentRepository, InMemoryEvaluationRepository,
    InMemoryScheduleRepository, InMemoryVehicleDirectory, VehicleId, VehicleSnapshot,
    WorkflowStore, WorkshopLocks,
};

pub(crate) type MemorySchedule = ScheduleStore<InMemoryScheduleRepository>;
pub(crate) type MemoryWorkflow = WorkflowStore<
    InMemoryEvaluationRepository,
    InMemoryAppointmentRepository,
    InMemoryScheduleRepository,
>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stores wired to in-memory repositories, sharing one lock table and clock.
pub(crate) struct WorkshopServices {
    pub(crate) schedule: Arc<MemorySchedule>,
    pub(crate) workflow: Arc<MemoryWorkflow>,
    pub(crate) vehicles: Arc<InMemoryVehicleDirectory>,
}

impl WorkshopServices {
    pub(crate) fn in_memory(clock: Arc<dyn Clock>) -> Self {
        let schedule = Arc::new(ScheduleStore::new(
            Arc::new(InMemoryScheduleRepository::new()),
            Arc::new(WorkshopLocks::new()),
            clock,
        ));
        let vehicles = Arc::new(InMemoryVehicleDirectory::new());
        let workflow = Arc::new(WorkflowStore::new(
            Arc::new(InMemoryEvaluationRepository::new()),
            Arc::new(InMemoryAppointmentRepository::new()),
            schedule.clone(),
            vehicles.clone(),
        ));
        Self {
            schedule,
            workflow,
            vehicles,
        }
    }

    pub(crate) fn register_sample_fleet(&self) {
        for vehicle in sample_fleet() {
            self.vehicles.register(vehicle);
        }
    }
}

pub(crate) fn sample_fleet() -> Vec<VehicleSnapshot> {
    [
        ("veh-hilux", "Toyota", "Hilux", 2021, "BXR-421", 48_200),
        ("veh-versa", "Nissan", "Versa", 2018, "KLM-907", 112_400),
        ("veh-golf", "Volkswagen", "Golf", 2016, "JTS-330", 151_050),
    ]
    .into_iter()
    .map(|(id, brand, model, year, plate, mileage)| VehicleSnapshot {
        vehicle_id: VehicleId::new(id),
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        plate: plate.to_string(),
        mileage,
        color: None,
    })
    .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
