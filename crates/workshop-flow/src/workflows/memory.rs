use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::appointments::{Appointment, AppointmentId, AppointmentRepository};
use super::domain::{VehicleId, VehicleSnapshot, WorkshopId};
use super::inspection::{EvaluationId, EvaluationRepository, InspectionEvaluation};
use super::repository::{DirectoryError, RepositoryError, VehicleDirectory};
use super::schedule::{DaySchedule, ScheduleRepository};

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Day schedules keyed by (workshop, date) so month scans are range reads.
#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    days: Mutex<BTreeMap<(WorkshopId, NaiveDate), DaySchedule>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleRepository for InMemoryScheduleRepository {
    fn fetch(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Option<DaySchedule>, RepositoryError> {
        let days = guard(&self.days)?;
        Ok(days.get(&(workshop_id.clone(), date)).cloned())
    }

    fn insert(&self, day: DaySchedule) -> Result<DaySchedule, RepositoryError> {
        let mut days = guard(&self.days)?;
        let key = (day.workshop_id.clone(), day.date);
        if days.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        days.insert(key, day.clone());
        Ok(day)
    }

    fn update(&self, day: DaySchedule) -> Result<(), RepositoryError> {
        let mut days = guard(&self.days)?;
        let key = (day.workshop_id.clone(), day.date);
        match days.get_mut(&key) {
            Some(existing) => {
                *existing = day;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove(&self, workshop_id: &WorkshopId, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut days = guard(&self.days)?;
        days.remove(&(workshop_id.clone(), date))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn between(
        &self,
        workshop_id: &WorkshopId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DaySchedule>, RepositoryError> {
        if from > to {
            return Ok(Vec::new());
        }
        let days = guard(&self.days)?;
        Ok(days
            .range((workshop_id.clone(), from)..=(workshop_id.clone(), to))
            .map(|(_, day)| day.clone())
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    records: Mutex<HashMap<AppointmentId, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut records = guard(&self.records)?;
        if records.contains_key(&appointment.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError> {
        let mut records = guard(&self.records)?;
        match records.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records.get(id).cloned())
    }

    fn for_workshop(&self, workshop_id: &WorkshopId) -> Result<Vec<Appointment>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records
            .values()
            .filter(|appointment| &appointment.workshop_id == workshop_id)
            .cloned()
            .collect())
    }

    fn on_date(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records
            .values()
            .filter(|appointment| {
                &appointment.workshop_id == workshop_id && appointment.date == date
            })
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEvaluationRepository {
    records: Mutex<HashMap<EvaluationId, InspectionEvaluation>>,
}

impl InMemoryEvaluationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(
        &self,
        evaluation: InspectionEvaluation,
    ) -> Result<InspectionEvaluation, RepositoryError> {
        let mut records = guard(&self.records)?;
        if records.contains_key(&evaluation.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(evaluation.id.clone(), evaluation.clone());
        Ok(evaluation)
    }

    fn update(&self, evaluation: InspectionEvaluation) -> Result<(), RepositoryError> {
        let mut records = guard(&self.records)?;
        match records.get_mut(&evaluation.id) {
            Some(existing) => {
                *existing = evaluation;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<InspectionEvaluation>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records.get(id).cloned())
    }

    fn for_workshop(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<Vec<InspectionEvaluation>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records
            .values()
            .filter(|evaluation| &evaluation.workshop_id == workshop_id)
            .cloned()
            .collect())
    }

    fn open_for_vehicle(
        &self,
        workshop_id: &WorkshopId,
        vehicle_id: &VehicleId,
    ) -> Result<Option<InspectionEvaluation>, RepositoryError> {
        let records = guard(&self.records)?;
        Ok(records
            .values()
            .filter(|evaluation| {
                &evaluation.workshop_id == workshop_id
                    && &evaluation.vehicle_id == vehicle_id
                    && evaluation.is_open()
            })
            .max_by_key(|evaluation| evaluation.created_at)
            .cloned())
    }
}

/// Vehicle directory seeded by hand; stands in for the external catalog service.
#[derive(Debug, Default)]
pub struct InMemoryVehicleDirectory {
    vehicles: Mutex<HashMap<VehicleId, VehicleSnapshot>>,
}

impl InMemoryVehicleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: impl IntoIterator<Item = VehicleSnapshot>) -> Self {
        let directory = Self::new();
        for vehicle in vehicles {
            directory.register(vehicle);
        }
        directory
    }

    pub fn register(&self, vehicle: VehicleSnapshot) {
        let mut vehicles = self
            .vehicles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        vehicles.insert(vehicle.vehicle_id.clone(), vehicle);
    }
}

impl VehicleDirectory for InMemoryVehicleDirectory {
    fn vehicle(&self, id: &VehicleId) -> Result<Option<VehicleSnapshot>, DirectoryError> {
        let vehicles = self.vehicles.lock().map_err(|_| {
            DirectoryError::Unavailable("vehicle directory lock poisoned".to_string())
        })?;
        Ok(vehicles.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::schedule::DaySchedule;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
    }

    #[test]
    fn schedule_range_reads_stay_inside_one_workshop() {
        let repository = InMemoryScheduleRepository::new();
        let north = WorkshopId::new("north");
        let south = WorkshopId::new("south");
        for day in [12, 3, 30] {
            repository
                .insert(DaySchedule::unconfigured(north.clone(), date(day)))
                .expect("insert north");
        }
        repository
            .insert(DaySchedule::unconfigured(south.clone(), date(5)))
            .expect("insert south");

        let dates: Vec<NaiveDate> = repository
            .between(&north, date(1), date(30))
            .expect("range read")
            .into_iter()
            .map(|day| day.date)
            .collect();
        assert_eq!(dates, vec![date(3), date(12), date(30)]);
    }

    #[test]
    fn schedule_insert_conflicts_and_update_requires_existing() {
        let repository = InMemoryScheduleRepository::new();
        let workshop = WorkshopId::new("north");
        let day = DaySchedule::unconfigured(workshop.clone(), date(10));

        repository.insert(day.clone()).expect("first insert");
        assert!(matches!(
            repository.insert(day.clone()),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repository.update(DaySchedule::unconfigured(workshop.clone(), date(11))),
            Err(RepositoryError::NotFound)
        ));
        repository.remove(&workshop, date(10)).expect("remove");
        assert!(repository.fetch(&workshop, date(10)).expect("fetch").is_none());
    }

    #[test]
    fn directory_returns_registered_vehicles_only() {
        let directory = InMemoryVehicleDirectory::with_vehicles([VehicleSnapshot {
            vehicle_id: VehicleId::new("veh-1"),
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2019,
            plate: "ABC-123".to_string(),
            mileage: 48_200,
            color: Some("white".to_string()),
        }]);

        let found = directory
            .vehicle(&VehicleId::new("veh-1"))
            .expect("lookup")
            .expect("registered");
        assert_eq!(found.display_name(), "Toyota Corolla 2019 (ABC-123)");
        assert!(directory
            .vehicle(&VehicleId::new("veh-2"))
            .expect("lookup")
            .is_none());
    }
}
