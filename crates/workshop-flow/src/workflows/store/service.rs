use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::statistics::WorkshopStatistics;
use crate::workflows::appointments::{
    Appointment, AppointmentId, AppointmentRepository, AppointmentStatus,
    AppointmentTransitionError, NewAppointment, SlotEffect,
};
use crate::workflows::clock::Clock;
use crate::workflows::domain::{VehicleId, VehicleSnapshot, WorkshopId};
use crate::workflows::inspection::{
    EntryEvaluation, EvaluationId, EvaluationRepository, FinalEvaluationSubmission,
    InspectionError, InspectionEvaluation, InspectionPhase, RecommendedRepair, RepairId,
    RepairStatus, TechnicalTests, WorkshopStatus,
};
use crate::workflows::locks::WorkshopLocks;
use crate::workflows::rejection::ErrorKind;
use crate::workflows::repository::{DirectoryError, RepositoryError, VehicleDirectory};
use crate::workflows::schedule::{
    ScheduleRepository, ScheduleStore, ScheduleStoreError, SlotHour,
};

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPOINTMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

fn next_appointment_id() -> AppointmentId {
    let id = APPOINTMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AppointmentId(format!("cita-{id:06}"))
}

/// Phase 1 request: which vehicle enters the workshop and in what condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySubmission {
    pub vehicle_id: VehicleId,
    #[serde(default)]
    pub appointment_id: Option<AppointmentId>,
    #[serde(flatten)]
    pub entry: EntryEvaluation,
}

/// Orchestrates inspections and appointments for each workshop.
pub struct WorkflowStore<E, A, S> {
    evaluations: Arc<E>,
    appointments: Arc<A>,
    schedule: Arc<ScheduleStore<S>>,
    vehicles: Arc<dyn VehicleDirectory>,
    locks: Arc<WorkshopLocks>,
    clock: Arc<dyn Clock>,
}

impl<E, A, S> WorkflowStore<E, A, S>
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    /// Shares the schedule store's locks and clock so seat changes and appointment writes
    /// serialize on the same guard.
    pub fn new(
        evaluations: Arc<E>,
        appointments: Arc<A>,
        schedule: Arc<ScheduleStore<S>>,
        vehicles: Arc<dyn VehicleDirectory>,
    ) -> Self {
        let locks = schedule.locks();
        let clock = schedule.clock();
        Self {
            evaluations,
            appointments,
            schedule,
            vehicles,
            locks,
            clock,
        }
    }

    pub fn schedule(&self) -> Arc<ScheduleStore<S>> {
        self.schedule.clone()
    }

    /// Open a new inspection cycle for a vehicle.
    pub fn submit_entry_evaluation(
        &self,
        workshop_id: &WorkshopId,
        submission: EntrySubmission,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        let vehicle = self.lookup_vehicle(&submission.vehicle_id)?;

        self.locks.with_workshop(workshop_id, || {
            if let Some(open) = self
                .evaluations
                .open_for_vehicle(workshop_id, &submission.vehicle_id)?
            {
                debug!(
                    workshop = %workshop_id,
                    vehicle = %submission.vehicle_id,
                    evaluation = %open.id,
                    "entry rejected; vehicle already has an open evaluation"
                );
                return Err(WorkflowStoreError::OpenEvaluationExists {
                    vehicle_id: submission.vehicle_id.clone(),
                    evaluation_id: open.id,
                });
            }
            if let Some(appointment_id) = &submission.appointment_id {
                self.appointment_in(workshop_id, appointment_id)?;
            }

            let mut evaluation = InspectionEvaluation::open(
                next_evaluation_id(),
                workshop_id.clone(),
                submission.vehicle_id,
                submission.entry,
                self.clock.now(),
            );
            evaluation.vehicle = Some(vehicle);
            evaluation.appointment_id = submission.appointment_id;

            let stored = self.evaluations.insert(evaluation)?;
            info!(
                workshop = %workshop_id,
                evaluation = %stored.id,
                vehicle = %stored.vehicle_id,
                "entry evaluation recorded"
            );
            Ok(stored)
        })
    }

    pub fn submit_technical_tests(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        tests: TechnicalTests,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        self.mutate_evaluation(workshop_id, evaluation_id, |evaluation, at| {
            let flagged = tests.flagged().len();
            evaluation.record_technical_tests(tests, at)?;
            info!(
                workshop = %workshop_id,
                evaluation = %evaluation_id,
                flagged,
                "technical tests recorded"
            );
            Ok(())
        })
    }

    pub fn submit_final_evaluation(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        submission: FinalEvaluationSubmission,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        self.mutate_evaluation(workshop_id, evaluation_id, |evaluation, at| {
            evaluation.record_final_evaluation(submission, at)?;
            info!(
                workshop = %workshop_id,
                evaluation = %evaluation_id,
                repairs = evaluation.recommended_repairs.len(),
                "final evaluation recorded"
            );
            Ok(())
        })
    }

    pub fn advance_repair_status(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        target: WorkshopStatus,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        self.mutate_evaluation(workshop_id, evaluation_id, |evaluation, at| {
            let from = evaluation.workshop_status();
            evaluation.advance_repair_status(target, at)?;
            info!(
                workshop = %workshop_id,
                evaluation = %evaluation_id,
                %from,
                to = %target,
                "vehicle status advanced"
            );
            Ok(())
        })
    }

    pub fn update_repair_status(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        repair_id: &RepairId,
        target: RepairStatus,
    ) -> Result<RecommendedRepair, WorkflowStoreError> {
        let evaluation = self.mutate_evaluation(workshop_id, evaluation_id, |evaluation, at| {
            evaluation.update_repair_status(repair_id, target, at)?;
            info!(
                workshop = %workshop_id,
                evaluation = %evaluation_id,
                repair = %repair_id,
                status = %target,
                "repair status updated"
            );
            Ok(())
        })?;
        evaluation
            .recommended_repairs
            .into_iter()
            .find(|repair| &repair.id == repair_id)
            .ok_or_else(|| InspectionError::RepairNotFound(repair_id.clone()).into())
    }

    pub fn get_evaluation(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        self.evaluation_in(workshop_id, evaluation_id)
    }

    /// All evaluations of a workshop, oldest first.
    pub fn list_evaluations(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<Vec<InspectionEvaluation>, WorkflowStoreError> {
        let mut evaluations = self.evaluations.for_workshop(workshop_id)?;
        evaluations.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(evaluations)
    }

    pub fn evaluations_by_status(
        &self,
        workshop_id: &WorkshopId,
        status: WorkshopStatus,
    ) -> Result<Vec<InspectionEvaluation>, WorkflowStoreError> {
        Ok(self
            .list_evaluations(workshop_id)?
            .into_iter()
            .filter(|evaluation| evaluation.workshop_status() == status)
            .collect())
    }

    pub fn completion_percentage(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
    ) -> Result<u8, WorkflowStoreError> {
        Ok(self
            .evaluation_in(workshop_id, evaluation_id)?
            .completion_percentage())
    }

    pub fn can_advance_to(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        phase: InspectionPhase,
    ) -> Result<bool, WorkflowStoreError> {
        Ok(self
            .evaluation_in(workshop_id, evaluation_id)?
            .can_advance_to(phase))
    }

    /// Book a seat and record the appointment as one step.
    ///
    /// The seat is taken first; if the appointment write then fails the seat is handed back
    /// before the lock is released.
    pub fn book_appointment(
        &self,
        workshop_id: &WorkshopId,
        request: NewAppointment,
    ) -> Result<Appointment, WorkflowStoreError> {
        self.ensure_not_past(request.date)?;
        let vehicle = self.lookup_vehicle(&request.vehicle_id)?;

        self.locks.with_workshop(workshop_id, || {
            self.schedule
                .reserve_locked(workshop_id, request.date, request.time_slot)?;

            let now = self.clock.now();
            let appointment = Appointment {
                id: next_appointment_id(),
                workshop_id: workshop_id.clone(),
                vehicle_id: request.vehicle_id,
                client_id: request.client_id,
                vehicle: Some(vehicle),
                date: request.date,
                time_slot: request.time_slot,
                description: request.description,
                notes: request.notes,
                status: AppointmentStatus::Pending,
                created_at: now,
                updated_at: now,
            };

            match self.appointments.insert(appointment) {
                Ok(stored) => {
                    info!(
                        workshop = %workshop_id,
                        appointment = %stored.id,
                        date = %stored.date,
                        hour = %stored.time_slot,
                        "appointment booked"
                    );
                    Ok(stored)
                }
                Err(err) => {
                    self.undo_seat_change(
                        workshop_id,
                        request.date,
                        request.time_slot,
                        SlotEffect::Reserve,
                    );
                    Err(err.into())
                }
            }
        })
    }

    /// Move an appointment through its lifecycle, taking or returning its seat as required.
    pub fn transition_appointment(
        &self,
        workshop_id: &WorkshopId,
        appointment_id: &AppointmentId,
        target: AppointmentStatus,
    ) -> Result<Appointment, WorkflowStoreError> {
        self.locks.with_workshop(workshop_id, || {
            let mut appointment = self.appointment_in(workshop_id, appointment_id)?;
            let from = appointment.status;
            let effect = match appointment.transition(target, self.clock.now()) {
                Ok(effect) => effect,
                Err(err) => {
                    debug!(appointment = %appointment_id, error = %err, "transition rejected");
                    return Err(err.into());
                }
            };

            match effect {
                SlotEffect::Keep => {}
                SlotEffect::Reserve => {
                    self.ensure_not_past(appointment.date)?;
                    self.schedule.reserve_locked(
                        workshop_id,
                        appointment.date,
                        appointment.time_slot,
                    )?;
                }
                SlotEffect::Release => {
                    self.schedule.release_locked(
                        workshop_id,
                        appointment.date,
                        appointment.time_slot,
                    )?;
                }
            }

            if let Err(err) = self.appointments.update(appointment.clone()) {
                self.undo_seat_change(
                    workshop_id,
                    appointment.date,
                    appointment.time_slot,
                    effect,
                );
                return Err(err.into());
            }
            info!(
                workshop = %workshop_id,
                appointment = %appointment_id,
                %from,
                to = %target,
                "appointment transitioned"
            );
            Ok(appointment)
        })
    }

    pub fn get_appointment(
        &self,
        workshop_id: &WorkshopId,
        appointment_id: &AppointmentId,
    ) -> Result<Appointment, WorkflowStoreError> {
        self.appointment_in(workshop_id, appointment_id)
    }

    /// All appointments of a workshop ordered by date, hour and id.
    pub fn list_appointments(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<Vec<Appointment>, WorkflowStoreError> {
        let mut appointments = self.appointments.for_workshop(workshop_id)?;
        sort_appointments(&mut appointments);
        Ok(appointments)
    }

    pub fn appointments_by_status(
        &self,
        workshop_id: &WorkshopId,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, WorkflowStoreError> {
        Ok(self
            .list_appointments(workshop_id)?
            .into_iter()
            .filter(|appointment| appointment.status == status)
            .collect())
    }

    pub fn list_appointments_on(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, WorkflowStoreError> {
        let mut appointments = self.appointments.on_date(workshop_id, date)?;
        sort_appointments(&mut appointments);
        Ok(appointments)
    }

    pub fn list_appointments_today(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<Vec<Appointment>, WorkflowStoreError> {
        self.list_appointments_on(workshop_id, self.clock.today())
    }

    pub fn statistics(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<WorkshopStatistics, WorkflowStoreError> {
        let evaluations = self.evaluations.for_workshop(workshop_id)?;
        let appointments = self.appointments.for_workshop(workshop_id)?;
        Ok(WorkshopStatistics::fold(
            workshop_id.clone(),
            self.clock.today(),
            &evaluations,
            &appointments,
        ))
    }

    fn mutate_evaluation<F>(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
        change: F,
    ) -> Result<InspectionEvaluation, WorkflowStoreError>
    where
        F: FnOnce(&mut InspectionEvaluation, DateTime<Utc>) -> Result<(), InspectionError>,
    {
        self.locks.with_workshop(workshop_id, || {
            let mut evaluation = self.evaluation_in(workshop_id, evaluation_id)?;
            if let Err(err) = change(&mut evaluation, self.clock.now()) {
                debug!(evaluation = %evaluation_id, error = %err, "inspection change rejected");
                return Err(err.into());
            }
            self.evaluations.update(evaluation.clone())?;
            Ok(evaluation)
        })
    }

    fn evaluation_in(
        &self,
        workshop_id: &WorkshopId,
        evaluation_id: &EvaluationId,
    ) -> Result<InspectionEvaluation, WorkflowStoreError> {
        self.evaluations
            .fetch(evaluation_id)?
            .filter(|evaluation| &evaluation.workshop_id == workshop_id)
            .ok_or_else(|| WorkflowStoreError::EvaluationNotFound(evaluation_id.clone()))
    }

    fn appointment_in(
        &self,
        workshop_id: &WorkshopId,
        appointment_id: &AppointmentId,
    ) -> Result<Appointment, WorkflowStoreError> {
        self.appointments
            .fetch(appointment_id)?
            .filter(|appointment| &appointment.workshop_id == workshop_id)
            .ok_or_else(|| WorkflowStoreError::AppointmentNotFound(appointment_id.clone()))
    }

    fn lookup_vehicle(
        &self,
        vehicle_id: &VehicleId,
    ) -> Result<VehicleSnapshot, WorkflowStoreError> {
        self.vehicles
            .vehicle(vehicle_id)?
            .ok_or_else(|| WorkflowStoreError::VehicleNotFound(vehicle_id.clone()))
    }

    fn ensure_not_past(&self, date: NaiveDate) -> Result<(), WorkflowStoreError> {
        let today = self.clock.today();
        if date < today {
            return Err(WorkflowStoreError::PastDate { date, today });
        }
        Ok(())
    }

    /// Reverse a seat change after the appointment write failed. Caller holds the lock.
    fn undo_seat_change(
        &self,
        workshop_id: &WorkshopId,
        date: NaiveDate,
        hour: SlotHour,
        applied: SlotEffect,
    ) {
        let undone = match applied {
            SlotEffect::Keep => return,
            SlotEffect::Reserve => self.schedule.release_locked(workshop_id, date, hour),
            SlotEffect::Release => self.schedule.reserve_locked(workshop_id, date, hour),
        };
        if let Err(err) = undone {
            error!(
                workshop = %workshop_id,
                %date,
                %hour,
                error = %err,
                "failed to roll back seat change; booked count may be off by one"
            );
        }
    }
}

fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| {
        (a.date, a.time_slot, &a.id).cmp(&(b.date, b.time_slot, &b.id))
    });
}

/// Error raised by the workflow store.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowStoreError {
    #[error("evaluation {0} not found")]
    EvaluationNotFound(EvaluationId),
    #[error("appointment {0} not found")]
    AppointmentNotFound(AppointmentId),
    #[error("vehicle {0} not found in the vehicle directory")]
    VehicleNotFound(VehicleId),
    #[error("vehicle {vehicle_id} already has open evaluation {evaluation_id}; finish it before starting another")]
    OpenEvaluationExists {
        vehicle_id: VehicleId,
        evaluation_id: EvaluationId,
    },
    #[error("{date} is before today ({today}); appointments cannot be booked in the past")]
    PastDate { date: NaiveDate, today: NaiveDate },
    #[error(transparent)]
    Inspection(#[from] InspectionError),
    #[error(transparent)]
    Transition(#[from] AppointmentTransitionError),
    #[error(transparent)]
    Schedule(#[from] ScheduleStoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl WorkflowStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowStoreError::EvaluationNotFound(_)
            | WorkflowStoreError::AppointmentNotFound(_)
            | WorkflowStoreError::VehicleNotFound(_) => ErrorKind::NotFound,
            WorkflowStoreError::OpenEvaluationExists { .. } => ErrorKind::InvalidState,
            WorkflowStoreError::PastDate { .. } => ErrorKind::PastDate,
            WorkflowStoreError::Inspection(err) => err.kind(),
            WorkflowStoreError::Transition(err) => err.kind(),
            WorkflowStoreError::Schedule(err) => err.kind(),
            WorkflowStoreError::Repository(err) => err.kind(),
            WorkflowStoreError::Directory(_) => ErrorKind::Storage,
        }
    }
}
