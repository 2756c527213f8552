use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::appointments::{Appointment, AppointmentStatus};
use crate::workflows::domain::WorkshopId;
use crate::workflows::inspection::{InspectionEvaluation, WorkshopStatus};

/// Dashboard counters for one workshop, folded from its evaluations and appointments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopStatistics {
    pub workshop_id: WorkshopId,
    pub evaluations_total: usize,
    pub evaluations_by_status: BTreeMap<&'static str, usize>,
    pub average_completion: f64,
    pub open_repairs: usize,
    pub open_repairs_estimated_cost: f64,
    pub appointments_total: usize,
    pub appointments_by_status: BTreeMap<&'static str, usize>,
    pub appointments_today: usize,
}

impl WorkshopStatistics {
    pub fn fold(
        workshop_id: WorkshopId,
        today: NaiveDate,
        evaluations: &[InspectionEvaluation],
        appointments: &[Appointment],
    ) -> Self {
        let mut evaluations_by_status: BTreeMap<&'static str, usize> = WorkshopStatus::ordered()
            .into_iter()
            .map(|status| (status.label(), 0))
            .collect();
        let mut completion_sum = 0u32;
        let mut open_repairs = 0;
        let mut open_repairs_estimated_cost = 0.0;

        for evaluation in evaluations {
            *evaluations_by_status
                .entry(evaluation.workshop_status().label())
                .or_default() += 1;
            completion_sum += u32::from(evaluation.completion_percentage());
            for repair in evaluation.open_repairs() {
                open_repairs += 1;
                open_repairs_estimated_cost += repair.estimated_cost;
            }
        }

        let average_completion = if evaluations.is_empty() {
            0.0
        } else {
            f64::from(completion_sum) / evaluations.len() as f64
        };

        let mut appointments_by_status: BTreeMap<&'static str, usize> =
            AppointmentStatus::ordered()
                .into_iter()
                .map(|status| (status.label(), 0))
                .collect();
        for appointment in appointments {
            *appointments_by_status
                .entry(appointment.status.label())
                .or_default() += 1;
        }

        Self {
            workshop_id,
            evaluations_total: evaluations.len(),
            evaluations_by_status,
            average_completion,
            open_repairs,
            open_repairs_estimated_cost,
            appointments_total: appointments.len(),
            appointments_by_status,
            appointments_today: appointments
                .iter()
                .filter(|appointment| appointment.date == today)
                .count(),
        }
    }
}
