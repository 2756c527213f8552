use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    EntryEvaluation, EvaluationId, FinalEvaluation, FinalEvaluationSubmission, InspectionPhase,
    InspectionStage, RecommendedRepair, RepairId, RepairStage, RepairStatus, TechnicalTests,
    WorkshopStatus,
};
use crate::workflows::appointments::AppointmentId;
use crate::workflows::domain::{VehicleId, VehicleSnapshot, WorkshopId};
use crate::workflows::rejection::ErrorKind;

/// Rule violations raised by the inspection state machine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InspectionError {
    #[error("cannot submit {phase} before the {missing} is recorded")]
    PhaseOutOfOrder {
        phase: InspectionPhase,
        missing: InspectionPhase,
    },
    #[error("{phase} was already submitted and can no longer be changed")]
    AlreadyCompleted { phase: InspectionPhase },
    #[error("cannot move vehicle status from {from} to {to}; only evaluated -> in_repair -> repaired is allowed")]
    InvalidTransition {
        from: WorkshopStatus,
        to: WorkshopStatus,
    },
    #[error("cannot move repair {repair_id} from {from} to {to}")]
    InvalidRepairTransition {
        repair_id: RepairId,
        from: RepairStatus,
        to: RepairStatus,
    },
    #[error("repair {0} is not part of this evaluation")]
    RepairNotFound(RepairId),
    #[error("{field} {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl InspectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InspectionError::PhaseOutOfOrder { .. } => ErrorKind::PhaseOutOfOrder,
            InspectionError::AlreadyCompleted { .. } => ErrorKind::AlreadyCompleted,
            InspectionError::InvalidTransition { .. }
            | InspectionError::InvalidRepairTransition { .. } => ErrorKind::InvalidTransition,
            InspectionError::RepairNotFound(_) => ErrorKind::NotFound,
            InspectionError::InvalidField { .. } => ErrorKind::InvalidRequest,
        }
    }
}

/// One vehicle's three-phase inspection record.
///
/// Phase completion is carried by which records are present; `workshop_status` is derived from
/// those records plus the repair stage, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionEvaluation {
    pub id: EvaluationId,
    pub vehicle_id: VehicleId,
    pub workshop_id: WorkshopId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entry_evaluation: Option<EntryEvaluation>,
    pub technical_tests: Option<TechnicalTests>,
    pub final_evaluation: Option<FinalEvaluation>,
    #[serde(default)]
    pub recommended_repairs: Vec<RecommendedRepair>,
    #[serde(default)]
    pub repair_stage: RepairStage,
}

impl InspectionEvaluation {
    /// Open a record from its entry evaluation.
    pub fn open(
        id: EvaluationId,
        workshop_id: WorkshopId,
        vehicle_id: VehicleId,
        entry: EntryEvaluation,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            vehicle_id,
            workshop_id,
            vehicle: None,
            appointment_id: None,
            created_at: at,
            updated_at: at,
            entry_evaluation: Some(entry),
            technical_tests: None,
            final_evaluation: None,
            recommended_repairs: Vec::new(),
            repair_stage: RepairStage::NotStarted,
        }
    }

    pub fn stage(&self) -> InspectionStage {
        match (
            &self.entry_evaluation,
            &self.technical_tests,
            &self.final_evaluation,
        ) {
            (_, _, Some(_)) => InspectionStage::FinalDone,
            (_, Some(_), None) => InspectionStage::TestsDone,
            (Some(_), None, None) => InspectionStage::EntryDone,
            (None, None, None) => InspectionStage::NoEntry,
        }
    }

    pub fn workshop_status(&self) -> WorkshopStatus {
        match self.repair_stage {
            RepairStage::Repaired => WorkshopStatus::Repaired,
            RepairStage::InRepair => WorkshopStatus::InRepair,
            RepairStage::NotStarted if self.final_evaluation.is_some() => WorkshopStatus::Evaluated,
            RepairStage::NotStarted => WorkshopStatus::InEvaluation,
        }
    }

    /// 33 per completed phase, 34 for the final one: 0, 33, 66 or 100.
    pub fn completion_percentage(&self) -> u8 {
        let phases = [
            (InspectionPhase::Entry, self.entry_evaluation.is_some()),
            (InspectionPhase::TechnicalTests, self.technical_tests.is_some()),
            (InspectionPhase::FinalEvaluation, self.final_evaluation.is_some()),
        ];
        phases
            .iter()
            .filter(|(_, done)| *done)
            .map(|(phase, _)| phase.weight())
            .sum()
    }

    /// The cycle stays open until the vehicle is repaired.
    pub fn is_open(&self) -> bool {
        self.workshop_status() != WorkshopStatus::Repaired
    }

    /// Gate for submitting `phase` next; `can_advance_to` and the `record_*` calls share it.
    pub fn check_phase(&self, phase: InspectionPhase) -> Result<(), InspectionError> {
        let (already_done, prerequisite) = match phase {
            InspectionPhase::Entry => (self.entry_evaluation.is_some(), None),
            InspectionPhase::TechnicalTests => (
                self.technical_tests.is_some(),
                Some((InspectionPhase::Entry, self.entry_evaluation.is_some())),
            ),
            InspectionPhase::FinalEvaluation => (
                self.final_evaluation.is_some(),
                Some((
                    InspectionPhase::TechnicalTests,
                    self.technical_tests.is_some(),
                )),
            ),
        };

        if let Some((missing, false)) = prerequisite {
            return Err(InspectionError::PhaseOutOfOrder { phase, missing });
        }
        if already_done {
            return Err(InspectionError::AlreadyCompleted { phase });
        }
        Ok(())
    }

    pub fn can_advance_to(&self, phase: InspectionPhase) -> bool {
        self.check_phase(phase).is_ok()
    }

    pub fn record_technical_tests(
        &mut self,
        tests: TechnicalTests,
        at: DateTime<Utc>,
    ) -> Result<(), InspectionError> {
        self.check_phase(InspectionPhase::TechnicalTests)?;
        self.technical_tests = Some(tests);
        self.updated_at = at;
        Ok(())
    }

    /// Record phase 3 and freeze the recommended repairs as submitted.
    pub fn record_final_evaluation(
        &mut self,
        submission: FinalEvaluationSubmission,
        at: DateTime<Utc>,
    ) -> Result<(), InspectionError> {
        self.check_phase(InspectionPhase::FinalEvaluation)?;
        validate_final(&submission)?;

        let FinalEvaluationSubmission {
            findings_summary,
            repair_priority,
            estimated_repair_hours,
            final_notes,
            evaluating_technician,
            final_photos,
            recommended_repairs,
        } = submission;

        self.recommended_repairs = recommended_repairs
            .into_iter()
            .enumerate()
            .map(|(index, draft)| RecommendedRepair {
                id: RepairId(format!("{}-r{}", self.id.0, index + 1)),
                name: draft.name,
                description: draft.description,
                priority: draft.priority,
                category: draft.category,
                estimated_cost: draft.estimated_cost,
                estimated_hours: draft.estimated_hours,
                status: RepairStatus::Pending,
            })
            .collect();
        self.final_evaluation = Some(FinalEvaluation {
            findings_summary,
            repair_priority,
            estimated_repair_hours,
            final_notes,
            evaluating_technician,
            final_photos,
            evaluated_at: at,
        });
        self.updated_at = at;
        Ok(())
    }

    /// Move the vehicle forward: evaluated -> in_repair -> repaired.
    pub fn advance_repair_status(
        &mut self,
        target: WorkshopStatus,
        at: DateTime<Utc>,
    ) -> Result<(), InspectionError> {
        let from = self.workshop_status();
        let stage = match (from, target) {
            (WorkshopStatus::Evaluated, WorkshopStatus::InRepair) => RepairStage::InRepair,
            (WorkshopStatus::InRepair, WorkshopStatus::Repaired) => RepairStage::Repaired,
            _ => return Err(InspectionError::InvalidTransition { from, to: target }),
        };
        self.repair_stage = stage;
        self.updated_at = at;
        Ok(())
    }

    pub fn update_repair_status(
        &mut self,
        repair_id: &RepairId,
        target: RepairStatus,
        at: DateTime<Utc>,
    ) -> Result<&RecommendedRepair, InspectionError> {
        let repair = self
            .recommended_repairs
            .iter_mut()
            .find(|repair| &repair.id == repair_id)
            .ok_or_else(|| InspectionError::RepairNotFound(repair_id.clone()))?;

        if !repair.status.can_transition_to(target) {
            return Err(InspectionError::InvalidRepairTransition {
                repair_id: repair_id.clone(),
                from: repair.status,
                to: target,
            });
        }
        repair.status = target;
        self.updated_at = at;
        Ok(repair)
    }

    pub fn open_repairs(&self) -> impl Iterator<Item = &RecommendedRepair> {
        self.recommended_repairs
            .iter()
            .filter(|repair| repair.status.is_open())
    }
}

fn validate_final(submission: &FinalEvaluationSubmission) -> Result<(), InspectionError> {
    if submission.findings_summary.trim().is_empty() {
        return Err(InspectionError::InvalidField {
            field: "findings_summary",
            reason: "must not be empty".to_string(),
        });
    }
    if !submission.estimated_repair_hours.is_finite() || submission.estimated_repair_hours < 0.0 {
        return Err(InspectionError::InvalidField {
            field: "estimated_repair_hours",
            reason: format!(
                "must be a non-negative number (got {})",
                submission.estimated_repair_hours
            ),
        });
    }
    for draft in &submission.recommended_repairs {
        if draft.name.trim().is_empty() {
            return Err(InspectionError::InvalidField {
                field: "recommended_repairs.name",
                reason: "must not be empty".to_string(),
            });
        }
        if !draft.estimated_cost.is_finite() || draft.estimated_cost < 0.0 {
            return Err(InspectionError::InvalidField {
                field: "recommended_repairs.estimated_cost",
                reason: format!("must be non-negative for '{}'", draft.name),
            });
        }
        if !draft.estimated_hours.is_finite() || draft.estimated_hours < 0.0 {
            return Err(InspectionError::InvalidField {
                field: "recommended_repairs.estimated_hours",
                reason: format!("must be non-negative for '{}'", draft.name),
            });
        }
    }
    Ok(())
}

/// Evaluation as exposed to callers, with the derived fields spelled out.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    #[serde(flatten)]
    pub evaluation: InspectionEvaluation,
    pub workshop_status: WorkshopStatus,
    pub stage: InspectionStage,
    pub completion_percentage: u8,
    pub next_phase: Option<InspectionPhase>,
}

impl From<InspectionEvaluation> for EvaluationView {
    fn from(evaluation: InspectionEvaluation) -> Self {
        let next_phase = [
            InspectionPhase::Entry,
            InspectionPhase::TechnicalTests,
            InspectionPhase::FinalEvaluation,
        ]
        .into_iter()
        .find(|phase| evaluation.can_advance_to(*phase));

        Self {
            workshop_status: evaluation.workshop_status(),
            stage: evaluation.stage(),
            completion_percentage: evaluation.completion_percentage(),
            next_phase,
            evaluation,
        }
    }
}
