//! Three-phase vehicle inspection: entry evaluation, technical tests, final evaluation.
//!
//! Phases are strictly ordered and write-once. After the final evaluation the vehicle moves
//! through the repair stages and each recommended repair carries its own status.

pub mod domain;
pub mod evaluation;
pub mod repository;

#[cfg(test)]
mod tests;

pub use domain::{
    ConditionRating, EntryEvaluation, EvaluationId, FinalEvaluation, FinalEvaluationSubmission,
    InspectionPhase, InspectionStage, RecommendedRepair, RepairDraft, RepairId, RepairPriority,
    RepairStage, RepairStatus, Subsystem, SubsystemCheck, TechnicalTests, WorkshopStatus,
};
pub use evaluation::{EvaluationView, InspectionError, InspectionEvaluation};
pub use repository::EvaluationRepository;
