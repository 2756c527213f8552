use super::domain::EvaluationId;
use super::evaluation::InspectionEvaluation;
use crate::workflows::domain::{VehicleId, WorkshopId};
use crate::workflows::repository::RepositoryError;

/// Storage abstraction for inspection evaluations.
pub trait EvaluationRepository: Send + Sync {
    fn insert(
        &self,
        evaluation: InspectionEvaluation,
    ) -> Result<InspectionEvaluation, RepositoryError>;
    fn update(&self, evaluation: InspectionEvaluation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<InspectionEvaluation>, RepositoryError>;
    fn for_workshop(
        &self,
        workshop_id: &WorkshopId,
    ) -> Result<Vec<InspectionEvaluation>, RepositoryError>;
    /// The vehicle's evaluation that has not reached `repaired`, if any.
    fn open_for_vehicle(
        &self,
        workshop_id: &WorkshopId,
        vehicle_id: &VehicleId,
    ) -> Result<Option<InspectionEvaluation>, RepositoryError>;
}
