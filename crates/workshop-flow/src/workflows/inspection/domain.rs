use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{PhotoHandle, TechnicianId};

/// Identifier wrapper for inspection evaluations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepairId(pub String);

impl fmt::Display for RepairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-step ordinal scale used for intake conditions and subsystem scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionRating {
    Excellent,
    Good,
    Regular,
    Bad,
}

impl ConditionRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Regular => "regular",
            Self::Bad => "bad",
        }
    }

    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::Regular | Self::Bad)
    }
}

/// Phase 1: vehicle condition at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryEvaluation {
    pub mileage_at_entry: u32,
    pub exterior_condition: ConditionRating,
    pub interior_condition: ConditionRating,
    #[serde(default)]
    pub notes: String,
    pub technician: TechnicianId,
    #[serde(default)]
    pub entry_photos: Vec<PhotoHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Engine,
    Brakes,
    Suspension,
    Steering,
    Lights,
    Tires,
    Electrical,
    Transmission,
    AirConditioning,
    Fluids,
}

impl Subsystem {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Engine,
            Self::Brakes,
            Self::Suspension,
            Self::Steering,
            Self::Lights,
            Self::Tires,
            Self::Electrical,
            Self::Transmission,
            Self::AirConditioning,
            Self::Fluids,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::Brakes => "Brakes",
            Self::Suspension => "Suspension",
            Self::Steering => "Steering",
            Self::Lights => "Lights",
            Self::Tires => "Tires",
            Self::Electrical => "Electrical system",
            Self::Transmission => "Transmission",
            Self::AirConditioning => "A/C",
            Self::Fluids => "Fluids",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemCheck {
    pub rating: ConditionRating,
    #[serde(default)]
    pub notes: String,
}

impl SubsystemCheck {
    pub fn rated(rating: ConditionRating) -> Self {
        Self {
            rating,
            notes: String::new(),
        }
    }
}

/// Phase 2: diagnostic scoring of the ten subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalTests {
    pub engine: SubsystemCheck,
    pub brakes: SubsystemCheck,
    pub suspension: SubsystemCheck,
    pub steering: SubsystemCheck,
    pub lights: SubsystemCheck,
    pub tires: SubsystemCheck,
    pub electrical: SubsystemCheck,
    pub transmission: SubsystemCheck,
    pub air_conditioning: SubsystemCheck,
    pub fluids: SubsystemCheck,
    #[serde(default)]
    pub technical_notes: String,
    #[serde(default)]
    pub photos: Vec<PhotoHandle>,
}

impl TechnicalTests {
    pub fn check(&self, subsystem: Subsystem) -> &SubsystemCheck {
        match subsystem {
            Subsystem::Engine => &self.engine,
            Subsystem::Brakes => &self.brakes,
            Subsystem::Suspension => &self.suspension,
            Subsystem::Steering => &self.steering,
            Subsystem::Lights => &self.lights,
            Subsystem::Tires => &self.tires,
            Subsystem::Electrical => &self.electrical,
            Subsystem::Transmission => &self.transmission,
            Subsystem::AirConditioning => &self.air_conditioning,
            Subsystem::Fluids => &self.fluids,
        }
    }

    pub fn checks(&self) -> impl Iterator<Item = (Subsystem, &SubsystemCheck)> {
        Subsystem::ordered()
            .into_iter()
            .map(move |subsystem| (subsystem, self.check(subsystem)))
    }

    /// Subsystems scored regular or bad.
    pub fn flagged(&self) -> Vec<Subsystem> {
        self.checks()
            .filter(|(_, check)| check.rating.needs_attention())
            .map(|(subsystem, _)| subsystem)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPriority {
    Critical,
    Important,
    Preventive,
}

impl RepairPriority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Preventive => "preventive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Declined,
}

impl RepairStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }

    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Declined],
            Self::Approved => &[Self::InProgress, Self::Declined],
            Self::InProgress => &[Self::Completed],
            Self::Completed | Self::Declined => &[],
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Still expected to be worked on.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Approved | Self::InProgress)
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Repair line item as submitted with the final evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: RepairPriority,
    pub category: String,
    pub estimated_cost: f64,
    pub estimated_hours: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedRepair {
    pub id: RepairId,
    pub name: String,
    pub description: String,
    pub priority: RepairPriority,
    pub category: String,
    pub estimated_cost: f64,
    pub estimated_hours: f32,
    pub status: RepairStatus,
}

/// Phase 3 payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluationSubmission {
    pub findings_summary: String,
    pub repair_priority: RepairPriority,
    pub estimated_repair_hours: f32,
    #[serde(default)]
    pub final_notes: String,
    pub evaluating_technician: TechnicianId,
    #[serde(default)]
    pub final_photos: Vec<PhotoHandle>,
    #[serde(default)]
    pub recommended_repairs: Vec<RepairDraft>,
}

/// Phase 3: summary and sign-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluation {
    pub findings_summary: String,
    pub repair_priority: RepairPriority,
    pub estimated_repair_hours: f32,
    pub final_notes: String,
    pub evaluating_technician: TechnicianId,
    pub final_photos: Vec<PhotoHandle>,
    pub evaluated_at: DateTime<Utc>,
}

/// Vehicle status as seen by the workshop floor. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStatus {
    InEvaluation,
    Evaluated,
    InRepair,
    Repaired,
}

impl WorkshopStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::InEvaluation,
            Self::Evaluated,
            Self::InRepair,
            Self::Repaired,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InEvaluation => "in_evaluation",
            Self::Evaluated => "evaluated",
            Self::InRepair => "in_repair",
            Self::Repaired => "repaired",
        }
    }
}

impl fmt::Display for WorkshopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Repair progress recorded after the final evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStage {
    #[default]
    NotStarted,
    InRepair,
    Repaired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionPhase {
    Entry,
    TechnicalTests,
    FinalEvaluation,
}

impl InspectionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry evaluation",
            Self::TechnicalTests => "technical tests",
            Self::FinalEvaluation => "final evaluation",
        }
    }

    /// Share of the completion percentage this phase contributes.
    pub const fn weight(self) -> u8 {
        match self {
            Self::Entry | Self::TechnicalTests => 33,
            Self::FinalEvaluation => 34,
        }
    }
}

impl fmt::Display for InspectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived position in the phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStage {
    NoEntry,
    EntryDone,
    TestsDone,
    FinalDone,
}
