use chrono::{DateTime, TimeZone, Utc};

use crate::workflows::domain::{PhotoHandle, TechnicianId, VehicleId, WorkshopId};
use crate::workflows::inspection::{
    ConditionRating, EntryEvaluation, EvaluationId, FinalEvaluationSubmission,
    InspectionEvaluation, RepairDraft, RepairPriority, SubsystemCheck, TechnicalTests,
};

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn entry() -> EntryEvaluation {
    EntryEvaluation {
        mileage_at_entry: 48_200,
        exterior_condition: ConditionRating::Good,
        interior_condition: ConditionRating::Regular,
        notes: "Scratch on rear bumper".to_string(),
        technician: TechnicianId::new("tec-1"),
        entry_photos: vec![PhotoHandle::new("media://entry/front.jpg")],
    }
}

pub(super) fn technical_tests() -> TechnicalTests {
    let good = || SubsystemCheck::rated(ConditionRating::Good);
    TechnicalTests {
        engine: good(),
        brakes: SubsystemCheck {
            rating: ConditionRating::Bad,
            notes: "Front pads below 2mm".to_string(),
        },
        suspension: good(),
        steering: good(),
        lights: SubsystemCheck::rated(ConditionRating::Excellent),
        tires: SubsystemCheck {
            rating: ConditionRating::Regular,
            notes: "Uneven wear".to_string(),
        },
        electrical: good(),
        transmission: good(),
        air_conditioning: good(),
        fluids: good(),
        technical_notes: "Road test completed".to_string(),
        photos: Vec::new(),
    }
}

pub(super) fn repair(name: &str, priority: RepairPriority, cost: f64) -> RepairDraft {
    RepairDraft {
        name: name.to_string(),
        description: format!("{name} as found during the road test"),
        priority,
        category: "safety".to_string(),
        estimated_cost: cost,
        estimated_hours: 1.5,
    }
}

pub(super) fn final_submission(repairs: Vec<RepairDraft>) -> FinalEvaluationSubmission {
    FinalEvaluationSubmission {
        findings_summary: "Brakes need immediate attention".to_string(),
        repair_priority: RepairPriority::Critical,
        estimated_repair_hours: 3.0,
        final_notes: String::new(),
        evaluating_technician: TechnicianId::new("tec-2"),
        final_photos: Vec::new(),
        recommended_repairs: repairs,
    }
}

pub(super) fn opened() -> InspectionEvaluation {
    InspectionEvaluation::open(
        EvaluationId("eval-000900".to_string()),
        WorkshopId::new("taller-centro"),
        VehicleId::new("veh-1"),
        entry(),
        at(8),
    )
}

/// An evaluation with all three phases and two pending repairs.
pub(super) fn evaluated() -> InspectionEvaluation {
    let mut evaluation = opened();
    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");
    evaluation
        .record_final_evaluation(
            final_submission(vec![
                repair("Replace front pads", RepairPriority::Critical, 180.0),
                repair("Rotate tires", RepairPriority::Preventive, 40.0),
            ]),
            at(10),
        )
        .expect("final");
    evaluation
}
