use super::common::*;
use crate::workflows::inspection::{
    EvaluationView, InspectionError, InspectionEvaluation, InspectionPhase, InspectionStage,
    RepairPriority, Subsystem, WorkshopStatus,
};
use crate::workflows::rejection::ErrorKind;

#[test]
fn phases_advance_in_order() {
    let mut evaluation = opened();
    assert_eq!(evaluation.workshop_status(), WorkshopStatus::InEvaluation);
    assert_eq!(evaluation.completion_percentage(), 33);

    let skipped = evaluation
        .record_final_evaluation(final_submission(Vec::new()), at(9))
        .expect_err("tests missing");
    assert_eq!(
        skipped,
        InspectionError::PhaseOutOfOrder {
            phase: InspectionPhase::FinalEvaluation,
            missing: InspectionPhase::TechnicalTests,
        }
    );
    assert_eq!(skipped.kind(), ErrorKind::PhaseOutOfOrder);

    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");
    assert_eq!(evaluation.completion_percentage(), 66);
    assert_eq!(evaluation.workshop_status(), WorkshopStatus::InEvaluation);

    evaluation
        .record_final_evaluation(
            final_submission(vec![
                repair("Replace front pads", RepairPriority::Critical, 180.0),
                repair("Align wheels", RepairPriority::Important, 60.0),
            ]),
            at(10),
        )
        .expect("final");
    assert_eq!(evaluation.workshop_status(), WorkshopStatus::Evaluated);
    assert_eq!(evaluation.completion_percentage(), 100);
    assert_eq!(evaluation.recommended_repairs.len(), 2);
    assert_eq!(
        evaluation
            .final_evaluation
            .as_ref()
            .map(|final_evaluation| final_evaluation.evaluated_at),
        Some(at(10))
    );
}

#[test]
fn completion_never_decreases_as_phases_land() {
    let mut evaluation = opened();
    let mut seen = vec![evaluation.completion_percentage()];
    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");
    seen.push(evaluation.completion_percentage());
    evaluation
        .record_final_evaluation(final_submission(Vec::new()), at(10))
        .expect("final");
    seen.push(evaluation.completion_percentage());
    evaluation
        .advance_repair_status(WorkshopStatus::InRepair, at(11))
        .expect("repair");
    seen.push(evaluation.completion_percentage());

    assert_eq!(seen, vec![33, 66, 100, 100]);
}

#[test]
fn submitted_phases_are_frozen() {
    let mut evaluation = opened();
    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");

    let again = evaluation
        .record_technical_tests(technical_tests(), at(10))
        .expect_err("already submitted");
    assert_eq!(
        again,
        InspectionError::AlreadyCompleted {
            phase: InspectionPhase::TechnicalTests,
        }
    );
    assert_eq!(again.kind(), ErrorKind::AlreadyCompleted);

    let done = evaluated();
    assert!(matches!(
        done.check_phase(InspectionPhase::TechnicalTests),
        Err(InspectionError::AlreadyCompleted { .. })
    ));
    assert!(matches!(
        done.check_phase(InspectionPhase::Entry),
        Err(InspectionError::AlreadyCompleted { .. })
    ));
}

#[test]
fn can_advance_to_agrees_with_the_gate() {
    let mut evaluation = opened();
    let phases = [
        InspectionPhase::Entry,
        InspectionPhase::TechnicalTests,
        InspectionPhase::FinalEvaluation,
    ];
    let offered = |evaluation: &InspectionEvaluation| {
        phases
            .iter()
            .map(|phase| evaluation.can_advance_to(*phase))
            .collect::<Vec<_>>()
    };

    assert_eq!(offered(&evaluation), vec![false, true, false]);
    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");
    assert_eq!(offered(&evaluation), vec![false, false, true]);
    evaluation
        .record_final_evaluation(final_submission(Vec::new()), at(10))
        .expect("final");
    assert_eq!(offered(&evaluation), vec![false, false, false]);

    for phase in phases {
        assert_eq!(
            evaluation.can_advance_to(phase),
            evaluation.check_phase(phase).is_ok()
        );
    }
}

#[test]
fn a_record_without_entry_reports_no_entry() {
    let mut evaluation = opened();
    evaluation.entry_evaluation = None;

    assert_eq!(evaluation.stage(), InspectionStage::NoEntry);
    assert_eq!(evaluation.completion_percentage(), 0);
    assert_eq!(
        evaluation.check_phase(InspectionPhase::TechnicalTests),
        Err(InspectionError::PhaseOutOfOrder {
            phase: InspectionPhase::TechnicalTests,
            missing: InspectionPhase::Entry,
        })
    );
    assert!(evaluation.can_advance_to(InspectionPhase::Entry));
}

#[test]
fn final_evaluation_validates_its_fields() {
    let mut evaluation = opened();
    evaluation
        .record_technical_tests(technical_tests(), at(9))
        .expect("tests");

    let mut blank = final_submission(Vec::new());
    blank.findings_summary = "   ".to_string();
    let err = evaluation
        .record_final_evaluation(blank, at(10))
        .expect_err("blank summary");
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert!(err.to_string().contains("findings_summary"));

    let negative = final_submission(vec![repair(
        "Replace front pads",
        RepairPriority::Critical,
        -5.0,
    )]);
    assert!(matches!(
        evaluation.record_final_evaluation(negative, at(10)),
        Err(InspectionError::InvalidField {
            field: "recommended_repairs.estimated_cost",
            ..
        })
    ));
    assert!(evaluation.final_evaluation.is_none());
}

#[test]
fn flagged_subsystems_are_the_regular_and_bad_ones() {
    assert_eq!(
        technical_tests().flagged(),
        vec![Subsystem::Brakes, Subsystem::Tires]
    );
    assert_eq!(technical_tests().checks().count(), 10);
}

#[test]
fn view_spells_out_derived_fields() {
    let view = EvaluationView::from(opened());
    let json = serde_json::to_value(&view).expect("serializes");

    assert_eq!(json["workshop_status"], "in_evaluation");
    assert_eq!(json["stage"], "entry_done");
    assert_eq!(json["completion_percentage"], 33);
    assert_eq!(json["next_phase"], "technical_tests");
    assert_eq!(json["id"], "eval-000900");
    assert_eq!(json["entry_evaluation"]["exterior_condition"], "good");
}
