use crate::infra::{parse_date, WorkshopServices};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use workshop_flow::error::AppError;
use workshop_flow::workflows::appointments::{AppointmentStatus, NewAppointment};
use workshop_flow::workflows::inspection::{
    ConditionRating, EntryEvaluation, FinalEvaluationSubmission, RepairDraft, RepairPriority,
    RepairStatus, SubsystemCheck, TechnicalTests, WorkshopStatus,
};
use workshop_flow::workflows::schedule::{NewDay, SlotConfig, SlotHour, HOURS_CATALOG};
use workshop_flow::workflows::store::EntrySubmission;
use workshop_flow::workflows::{ClientId, FixedClock, TechnicianId, VehicleId, WorkshopId};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pin the demo's notion of today (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Workshop the demo operates on.
    #[arg(long, default_value = "taller-demo")]
    pub(crate) workshop: String,
    /// Skip the inspection portion of the demo.
    #[arg(long)]
    pub(crate) skip_inspection: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        workshop,
        skip_inspection,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let workshop = WorkshopId::new(workshop);
    let services = WorkshopServices::in_memory(Arc::new(FixedClock::new(today)));
    services.register_sample_fleet();

    println!("Workshop flow demo for {} (today {})", workshop, today);
    run_calendar_demo(&services, &workshop, today)?;
    run_appointment_demo(&services, &workshop, today)?;
    if !skip_inspection {
        run_inspection_demo(&services, &workshop)?;
    }

    let stats = services.workflow.statistics(&workshop)?;
    println!("\nWorkshop statistics");
    println!(
        "- {} evaluation(s) | {:.0}% average completion | {} open repair(s) worth ${:.2}",
        stats.evaluations_total,
        stats.average_completion,
        stats.open_repairs,
        stats.open_repairs_estimated_cost
    );
    println!(
        "- {} appointment(s), {} today",
        stats.appointments_total, stats.appointments_today
    );
    for (status, count) in &stats.appointments_by_status {
        println!("  - {status}: {count}");
    }

    Ok(())
}

const NINE: SlotHour = HOURS_CATALOG[1];
const TEN: SlotHour = HOURS_CATALOG[2];

fn run_calendar_demo(
    services: &WorkshopServices,
    workshop: &WorkshopId,
    today: NaiveDate,
) -> Result<(), AppError> {
    let schedule = &services.schedule;
    let service_day = today + Duration::days(9);

    println!("\nCapacity calendar");
    let day = schedule.create_day(
        workshop,
        NewDay {
            date: service_day,
            slots: vec![
                SlotConfig {
                    hour: NINE,
                    active: true,
                    capacity: 2,
                },
                SlotConfig {
                    hour: TEN,
                    active: true,
                    capacity: 1,
                },
            ],
            blocked: false,
            block_reason: None,
        },
    )?;
    println!(
        "- Configured {} with {} open hour(s)",
        day.date,
        day.active_slots().count()
    );

    for attempt in 1..=3 {
        match schedule.reserve(workshop, service_day, NINE) {
            Ok(day) => {
                let booked = day.slot(NINE).map(|slot| slot.booked).unwrap_or_default();
                println!("  Reservation {attempt} at {NINE}: ok ({booked} of 2 booked)");
            }
            Err(err) => println!(
                "  Reservation {attempt} at {NINE}: {} ({err})",
                err.kind().label()
            ),
        }
    }

    let yesterday = today - Duration::days(1);
    match schedule.create_day(
        workshop,
        NewDay {
            date: yesterday,
            slots: Vec::new(),
            blocked: false,
            block_reason: None,
        },
    ) {
        Ok(_) => println!("  Unexpectedly configured {yesterday}"),
        Err(err) => println!("  Configuring {yesterday}: {} ({err})", err.kind().label()),
    }

    let copy_target = service_day + Duration::days(7);
    let copied = schedule.copy_day(workshop, service_day, copy_target)?;
    println!(
        "- Copied {} onto {}: capacity {} with {} booked",
        service_day,
        copied.date,
        copied.active_slots().map(|slot| slot.capacity).sum::<u32>(),
        copied.booked_total()
    );

    let summary = schedule.month_summary(workshop, service_day.year(), service_day.month())?;
    println!(
        "- {}-{:02}: {} configured day(s), {} of {} seat(s) booked",
        summary.year,
        summary.month,
        summary.configured_days,
        summary.booked,
        summary.total_capacity
    );
    Ok(())
}

fn run_appointment_demo(
    services: &WorkshopServices,
    workshop: &WorkshopId,
    today: NaiveDate,
) -> Result<(), AppError> {
    let workflow = &services.workflow;
    let service_day = today + Duration::days(9);

    println!("\nAppointment lifecycle");
    let appointment = workflow.book_appointment(
        workshop,
        NewAppointment {
            vehicle_id: VehicleId::new("veh-versa"),
            client_id: ClientId::new("cli-0042"),
            date: service_day,
            time_slot: TEN,
            description: "Noise when braking".to_string(),
            notes: None,
        },
    )?;
    println!(
        "- Booked {} for {} at {} {} -> {}",
        appointment.id,
        appointment
            .vehicle
            .as_ref()
            .map(|vehicle| vehicle.display_name())
            .unwrap_or_else(|| appointment.vehicle_id.to_string()),
        appointment.date,
        appointment.time_slot,
        appointment.status
    );

    let steps = [
        AppointmentStatus::InProgress,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Pending,
        AppointmentStatus::Completed,
    ];
    for target in steps {
        match workflow.transition_appointment(workshop, &appointment.id, target) {
            Ok(updated) => println!("  -> {}", updated.status),
            Err(err) => println!("  -> {target} refused: {} ({err})", err.kind().label()),
        }
    }
    Ok(())
}

fn run_inspection_demo(services: &WorkshopServices, workshop: &WorkshopId) -> Result<(), AppError> {
    let workflow = &services.workflow;

    println!("\nVehicle inspection");
    let evaluation = workflow.submit_entry_evaluation(
        workshop,
        EntrySubmission {
            vehicle_id: VehicleId::new("veh-golf"),
            appointment_id: None,
            entry: EntryEvaluation {
                mileage_at_entry: 151_090,
                exterior_condition: ConditionRating::Regular,
                interior_condition: ConditionRating::Good,
                notes: "Dent on driver door".to_string(),
                technician: TechnicianId::new("tec-marta"),
                entry_photos: Vec::new(),
            },
        },
    )?;
    println!(
        "- Opened {} ({}%, {})",
        evaluation.id,
        evaluation.completion_percentage(),
        evaluation.workshop_status()
    );

    let final_submission = FinalEvaluationSubmission {
        findings_summary: "Front brakes worn and tires past wear bars".to_string(),
        repair_priority: RepairPriority::Critical,
        estimated_repair_hours: 3.0,
        final_notes: String::new(),
        evaluating_technician: TechnicianId::new("tec-jorge"),
        final_photos: Vec::new(),
        recommended_repairs: vec![
            RepairDraft {
                name: "Front brake pads and discs".to_string(),
                description: String::new(),
                priority: RepairPriority::Critical,
                category: "brakes".to_string(),
                estimated_cost: 320.0,
                estimated_hours: 2.0,
            },
            RepairDraft {
                name: "Replace four tires".to_string(),
                description: String::new(),
                priority: RepairPriority::Important,
                category: "tires".to_string(),
                estimated_cost: 480.0,
                estimated_hours: 1.0,
            },
        ],
    };

    match workflow.submit_final_evaluation(workshop, &evaluation.id, final_submission.clone()) {
        Ok(_) => println!("  Final evaluation unexpectedly accepted before tests"),
        Err(err) => println!("  Final evaluation first: {} ({err})", err.kind().label()),
    }

    let good = || SubsystemCheck::rated(ConditionRating::Good);
    let tested = workflow.submit_technical_tests(
        workshop,
        &evaluation.id,
        TechnicalTests {
            engine: good(),
            brakes: SubsystemCheck::rated(ConditionRating::Bad),
            suspension: good(),
            steering: good(),
            lights: good(),
            tires: SubsystemCheck::rated(ConditionRating::Bad),
            electrical: good(),
            transmission: good(),
            air_conditioning: SubsystemCheck::rated(ConditionRating::Regular),
            fluids: good(),
            technical_notes: String::new(),
            photos: Vec::new(),
        },
    )?;
    let flagged: Vec<_> = tested
        .technical_tests
        .as_ref()
        .map(|tests| tests.flagged().into_iter().map(|s| s.label()).collect())
        .unwrap_or_default();
    println!(
        "- Technical tests recorded ({}%), flagged: {}",
        tested.completion_percentage(),
        flagged.join(", ")
    );

    let evaluated = workflow.submit_final_evaluation(workshop, &evaluation.id, final_submission)?;
    println!(
        "- Final evaluation recorded ({}%, {})",
        evaluated.completion_percentage(),
        evaluated.workshop_status()
    );
    for repair in &evaluated.recommended_repairs {
        println!(
            "  - {} [{}] ${:.2} -> {}",
            repair.name,
            repair.priority.label(),
            repair.estimated_cost,
            repair.status
        );
    }

    if let Some(first) = evaluated.recommended_repairs.first() {
        let approved = workflow.update_repair_status(
            workshop,
            &evaluation.id,
            &first.id,
            RepairStatus::Approved,
        )?;
        println!("  Repair {} -> {}", approved.id, approved.status);
    }

    let in_repair =
        workflow.advance_repair_status(workshop, &evaluation.id, WorkshopStatus::InRepair)?;
    println!("- Vehicle status -> {}", in_repair.workshop_status());
    Ok(())
}
