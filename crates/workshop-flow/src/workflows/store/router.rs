use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::service::{EntrySubmission, WorkflowStore, WorkflowStoreError};
use crate::workflows::appointments::{
    AppointmentId, AppointmentRepository, AppointmentStatus, NewAppointment,
};
use crate::workflows::domain::WorkshopId;
use crate::workflows::inspection::{
    EvaluationId, EvaluationRepository, EvaluationView, FinalEvaluationSubmission,
    InspectionEvaluation, InspectionPhase, RepairId, RepairStatus, TechnicalTests, WorkshopStatus,
};
use crate::workflows::rejection::rejection_response;
use crate::workflows::schedule::ScheduleRepository;

type SharedStore<E, A, S> = Arc<WorkflowStore<E, A, S>>;

#[derive(Debug, Default, Deserialize)]
pub struct EvaluationFilter {
    #[serde(default)]
    pub status: Option<WorkshopStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange<T> {
    pub status: T,
}

/// Which phases the evaluation would accept next.
#[derive(Debug, Serialize)]
pub struct PhaseAvailability {
    pub evaluation_id: EvaluationId,
    pub completion_percentage: u8,
    pub entry: bool,
    pub technical_tests: bool,
    pub final_evaluation: bool,
}

/// Router builder exposing inspections, appointments and workshop statistics.
pub fn workflow_router<E, A, S>(store: SharedStore<E, A, S>) -> Router
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/workshops/:workshop_id/evaluations",
            get(list_evaluations_handler::<E, A, S>).post(submit_entry_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id",
            get(get_evaluation_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id/phases",
            get(phases_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id/technical-tests",
            put(technical_tests_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id/final-evaluation",
            put(final_evaluation_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id/status",
            post(advance_status_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/evaluations/:evaluation_id/repairs/:repair_id/status",
            post(repair_status_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/appointments",
            get(list_appointments_handler::<E, A, S>).post(book_appointment_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/appointments/today",
            get(appointments_today_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/appointments/:appointment_id",
            get(get_appointment_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/appointments/:appointment_id/status",
            post(transition_appointment_handler::<E, A, S>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/statistics",
            get(statistics_handler::<E, A, S>),
        )
        .with_state(store)
}

pub(crate) async fn submit_entry_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
    Json(submission): Json<EntrySubmission>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.submit_entry_evaluation(&WorkshopId(workshop_id), submission) {
        Ok(evaluation) => evaluation_response(StatusCode::CREATED, evaluation),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn list_evaluations_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
    Query(filter): Query<EvaluationFilter>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    let workshop_id = WorkshopId(workshop_id);
    let listed = match filter.status {
        Some(status) => store.evaluations_by_status(&workshop_id, status),
        None => store.list_evaluations(&workshop_id),
    };
    match listed {
        Ok(evaluations) => {
            let views: Vec<EvaluationView> =
                evaluations.into_iter().map(EvaluationView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => store_error(err),
    }
}

pub(crate) async fn get_evaluation_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id)): Path<(String, String)>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.get_evaluation(&WorkshopId(workshop_id), &EvaluationId(evaluation_id)) {
        Ok(evaluation) => evaluation_response(StatusCode::OK, evaluation),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn phases_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id)): Path<(String, String)>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    let evaluation_id = EvaluationId(evaluation_id);
    match store.get_evaluation(&WorkshopId(workshop_id), &evaluation_id) {
        Ok(evaluation) => {
            let availability = PhaseAvailability {
                completion_percentage: evaluation.completion_percentage(),
                entry: evaluation.can_advance_to(InspectionPhase::Entry),
                technical_tests: evaluation.can_advance_to(InspectionPhase::TechnicalTests),
                final_evaluation: evaluation.can_advance_to(InspectionPhase::FinalEvaluation),
                evaluation_id,
            };
            (StatusCode::OK, Json(availability)).into_response()
        }
        Err(err) => store_error(err),
    }
}

pub(crate) async fn technical_tests_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id)): Path<(String, String)>,
    Json(tests): Json<TechnicalTests>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.submit_technical_tests(
        &WorkshopId(workshop_id),
        &EvaluationId(evaluation_id),
        tests,
    ) {
        Ok(evaluation) => evaluation_response(StatusCode::OK, evaluation),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn final_evaluation_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id)): Path<(String, String)>,
    Json(submission): Json<FinalEvaluationSubmission>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.submit_final_evaluation(
        &WorkshopId(workshop_id),
        &EvaluationId(evaluation_id),
        submission,
    ) {
        Ok(evaluation) => evaluation_response(StatusCode::OK, evaluation),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn advance_status_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id)): Path<(String, String)>,
    Json(change): Json<StatusChange<WorkshopStatus>>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.advance_repair_status(
        &WorkshopId(workshop_id),
        &EvaluationId(evaluation_id),
        change.status,
    ) {
        Ok(evaluation) => evaluation_response(StatusCode::OK, evaluation),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn repair_status_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, evaluation_id, repair_id)): Path<(String, String, String)>,
    Json(change): Json<StatusChange<RepairStatus>>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.update_repair_status(
        &WorkshopId(workshop_id),
        &EvaluationId(evaluation_id),
        &RepairId(repair_id),
        change.status,
    ) {
        Ok(repair) => (StatusCode::OK, Json(repair)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn book_appointment_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
    Json(request): Json<NewAppointment>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.book_appointment(&WorkshopId(workshop_id), request) {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn list_appointments_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
    Query(filter): Query<AppointmentFilter>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    let workshop_id = WorkshopId(workshop_id);
    let listed = match filter.date {
        Some(date) => store.list_appointments_on(&workshop_id, date),
        None => store.list_appointments(&workshop_id),
    };
    match listed {
        Ok(appointments) => {
            let filtered: Vec<_> = appointments
                .into_iter()
                .filter(|appointment| {
                    filter
                        .status
                        .map_or(true, |status| appointment.status == status)
                })
                .collect();
            (StatusCode::OK, Json(filtered)).into_response()
        }
        Err(err) => store_error(err),
    }
}

pub(crate) async fn appointments_today_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.list_appointments_today(&WorkshopId(workshop_id)) {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn get_appointment_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, appointment_id)): Path<(String, String)>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.get_appointment(&WorkshopId(workshop_id), &AppointmentId(appointment_id)) {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn transition_appointment_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path((workshop_id, appointment_id)): Path<(String, String)>,
    Json(change): Json<StatusChange<AppointmentStatus>>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.transition_appointment(
        &WorkshopId(workshop_id),
        &AppointmentId(appointment_id),
        change.status,
    ) {
        Ok(appointment) => (StatusCode::OK, Json(appointment)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn statistics_handler<E, A, S>(
    State(store): State<SharedStore<E, A, S>>,
    Path(workshop_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    A: AppointmentRepository + 'static,
    S: ScheduleRepository + 'static,
{
    match store.statistics(&WorkshopId(workshop_id)) {
        Ok(statistics) => (StatusCode::OK, Json(statistics)).into_response(),
        Err(err) => store_error(err),
    }
}

fn evaluation_response(status: StatusCode, evaluation: InspectionEvaluation) -> Response {
    (status, Json(EvaluationView::from(evaluation))).into_response()
}

fn store_error(err: WorkflowStoreError) -> Response {
    let kind = err.kind();
    if !kind.is_business_rule() {
        error!(error = %err, "workflow storage failure");
    }
    rejection_response(kind, err.to_string())
}
