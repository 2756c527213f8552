use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;

use super::domain::{DayUpdate, NewDay, ScheduleTemplate, SlotHour};
use super::repository::ScheduleRepository;
use super::store::{ScheduleStore, ScheduleStoreError};
use crate::config::SchedulingConfig;
use crate::workflows::domain::WorkshopId;
use crate::workflows::rejection::{rejection_response, ErrorKind};

pub struct ScheduleRouterState<R> {
    store: Arc<ScheduleStore<R>>,
    scheduling: SchedulingConfig,
}

impl<R> ScheduleRouterState<R> {
    pub(crate) fn new(store: Arc<ScheduleStore<R>>, scheduling: SchedulingConfig) -> Self {
        Self { store, scheduling }
    }
}

impl<R> Clone for ScheduleRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scheduling: self.scheduling,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CopyDayRequest {
    pub destination: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub start: SlotHour,
    pub end: SlotHour,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Router builder exposing the day-schedule calendar of a workshop.
pub fn schedule_router<R>(store: Arc<ScheduleStore<R>>, scheduling: SchedulingConfig) -> Router
where
    R: ScheduleRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days",
            post(create_day_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date",
            get(get_day_handler::<R>)
                .put(update_day_handler::<R>)
                .delete(delete_day_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date/copy",
            post(copy_day_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date/template",
            post(template_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date/range",
            post(range_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date/block",
            post(block_handler::<R>).delete(unblock_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/days/:date/available",
            get(available_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/months/:year/:month",
            get(month_handler::<R>),
        )
        .route(
            "/api/v1/workshops/:workshop_id/schedule/months/:year/:month/summary",
            get(month_summary_handler::<R>),
        )
        .with_state(ScheduleRouterState::new(store, scheduling))
}

pub(crate) async fn create_day_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path(workshop_id): Path<String>,
    Json(request): Json<NewDay>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.create_day(&WorkshopId(workshop_id), request) {
        Ok(day) => (StatusCode::CREATED, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn get_day_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.get_day(&WorkshopId(workshop_id), date) {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn update_day_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
    Json(update): Json<DayUpdate>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.update_day(&WorkshopId(workshop_id), date, update) {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn delete_day_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.delete_day(&WorkshopId(workshop_id), date) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn copy_day_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, source)): Path<(String, NaiveDate)>,
    Json(request): Json<CopyDayRequest>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state
        .store
        .copy_day(&WorkshopId(workshop_id), source, request.destination)
    {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn template_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
    Json(request): Json<TemplateRequest>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    let capacity = request
        .capacity
        .unwrap_or(state.scheduling.default_slot_capacity);
    let Some(template) = ScheduleTemplate::builtin(&request.template, capacity) else {
        return rejection_response(
            ErrorKind::InvalidRequest,
            format!("unknown schedule template '{}'", request.template),
        );
    };

    match state
        .store
        .apply_template(&WorkshopId(workshop_id), date, &template)
    {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn range_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
    Json(request): Json<RangeRequest>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    let capacity = request
        .capacity
        .unwrap_or(state.scheduling.default_slot_capacity);
    match state.store.apply_range(
        &WorkshopId(workshop_id),
        date,
        request.start,
        request.end,
        capacity,
    ) {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn block_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
    Json(request): Json<BlockRequest>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state
        .store
        .block_day(&WorkshopId(workshop_id), date, request.reason)
    {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn unblock_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.unblock_day(&WorkshopId(workshop_id), date) {
        Ok(day) => (StatusCode::OK, Json(day)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn available_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state.store.available_slots(&WorkshopId(workshop_id), date) {
        Ok(slots) => (StatusCode::OK, Json(slots)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn month_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, year, month)): Path<(String, i32, u32)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state
        .store
        .list_days_in_month(&WorkshopId(workshop_id), year, month)
    {
        Ok(days) => (StatusCode::OK, Json(days)).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn month_summary_handler<R>(
    State(state): State<ScheduleRouterState<R>>,
    Path((workshop_id, year, month)): Path<(String, i32, u32)>,
) -> Response
where
    R: ScheduleRepository + 'static,
{
    match state
        .store
        .month_summary(&WorkshopId(workshop_id), year, month)
    {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => store_error(err),
    }
}

fn store_error(err: ScheduleStoreError) -> Response {
    let kind = err.kind();
    if !kind.is_business_rule() {
        error!(error = %err, "schedule storage failure");
    }
    rejection_response(kind, err.to_string())
}
