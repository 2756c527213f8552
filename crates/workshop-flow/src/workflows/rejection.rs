use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Classification of every rejected command, shared by all stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PhaseOutOfOrder,
    AlreadyCompleted,
    InvalidTransition,
    InvalidState,
    PastDate,
    AlreadyExists,
    SlotInUse,
    CapacityBelowBooked,
    SlotClosed,
    SlotFull,
    NotFound,
    InvalidRequest,
    /// Storage or collaborator failure. The only kind callers are expected to retry.
    Storage,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PhaseOutOfOrder => "phase_out_of_order",
            Self::AlreadyCompleted => "already_completed",
            Self::InvalidTransition => "invalid_transition",
            Self::InvalidState => "invalid_state",
            Self::PastDate => "past_date",
            Self::AlreadyExists => "already_exists",
            Self::SlotInUse => "slot_in_use",
            Self::CapacityBelowBooked => "capacity_below_booked",
            Self::SlotClosed => "slot_closed",
            Self::SlotFull => "slot_full",
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::Storage => "storage",
        }
    }

    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PastDate | Self::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PhaseOutOfOrder
            | Self::AlreadyCompleted
            | Self::InvalidTransition
            | Self::InvalidState
            | Self::AlreadyExists
            | Self::SlotInUse
            | Self::CapacityBelowBooked
            | Self::SlotClosed
            | Self::SlotFull => StatusCode::CONFLICT,
        }
    }

    pub const fn is_business_rule(self) -> bool {
        !matches!(self, Self::Storage)
    }
}

/// JSON error body carrying both the kind and the human readable reason.
pub(crate) fn rejection_response(kind: ErrorKind, message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": kind.label(),
    });
    (kind.status_code(), Json(payload)).into_response()
}
