use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{ClientId, VehicleId, VehicleSnapshot, WorkshopId};
use crate::workflows::rejection::ErrorKind;
use crate::workflows::schedule::SlotHour;

/// Identifier wrapper for booked appointments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Pending,
            Self::Confirmed,
            Self::InProgress,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Targets reachable in one step. `Cancelled -> Pending` is the only way back.
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed],
            Self::Completed => &[],
            Self::Cancelled => &[Self::Pending],
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether an appointment in this status occupies a seat in its slot.
    pub const fn holds_seat(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Validate `from -> to` against the transition table.
    pub fn check_transition(
        from: Self,
        to: Self,
    ) -> Result<SlotEffect, AppointmentTransitionError> {
        if !from.can_transition_to(to) {
            return Err(AppointmentTransitionError { from, to });
        }
        Ok(match (from.holds_seat(), to.holds_seat()) {
            (true, false) => SlotEffect::Release,
            (false, true) => SlotEffect::Reserve,
            _ => SlotEffect::Keep,
        })
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a transition does to the seat held in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEffect {
    Keep,
    Reserve,
    Release,
}

/// Transition outside the allowed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move appointment from {from} to {to}; allowed from {from}: {}", allowed_list(.from))]
pub struct AppointmentTransitionError {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

impl AppointmentTransitionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidTransition
    }
}

fn allowed_list(from: &AppointmentStatus) -> String {
    let allowed = from.allowed_transitions();
    if allowed.is_empty() {
        return "none (terminal)".to_string();
    }
    allowed
        .iter()
        .map(|status| status.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A client's booked visit to the workshop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub workshop_id: WorkshopId,
    pub vehicle_id: VehicleId,
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleSnapshot>,
    pub date: NaiveDate,
    pub time_slot: SlotHour,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Apply a transition, returning the seat effect the caller must commit alongside it.
    pub fn transition(
        &mut self,
        target: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<SlotEffect, AppointmentTransitionError> {
        let effect = AppointmentStatus::check_transition(self.status, target)?;
        self.status = target;
        self.updated_at = at;
        Ok(effect)
    }
}

/// Booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub vehicle_id: VehicleId,
    pub client_id: ClientId,
    pub date: NaiveDate,
    pub time_slot: SlotHour,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
}
