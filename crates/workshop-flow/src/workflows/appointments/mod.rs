//! Appointment (cita) lifecycle: pending, confirmed, in progress, completed or cancelled.

pub mod domain;
pub mod repository;

#[cfg(test)]
mod tests;

pub use domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTransitionError, NewAppointment,
    SlotEffect,
};
pub use repository::AppointmentRepository;
