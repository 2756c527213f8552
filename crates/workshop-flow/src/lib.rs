//! Workshop inspection workflow and appointment capacity scheduling.
//!
//! The library holds the domain state machines (inspection phases, appointment lifecycle,
//! per-day slot calendars), the stores that serialize mutations per workshop, and axum routers
//! exposing them. Persistence and the vehicle directory are reached through traits so hosts can
//! plug in their own storage.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
