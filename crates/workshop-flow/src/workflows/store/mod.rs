//! Workshop-scoped orchestration of inspections and appointments.
//!
//! Every mutation runs under the workshop lock shared with the schedule store, so booking an
//! appointment and taking its seat commit together.

pub mod router;
pub mod service;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use router::workflow_router;
pub use service::{EntrySubmission, WorkflowStore, WorkflowStoreError};
pub use statistics::WorkshopStatistics;
