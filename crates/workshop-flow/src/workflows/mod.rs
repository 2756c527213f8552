//! Workshop workflows: day schedules, appointments and vehicle inspections.

pub mod appointments;
pub mod clock;
pub mod domain;
pub mod inspection;
pub mod locks;
pub mod memory;
pub mod rejection;
pub mod repository;
pub mod schedule;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{ClientId, PhotoHandle, TechnicianId, VehicleId, VehicleSnapshot, WorkshopId};
pub use locks::WorkshopLocks;
pub use memory::{
    InMemoryAppointmentRepository, InMemoryEvaluationRepository, InMemoryScheduleRepository,
    InMemoryVehicleDirectory,
};
pub use rejection::ErrorKind;
pub use repository::{DirectoryError, RepositoryError, VehicleDirectory};
pub use store::{WorkflowStore, WorkflowStoreError, WorkshopStatistics};
