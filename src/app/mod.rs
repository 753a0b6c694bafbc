//! Application layer - wiring and the maintenance loop.

mod coordinator;

pub use coordinator::{Coordinator, CoordinatorBuilder, MaintenanceReport};
