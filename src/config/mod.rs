//! Configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The core
//! consumes these values; it never owns or mutates them.

pub mod capital;
pub mod logging;
pub mod monitoring;
pub mod risk;
pub mod scheduler;
pub mod settings;
pub mod venue;

pub use capital::{CapitalConfig, TierSplit};
pub use logging::LoggingConfig;
pub use monitoring::MonitoringConfig;
pub use risk::{CircuitBreakerConfig, ProfileOverrides, RiskConfig};
pub use scheduler::SchedulerConfig;
pub use settings::{Config, RISK_MODE_ENV};
pub use venue::VenueConfig;
