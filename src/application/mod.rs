//! Application services.
//!
//! The capital ledger and the risk evaluator are leaves; the scheduler
//! composes them and the monitoring aggregator reads all three.

pub mod ledger;
pub mod monitoring;
pub mod risk;
pub mod scheduler;

pub use ledger::{CapitalLedger, ReservationTicket, VenueCapitalState};
pub use monitoring::{MonitoringAggregator, Snapshot, StatusFileWriter};
pub use risk::{CircuitBreaker, HaltReason, RiskEvaluator, RiskInputs, RiskProfile};
pub use scheduler::{Admission, JobScheduler, SchedulerDeps, WithdrawResult};
