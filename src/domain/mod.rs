//! Exchange-agnostic domain types.

pub mod error;
mod evaluation;
mod ids;
mod job;
mod market;
mod money;
mod outcome;
mod status;
mod tier;

pub use error::ValidationError;
pub use evaluation::{FactorScores, RejectionClass, RiskDecision, RiskEvaluation, RiskMode};
pub use ids::{JobId, Symbol, VenueId};
pub use job::{HedgeJob, HedgeJobBuildError, HedgeJobBuilder, Leg, Side, StrategyKind};
pub use market::MarketSnapshot;
pub use money::{Amount, Price, Quantity};
pub use outcome::{FailureReason, JobOutcome, LegFill};
pub use status::JobStatus;
pub use tier::CapitalTier;
