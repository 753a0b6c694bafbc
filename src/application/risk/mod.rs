//! Risk evaluation.
//!
//! Scores a candidate job against live market conditions and rejects it
//! outright when a hard threshold is crossed:
//!
//! - Circuit breaker tripped (consecutive failures or daily loss)
//! - Safe mode, globally or on a participating venue
//! - Disabled venue, missing or stale market data
//! - Latency or funding beyond their hard limits
//!
//! Otherwise five penalty factors are weighted into a safety score and
//! blended with an opportunity score. The mode-specific numbers live in a
//! [`RiskProfile`].

mod breaker;
mod evaluator;
mod factor;
mod profile;

pub use breaker::{BreakerStatus, CircuitBreaker, HaltReason};
pub use evaluator::{RiskEvaluator, RiskStatus};
pub use factor::RiskInputs;
pub use profile::RiskProfile;
