use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{CapitalTier, JobId, ValidationError, VenueId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Reasons a capital reservation was refused. No ledger state changes on any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    #[error("{venue}: {amount} exceeds per-job cap {cap}")]
    OverPerJobCap {
        venue: VenueId,
        amount: Decimal,
        cap: Decimal,
    },

    #[error("{venue}: in-flight {in_flight} + {amount} exceeds total cap {cap}")]
    OverTotalCap {
        venue: VenueId,
        in_flight: Decimal,
        amount: Decimal,
        cap: Decimal,
    },

    #[error("{venue}: {tier} tier used {used} + {amount} exceeds budget {budget}")]
    TierExhausted {
        venue: VenueId,
        tier: CapitalTier,
        used: Decimal,
        amount: Decimal,
        budget: Decimal,
    },

    #[error("safe mode active on {venue}")]
    SafeModeActive { venue: VenueId },

    #[error("venue {0} is disabled")]
    VenueDisabled(VenueId),

    #[error("no equity recorded for venue {0}")]
    UnknownVenue(VenueId),

    #[error("reservation amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

/// Equity updates the ledger refuses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EquityError {
    #[error("equity for {venue} must be 0 or greater, got {equity}")]
    Negative { venue: VenueId, equity: Decimal },
}

/// Ticket release contract violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("ticket {ticket} on {venue} was already released")]
    DoubleReleaseAttempt { ticket: u64, venue: VenueId },

    #[error("ticket {0} was never issued by this ledger")]
    UnknownTicket(u64),
}

/// Why a submission was turned away. Every variant is terminal for that submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("risk rejected: {}", .reasons.join("; "))]
    RiskRejected { reasons: Vec<String> },

    #[error("capital exhausted: {0}")]
    CapitalExhausted(ReserveError),

    #[error("safe mode active: {reason}")]
    SafeModeActive { reason: String },
}

/// Errors returned by scheduler operations other than submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("job {0} is not running")]
    UnknownJob(JobId),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Reserve(#[from] ReserveError),

    #[error(transparent)]
    Equity(#[from] EquityError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reserve_error_messages_name_the_venue() {
        let err = ReserveError::OverTotalCap {
            venue: VenueId::from("okx"),
            in_flight: dec!(30000),
            amount: dec!(1),
            cap: dec!(30000),
        };
        assert_eq!(
            err.to_string(),
            "okx: in-flight 30000 + 1 exceeds total cap 30000"
        );
    }

    #[test]
    fn submit_error_joins_reasons() {
        let err = SubmitError::RiskRejected {
            reasons: vec!["latency 900ms > 500ms".into(), "stale data".into()],
        };
        assert_eq!(
            err.to_string(),
            "risk rejected: latency 900ms > 500ms; stale data"
        );
    }

    #[test]
    fn validation_error_converts_into_submit_error() {
        let err: SubmitError = ValidationError::EmptyLegs.into();
        assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyLegs)));
    }
}
