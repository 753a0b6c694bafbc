//! Execution outcomes reported back by the executor.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::VenueId;
use super::job::Side;
use super::money::{Amount, Price, Quantity};

/// Fill details for one leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegFill {
    pub venue: VenueId,
    pub side: Side,
    pub filled_quantity: Quantity,
    pub average_price: Price,
    #[serde(default)]
    pub fee: Amount,
}

/// Why a job failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The executor reported a failure.
    Executor { message: String },
    /// No outcome arrived within the holding window; the scheduler gave up.
    StuckJobReclaimed {
        #[serde(with = "duration_secs")]
        held_for: Duration,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executor { message } => write!(f, "executor failure: {message}"),
            Self::StuckJobReclaimed { held_for } => {
                write!(f, "reclaimed after {}s without outcome", held_for.as_secs())
            }
        }
    }
}

/// Result of executing a hedge job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    #[serde(default)]
    pub fills: Vec<LegFill>,
    #[serde(default)]
    pub realized_pnl: Amount,
    #[serde(default)]
    pub realized_volume: Amount,
    /// `None` on success.
    #[serde(default)]
    pub failure: Option<FailureReason>,
}

impl JobOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn success(fills: Vec<LegFill>, realized_pnl: Amount, realized_volume: Amount) -> Self {
        Self {
            fills,
            realized_pnl,
            realized_volume,
            failure: None,
        }
    }

    /// A failed outcome with the executor's message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            fills: Vec::new(),
            realized_pnl: Decimal::ZERO,
            realized_volume: Decimal::ZERO,
            failure: Some(FailureReason::Executor {
                message: message.into(),
            }),
        }
    }

    /// Outcome synthesized when a job is reclaimed after timing out.
    #[must_use]
    pub fn reclaimed(held_for: Duration) -> Self {
        Self {
            fills: Vec::new(),
            realized_pnl: Decimal::ZERO,
            realized_volume: Decimal::ZERO,
            failure: Some(FailureReason::StuckJobReclaimed { held_for }),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Sum of fees across all leg fills.
    #[must_use]
    pub fn total_fees(&self) -> Amount {
        self.fills.iter().map(|fill| fill.fee).sum()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_fees_sums_legs() {
        let outcome = JobOutcome::success(
            vec![
                LegFill {
                    venue: VenueId::from("binance"),
                    side: Side::Buy,
                    filled_quantity: dec!(1),
                    average_price: dec!(100),
                    fee: dec!(0.04),
                },
                LegFill {
                    venue: VenueId::from("okx"),
                    side: Side::Sell,
                    filled_quantity: dec!(1),
                    average_price: dec!(100.1),
                    fee: dec!(0.05),
                },
            ],
            dec!(0.01),
            dec!(200.1),
        );

        assert!(outcome.is_success());
        assert_eq!(outcome.total_fees(), dec!(0.09));
    }

    #[test]
    fn reclaimed_outcome_is_failure() {
        let outcome = JobOutcome::reclaimed(Duration::from_secs(60));
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.failure.unwrap().to_string(),
            "reclaimed after 60s without outcome"
        );
    }

    #[test]
    fn failure_reason_serializes_tagged() {
        let reason = FailureReason::StuckJobReclaimed {
            held_for: Duration::from_secs(90),
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#"{"kind":"stuck_job_reclaimed","held_for":90}"#);
    }
}
