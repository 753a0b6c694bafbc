//! Validation errors for submitted hedge jobs.
//!
//! A job that fails these checks is rejected before any risk evaluation or
//! capital reservation happens.
//!
//! # Examples
//!
//! ```
//! use hedgeward::domain::{HedgeJob, StrategyKind, ValidationError};
//! use rust_decimal_macros::dec;
//!
//! let job = HedgeJob::builder()
//!     .strategy(StrategyKind::Arbitrage)
//!     .symbol("BTC-PERP")
//!     .notional(dec!(1000))
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(job.validate(), Err(ValidationError::EmptyLegs)));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::ids::{JobId, Symbol};

/// Errors that occur when a job's shape is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Jobs must have at least one leg.
    #[error("legs cannot be empty")]
    EmptyLegs,

    /// Notional must be positive.
    #[error("notional must be positive, got {notional}")]
    NonPositiveNotional {
        /// The invalid notional that was provided.
        notional: Decimal,
    },

    /// Every leg must carry a positive quantity.
    #[error("leg {index} quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// Position of the leg in the job.
        index: usize,
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// All legs must trade the job's symbol.
    #[error("leg {index} trades {instrument}, job symbol is {symbol}")]
    MixedSymbols {
        /// Position of the offending leg.
        index: usize,
        /// The leg's instrument tag.
        instrument: Symbol,
        /// The job's symbol.
        symbol: Symbol,
    },

    /// Every leg must name a venue.
    #[error("leg {index} has an empty venue id")]
    EmptyVenue {
        /// Position of the offending leg.
        index: usize,
    },

    /// Job ids are unique for the lifetime of the scheduler.
    #[error("job {0} was already submitted")]
    DuplicateJob(JobId),
}
