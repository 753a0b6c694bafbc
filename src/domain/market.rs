//! Live market conditions for one symbol on one venue.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{Symbol, VenueId};
use super::money::{Amount, Price};

/// Top-of-book and venue health observed at `observed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub bid: Price,
    pub ask: Price,
    /// Visible depth near the touch, in quote currency.
    pub depth: Amount,
    /// Round-trip latency to the venue in milliseconds, when the quote carries one.
    #[serde(default)]
    pub latency_ms: Option<u64>,
    /// Current funding rate per period as a fraction (0.0001 = 1 bp).
    #[serde(default)]
    pub funding_rate: f64,
    /// Recent realized volatility as a fraction.
    #[serde(default)]
    pub volatility: f64,
    pub observed_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Mid price, or `None` for a crossed or empty book.
    #[must_use]
    pub fn mid(&self) -> Option<Price> {
        if self.bid <= Decimal::ZERO || self.ask < self.bid {
            return None;
        }
        Some((self.bid + self.ask) / Decimal::TWO)
    }

    /// Quoted spread in basis points of mid. `None` when the book is unusable.
    #[must_use]
    pub fn spread_bps(&self) -> Option<f64> {
        let mid = self.mid()?;
        ((self.ask - self.bid) / mid * Decimal::from(10_000)).to_f64()
    }

    /// Absolute funding rate in basis points.
    #[must_use]
    pub fn funding_bps(&self) -> f64 {
        (self.funding_rate * 10_000.0).abs()
    }

    /// Milliseconds elapsed between observation and `now`.
    ///
    /// Negative when the snapshot is stamped ahead of `now`.
    #[must_use]
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.observed_at).num_milliseconds()
    }
}
