//! Hedge job types with builder pattern.
//!
//! A [`HedgeJob`] is produced by the upstream strategy layer and is immutable
//! once submitted. Use [`HedgeJob::builder`] to construct instances; shape
//! checks that depend on the whole job live in [`HedgeJob::validate`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::ids::{JobId, Symbol, VenueId};
use super::money::{Amount, Quantity};
use super::tier::CapitalTier;

/// The kind of strategy that produced a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Self-matched volume generation across venues.
    Wash,
    /// Cross-venue price or funding arbitrage.
    Arbitrage,
    /// Inventory rebalancing between venues.
    Rebalance,
}

impl StrategyKind {
    /// Capital tier a job of this kind draws from.
    #[must_use]
    pub const fn tier(self) -> CapitalTier {
        match self {
            Self::Wash => CapitalTier::Wash,
            Self::Arbitrage => CapitalTier::Arb,
            Self::Rebalance => CapitalTier::Reserve,
        }
    }

    /// Stable name used in logs and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wash => "wash",
            Self::Arbitrage => "arbitrage",
            Self::Rebalance => "rebalance",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order side of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("buy"),
            Self::Sell => f.write_str("sell"),
        }
    }
}

/// One side of a multi-venue hedge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    venue: VenueId,
    side: Side,
    quantity: Quantity,
    instrument: Symbol,
}

impl Leg {
    /// Create a new leg.
    pub fn new(
        venue: impl Into<VenueId>,
        side: Side,
        quantity: Quantity,
        instrument: impl Into<Symbol>,
    ) -> Self {
        Self {
            venue: venue.into(),
            side,
            quantity,
            instrument: instrument.into(),
        }
    }

    /// Venue this leg executes on.
    #[must_use]
    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Quantity in base units.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Instrument tag.
    #[must_use]
    pub fn instrument(&self) -> &Symbol {
        &self.instrument
    }
}

/// A candidate multi-leg hedge job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeJob {
    #[serde(default = "JobId::generate")]
    id: JobId,
    strategy: StrategyKind,
    symbol: Symbol,
    legs: Vec<Leg>,
    notional: Amount,
    #[serde(default)]
    expected_edge_bps: f64,
    #[serde(default)]
    estimated_volume: Amount,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl HedgeJob {
    /// Create a new builder for constructing a job.
    #[must_use]
    pub fn builder() -> HedgeJobBuilder {
        HedgeJobBuilder::new()
    }

    #[must_use]
    pub fn id(&self) -> &JobId {
        &self.id
    }

    #[must_use]
    pub const fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Total economic size of the job's exposure.
    #[must_use]
    pub const fn notional(&self) -> Amount {
        self.notional
    }

    /// Expected edge in basis points.
    #[must_use]
    pub const fn expected_edge_bps(&self) -> f64 {
        self.expected_edge_bps
    }

    #[must_use]
    pub const fn estimated_volume(&self) -> Amount {
        self.estimated_volume
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Capital tier this job draws from.
    #[must_use]
    pub const fn tier(&self) -> CapitalTier {
        self.strategy.tier()
    }

    /// Distinct venues touched by the job, in lexicographic order.
    #[must_use]
    pub fn venues(&self) -> BTreeSet<VenueId> {
        self.legs.iter().map(|leg| leg.venue.clone()).collect()
    }

    /// Capital the job needs on each participating venue.
    ///
    /// A hedge carries its full notional on every venue it touches, so
    /// multiple legs on one venue still require the notional only once.
    #[must_use]
    pub fn capital_requirements(&self) -> BTreeMap<VenueId, Amount> {
        self.venues()
            .into_iter()
            .map(|venue| (venue, self.notional))
            .collect()
    }

    /// Check the job's shape.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.legs.is_empty() {
            return Err(ValidationError::EmptyLegs);
        }
        if self.notional <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveNotional {
                notional: self.notional,
            });
        }
        for (index, leg) in self.legs.iter().enumerate() {
            if leg.venue.as_str().is_empty() {
                return Err(ValidationError::EmptyVenue { index });
            }
            if leg.quantity <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveQuantity {
                    index,
                    quantity: leg.quantity,
                });
            }
            if leg.instrument != self.symbol {
                return Err(ValidationError::MixedSymbols {
                    index,
                    instrument: leg.instrument.clone(),
                    symbol: self.symbol.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Error returned when building a job fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HedgeJobBuildError {
    /// Strategy kind is required but was not provided.
    MissingStrategy,
    /// Symbol is required but was not provided.
    MissingSymbol,
    /// Notional is required but was not provided.
    MissingNotional,
}

impl fmt::Display for HedgeJobBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStrategy => write!(f, "strategy is required"),
            Self::MissingSymbol => write!(f, "symbol is required"),
            Self::MissingNotional => write!(f, "notional is required"),
        }
    }
}

impl std::error::Error for HedgeJobBuildError {}

/// Builder for constructing [`HedgeJob`] instances.
///
/// # Example
///
/// ```ignore
/// let job = HedgeJob::builder()
///     .strategy(StrategyKind::Arbitrage)
///     .symbol("BTC-PERP")
///     .leg(Leg::new("binance", Side::Buy, dec!(0.1), "BTC-PERP"))
///     .leg(Leg::new("okx", Side::Sell, dec!(0.1), "BTC-PERP"))
///     .notional(dec!(6000))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct HedgeJobBuilder {
    id: Option<JobId>,
    strategy: Option<StrategyKind>,
    symbol: Option<Symbol>,
    legs: Vec<Leg>,
    notional: Option<Amount>,
    expected_edge_bps: f64,
    estimated_volume: Amount,
    created_at: Option<DateTime<Utc>>,
    metadata: BTreeMap<String, String>,
}

impl HedgeJobBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the job ID. A random one is generated when omitted.
    #[must_use]
    pub fn id(mut self, id: impl Into<JobId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Append a leg.
    #[must_use]
    pub fn leg(mut self, leg: Leg) -> Self {
        self.legs.push(leg);
        self
    }

    #[must_use]
    pub fn notional(mut self, notional: Amount) -> Self {
        self.notional = Some(notional);
        self
    }

    #[must_use]
    pub fn expected_edge_bps(mut self, edge_bps: f64) -> Self {
        self.expected_edge_bps = edge_bps;
        self
    }

    #[must_use]
    pub fn estimated_volume(mut self, volume: Amount) -> Self {
        self.estimated_volume = volume;
        self
    }

    /// Set the creation timestamp. Defaults to now.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the job.
    ///
    /// # Errors
    ///
    /// Returns `HedgeJobBuildError` if any required field is missing.
    pub fn build(self) -> Result<HedgeJob, HedgeJobBuildError> {
        let strategy = self.strategy.ok_or(HedgeJobBuildError::MissingStrategy)?;
        let symbol = self.symbol.ok_or(HedgeJobBuildError::MissingSymbol)?;
        let notional = self.notional.ok_or(HedgeJobBuildError::MissingNotional)?;

        Ok(HedgeJob {
            id: self.id.unwrap_or_else(JobId::generate),
            strategy,
            symbol,
            legs: self.legs,
            notional,
            expected_edge_bps: self.expected_edge_bps,
            estimated_volume: self.estimated_volume,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            metadata: self.metadata,
        })
    }
}
