//! Market data port.

use crate::domain::{MarketSnapshot, Symbol, VenueId};

/// Source of the latest market snapshot per venue and symbol.
///
/// Implementations must be cheap to query; the risk evaluator calls this on
/// every submission.
pub trait MarketDataSource: Send + Sync {
    /// Latest snapshot for `symbol` on `venue`, if any was ever observed.
    fn snapshot(&self, venue: &VenueId, symbol: &Symbol) -> Option<MarketSnapshot>;

    /// Most recent latency observed for `venue` across all symbols, in milliseconds.
    fn latency_ms(&self, venue: &VenueId) -> Option<u64>;
}
