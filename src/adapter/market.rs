//! In-memory market book.

use dashmap::DashMap;

use crate::domain::{MarketSnapshot, Symbol, VenueId};
use crate::port::MarketDataSource;

/// Latest snapshot per venue and symbol, updated from any thread.
///
/// A snapshot that carries a latency also refreshes the venue's latency; one
/// without keeps the last measurement.
#[derive(Debug, Default)]
pub struct InMemoryMarketBook {
    snapshots: DashMap<(VenueId, Symbol), MarketSnapshot>,
    latency: DashMap<VenueId, u64>,
}

impl InMemoryMarketBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot`, replacing any older one for the same venue and symbol.
    pub fn update(&self, snapshot: MarketSnapshot) {
        if let Some(latency) = snapshot.latency_ms {
            self.latency.insert(snapshot.venue.clone(), latency);
        }
        self.snapshots
            .insert((snapshot.venue.clone(), snapshot.symbol.clone()), snapshot);
    }

    /// Record a latency probe for `venue` without a new quote.
    pub fn set_latency(&self, venue: VenueId, latency_ms: u64) {
        self.latency.insert(venue, latency_ms);
    }

    pub fn remove(&self, venue: &VenueId, symbol: &Symbol) -> Option<MarketSnapshot> {
        self.snapshots
            .remove(&(venue.clone(), symbol.clone()))
            .map(|(_, snapshot)| snapshot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl MarketDataSource for InMemoryMarketBook {
    fn snapshot(&self, venue: &VenueId, symbol: &Symbol) -> Option<MarketSnapshot> {
        self.snapshots
            .get(&(venue.clone(), symbol.clone()))
            .map(|entry| entry.value().clone())
    }

    fn latency_ms(&self, venue: &VenueId) -> Option<u64> {
        self.latency.get(venue).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snapshot(venue: &str, latency_ms: Option<u64>) -> MarketSnapshot {
        MarketSnapshot {
            venue: VenueId::from(venue),
            symbol: Symbol::from("BTC-PERP"),
            bid: dec!(100),
            ask: dec!(101),
            depth: dec!(10000),
            latency_ms,
            funding_rate: 0.0,
            volatility: 0.01,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn update_replaces_and_tracks_latency() {
        let book = InMemoryMarketBook::new();
        book.update(snapshot("okx", Some(40)));
        book.update(snapshot("okx", Some(70)));

        let venue = VenueId::from("okx");
        assert_eq!(book.len(), 1);
        assert_eq!(book.latency_ms(&venue), Some(70));
        assert_eq!(
            book.snapshot(&venue, &Symbol::from("BTC-PERP"))
                .map(|s| s.latency_ms),
            Some(Some(70))
        );
    }

    #[test]
    fn quote_without_latency_keeps_last_measurement() {
        let book = InMemoryMarketBook::new();
        let venue = VenueId::from("okx");
        book.set_latency(venue.clone(), 900);
        book.update(snapshot("okx", None));
        assert_eq!(book.latency_ms(&venue), Some(900));
    }

    #[test]
    fn latency_probe_overrides_last_quote() {
        let book = InMemoryMarketBook::new();
        book.update(snapshot("okx", Some(40)));
        book.set_latency(VenueId::from("okx"), 900);
        assert_eq!(book.latency_ms(&VenueId::from("okx")), Some(900));
    }

    #[test]
    fn unknown_pair_has_no_snapshot() {
        let book = InMemoryMarketBook::new();
        assert!(book
            .snapshot(&VenueId::from("okx"), &Symbol::from("ETH-PERP"))
            .is_none());
        assert!(book.remove(&VenueId::from("okx"), &Symbol::from("ETH-PERP")).is_none());
    }
}
