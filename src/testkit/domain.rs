//! Builders for domain primitives used across tests.
//!
//! Jobs trade [`SYMBOL`] and buy on the first venue, selling on the rest.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Amount, HedgeJob, Leg, MarketSnapshot, Side, StrategyKind};

/// Symbol every testkit job and snapshot uses.
pub const SYMBOL: &str = "BTC-PERP";

/// Edge given to jobs that do not ask for one.
pub const DEFAULT_EDGE_BPS: f64 = 20.0;

/// An arbitrage job across `venues` with the default edge.
pub fn job(id: &str, venues: &[&str], notional: Amount) -> HedgeJob {
    job_with_edge(id, venues, notional, DEFAULT_EDGE_BPS)
}

/// An arbitrage job with an explicit expected edge.
///
/// Higher edge means a higher final score, which tests use to order the queue.
pub fn job_with_edge(id: &str, venues: &[&str], notional: Amount, edge_bps: f64) -> HedgeJob {
    job_for(StrategyKind::Arbitrage, id, venues, notional, edge_bps)
}

pub fn job_for(
    strategy: StrategyKind,
    id: &str,
    venues: &[&str],
    notional: Amount,
    edge_bps: f64,
) -> HedgeJob {
    let mut builder = HedgeJob::builder()
        .id(id)
        .strategy(strategy)
        .symbol(SYMBOL)
        .notional(notional)
        .expected_edge_bps(edge_bps);
    for (i, venue) in venues.iter().enumerate() {
        let side = if i == 0 { Side::Buy } else { Side::Sell };
        builder = builder.leg(Leg::new(*venue, side, dec!(0.1), SYMBOL));
    }
    builder.build().unwrap()
}

/// A deep, tight, calm snapshot observed at `now`.
pub fn healthy_snapshot(venue: &str, now: DateTime<Utc>) -> MarketSnapshot {
    MarketSnapshot {
        venue: venue.into(),
        symbol: SYMBOL.into(),
        bid: dec!(64000),
        ask: dec!(64001),
        depth: dec!(5000000),
        latency_ms: Some(20),
        funding_rate: 0.00001,
        volatility: 0.005,
        observed_at: now,
    }
}

/// Equity every testkit venue starts with.
pub fn default_equity() -> Decimal {
    dec!(100000)
}
