//! Canonical test configurations.

use rust_decimal::Decimal;

use crate::config::{Config, VenueConfig};

/// Default limits with `venues` seeded at the given equity.
pub fn with_venues(venues: &[(&str, Decimal)]) -> Config {
    let mut config = Config::default();
    for (name, equity) in venues {
        config.venues.insert(
            (*name).to_string(),
            VenueConfig {
                equity: Some(*equity),
                ..VenueConfig::default()
            },
        );
    }
    config
}

/// Two venues at 100k each: `binance` and `okx`.
pub fn two_venues() -> Config {
    let equity = super::domain::default_equity();
    with_venues(&[("binance", equity), ("okx", equity)])
}
