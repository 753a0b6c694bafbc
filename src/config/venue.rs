//! Per-venue settings.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Settings for one venue, keyed by venue id under `[venues.<id>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Equity to seed the ledger with before the first live update.
    pub equity: Option<Decimal>,
    /// Overrides `scheduler.max_concurrent_per_venue` for this venue.
    pub max_concurrent: Option<usize>,
    /// Disabled venues are hard rejected (e.g. missing credentials).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            equity: None,
            max_concurrent: None,
            enabled: true,
        }
    }
}
