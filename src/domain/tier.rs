//! Capital tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three capital pools every venue splits its equity into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalTier {
    /// Buffer kept for rebalancing transfers and margin top-ups.
    Reserve,
    /// Pool for wash (volume) jobs.
    Wash,
    /// Pool for arbitrage jobs.
    Arb,
}

impl CapitalTier {
    /// All tiers in display order.
    pub const ALL: [CapitalTier; 3] = [CapitalTier::Reserve, CapitalTier::Wash, CapitalTier::Arb];

    /// Stable name used in logs and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::Wash => "wash",
            Self::Arb => "arb",
        }
    }

    /// Index into per-tier arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Reserve => 0,
            Self::Wash => 1,
            Self::Arb => 2,
        }
    }
}

impl fmt::Display for CapitalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_all_order() {
        for (i, tier) in CapitalTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }
}
