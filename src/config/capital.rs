//! Capital ledger configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::CapitalTier;

/// Fractions of equity assigned to each capital tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierSplit {
    #[serde(default = "default_reserve")]
    pub reserve: Decimal,
    #[serde(default = "default_wash")]
    pub wash: Decimal,
    #[serde(default = "default_arb")]
    pub arb: Decimal,
}

fn default_reserve() -> Decimal {
    Decimal::new(2, 1) // 20%
}

fn default_wash() -> Decimal {
    Decimal::new(3, 1) // 30%
}

fn default_arb() -> Decimal {
    Decimal::new(5, 1) // 50%
}

impl TierSplit {
    /// Fraction of equity for `tier`.
    #[must_use]
    pub const fn fraction(&self, tier: CapitalTier) -> Decimal {
        match tier {
            CapitalTier::Reserve => self.reserve,
            CapitalTier::Wash => self.wash,
            CapitalTier::Arb => self.arb,
        }
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.reserve + self.wash + self.arb
    }
}

impl Default for TierSplit {
    fn default() -> Self {
        Self {
            reserve: default_reserve(),
            wash: default_wash(),
            arb: default_arb(),
        }
    }
}

/// Capital limits applied by the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct CapitalConfig {
    /// Largest single reservation as a fraction of venue equity.
    #[serde(default = "default_per_job_cap")]
    pub per_job_cap: Decimal,
    /// Largest total in-flight amount as a fraction of venue equity.
    #[serde(default = "default_total_cap")]
    pub total_cap: Decimal,
    #[serde(default)]
    pub tiers: TierSplit,
}

fn default_per_job_cap() -> Decimal {
    Decimal::new(1, 1) // 10%
}

fn default_total_cap() -> Decimal {
    Decimal::new(3, 1) // 30%
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            per_job_cap: default_per_job_cap(),
            total_cap: default_total_cap(),
            tiers: TierSplit::default(),
        }
    }
}
