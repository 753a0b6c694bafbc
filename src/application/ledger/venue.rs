//! Capital state of a single venue.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{CapitalConfig, TierSplit};
use crate::domain::{Amount, CapitalTier, VenueId};
use crate::error::ReserveError;

/// Equity, tier budgets and commitments for one venue.
///
/// Instances handed out by the ledger are copies; mutating them has no effect
/// on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueCapitalState {
    venue: VenueId,
    equity: Amount,
    budgets: [Amount; 3],
    used: [Amount; 3],
    in_flight: Amount,
    safe_mode: bool,
    enabled: bool,
}

impl VenueCapitalState {
    pub(crate) fn new(venue: VenueId, equity: Amount, split: &TierSplit) -> Self {
        let mut state = Self {
            venue,
            equity: Decimal::ZERO,
            budgets: [Decimal::ZERO; 3],
            used: [Decimal::ZERO; 3],
            in_flight: Decimal::ZERO,
            safe_mode: false,
            enabled: true,
        };
        state.rescale(equity, split);
        state
    }

    #[must_use]
    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    #[must_use]
    pub const fn equity(&self) -> Amount {
        self.equity
    }

    /// Budget of `tier`, derived from equity.
    #[must_use]
    pub const fn budget(&self, tier: CapitalTier) -> Amount {
        self.budgets[tier.index()]
    }

    /// Amount currently reserved from `tier`.
    #[must_use]
    pub const fn used(&self, tier: CapitalTier) -> Amount {
        self.used[tier.index()]
    }

    /// Budget left in `tier`. Zero when a shrinking equity left the tier over budget.
    #[must_use]
    pub fn available(&self, tier: CapitalTier) -> Amount {
        (self.budget(tier) - self.used(tier)).max(Decimal::ZERO)
    }

    /// Total reserved across all tiers.
    #[must_use]
    pub const fn in_flight(&self) -> Amount {
        self.in_flight
    }

    #[must_use]
    pub const fn is_safe_mode(&self) -> bool {
        self.safe_mode
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Largest single reservation allowed right now.
    #[must_use]
    pub fn per_job_cap(&self, limits: &CapitalConfig) -> Amount {
        self.equity * limits.per_job_cap
    }

    /// Largest total in-flight amount allowed right now.
    #[must_use]
    pub fn total_cap(&self, limits: &CapitalConfig) -> Amount {
        self.equity * limits.total_cap
    }

    pub(crate) fn rescale(&mut self, equity: Amount, split: &TierSplit) {
        self.equity = equity;
        for tier in CapitalTier::ALL {
            self.budgets[tier.index()] = equity * split.fraction(tier);
        }
    }

    pub(crate) fn set_safe_mode(&mut self, on: bool) {
        self.safe_mode = on;
    }

    pub(crate) fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
    }

    /// Every condition a reservation of `amount` from `tier` must meet.
    pub(crate) fn check(
        &self,
        tier: CapitalTier,
        amount: Amount,
        limits: &CapitalConfig,
        global_safe_mode: bool,
    ) -> Result<(), ReserveError> {
        if amount <= Decimal::ZERO {
            return Err(ReserveError::NonPositiveAmount(amount));
        }
        if !self.enabled {
            return Err(ReserveError::VenueDisabled(self.venue.clone()));
        }
        if global_safe_mode || self.safe_mode {
            return Err(ReserveError::SafeModeActive {
                venue: self.venue.clone(),
            });
        }

        let per_job_cap = self.per_job_cap(limits);
        if amount > per_job_cap {
            return Err(ReserveError::OverPerJobCap {
                venue: self.venue.clone(),
                amount,
                cap: per_job_cap,
            });
        }

        let total_cap = self.total_cap(limits);
        if self.in_flight + amount > total_cap {
            return Err(ReserveError::OverTotalCap {
                venue: self.venue.clone(),
                in_flight: self.in_flight,
                amount,
                cap: total_cap,
            });
        }

        let used = self.used(tier);
        let budget = self.budget(tier);
        if used + amount > budget {
            return Err(ReserveError::TierExhausted {
                venue: self.venue.clone(),
                tier,
                used,
                amount,
                budget,
            });
        }

        Ok(())
    }

    /// Commit a reservation that already passed [`check`](Self::check).
    pub(crate) fn debit(&mut self, tier: CapitalTier, amount: Amount) {
        self.used[tier.index()] += amount;
        self.in_flight += amount;
    }

    pub(crate) fn credit(&mut self, tier: CapitalTier, amount: Amount) {
        let slot = &mut self.used[tier.index()];
        *slot = (*slot - amount).max(Decimal::ZERO);
        self.in_flight = (self.in_flight - amount).max(Decimal::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn state(equity: Decimal) -> VenueCapitalState {
        VenueCapitalState::new(VenueId::from("binance"), equity, &TierSplit::default())
    }

    #[test]
    fn budgets_follow_split() {
        let s = state(dec!(100000));
        assert_eq!(s.budget(CapitalTier::Reserve), dec!(20000));
        assert_eq!(s.budget(CapitalTier::Wash), dec!(30000));
        assert_eq!(s.budget(CapitalTier::Arb), dec!(50000));
    }

    #[test]
    fn rescale_keeps_reserved_amounts() {
        let mut s = state(dec!(100000));
        s.debit(CapitalTier::Arb, dec!(5000));
        s.rescale(dec!(50000), &TierSplit::default());

        assert_eq!(s.budget(CapitalTier::Arb), dec!(25000));
        assert_eq!(s.used(CapitalTier::Arb), dec!(5000));
        assert_eq!(s.in_flight(), dec!(5000));
    }

    #[test]
    fn check_orders_failures() {
        let limits = CapitalConfig::default();
        let mut s = state(dec!(100000));

        assert!(matches!(
            s.check(CapitalTier::Arb, dec!(10001), &limits, false),
            Err(ReserveError::OverPerJobCap { .. })
        ));

        s.debit(CapitalTier::Arb, dec!(25000));
        assert!(matches!(
            s.check(CapitalTier::Arb, dec!(5001), &limits, false),
            Err(ReserveError::OverTotalCap { .. })
        ));

        assert!(matches!(
            s.check(CapitalTier::Arb, dec!(100), &limits, true),
            Err(ReserveError::SafeModeActive { .. })
        ));
    }

    #[test]
    fn tier_budget_binds_before_total_cap() {
        let limits = CapitalConfig::default();
        let mut s = state(dec!(100000));
        s.debit(CapitalTier::Reserve, dec!(15000));

        assert!(matches!(
            s.check(CapitalTier::Reserve, dec!(6000), &limits, false),
            Err(ReserveError::TierExhausted {
                tier: CapitalTier::Reserve,
                ..
            })
        ));
        assert!(s.check(CapitalTier::Wash, dec!(6000), &limits, false).is_ok());
    }

    #[test]
    fn disabled_venue_refuses() {
        let mut s = state(dec!(100000));
        s.set_enabled(false);
        assert!(matches!(
            s.check(CapitalTier::Wash, dec!(1), &CapitalConfig::default(), false),
            Err(ReserveError::VenueDisabled(_))
        ));
    }

    #[test]
    fn credit_never_goes_negative() {
        let mut s = state(dec!(1000));
        s.debit(CapitalTier::Wash, dec!(10));
        s.credit(CapitalTier::Wash, dec!(25));
        assert_eq!(s.used(CapitalTier::Wash), Decimal::ZERO);
        assert_eq!(s.in_flight(), Decimal::ZERO);
    }
}
