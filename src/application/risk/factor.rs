//! Pure scoring functions over a job, its market inputs and a profile.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::profile::RiskProfile;
use crate::domain::{Amount, FactorScores, HedgeJob, MarketSnapshot, RejectionClass, VenueId};

/// Everything outside the job that a risk evaluation looks at.
#[derive(Debug, Clone)]
pub struct RiskInputs {
    pub now: DateTime<Utc>,
    /// Latest snapshot for the job's symbol, per venue.
    pub markets: BTreeMap<VenueId, MarketSnapshot>,
    /// Ledger equity per venue.
    pub equity: BTreeMap<VenueId, Amount>,
    pub global_safe_mode: bool,
    pub safe_mode_venues: BTreeSet<VenueId>,
    pub disabled_venues: BTreeSet<VenueId>,
}

impl RiskInputs {
    /// Inputs with no market data, equity or flags.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            now,
            markets: BTreeMap::new(),
            equity: BTreeMap::new(),
            global_safe_mode: false,
            safe_mode_venues: BTreeSet::new(),
            disabled_venues: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_market(mut self, snapshot: MarketSnapshot) -> Self {
        self.markets.insert(snapshot.venue.clone(), snapshot);
        self
    }

    #[must_use]
    pub fn with_equity(mut self, venue: impl Into<VenueId>, equity: Amount) -> Self {
        self.equity.insert(venue.into(), equity);
        self
    }
}

/// Hard-threshold violations, in reporting order.
pub(crate) fn hard_violations(
    job: &HedgeJob,
    inputs: &RiskInputs,
    profile: &RiskProfile,
) -> Vec<(RejectionClass, String)> {
    let venues = job.venues();
    let mut violations = Vec::new();

    if inputs.global_safe_mode {
        violations.push((RejectionClass::SafeMode, "global safe mode active".to_string()));
    }
    for venue in venues.iter().filter(|v| inputs.safe_mode_venues.contains(*v)) {
        violations.push((
            RejectionClass::SafeMode,
            format!("safe mode active on {venue}"),
        ));
    }
    for venue in venues.iter().filter(|v| inputs.disabled_venues.contains(*v)) {
        violations.push((
            RejectionClass::HardThreshold,
            format!("venue {venue} is disabled"),
        ));
    }

    for venue in &venues {
        let Some(snapshot) = inputs.markets.get(venue) else {
            violations.push((
                RejectionClass::HardThreshold,
                format!("no market data for {venue}"),
            ));
            continue;
        };

        let age = snapshot.age_ms(inputs.now);
        if age > i64::try_from(profile.staleness_ms).unwrap_or(i64::MAX) {
            violations.push((
                RejectionClass::HardThreshold,
                format!(
                    "market data for {venue} is {age}ms old (max {}ms)",
                    profile.staleness_ms
                ),
            ));
        } else if -age > i64::try_from(profile.max_clock_skew_ms).unwrap_or(i64::MAX) {
            violations.push((
                RejectionClass::HardThreshold,
                format!(
                    "market data for {venue} is stamped {}ms ahead of the clock (max skew {}ms)",
                    -age, profile.max_clock_skew_ms
                ),
            ));
        }
        match snapshot.latency_ms {
            None => violations.push((
                RejectionClass::HardThreshold,
                format!("no latency measurement for {venue}"),
            )),
            Some(latency) if latency > profile.max_latency_ms => violations.push((
                RejectionClass::HardThreshold,
                format!("latency on {venue} {latency}ms > {}ms", profile.max_latency_ms),
            )),
            Some(_) => {}
        }
        let funding = snapshot.funding_bps();
        if funding > profile.emergency_funding_bps {
            violations.push((
                RejectionClass::HardThreshold,
                format!(
                    "funding on {venue} {funding:.1}bps > emergency {:.1}bps",
                    profile.emergency_funding_bps
                ),
            ));
        }
    }

    violations
}

/// Unweighted penalties, the worst participating venue winning per factor.
///
/// Venues without a snapshot are skipped; the hard checks reject those jobs
/// before scoring matters.
pub(crate) fn penalties(job: &HedgeJob, inputs: &RiskInputs, profile: &RiskProfile) -> FactorScores {
    let notional = job.notional();
    let mut worst = FactorScores::default();

    for venue in job.venues() {
        let Some(snapshot) = inputs.markets.get(&venue) else {
            continue;
        };
        let equity = inputs.equity.get(&venue).copied().unwrap_or(Decimal::ZERO);

        let venue_penalties = FactorScores {
            funding: normalize(snapshot.funding_bps(), profile.funding_threshold_bps),
            slippage: normalize(
                expected_slippage_bps(snapshot, notional).unwrap_or(f64::INFINITY),
                profile.max_slippage_bps,
            ),
            latency: normalize(
                snapshot.latency_ms.map_or(f64::INFINITY, |ms| ms as f64),
                profile.max_latency_ms as f64,
            ),
            volatility: normalize(snapshot.volatility, profile.volatility_threshold),
            leverage: normalize(
                ratio(notional, equity).unwrap_or(f64::INFINITY),
                profile.max_leverage,
            ),
        };

        worst.funding = worst.funding.max(venue_penalties.funding);
        worst.slippage = worst.slippage.max(venue_penalties.slippage);
        worst.latency = worst.latency.max(venue_penalties.latency);
        worst.volatility = worst.volatility.max(venue_penalties.volatility);
        worst.leverage = worst.leverage.max(venue_penalties.leverage);
    }

    worst
}

/// `1 - max(weight * penalty)` over all factors.
pub(crate) fn safety_score(penalties: &FactorScores, profile: &RiskProfile) -> f64 {
    let weights = profile.weights.iter();
    let worst = penalties
        .iter()
        .iter()
        .zip(weights.iter())
        .map(|((_, penalty), (_, weight))| penalty * weight)
        .fold(0.0_f64, f64::max);
    (1.0 - worst).clamp(0.0, 1.0)
}

/// Opportunity score in `[0, 1)`, increasing in estimated volume and expected edge.
pub(crate) fn volume_score(job: &HedgeJob, profile: &RiskProfile) -> f64 {
    let volume = job.estimated_volume().to_f64().unwrap_or(0.0).max(0.0);
    let edge = job.expected_edge_bps().max(0.0);
    let volume_part = 1.0 - (-volume / profile.volume_scale).exp();
    let edge_part = 1.0 - (-edge / profile.edge_scale_bps).exp();
    0.5 * volume_part + 0.5 * edge_part
}

/// Half the quoted spread plus the notional's share of visible depth, in bps.
fn expected_slippage_bps(snapshot: &MarketSnapshot, notional: Amount) -> Option<f64> {
    let spread = snapshot.spread_bps()?;
    let impact = ratio(notional, snapshot.depth)? * 100.0;
    Some(spread / 2.0 + impact)
}

fn ratio(numerator: Amount, denominator: Amount) -> Option<f64> {
    if denominator <= Decimal::ZERO {
        return None;
    }
    numerator.checked_div(denominator)?.to_f64()
}

/// `value / limit` clamped to `[0, 1]`; anything unmeasurable saturates.
fn normalize(value: f64, limit: f64) -> f64 {
    let scaled = value / limit;
    if scaled.is_nan() {
        return 1.0;
    }
    scaled.clamp(0.0, 1.0)
}
