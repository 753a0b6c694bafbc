//! Risk evaluator: hard thresholds, weighted scoring and operator overrides.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::breaker::{BreakerStatus, CircuitBreaker, HaltReason};
use super::factor::{self, RiskInputs};
use super::profile::RiskProfile;
use crate::config::{CircuitBreakerConfig, RiskConfig};
use crate::domain::{
    Amount, FactorScores, HedgeJob, JobId, RejectionClass, RiskDecision, RiskEvaluation, RiskMode,
};

/// Counters exposed to monitoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStatus {
    pub mode: RiskMode,
    pub breaker: BreakerStatus,
    /// Jobs holding an unused override grant.
    pub override_grants: Vec<JobId>,
}

/// Scores jobs against market conditions and owns the circuit breaker.
pub struct RiskEvaluator {
    config: RiskConfig,
    profile: RwLock<RiskProfile>,
    breaker: CircuitBreaker,
    overrides: Mutex<HashSet<JobId>>,
}

impl RiskEvaluator {
    #[must_use]
    pub fn new(config: RiskConfig, breaker: CircuitBreakerConfig, now: DateTime<Utc>) -> Self {
        Self {
            profile: RwLock::new(RiskProfile::from_config(&config)),
            config,
            breaker: CircuitBreaker::new(breaker, now),
            overrides: Mutex::new(HashSet::new()),
        }
    }

    /// Evaluate `job` with the current profile.
    ///
    /// A soft rejection becomes [`RiskDecision::Override`] while the job holds a
    /// grant. The grant stays in place until [`Self::consume_override`].
    pub fn evaluate(&self, job: &HedgeJob, inputs: &RiskInputs) -> RiskEvaluation {
        let profile = self.profile.read().clone();
        self.evaluate_with(job, inputs, &profile)
    }

    /// Evaluate `job` against an explicit profile.
    pub fn evaluate_with(
        &self,
        job: &HedgeJob,
        inputs: &RiskInputs,
        profile: &RiskProfile,
    ) -> RiskEvaluation {
        let mut hard = Vec::new();
        if let Some(halt) = self.breaker.halt() {
            hard.push((
                RejectionClass::CircuitBreaker,
                format!("circuit breaker tripped: {halt}"),
            ));
        }
        hard.extend(factor::hard_violations(job, inputs, profile));

        if let Some((class, _)) = hard.first() {
            let class = *class;
            let reasons: Vec<String> = hard.into_iter().map(|(_, reason)| reason).collect();
            warn!(
                job_id = %job.id(),
                class = ?class,
                reasons = %reasons.join("; "),
                "Job hard rejected"
            );
            return RiskEvaluation {
                job_id: job.id().clone(),
                penalties: FactorScores::default(),
                safety_score: 0.0,
                volume_score: 0.0,
                final_score: 0.0,
                decision: RiskDecision::Reject,
                rejection: Some(class),
                reasons,
            };
        }

        let penalties = factor::penalties(job, inputs, profile);
        let safety_score = factor::safety_score(&penalties, profile);
        let volume_score = factor::volume_score(job, profile);
        let final_score =
            profile.safety_weight * safety_score + profile.volume_weight * volume_score;

        let mut reasons = Vec::new();
        if final_score < profile.min_final_score {
            reasons.push(format!(
                "final score {final_score:.3} below minimum {:.3}",
                profile.min_final_score
            ));
        }
        if safety_score < profile.min_safety_score {
            reasons.push(format!(
                "safety score {safety_score:.3} below minimum {:.3}",
                profile.min_safety_score
            ));
        }

        let (decision, rejection) = if reasons.is_empty() {
            (RiskDecision::Accept, None)
        } else if self.overrides.lock().contains(job.id()) {
            warn!(job_id = %job.id(), reasons = %reasons.join("; "), "Soft rejection overridden");
            (RiskDecision::Override, Some(RejectionClass::SoftScore))
        } else {
            debug!(job_id = %job.id(), reasons = %reasons.join("; "), "Job soft rejected");
            (RiskDecision::Reject, Some(RejectionClass::SoftScore))
        };

        debug!(
            job_id = %job.id(),
            safety = safety_score,
            volume = volume_score,
            final_score,
            decision = ?decision,
            "Job evaluated"
        );

        RiskEvaluation {
            job_id: job.id().clone(),
            penalties,
            safety_score,
            volume_score,
            final_score,
            decision,
            rejection,
            reasons,
        }
    }

    /// Let `job_id` through its next soft rejection.
    pub fn grant_override(&self, job_id: JobId) {
        info!(job_id = %job_id, "Override granted");
        self.overrides.lock().insert(job_id);
    }

    /// Withdraw an unused grant. Returns `false` if there was none.
    pub fn revoke_override(&self, job_id: &JobId) -> bool {
        let removed = self.overrides.lock().remove(job_id);
        if removed {
            info!(job_id = %job_id, "Override revoked");
        }
        removed
    }

    /// Use up the grant once the overridden job has been admitted or queued.
    /// Returns `false` if the grant was revoked in the meantime.
    pub fn consume_override(&self, job_id: &JobId) -> bool {
        let consumed = self.overrides.lock().remove(job_id);
        if consumed {
            debug!(job_id = %job_id, "Override consumed");
        }
        consumed
    }

    #[must_use]
    pub fn has_override(&self, job_id: &JobId) -> bool {
        self.overrides.lock().contains(job_id)
    }

    /// Feed a finished job to the circuit breaker.
    pub fn record_outcome(
        &self,
        success: bool,
        realized_pnl: Amount,
        now: DateTime<Utc>,
    ) -> Option<HaltReason> {
        self.breaker.record_outcome(success, realized_pnl, now)
    }

    pub fn clear_halt(&self) -> Option<HaltReason> {
        self.breaker.clear_halt()
    }

    pub fn roll_period(&self, now: DateTime<Utc>) -> bool {
        self.breaker.roll_period(now)
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.breaker.is_tripped()
    }

    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    #[must_use]
    pub fn profile(&self) -> RiskProfile {
        self.profile.read().clone()
    }

    #[must_use]
    pub fn mode(&self) -> RiskMode {
        self.profile.read().mode
    }

    /// Switch mode, keeping configured thresholds and overrides.
    pub fn set_mode(&self, mode: RiskMode) {
        let profile = RiskProfile::for_mode(mode, &self.config);
        *self.profile.write() = profile;
        info!(mode = %mode, "Risk mode changed");
    }

    /// Monitoring view, or `None` if a lock could not be taken within `timeout`.
    #[must_use]
    pub fn try_status(&self, timeout: Duration) -> Option<RiskStatus> {
        let mode = self.profile.try_read_for(timeout)?.mode;
        let breaker = self.breaker.try_status(timeout)?;
        let mut override_grants: Vec<JobId> =
            self.overrides.try_lock_for(timeout)?.iter().cloned().collect();
        override_grants.sort();
        Some(RiskStatus {
            mode,
            breaker,
            override_grants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, MarketSnapshot, Side, StrategyKind, Symbol, VenueId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn evaluator() -> RiskEvaluator {
        RiskEvaluator::new(
            RiskConfig::default(),
            CircuitBreakerConfig::default(),
            Utc::now(),
        )
    }

    fn job(edge_bps: f64, volume: Decimal) -> HedgeJob {
        HedgeJob::builder()
            .id("job-1")
            .strategy(StrategyKind::Arbitrage)
            .symbol("ETH-PERP")
            .leg(Leg::new("binance", Side::Buy, dec!(1), "ETH-PERP"))
            .notional(dec!(1000))
            .expected_edge_bps(edge_bps)
            .estimated_volume(volume)
            .build()
            .unwrap()
    }

    fn inputs(volatility: f64) -> RiskInputs {
        let now = Utc::now();
        RiskInputs::empty(now)
            .with_market(MarketSnapshot {
                venue: VenueId::from("binance"),
                symbol: Symbol::from("ETH-PERP"),
                bid: dec!(1999.9),
                ask: dec!(2000.1),
                depth: dec!(500000),
                latency_ms: Some(40),
                funding_rate: 0.0001,
                volatility,
                observed_at: now,
            })
            .with_equity("binance", dec!(100000))
    }

    #[test]
    fn good_job_is_accepted() {
        let eval = evaluator().evaluate(&job(12.0, dec!(200000)), &inputs(0.005));
        assert_eq!(eval.decision, RiskDecision::Accept);
        assert!(eval.rejection.is_none());
        assert!(eval.final_score > 0.45);
    }

    #[test]
    fn tripped_breaker_rejects_first() {
        let evaluator = evaluator();
        let now = Utc::now();
        for _ in 0..3 {
            evaluator.record_outcome(false, Decimal::ZERO, now);
        }

        let eval = evaluator.evaluate(&job(12.0, dec!(200000)), &inputs(0.005));
        assert_eq!(eval.decision, RiskDecision::Reject);
        assert_eq!(eval.rejection, Some(RejectionClass::CircuitBreaker));
    }

    #[test]
    fn override_lifts_soft_rejection_once() {
        let evaluator = evaluator();
        // saturated volatility, no edge: weak job
        let weak = job(0.0, Decimal::ZERO);
        let inputs = inputs(0.5);

        assert_eq!(
            evaluator.evaluate(&weak, &inputs).rejection,
            Some(RejectionClass::SoftScore)
        );

        evaluator.grant_override(weak.id().clone());
        let eval = evaluator.evaluate(&weak, &inputs);
        assert_eq!(eval.decision, RiskDecision::Override);
        assert!(evaluator.has_override(weak.id()));
        assert!(evaluator.consume_override(weak.id()));
        assert!(!evaluator.consume_override(weak.id()));

        assert_eq!(evaluator.evaluate(&weak, &inputs).decision, RiskDecision::Reject);
    }

    #[test]
    fn override_does_not_lift_hard_rejection() {
        let evaluator = evaluator();
        let job = job(12.0, dec!(200000));
        evaluator.grant_override(job.id().clone());

        let mut inputs = inputs(0.005);
        inputs.disabled_venues.insert(VenueId::from("binance"));

        let eval = evaluator.evaluate(&job, &inputs);
        assert_eq!(eval.rejection, Some(RejectionClass::HardThreshold));
        assert!(evaluator.has_override(job.id()));
    }

    #[test]
    fn revoked_override_is_gone() {
        let evaluator = evaluator();
        evaluator.grant_override(JobId::from("job-9"));
        assert!(evaluator.revoke_override(&JobId::from("job-9")));
        assert!(!evaluator.revoke_override(&JobId::from("job-9")));
    }

    #[test]
    fn mode_switch_changes_thresholds_only() {
        let evaluator = evaluator();
        evaluator.set_mode(RiskMode::Aggressive);
        let profile = evaluator.profile();
        assert_eq!(profile.mode, RiskMode::Aggressive);
        assert_eq!(profile.max_latency_ms, 500);
    }
}
