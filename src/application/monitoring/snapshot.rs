//! Snapshot types served to external observers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::ledger::VenueCapitalState;
use crate::application::risk::{HaltReason, RiskStatus};
use crate::application::scheduler::{RunningJobSummary, SchedulerStatus};
use crate::config::CapitalConfig;
use crate::domain::{Amount, CapitalTier, JobId, RiskMode, VenueId};

/// Schema version of the serialized snapshot.
pub const SNAPSHOT_VERSION: &str = "1";

/// Overall state of admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// Jobs are being admitted.
    Active,
    /// Ledger safe mode blocks new reservations.
    SafeMode,
    /// The circuit breaker is tripped.
    Halted,
}

/// One subsystem's data and whether it could be read this time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    /// Set when `data` is the last known value rather than a fresh read.
    pub stale: bool,
    pub data: T,
}

impl<T> Section<T> {
    pub(crate) const fn fresh(data: T) -> Self {
        Self { stale: false, data }
    }

    pub(crate) const fn stale(data: T) -> Self {
        Self { stale: true, data }
    }
}

/// Complete monitoring snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: &'static str,
    pub taken_at: DateTime<Utc>,
    pub global: GlobalSection,
    pub venues: Section<Vec<VenueSnapshot>>,
    pub jobs: Section<JobsSection>,
    pub risk: Section<RiskSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSection {
    pub status: SystemStatus,
    pub risk_mode: RiskMode,
    pub volume_today: Amount,
    pub fees_today: Amount,
    pub pnl_today: Amount,
    pub daily_loss_used: Amount,
    pub daily_loss_limit: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierUsage {
    pub tier: CapitalTier,
    pub budget: Amount,
    pub used: Amount,
    pub available: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSnapshot {
    pub venue: VenueId,
    pub equity: Amount,
    pub in_flight: Amount,
    pub total_cap: Amount,
    pub per_job_cap: Amount,
    pub tiers: Vec<TierUsage>,
    pub safe_mode: bool,
    pub enabled: bool,
    pub latency_ms: Option<u64>,
    pub concurrent_jobs: usize,
    pub open_legs: usize,
}

impl VenueSnapshot {
    pub(crate) fn from_state(
        state: &VenueCapitalState,
        limits: &CapitalConfig,
        latency_ms: Option<u64>,
    ) -> Self {
        Self {
            venue: state.venue().clone(),
            equity: state.equity(),
            in_flight: state.in_flight(),
            total_cap: state.total_cap(limits),
            per_job_cap: state.per_job_cap(limits),
            tiers: CapitalTier::ALL
                .iter()
                .map(|&tier| TierUsage {
                    tier,
                    budget: state.budget(tier),
                    used: state.used(tier),
                    available: state.available(tier),
                })
                .collect(),
            safe_mode: state.is_safe_mode(),
            enabled: state.is_enabled(),
            latency_ms,
            concurrent_jobs: 0,
            open_legs: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobsSection {
    pub running: Vec<RunningJobSummary>,
    pub pending: usize,
    pub completed_today: u64,
    pub failed_today: u64,
    pub completed_total: u64,
    pub failed_total: u64,
}

impl From<&SchedulerStatus> for JobsSection {
    fn from(status: &SchedulerStatus) -> Self {
        Self {
            running: status.running.clone(),
            pending: status.pending,
            completed_today: status.today.completed,
            failed_today: status.today.failed,
            completed_total: status.completed_total,
            failed_total: status.failed_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSection {
    pub mode: RiskMode,
    pub consecutive_failures: u32,
    pub max_consecutive_failures: u32,
    pub auto_halt: bool,
    pub halt_reason: Option<HaltReason>,
    pub daily_loss: Amount,
    pub daily_loss_limit: Amount,
    /// Jobs holding an unused manual override.
    pub manual_overrides: Vec<JobId>,
}

impl Default for RiskSection {
    fn default() -> Self {
        Self {
            mode: RiskMode::default(),
            consecutive_failures: 0,
            max_consecutive_failures: 0,
            auto_halt: false,
            halt_reason: None,
            daily_loss: Decimal::ZERO,
            daily_loss_limit: Decimal::ZERO,
            manual_overrides: Vec::new(),
        }
    }
}

impl From<&RiskStatus> for RiskSection {
    fn from(status: &RiskStatus) -> Self {
        Self {
            mode: status.mode,
            consecutive_failures: status.breaker.consecutive_failures,
            max_consecutive_failures: status.breaker.max_consecutive_failures,
            auto_halt: status.breaker.halt.is_some(),
            halt_reason: status.breaker.halt.clone(),
            daily_loss: status.breaker.daily_loss,
            daily_loss_limit: status.breaker.daily_loss_limit,
            manual_overrides: status.override_grants.clone(),
        }
    }
}
