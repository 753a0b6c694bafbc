//! Job scheduler.
//!
//! Owns the job lifecycle: risk gating, capital reservation, dispatch to the
//! executor, the pending queue and the concurrency ceilings. All state
//! transitions serialise on one mutex; the executor future is spawned only
//! after that mutex is released and reports back through
//! [`JobScheduler::on_job_result`].

mod queue;
mod state;

pub use state::{DailyStats, RunningJobSummary, SchedulerStatus};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::application::ledger::CapitalLedger;
use crate::application::risk::{RiskEvaluator, RiskInputs};
use crate::config::SchedulerConfig;
use crate::domain::{
    HedgeJob, JobId, JobOutcome, JobStatus, RejectionClass, RiskDecision, RiskEvaluation,
    ValidationError, VenueId,
};
use crate::error::{SchedulerError, SubmitError};
use crate::port::{Clock, JobExecutor, MarketDataSource};
use state::{RunningJob, SchedulerState};

/// How an accepted submission proceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Capital reserved and the job dispatched.
    Admitted,
    /// Waiting for a concurrency slot. Holds no capital.
    Queued,
}

/// Result of [`JobScheduler::withdraw_job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawResult {
    Withdrawn,
    NotFound,
}

/// Collaborators the scheduler drives.
#[derive(Clone)]
pub struct SchedulerDeps {
    pub ledger: Arc<CapitalLedger>,
    pub risk: Arc<RiskEvaluator>,
    pub executor: Arc<dyn JobExecutor>,
    pub market: Arc<dyn MarketDataSource>,
    pub clock: Arc<dyn Clock>,
}

struct Inner {
    config: SchedulerConfig,
    deps: SchedulerDeps,
    state: Mutex<SchedulerState>,
}

/// Cloneable handle to the scheduler.
///
/// Methods that may dispatch a job spawn onto the current Tokio runtime and
/// must be called from within one.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Inner>,
}

impl JobScheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig, deps: SchedulerDeps) -> Self {
        let state = SchedulerState::new(config.terminal_history, deps.clock.now());
        Self {
            inner: Arc::new(Inner {
                config,
                deps,
                state: Mutex::new(state),
            }),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<CapitalLedger> {
        &self.inner.deps.ledger
    }

    #[must_use]
    pub fn risk(&self) -> &Arc<RiskEvaluator> {
        &self.inner.deps.risk
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Override the concurrency ceiling of one venue.
    pub fn set_venue_ceiling(&self, venue: VenueId, ceiling: usize) {
        self.inner.state.lock().venue_ceilings.insert(venue, ceiling);
    }

    /// Validate, risk-check and either dispatch or queue `job`.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Validation`] for a malformed or duplicate job
    /// - [`SubmitError::SafeModeActive`] while the circuit breaker or safe mode blocks admission
    /// - [`SubmitError::RiskRejected`] for hard-threshold and score rejections
    /// - [`SubmitError::CapitalExhausted`] when the ledger cannot fund the job
    ///
    /// Every error leaves the ledger and the scheduler untouched.
    pub fn submit_job(&self, job: HedgeJob) -> Result<Admission, SubmitError> {
        job.validate()?;
        if self.inner.state.lock().knows(job.id()) {
            return Err(ValidationError::DuplicateJob(job.id().clone()).into());
        }

        let inputs = self.risk_inputs(&job);
        let evaluation = self.inner.deps.risk.evaluate(&job, &inputs);
        if !evaluation.is_admissible() {
            return Err(rejection_error(evaluation));
        }
        let score = evaluation.final_score;
        let overridden = evaluation.decision == RiskDecision::Override;

        let deps = &self.inner.deps;
        let mut state = self.inner.state.lock();
        if state.knows(job.id()) {
            return Err(ValidationError::DuplicateJob(job.id().clone()).into());
        }

        let has_slot = state.running.len() < self.inner.config.max_concurrent_jobs
            && state.venues_have_headroom(&job, self.inner.config.max_concurrent_per_venue)
            && !deps.risk.is_halted();

        if !has_slot {
            deps.ledger
                .check_job(&job)
                .map_err(SubmitError::CapitalExhausted)?;
            if overridden && !deps.risk.consume_override(job.id()) {
                return Err(override_revoked(evaluation));
            }
            info!(
                job_id = %job.id(),
                score,
                pending = state.queue.len() + 1,
                "Job queued, concurrency ceiling reached"
            );
            state.enqueue(job, score);
            return Ok(Admission::Queued);
        }

        let tickets = deps
            .ledger
            .reserve_for_job(&job)
            .map_err(SubmitError::CapitalExhausted)?;
        if overridden && !deps.risk.consume_override(job.id()) {
            deps.ledger.release_all(&tickets);
            return Err(override_revoked(evaluation));
        }
        info!(
            job_id = %job.id(),
            strategy = %job.strategy(),
            notional = %job.notional(),
            score,
            "Job admitted"
        );
        state.start(job.clone(), tickets, deps.clock.now(), score);
        drop(state);

        self.spawn_execution(job);
        Ok(Admission::Admitted)
    }

    /// Admit queued jobs while headroom and capital allow.
    ///
    /// Returns the number of jobs dispatched.
    pub fn tick(&self) -> usize {
        let admitted = {
            let mut state = self.inner.state.lock();
            self.admit_pending(&mut state)
        };
        let count = admitted.len();
        for job in admitted {
            self.spawn_execution(job);
        }
        count
    }

    /// Settle a running job: release its capital, record the outcome, then tick.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::UnknownJob`] if `job_id` is not running; nothing changes.
    pub fn on_job_result(&self, job_id: &JobId, outcome: JobOutcome) -> Result<(), SchedulerError> {
        let admitted = {
            let mut state = self.inner.state.lock();
            let running = state
                .running
                .remove(job_id)
                .ok_or_else(|| SchedulerError::UnknownJob(job_id.clone()))?;
            self.settle(&mut state, &running, &outcome);
            self.admit_pending(&mut state)
        };
        for job in admitted {
            self.spawn_execution(job);
        }
        Ok(())
    }

    /// Fail every job running longer than `max_hold` and release its capital.
    ///
    /// Returns the reclaimed job ids.
    pub fn reclaim_stuck_jobs(&self) -> Vec<JobId> {
        let now = self.inner.deps.clock.now();
        let max_hold = self.inner.config.max_hold();

        let (reclaimed, admitted) = {
            let mut state = self.inner.state.lock();
            let mut stuck: Vec<(JobId, Duration)> = state
                .running
                .values()
                .filter_map(|r| {
                    let held = (now - r.admitted_at).to_std().ok()?;
                    (held > max_hold).then(|| (r.job.id().clone(), held))
                })
                .collect();
            stuck.sort();

            for (id, held) in &stuck {
                let Some(running) = state.running.remove(id) else {
                    continue;
                };
                warn!(
                    job_id = %id,
                    held_secs = held.as_secs(),
                    max_hold_secs = max_hold.as_secs(),
                    "Reclaiming stuck job"
                );
                self.settle(&mut state, &running, &JobOutcome::reclaimed(*held));
            }

            let admitted = if stuck.is_empty() {
                Vec::new()
            } else {
                self.admit_pending(&mut state)
            };
            (stuck.into_iter().map(|(id, _)| id).collect::<Vec<_>>(), admitted)
        };

        for job in admitted {
            self.spawn_execution(job);
        }
        reclaimed
    }

    /// Remove a queued job. Running and finished jobs are not withdrawable.
    pub fn withdraw_job(&self, job_id: &JobId) -> WithdrawResult {
        let mut state = self.inner.state.lock();
        if state.queue.remove(job_id).is_none() {
            return WithdrawResult::NotFound;
        }
        state.record_terminal(job_id.clone(), JobStatus::Withdrawn);
        info!(job_id = %job_id, "Job withdrawn");
        WithdrawResult::Withdrawn
    }

    #[must_use]
    pub fn job_status(&self, job_id: &JobId) -> Option<JobStatus> {
        self.inner.state.lock().status(job_id)
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.inner.state.lock().running.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Whether nothing is running or queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        state.running.is_empty() && state.queue.is_empty()
    }

    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        let now = self.inner.deps.clock.now();
        self.inner.state.lock().snapshot(now)
    }

    /// Like [`status`](Self::status), but gives up after `timeout`.
    #[must_use]
    pub fn try_status(&self, timeout: Duration) -> Option<SchedulerStatus> {
        let now = self.inner.deps.clock.now();
        let state = self.inner.state.try_lock_for(timeout)?;
        Some(state.snapshot(now))
    }

    fn settle(&self, state: &mut SchedulerState, running: &RunningJob, outcome: &JobOutcome) {
        let deps = &self.inner.deps;
        let now = deps.clock.now();

        let released = deps.ledger.release_all(&running.tickets);
        if released != running.tickets.len() {
            warn!(
                job_id = %running.job.id(),
                released,
                held = running.tickets.len(),
                "Not every reservation was released"
            );
        }

        deps.risk
            .record_outcome(outcome.is_success(), outcome.realized_pnl, now);
        state.finish(running, outcome, now);

        match &outcome.failure {
            None => info!(
                job_id = %running.job.id(),
                pnl = %outcome.realized_pnl,
                volume = %outcome.realized_volume,
                "Job completed"
            ),
            Some(reason) => warn!(job_id = %running.job.id(), reason = %reason, "Job failed"),
        }
    }

    fn admit_pending(&self, state: &mut SchedulerState) -> Vec<HedgeJob> {
        let deps = &self.inner.deps;
        let config = &self.inner.config;
        if state.queue.is_empty() {
            return Vec::new();
        }
        if deps.risk.is_halted() {
            debug!(pending = state.queue.len(), "Circuit breaker tripped, queue held");
            return Vec::new();
        }

        let now = deps.clock.now();
        let mut admitted = Vec::new();
        for key in state.queue.keys() {
            if state.running.len() >= config.max_concurrent_jobs {
                break;
            }
            let Some(entry) = state.queue.get(&key) else {
                continue;
            };
            if !state.venues_have_headroom(&entry.job, config.max_concurrent_per_venue) {
                debug!(job_id = %entry.job.id(), "Venue at capacity, job stays queued");
                continue;
            }
            let tickets = match deps.ledger.reserve_for_job(&entry.job) {
                Ok(tickets) => tickets,
                Err(e) => {
                    debug!(job_id = %entry.job.id(), error = %e, "Reservation failed, job stays queued");
                    continue;
                }
            };
            let Some(entry) = state.queue.take(&key) else {
                continue;
            };
            info!(job_id = %entry.job.id(), score = entry.score, "Queued job admitted");
            state.start(entry.job.clone(), tickets, now, entry.score);
            admitted.push(entry.job);
        }
        admitted
    }

    fn risk_inputs(&self, job: &HedgeJob) -> RiskInputs {
        let deps = &self.inner.deps;
        let mut inputs = RiskInputs::empty(deps.clock.now());
        inputs.global_safe_mode = deps.ledger.is_safe_mode();

        for venue in job.venues() {
            if let Some(mut snapshot) = deps.market.snapshot(&venue, job.symbol()) {
                snapshot.latency_ms = snapshot.latency_ms.max(deps.market.latency_ms(&venue));
                inputs.markets.insert(venue.clone(), snapshot);
            }
            if let Some(capital) = deps.ledger.venue(&venue) {
                inputs.equity.insert(venue.clone(), capital.equity());
                if capital.is_safe_mode() {
                    inputs.safe_mode_venues.insert(venue.clone());
                }
                if !capital.is_enabled() {
                    inputs.disabled_venues.insert(venue);
                }
            }
        }
        inputs
    }

    /// Run the executor off the scheduler lock and feed its outcome back.
    fn spawn_execution(&self, job: HedgeJob) {
        let scheduler = self.clone();
        let executor = Arc::clone(&self.inner.deps.executor);
        tokio::spawn(async move {
            let job_id = job.id().clone();
            debug!(job_id = %job_id, executor = executor.name(), "Dispatching job");
            let outcome = executor.execute(job).await;
            if let Err(e) = scheduler.on_job_result(&job_id, outcome) {
                warn!(error = %e, "Late outcome ignored");
            }
        });
    }
}

fn override_revoked(evaluation: RiskEvaluation) -> SubmitError {
    let mut reasons = evaluation.reasons;
    reasons.push("override revoked during admission".to_string());
    SubmitError::RiskRejected { reasons }
}

fn rejection_error(evaluation: RiskEvaluation) -> SubmitError {
    match evaluation.rejection {
        Some(RejectionClass::CircuitBreaker | RejectionClass::SafeMode) => {
            SubmitError::SafeModeActive {
                reason: evaluation.summary(),
            }
        }
        _ => SubmitError::RiskRejected {
            reasons: evaluation.reasons,
        },
    }
}
