//! Wires the ledger, the risk evaluator, the scheduler and the monitor.

use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::risk::HaltReason;
use crate::application::{
    Admission, CapitalLedger, JobScheduler, MonitoringAggregator, RiskEvaluator, SchedulerDeps,
    Snapshot, StatusFileWriter, WithdrawResult,
};
use crate::config::Config;
use crate::domain::{Amount, HedgeJob, JobId, JobStatus, RiskMode, VenueId};
use crate::error::{ConfigError, EquityError, Result, SubmitError};
use crate::port::{Clock, JobExecutor, MarketDataSource, SystemClock};

/// What one maintenance pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub reclaimed: Vec<JobId>,
    pub admitted: usize,
    /// A daily-loss halt was cleared by the period rollover.
    pub halt_cleared: bool,
}

/// Owner of the admission core and the operator surface.
pub struct Coordinator {
    config: Config,
    ledger: Arc<CapitalLedger>,
    risk: Arc<RiskEvaluator>,
    scheduler: JobScheduler,
    monitor: MonitoringAggregator,
    clock: Arc<dyn Clock>,
    status_file: Option<StatusFileWriter>,
}

impl Coordinator {
    #[must_use]
    pub fn builder(config: Config) -> CoordinatorBuilder {
        CoordinatorBuilder {
            config,
            executor: None,
            market: None,
            clock: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<CapitalLedger> {
        &self.ledger
    }

    #[must_use]
    pub fn risk(&self) -> &Arc<RiskEvaluator> {
        &self.risk
    }

    #[must_use]
    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    /// Submit a job for admission.
    ///
    /// # Errors
    ///
    /// See [`JobScheduler::submit_job`].
    pub fn submit_job(&self, job: HedgeJob) -> std::result::Result<Admission, SubmitError> {
        self.scheduler.submit_job(job)
    }

    pub fn withdraw_job(&self, job_id: &JobId) -> WithdrawResult {
        self.scheduler.withdraw_job(job_id)
    }

    #[must_use]
    pub fn job_status(&self, job_id: &JobId) -> Option<JobStatus> {
        self.scheduler.job_status(job_id)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.monitor.snapshot()
    }

    /// Replace a venue's equity.
    ///
    /// # Errors
    ///
    /// Negative equity is rejected.
    pub fn update_equity(
        &self,
        venue: &VenueId,
        equity: Amount,
    ) -> std::result::Result<(), EquityError> {
        self.ledger.update_equity(venue, equity)
    }

    pub fn set_safe_mode(&self, on: bool) {
        self.ledger.set_safe_mode(on);
    }

    pub fn set_venue_safe_mode(&self, venue: &VenueId, on: bool) -> bool {
        self.ledger.set_venue_safe_mode(venue, on)
    }

    pub fn set_venue_enabled(&self, venue: &VenueId, on: bool) -> bool {
        self.ledger.set_venue_enabled(venue, on)
    }

    /// Clear a circuit-breaker halt and retry the queue.
    pub fn clear_halt(&self) -> Option<HaltReason> {
        let cleared = self.risk.clear_halt();
        if cleared.is_some() {
            self.scheduler.tick();
        }
        cleared
    }

    pub fn grant_override(&self, job_id: JobId) {
        self.risk.grant_override(job_id);
    }

    pub fn revoke_override(&self, job_id: &JobId) -> bool {
        self.risk.revoke_override(job_id)
    }

    pub fn set_risk_mode(&self, mode: RiskMode) {
        self.risk.set_mode(mode);
    }

    /// Roll the loss period, reclaim stuck jobs, admit queued jobs and
    /// refresh the status file.
    pub fn maintain(&self) -> MaintenanceReport {
        let halt_cleared = self.risk.roll_period(self.clock.now());
        let reclaimed = self.scheduler.reclaim_stuck_jobs();
        let admitted = self.scheduler.tick();

        if let Some(writer) = &self.status_file {
            if let Err(e) = writer.write(&self.snapshot()) {
                warn!(error = %e, path = %writer.path().display(), "Failed to write status file");
            }
        }

        if !reclaimed.is_empty() || admitted > 0 || halt_cleared {
            debug!(
                reclaimed = reclaimed.len(),
                admitted,
                halt_cleared,
                "Maintenance pass"
            );
        }
        MaintenanceReport {
            reclaimed,
            admitted,
            halt_cleared,
        }
    }

    /// Run maintenance every `tick_interval` until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.config.scheduler.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.maintain();
                }
            }
        }
        info!("Maintenance loop stopped");
    }

    /// Run maintenance until nothing is running or queued.
    ///
    /// Queued jobs that can never be funded keep this waiting; pair it with a
    /// shutdown signal.
    pub async fn drain(&self) {
        let mut ticker = interval(self.config.scheduler.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !self.scheduler.is_idle() {
            ticker.tick().await;
            self.maintain();
        }
    }
}

/// Builder for [`Coordinator`].
pub struct CoordinatorBuilder {
    config: Config,
    executor: Option<Arc<dyn JobExecutor>>,
    market: Option<Arc<dyn MarketDataSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoordinatorBuilder {
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn JobExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    #[must_use]
    pub fn market(mut self, market: Arc<dyn MarketDataSource>) -> Self {
        self.market = Some(market);
        self
    }

    /// Defaults to the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the coordinator and seed the ledger from `[venues]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] without an executor or a market
    /// source, and an equity error for a negative configured equity.
    #[allow(clippy::result_large_err)]
    pub fn build(self) -> Result<Coordinator> {
        let executor = self
            .executor
            .ok_or(ConfigError::MissingField { field: "executor" })?;
        let market = self
            .market
            .ok_or(ConfigError::MissingField { field: "market" })?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let executor_name = executor.name();
        let config = self.config;

        let ledger = Arc::new(CapitalLedger::new(config.capital.clone()));
        let risk = Arc::new(RiskEvaluator::new(
            config.risk.clone(),
            config.circuit_breaker.clone(),
            clock.now(),
        ));
        let scheduler = JobScheduler::new(
            config.scheduler.clone(),
            SchedulerDeps {
                ledger: Arc::clone(&ledger),
                risk: Arc::clone(&risk),
                executor,
                market: Arc::clone(&market),
                clock: Arc::clone(&clock),
            },
        );

        for (name, venue) in &config.venues {
            let id = VenueId::from(name.as_str());
            ledger.update_equity(&id, venue.equity.unwrap_or(Decimal::ZERO))?;
            if !venue.enabled {
                ledger.set_venue_enabled(&id, false);
            }
            if let Some(ceiling) = venue.max_concurrent {
                scheduler.set_venue_ceiling(id, ceiling);
            }
        }

        let monitor = MonitoringAggregator::new(
            scheduler.clone(),
            market,
            Arc::clone(&clock),
            config.monitoring.lock_timeout(),
        );
        let status_file = config
            .monitoring
            .status_file
            .as_ref()
            .map(|path| StatusFileWriter::new(path.clone()));

        info!(
            venues = config.venues.len(),
            mode = %risk.mode(),
            executor = executor_name,
            "Coordinator ready"
        );

        Ok(Coordinator {
            config,
            ledger,
            risk,
            scheduler,
            monitor,
            clock,
            status_file,
        })
    }
}
