//! Read-only monitoring snapshots.
//!
//! The aggregator never blocks a subsystem for longer than its lock timeout.
//! A subsystem it cannot read in time is reported from the last successful
//! read, flagged `stale`.

mod snapshot;
mod status_file;

pub use snapshot::{
    GlobalSection, JobsSection, RiskSection, Section, Snapshot, SystemStatus, TierUsage,
    VenueSnapshot, SNAPSHOT_VERSION,
};
pub use status_file::StatusFileWriter;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::application::ledger::{CapitalLedger, VenueCapitalState};
use crate::application::risk::{RiskEvaluator, RiskStatus};
use crate::application::scheduler::{JobScheduler, SchedulerStatus};
use crate::domain::RiskMode;
use crate::port::{Clock, MarketDataSource};

#[derive(Default)]
struct LastKnown {
    venues: Option<Vec<VenueCapitalState>>,
    scheduler: Option<SchedulerStatus>,
    risk: Option<RiskStatus>,
}

/// Builds [`Snapshot`]s over the ledger, the evaluator and the scheduler.
pub struct MonitoringAggregator {
    ledger: Arc<CapitalLedger>,
    risk: Arc<RiskEvaluator>,
    scheduler: JobScheduler,
    market: Arc<dyn MarketDataSource>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    last_known: Mutex<LastKnown>,
}

impl MonitoringAggregator {
    #[must_use]
    pub fn new(
        scheduler: JobScheduler,
        market: Arc<dyn MarketDataSource>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger: Arc::clone(scheduler.ledger()),
            risk: Arc::clone(scheduler.risk()),
            scheduler,
            market,
            clock,
            timeout,
            last_known: Mutex::new(LastKnown::default()),
        }
    }

    /// Take a snapshot of every subsystem.
    pub fn snapshot(&self) -> Snapshot {
        let venues = self.ledger.try_venues(self.timeout);
        let scheduler = self.scheduler.try_status(self.timeout);
        let risk = self.risk.try_status(self.timeout);

        let mut last = self.last_known.lock();
        let (venues, venues_stale) = refresh(&mut last.venues, venues, "venues");
        let (scheduler, scheduler_stale) = refresh(&mut last.scheduler, scheduler, "scheduler");
        let (risk, risk_stale) = refresh(&mut last.risk, risk, "risk");
        drop(last);

        let global = self.global_section(scheduler.as_ref(), risk.as_ref());
        let venues = self.venue_section(venues.unwrap_or_default(), scheduler.as_ref());
        let jobs = scheduler.as_ref().map(JobsSection::from).unwrap_or_default();
        let risk = risk.as_ref().map(RiskSection::from).unwrap_or_default();

        Snapshot {
            version: SNAPSHOT_VERSION,
            taken_at: self.clock.now(),
            global,
            venues: section(venues, venues_stale),
            jobs: section(jobs, scheduler_stale),
            risk: section(risk, risk_stale),
        }
    }

    fn global_section(
        &self,
        scheduler: Option<&SchedulerStatus>,
        risk: Option<&RiskStatus>,
    ) -> GlobalSection {
        let halted = risk.is_some_and(|r| r.breaker.halt.is_some());
        let status = if halted {
            SystemStatus::Halted
        } else if self.ledger.is_safe_mode() {
            SystemStatus::SafeMode
        } else {
            SystemStatus::Active
        };

        let today = scheduler.map(|s| &s.today);
        GlobalSection {
            status,
            risk_mode: risk.map_or_else(RiskMode::default, |r| r.mode),
            volume_today: today.map_or(Decimal::ZERO, |t| t.volume),
            fees_today: today.map_or(Decimal::ZERO, |t| t.fees),
            pnl_today: today.map_or(Decimal::ZERO, |t| t.pnl),
            daily_loss_used: risk.map_or(Decimal::ZERO, |r| r.breaker.daily_loss),
            daily_loss_limit: risk.map_or(Decimal::ZERO, |r| r.breaker.daily_loss_limit),
        }
    }

    fn venue_section(
        &self,
        venues: Vec<VenueCapitalState>,
        scheduler: Option<&SchedulerStatus>,
    ) -> Vec<VenueSnapshot> {
        let limits = self.ledger.limits();
        venues
            .iter()
            .map(|state| {
                let mut venue = VenueSnapshot::from_state(
                    state,
                    limits,
                    self.market.latency_ms(state.venue()),
                );
                if let Some(scheduler) = scheduler {
                    venue.concurrent_jobs = scheduler
                        .concurrent_per_venue
                        .get(state.venue())
                        .copied()
                        .unwrap_or(0);
                    venue.open_legs = scheduler
                        .open_legs_per_venue
                        .get(state.venue())
                        .copied()
                        .unwrap_or(0);
                }
                venue
            })
            .collect()
    }
}

/// Store a fresh read, or fall back to the cached one. Returns the value and whether it is stale.
fn refresh<T: Clone>(cache: &mut Option<T>, fresh: Option<T>, subsystem: &str) -> (Option<T>, bool) {
    match fresh {
        Some(value) => {
            *cache = Some(value.clone());
            (Some(value), false)
        }
        None => {
            debug!(subsystem, "Lock busy, serving last known section");
            (cache.clone(), true)
        }
    }
}

fn section<T>(data: T, stale: bool) -> Section<T> {
    if stale {
        Section::stale(data)
    } else {
        Section::fresh(data)
    }
}
