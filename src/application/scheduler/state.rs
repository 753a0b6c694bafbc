//! Mutable scheduler bookkeeping, guarded by the scheduler mutex.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::queue::PendingQueue;
use crate::application::ledger::ReservationTicket;
use crate::domain::{Amount, HedgeJob, JobId, JobOutcome, JobStatus, StrategyKind, Symbol, VenueId};

/// A dispatched job and the capital it holds.
#[derive(Debug, Clone)]
pub(crate) struct RunningJob {
    pub job: HedgeJob,
    pub tickets: Vec<ReservationTicket>,
    pub admitted_at: DateTime<Utc>,
    pub score: f64,
}

/// Realized totals for one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub completed: u64,
    pub failed: u64,
    pub volume: Amount,
    pub fees: Amount,
    pub pnl: Amount,
}

impl DailyStats {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed: 0,
            failed: 0,
            volume: Decimal::ZERO,
            fees: Decimal::ZERO,
            pnl: Decimal::ZERO,
        }
    }

    /// Today's totals as of `now`; zeroed if the day has rolled over.
    #[must_use]
    pub fn as_of(&self, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        if today > self.date {
            Self::new(today)
        } else {
            self.clone()
        }
    }
}

/// Monitoring view of one running job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningJobSummary {
    pub job_id: JobId,
    pub strategy: StrategyKind,
    pub symbol: Symbol,
    pub venues: Vec<VenueId>,
    pub notional: Amount,
    pub score: f64,
    pub admitted_at: DateTime<Utc>,
}

/// Monitoring view of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub running: Vec<RunningJobSummary>,
    pub pending: usize,
    /// Running jobs per venue.
    pub concurrent_per_venue: BTreeMap<VenueId, usize>,
    /// Running legs per venue.
    pub open_legs_per_venue: BTreeMap<VenueId, usize>,
    pub today: DailyStats,
    pub completed_total: u64,
    pub failed_total: u64,
}

pub(crate) struct SchedulerState {
    pub queue: PendingQueue,
    pub running: HashMap<JobId, RunningJob>,
    pub running_per_venue: BTreeMap<VenueId, usize>,
    pub venue_ceilings: BTreeMap<VenueId, usize>,
    statuses: HashMap<JobId, JobStatus>,
    terminal: VecDeque<JobId>,
    history_limit: usize,
    today: DailyStats,
    completed_total: u64,
    failed_total: u64,
}

impl SchedulerState {
    pub fn new(history_limit: usize, now: DateTime<Utc>) -> Self {
        Self {
            queue: PendingQueue::default(),
            running: HashMap::new(),
            running_per_venue: BTreeMap::new(),
            venue_ceilings: BTreeMap::new(),
            statuses: HashMap::new(),
            terminal: VecDeque::new(),
            history_limit,
            today: DailyStats::new(now.date_naive()),
            completed_total: 0,
            failed_total: 0,
        }
    }

    pub fn knows(&self, id: &JobId) -> bool {
        self.statuses.contains_key(id)
    }

    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.statuses.get(id).cloned()
    }

    fn ceiling(&self, venue: &VenueId, default: usize) -> usize {
        self.venue_ceilings.get(venue).copied().unwrap_or(default)
    }

    /// Whether every venue of `job` has a free concurrency slot.
    pub fn venues_have_headroom(&self, job: &HedgeJob, default_ceiling: usize) -> bool {
        job.venues().iter().all(|venue| {
            let running = self.running_per_venue.get(venue).copied().unwrap_or(0);
            running < self.ceiling(venue, default_ceiling)
        })
    }

    pub fn enqueue(&mut self, job: HedgeJob, score: f64) {
        self.statuses.insert(job.id().clone(), JobStatus::Queued);
        self.queue.push(job, score);
    }

    pub fn start(
        &mut self,
        job: HedgeJob,
        tickets: Vec<ReservationTicket>,
        admitted_at: DateTime<Utc>,
        score: f64,
    ) {
        for venue in job.venues() {
            *self.running_per_venue.entry(venue).or_insert(0) += 1;
        }
        self.statuses.insert(job.id().clone(), JobStatus::Running);
        self.running.insert(
            job.id().clone(),
            RunningJob {
                job,
                tickets,
                admitted_at,
                score,
            },
        );
    }

    /// Drop a job's venue slots and record its terminal outcome.
    pub fn finish(&mut self, running: &RunningJob, outcome: &JobOutcome, now: DateTime<Utc>) {
        for venue in running.job.venues() {
            if let Some(count) = self.running_per_venue.get_mut(&venue) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.running_per_venue.remove(&venue);
                }
            }
        }

        self.today = self.today.as_of(now);
        self.today.volume += outcome.realized_volume;
        self.today.fees += outcome.total_fees();
        self.today.pnl += outcome.realized_pnl;

        let status = match &outcome.failure {
            None => {
                self.today.completed += 1;
                self.completed_total += 1;
                JobStatus::Completed
            }
            Some(reason) => {
                self.today.failed += 1;
                self.failed_total += 1;
                JobStatus::Failed {
                    reason: reason.clone(),
                }
            }
        };
        self.record_terminal(running.job.id().clone(), status);
    }

    pub fn record_terminal(&mut self, id: JobId, status: JobStatus) {
        self.statuses.insert(id.clone(), status);
        self.terminal.push_back(id);
        while self.terminal.len() > self.history_limit {
            if let Some(evicted) = self.terminal.pop_front() {
                self.statuses.remove(&evicted);
            }
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SchedulerStatus {
        let mut running: Vec<RunningJobSummary> = self
            .running
            .values()
            .map(|r| RunningJobSummary {
                job_id: r.job.id().clone(),
                strategy: r.job.strategy(),
                symbol: r.job.symbol().clone(),
                venues: r.job.venues().into_iter().collect(),
                notional: r.job.notional(),
                score: r.score,
                admitted_at: r.admitted_at,
            })
            .collect();
        running.sort_by(|a, b| {
            a.admitted_at
                .cmp(&b.admitted_at)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });

        let mut open_legs_per_venue = BTreeMap::new();
        for r in self.running.values() {
            for leg in r.job.legs() {
                *open_legs_per_venue.entry(leg.venue().clone()).or_insert(0) += 1;
            }
        }

        SchedulerStatus {
            running,
            pending: self.queue.len(),
            concurrent_per_venue: self.running_per_venue.clone(),
            open_legs_per_venue,
            today: self.today.as_of(now),
            completed_total: self.completed_total,
            failed_total: self.failed_total,
        }
    }
}
