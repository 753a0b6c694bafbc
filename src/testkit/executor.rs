//! Fake [`JobExecutor`] implementations.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::{oneshot, Notify};

use crate::domain::{HedgeJob, JobId, JobOutcome};
use crate::port::JobExecutor;

/// Resolves every job immediately with a fixed outcome.
pub struct InstantExecutor {
    outcome: JobOutcome,
    executed: Mutex<Vec<JobId>>,
}

impl InstantExecutor {
    /// Succeeds with zero pnl.
    pub fn succeeding() -> Self {
        Self::with_outcome(JobOutcome::success(Vec::new(), Decimal::ZERO, Decimal::ZERO))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(JobOutcome::failure(message))
    }

    pub fn with_outcome(outcome: JobOutcome) -> Self {
        Self {
            outcome,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Jobs executed so far, in dispatch order.
    pub fn executed(&self) -> Vec<JobId> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl JobExecutor for InstantExecutor {
    async fn execute(&self, job: HedgeJob) -> JobOutcome {
        self.executed.lock().push(job.id().clone());
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "instant"
    }
}

/// Holds every job until the test completes it.
///
/// Dropping the executor resolves outstanding jobs as failures.
#[derive(Default)]
pub struct ManualExecutor {
    pending: Mutex<HashMap<JobId, oneshot::Sender<JobOutcome>>>,
    dispatched: Mutex<Vec<JobId>>,
    notify: Notify,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs dispatched so far, in dispatch order.
    pub fn dispatched(&self) -> Vec<JobId> {
        self.dispatched.lock().clone()
    }

    /// Whether `job_id` is waiting for an outcome.
    pub fn is_pending(&self, job_id: &JobId) -> bool {
        self.pending.lock().contains_key(job_id)
    }

    /// Wait until at least `count` jobs have been dispatched.
    ///
    /// Panics after five seconds.
    pub async fn wait_for_dispatched(&self, count: usize) {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if self.dispatched.lock().len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {count} dispatched jobs"));
    }

    /// Resolve `job_id` with `outcome`. Returns `false` if it was not pending.
    pub fn complete(&self, job_id: &JobId, outcome: JobOutcome) -> bool {
        match self.pending.lock().remove(job_id) {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Resolve `job_id` as a zero-pnl success.
    pub fn succeed(&self, job_id: &JobId) -> bool {
        self.complete(
            job_id,
            JobOutcome::success(Vec::new(), Decimal::ZERO, Decimal::ZERO),
        )
    }
}

#[async_trait]
impl JobExecutor for ManualExecutor {
    async fn execute(&self, job: HedgeJob) -> JobOutcome {
        let (tx, rx) = oneshot::channel();
        {
            self.pending.lock().insert(job.id().clone(), tx);
            self.dispatched.lock().push(job.id().clone());
        }
        self.notify.notify_waiters();
        rx.await
            .unwrap_or_else(|_| JobOutcome::failure("manual executor dropped the job"))
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}
