//! Executor port for admitted hedge jobs.

use async_trait::async_trait;

use crate::domain::{HedgeJob, JobOutcome};

/// Executes the legs of an admitted job on their venues.
///
/// The scheduler spawns `execute` on the runtime and feeds the returned
/// outcome back into itself exactly once. Implementations own retries,
/// order placement and cancellation; a future that never resolves is
/// eventually reclaimed by the stuck-job timeout.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run the job to completion and report how it went.
    async fn execute(&self, job: HedgeJob) -> JobOutcome;

    /// Executor name for logging.
    fn name(&self) -> &'static str {
        "executor"
    }
}
