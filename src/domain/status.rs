//! Job lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::outcome::FailureReason;

/// Where a submitted job is in its lifecycle.
///
/// Rejected submissions are not tracked; they never enter the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted and waiting for concurrency headroom.
    Queued,
    /// Capital reserved and dispatched to the executor.
    Running,
    Completed,
    Failed { reason: FailureReason },
    /// Removed from the queue by its submitter.
    Withdrawn,
}

impl JobStatus {
    /// Terminal states are final.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. } | Self::Withdrawn)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Failed { reason } => write!(f, "failed ({reason})"),
            Self::Withdrawn => f.write_str("withdrawn"),
        }
    }
}
