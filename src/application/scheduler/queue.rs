//! Pending-job queue ordered by risk score.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{HedgeJob, JobId};

/// Queue position: higher score first, then earlier submission.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueKey {
    score: f64,
    seq: u64,
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.seq.cmp(&other.seq))
    }
}

/// A queued job with the score it was admitted under.
#[derive(Debug, Clone)]
pub(crate) struct QueuedJob {
    pub job: HedgeJob,
    pub score: f64,
}

#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    entries: BTreeMap<QueueKey, QueuedJob>,
    index: HashMap<JobId, QueueKey>,
    next_seq: u64,
}

impl PendingQueue {
    pub fn push(&mut self, job: HedgeJob, score: f64) {
        let key = QueueKey {
            score,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.index.insert(job.id().clone(), key);
        self.entries.insert(key, QueuedJob { job, score });
    }

    /// Keys in priority order.
    pub fn keys(&self) -> Vec<QueueKey> {
        self.entries.keys().copied().collect()
    }

    pub fn get(&self, key: &QueueKey) -> Option<&QueuedJob> {
        self.entries.get(key)
    }

    pub fn take(&mut self, key: &QueueKey) -> Option<QueuedJob> {
        let entry = self.entries.remove(key)?;
        self.index.remove(entry.job.id());
        Some(entry)
    }

    pub fn remove(&mut self, id: &JobId) -> Option<QueuedJob> {
        let key = self.index.remove(id)?;
        self.entries.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
