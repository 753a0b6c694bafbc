//! Scheduler concurrency and timing configuration.

use std::time::Duration;

use serde::Deserialize;

/// Scheduler limits.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Jobs running at once across all venues.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Jobs running at once on one venue, unless the venue overrides it.
    #[serde(default = "default_max_concurrent_per_venue")]
    pub max_concurrent_per_venue: usize,
    /// Running jobs without an outcome after this long are reclaimed.
    #[serde(default = "default_max_hold_secs")]
    pub max_hold_secs: u64,
    /// Period of the maintenance loop (tick, reclamation, daily roll).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Terminal job states remembered for status queries and duplicate detection.
    #[serde(default = "default_terminal_history")]
    pub terminal_history: usize,
}

const fn default_max_concurrent_jobs() -> usize {
    8
}

const fn default_max_concurrent_per_venue() -> usize {
    3
}

const fn default_max_hold_secs() -> u64 {
    120
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_terminal_history() -> usize {
    4_096
}

impl SchedulerConfig {
    #[must_use]
    pub const fn max_hold(&self) -> Duration {
        Duration::from_secs(self.max_hold_secs)
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_concurrent_per_venue: default_max_concurrent_per_venue(),
            max_hold_secs: default_max_hold_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            terminal_history: default_terminal_history(),
        }
    }
}
