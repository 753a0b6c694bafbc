//! Monitoring snapshot configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How long a snapshot waits on each subsystem lock before reporting it stale.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// When set, the maintenance loop rewrites this JSON file on every tick.
    #[serde(default)]
    pub status_file: Option<PathBuf>,
}

const fn default_lock_timeout_ms() -> u64 {
    50
}

impl MonitoringConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            status_file: None,
        }
    }
}
