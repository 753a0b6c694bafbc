//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. `HEDGEWARD_RISK_MODE` overrides
//! `risk.mode` so operators can tighten risk without editing the file.
//!
//! # Example
//!
//! ```no_run
//! use hedgeward::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::capital::CapitalConfig;
use super::logging::LoggingConfig;
use super::monitoring::MonitoringConfig;
use super::risk::{CircuitBreakerConfig, RiskConfig};
use super::scheduler::SchedulerConfig;
use super::venue::VenueConfig;
use crate::domain::{RiskMode, VenueId};
use crate::error::{ConfigError, Result};

/// Environment variable overriding `risk.mode`.
pub const RISK_MODE_ENV: &str = "HEDGEWARD_RISK_MODE";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-job and total caps plus the tier split.
    #[serde(default)]
    pub capital: CapitalConfig,

    /// Risk mode, hard thresholds and profile overrides.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Consecutive-failure and daily-loss halts.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    /// Concurrency ceilings and timing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Snapshot lock timeout and optional status file.
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Per-venue settings keyed by venue id.
    #[serde(default)]
    pub venues: BTreeMap<String, VenueConfig>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(mode) = std::env::var(RISK_MODE_ENV) {
            config.risk.mode = mode
                .parse::<RiskMode>()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: RISK_MODE_ENV,
                    reason,
                })?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed, or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Concurrency ceiling for `venue`.
    #[must_use]
    pub fn venue_ceiling(&self, venue: &VenueId) -> usize {
        self.venues
            .get(venue.as_str())
            .and_then(|v| v.max_concurrent)
            .unwrap_or(self.scheduler.max_concurrent_per_venue)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let capital = &self.capital;
        check_fraction("per_job_cap", capital.per_job_cap, false)?;
        check_fraction("total_cap", capital.total_cap, false)?;
        if capital.per_job_cap > capital.total_cap {
            return Err(invalid("per_job_cap", "must not exceed total_cap"));
        }
        check_fraction("tiers.reserve", capital.tiers.reserve, true)?;
        check_fraction("tiers.wash", capital.tiers.wash, true)?;
        check_fraction("tiers.arb", capital.tiers.arb, true)?;
        if capital.tiers.total() > Decimal::ONE {
            return Err(invalid("tiers", "fractions must sum to at most 1"));
        }

        let risk = &self.risk;
        if risk.max_latency_ms == 0 {
            return Err(invalid("max_latency_ms", "must be greater than 0"));
        }
        if risk.staleness_ms == 0 {
            return Err(invalid("staleness_ms", "must be greater than 0"));
        }
        for (field, value) in [
            ("funding_threshold_bps", risk.funding_threshold_bps),
            ("max_slippage_bps", risk.max_slippage_bps),
            ("max_leverage", risk.max_leverage),
            ("edge_scale_bps", risk.edge_scale_bps),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be a positive number"));
            }
        }
        if risk.emergency_funding_bps < risk.funding_threshold_bps {
            return Err(invalid(
                "emergency_funding_bps",
                "must be at least funding_threshold_bps",
            ));
        }
        if risk.volume_scale <= Decimal::ZERO {
            return Err(invalid("volume_scale", "must be greater than 0"));
        }
        let overrides = &risk.overrides;
        for (field, value) in [
            ("overrides.safety_weight", overrides.safety_weight),
            ("overrides.volume_weight", overrides.volume_weight),
            ("overrides.min_final_score", overrides.min_final_score),
            ("overrides.min_safety_score", overrides.min_safety_score),
        ] {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(invalid(field, "must be between 0 and 1"));
                }
            }
        }
        if let Some(threshold) = overrides.volatility_threshold {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(invalid(
                    "overrides.volatility_threshold",
                    "must be a positive number",
                ));
            }
        }

        if self.circuit_breaker.max_consecutive_failures == 0 {
            return Err(invalid("max_consecutive_failures", "must be at least 1"));
        }
        if self.circuit_breaker.daily_loss_limit <= Decimal::ZERO {
            return Err(invalid("daily_loss_limit", "must be greater than 0"));
        }

        let scheduler = &self.scheduler;
        if scheduler.max_concurrent_jobs == 0 {
            return Err(invalid("max_concurrent_jobs", "must be at least 1"));
        }
        if scheduler.max_concurrent_per_venue == 0 {
            return Err(invalid("max_concurrent_per_venue", "must be at least 1"));
        }
        if scheduler.max_hold_secs == 0 {
            return Err(invalid("max_hold_secs", "must be greater than 0"));
        }
        if scheduler.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be greater than 0"));
        }

        if self.monitoring.lock_timeout_ms == 0 {
            return Err(invalid("lock_timeout_ms", "must be greater than 0"));
        }

        for (name, venue) in &self.venues {
            if name.is_empty() {
                return Err(invalid("venues", "venue id cannot be empty"));
            }
            if venue.equity.is_some_and(|e| e < Decimal::ZERO) {
                return Err(invalid("venues.equity", "must be 0 or greater"));
            }
            if venue.max_concurrent == Some(0) {
                return Err(invalid("venues.max_concurrent", "must be at least 1"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn check_fraction(field: &'static str, value: Decimal, allow_zero: bool) -> Result<()> {
    let lower_ok = if allow_zero {
        value >= Decimal::ZERO
    } else {
        value > Decimal::ZERO
    };
    if !lower_ok || value > Decimal::ONE {
        let reason = if allow_zero {
            "must be between 0 and 1"
        } else {
            "must be greater than 0 and at most 1"
        };
        return Err(invalid(field, reason));
    }
    Ok(())
}
