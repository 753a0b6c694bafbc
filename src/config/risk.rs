//! Risk evaluation and circuit breaker configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::RiskMode;

/// Thresholds shared by every risk mode plus optional per-field profile overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub mode: RiskMode,
    /// Latency above this is a hard reject; it also normalises the latency factor.
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
    /// Funding magnitude that saturates the funding penalty.
    #[serde(default = "default_funding_threshold_bps")]
    pub funding_threshold_bps: f64,
    /// Funding magnitude beyond which jobs are hard rejected.
    #[serde(default = "default_emergency_funding_bps")]
    pub emergency_funding_bps: f64,
    /// Expected slippage that saturates the slippage penalty.
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: f64,
    /// Market data older than this is a hard reject.
    #[serde(default = "default_staleness_ms")]
    pub staleness_ms: u64,
    /// How far ahead of the clock a snapshot may be stamped before it is a hard reject.
    #[serde(default = "default_max_clock_skew_ms")]
    pub max_clock_skew_ms: u64,
    /// Notional / equity that saturates the leverage penalty.
    #[serde(default = "default_max_leverage")]
    pub max_leverage: f64,
    /// Estimated volume at which the volume half of the opportunity score reaches ~63%.
    #[serde(default = "default_volume_scale")]
    pub volume_scale: Decimal,
    /// Expected edge at which the edge half of the opportunity score reaches ~63%.
    #[serde(default = "default_edge_scale_bps")]
    pub edge_scale_bps: f64,
    #[serde(default)]
    pub overrides: ProfileOverrides,
}

const fn default_max_latency_ms() -> u64 {
    500
}

const fn default_funding_threshold_bps() -> f64 {
    10.0
}

const fn default_emergency_funding_bps() -> f64 {
    75.0
}

const fn default_max_slippage_bps() -> f64 {
    25.0
}

const fn default_staleness_ms() -> u64 {
    5_000
}

const fn default_max_clock_skew_ms() -> u64 {
    1_000
}

const fn default_max_leverage() -> f64 {
    3.0
}

fn default_volume_scale() -> Decimal {
    Decimal::from(100_000)
}

const fn default_edge_scale_bps() -> f64 {
    10.0
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            mode: RiskMode::default(),
            max_latency_ms: default_max_latency_ms(),
            funding_threshold_bps: default_funding_threshold_bps(),
            emergency_funding_bps: default_emergency_funding_bps(),
            max_slippage_bps: default_max_slippage_bps(),
            staleness_ms: default_staleness_ms(),
            max_clock_skew_ms: default_max_clock_skew_ms(),
            max_leverage: default_max_leverage(),
            volume_scale: default_volume_scale(),
            edge_scale_bps: default_edge_scale_bps(),
            overrides: ProfileOverrides::default(),
        }
    }
}

/// Optional replacements for the mode-derived profile numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverrides {
    pub safety_weight: Option<f64>,
    pub volume_weight: Option<f64>,
    pub volatility_threshold: Option<f64>,
    pub min_final_score: Option<f64>,
    pub min_safety_score: Option<f64>,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed outcomes before the auto-halt trips.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Realized loss for the current UTC day that trips the auto-halt.
    #[serde(default = "default_daily_loss_limit")]
    pub daily_loss_limit: Decimal,
    /// Clear a daily-loss halt automatically when the UTC day rolls over.
    #[serde(default = "default_true")]
    pub auto_clear_daily_loss: bool,
}

const fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_daily_loss_limit() -> Decimal {
    Decimal::from(1_000)
}

const fn default_true() -> bool {
    true
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            daily_loss_limit: default_daily_loss_limit(),
            auto_clear_daily_loss: default_true(),
        }
    }
}
