//! Mode-dependent scoring numbers.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::config::RiskConfig;
use crate::domain::{FactorScores, RiskMode};

/// Every number the evaluator needs for one scoring pass.
///
/// The mode only selects values here; the evaluator's control flow is the
/// same for every mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    pub mode: RiskMode,
    /// Per-factor weights applied to the penalties.
    pub weights: FactorScores,
    pub safety_weight: f64,
    pub volume_weight: f64,
    /// Volatility that saturates the volatility penalty.
    pub volatility_threshold: f64,
    pub min_final_score: f64,
    pub min_safety_score: f64,
    pub max_latency_ms: u64,
    pub funding_threshold_bps: f64,
    pub emergency_funding_bps: f64,
    pub max_slippage_bps: f64,
    pub staleness_ms: u64,
    pub max_clock_skew_ms: u64,
    pub max_leverage: f64,
    pub volume_scale: f64,
    pub edge_scale_bps: f64,
}

impl RiskProfile {
    /// Profile for `mode`, with thresholds and overrides taken from `config`.
    #[must_use]
    pub fn for_mode(mode: RiskMode, config: &RiskConfig) -> Self {
        let (weights, safety_weight, volume_weight, volatility_threshold, min_final, min_safety) =
            match mode {
                RiskMode::Conservative => (
                    FactorScores {
                        funding: 1.0,
                        slippage: 1.0,
                        latency: 1.0,
                        volatility: 1.0,
                        leverage: 1.0,
                    },
                    0.8,
                    0.2,
                    0.02,
                    0.55,
                    0.4,
                ),
                RiskMode::Balanced => (
                    FactorScores {
                        funding: 0.9,
                        slippage: 0.9,
                        latency: 0.8,
                        volatility: 0.8,
                        leverage: 1.0,
                    },
                    0.7,
                    0.3,
                    0.04,
                    0.45,
                    0.3,
                ),
                RiskMode::Aggressive => (
                    FactorScores {
                        funding: 0.7,
                        slippage: 0.7,
                        latency: 0.6,
                        volatility: 0.6,
                        leverage: 0.9,
                    },
                    0.5,
                    0.5,
                    0.08,
                    0.35,
                    0.2,
                ),
            };

        let overrides = &config.overrides;
        Self {
            mode,
            weights,
            safety_weight: overrides.safety_weight.unwrap_or(safety_weight),
            volume_weight: overrides.volume_weight.unwrap_or(volume_weight),
            volatility_threshold: overrides
                .volatility_threshold
                .unwrap_or(volatility_threshold),
            min_final_score: overrides.min_final_score.unwrap_or(min_final),
            min_safety_score: overrides.min_safety_score.unwrap_or(min_safety),
            max_latency_ms: config.max_latency_ms,
            funding_threshold_bps: config.funding_threshold_bps,
            emergency_funding_bps: config.emergency_funding_bps,
            max_slippage_bps: config.max_slippage_bps,
            staleness_ms: config.staleness_ms,
            max_clock_skew_ms: config.max_clock_skew_ms,
            max_leverage: config.max_leverage,
            volume_scale: config.volume_scale.to_f64().unwrap_or(f64::MAX),
            edge_scale_bps: config.edge_scale_bps,
        }
    }

    /// Profile for the mode named in `config`.
    #[must_use]
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::for_mode(config.mode, config)
    }
}
