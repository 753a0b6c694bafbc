//! Risk evaluation results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::JobId;

/// Risk appetite. Each mode only changes numeric weights and thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!("unknown risk mode '{other}'")),
        }
    }
}

/// Final verdict for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskDecision {
    Accept,
    Reject,
    /// Soft rejection overridden by an operator grant.
    Override,
}

impl RiskDecision {
    /// Whether the job may proceed to capital reservation.
    #[must_use]
    pub const fn is_admissible(self) -> bool {
        matches!(self, Self::Accept | Self::Override)
    }
}

/// Why a job was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionClass {
    /// The system-wide auto-halt is set.
    CircuitBreaker,
    /// Safe mode is active globally or on a participating venue.
    SafeMode,
    /// A hard threshold was crossed (latency, funding, staleness, missing data, disabled venue).
    HardThreshold,
    /// The combined score was too low.
    SoftScore,
}

impl RejectionClass {
    /// Whether an operator override may lift this rejection.
    #[must_use]
    pub const fn is_overridable(self) -> bool {
        matches!(self, Self::SoftScore)
    }
}

/// Per-factor penalties, each in `[0, 1]` before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub funding: f64,
    pub slippage: f64,
    pub latency: f64,
    pub volatility: f64,
    pub leverage: f64,
}

impl FactorScores {
    /// Factor names and values, for logging.
    #[must_use]
    pub fn iter(&self) -> [(&'static str, f64); 5] {
        [
            ("funding", self.funding),
            ("slippage", self.slippage),
            ("latency", self.latency),
            ("volatility", self.volatility),
            ("leverage", self.leverage),
        ]
    }
}

/// Scored risk verdict for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvaluation {
    pub job_id: JobId,
    /// Unweighted penalties.
    pub penalties: FactorScores,
    pub safety_score: f64,
    pub volume_score: f64,
    pub final_score: f64,
    pub decision: RiskDecision,
    /// Set whenever the job was rejected, even if later overridden.
    pub rejection: Option<RejectionClass>,
    pub reasons: Vec<String>,
}

impl RiskEvaluation {
    #[must_use]
    pub const fn is_admissible(&self) -> bool {
        self.decision.is_admissible()
    }

    /// Reasons joined into one line.
    #[must_use]
    pub fn summary(&self) -> String {
        self.reasons.join("; ")
    }
}
