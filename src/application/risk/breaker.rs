//! System-wide circuit breaker.
//!
//! Trips on a run of failed outcomes or when today's realized loss reaches
//! the configured limit. While tripped, every job is rejected. A
//! consecutive-failure halt only clears through [`CircuitBreaker::clear_halt`];
//! a daily-loss halt may also clear when the UTC day rolls over.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use crate::config::CircuitBreakerConfig;
use crate::domain::Amount;

/// Why the breaker is holding trading halted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HaltReason {
    ConsecutiveFailures { count: u32 },
    DailyLoss { loss: Amount, limit: Amount },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsecutiveFailures { count } => write!(f, "{count} consecutive failures"),
            Self::DailyLoss { loss, limit } => {
                write!(f, "daily loss {loss} reached limit {limit}")
            }
        }
    }
}

/// Point-in-time copy of the breaker counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub consecutive_failures: u32,
    pub max_consecutive_failures: u32,
    pub daily_loss: Amount,
    pub daily_loss_limit: Amount,
    pub halt: Option<HaltReason>,
    /// UTC date the daily loss belongs to.
    pub period: NaiveDate,
    pub total_trips: u64,
}

#[derive(Debug)]
struct BreakerState {
    consecutive_failures: u32,
    daily_loss: Amount,
    halt: Option<HaltReason>,
    period: NaiveDate,
    total_trips: u64,
}

/// Consecutive-failure and daily-loss halt.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker whose loss period starts on `now`'s UTC date.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig, now: DateTime<Utc>) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState {
                consecutive_failures: 0,
                daily_loss: Decimal::ZERO,
                halt: None,
                period: now.date_naive(),
                total_trips: 0,
            }),
        }
    }

    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.state.lock().halt.is_some()
    }

    #[must_use]
    pub fn halt(&self) -> Option<HaltReason> {
        self.state.lock().halt.clone()
    }

    /// Record one finished job. Returns the halt reason if this outcome tripped the breaker.
    pub fn record_outcome(
        &self,
        success: bool,
        realized_pnl: Amount,
        now: DateTime<Utc>,
    ) -> Option<HaltReason> {
        let mut state = self.state.lock();
        self.roll_locked(&mut state, now);

        if success {
            state.consecutive_failures = 0;
        } else {
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        }
        if realized_pnl < Decimal::ZERO {
            state.daily_loss -= realized_pnl;
        }

        if state.halt.is_some() {
            return None;
        }

        let reason = if state.consecutive_failures >= self.config.max_consecutive_failures {
            HaltReason::ConsecutiveFailures {
                count: state.consecutive_failures,
            }
        } else if state.daily_loss >= self.config.daily_loss_limit {
            HaltReason::DailyLoss {
                loss: state.daily_loss,
                limit: self.config.daily_loss_limit,
            }
        } else {
            return None;
        };

        error!(reason = %reason, "Circuit breaker tripped, all new jobs rejected");
        state.total_trips += 1;
        state.halt = Some(reason.clone());
        Some(reason)
    }

    /// Start a new loss period if `now` is on a later UTC date.
    ///
    /// Returns `true` if this cleared a daily-loss halt.
    pub fn roll_period(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        self.roll_locked(&mut state, now)
    }

    fn roll_locked(&self, state: &mut BreakerState, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if today <= state.period {
            return false;
        }
        state.period = today;
        state.daily_loss = Decimal::ZERO;

        if self.config.auto_clear_daily_loss
            && matches!(state.halt, Some(HaltReason::DailyLoss { .. }))
        {
            state.halt = None;
            info!(period = %today, "Daily loss halt cleared at period rollover");
            return true;
        }
        false
    }

    /// Manually clear any halt and the consecutive-failure count.
    ///
    /// Returns the reason that was cleared.
    pub fn clear_halt(&self) -> Option<HaltReason> {
        let mut state = self.state.lock();
        state.consecutive_failures = 0;
        let cleared = state.halt.take();
        if let Some(reason) = &cleared {
            info!(reason = %reason, "Circuit breaker cleared by operator");
        }
        cleared
    }

    #[must_use]
    pub fn status(&self) -> BreakerStatus {
        self.snapshot(&self.state.lock())
    }

    /// Like [`status`](Self::status), but gives up after `timeout`.
    #[must_use]
    pub fn try_status(&self, timeout: Duration) -> Option<BreakerStatus> {
        self.state
            .try_lock_for(timeout)
            .map(|state| self.snapshot(&state))
    }

    fn snapshot(&self, state: &BreakerState) -> BreakerStatus {
        BreakerStatus {
            consecutive_failures: state.consecutive_failures,
            max_consecutive_failures: self.config.max_consecutive_failures,
            daily_loss: state.daily_loss,
            daily_loss_limit: self.config.daily_loss_limit,
            halt: state.halt.clone(),
            period: state.period,
            total_trips: state.total_trips,
        }
    }
}
