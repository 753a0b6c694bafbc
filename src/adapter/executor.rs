//! Dry-run executor.
//!
//! Fills every leg at the current mid without touching a venue. Used by the
//! `run` command and for rehearsing configurations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{HedgeJob, JobOutcome, LegFill};
use crate::port::{JobExecutor, MarketDataSource};

/// Simulated executor that books the expected edge as pnl.
pub struct DryRunExecutor {
    market: Arc<dyn MarketDataSource>,
    fee_bps: Decimal,
    delay: Duration,
}

impl DryRunExecutor {
    #[must_use]
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self {
            market,
            fee_bps: Decimal::ZERO,
            delay: Duration::ZERO,
        }
    }

    /// Charge `fee_bps` of each leg's traded value.
    #[must_use]
    pub fn with_fee_bps(mut self, fee_bps: Decimal) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Pretend each job takes `delay` to execute.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fills(&self, job: &HedgeJob) -> Option<Vec<LegFill>> {
        job.legs()
            .iter()
            .map(|leg| {
                let price = self.market.snapshot(leg.venue(), leg.instrument())?.mid()?;
                let value = price * leg.quantity();
                Some(LegFill {
                    venue: leg.venue().clone(),
                    side: leg.side(),
                    filled_quantity: leg.quantity(),
                    average_price: price,
                    fee: value * self.fee_bps / Decimal::from(10_000),
                })
            })
            .collect()
    }
}

#[async_trait]
impl JobExecutor for DryRunExecutor {
    async fn execute(&self, job: HedgeJob) -> JobOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let Some(fills) = self.fills(&job) else {
            return JobOutcome::failure("no usable quote for a leg");
        };

        let volume: Decimal = fills
            .iter()
            .map(|fill| fill.average_price * fill.filled_quantity)
            .sum();
        let fees: Decimal = fills.iter().map(|fill| fill.fee).sum();
        let edge = Decimal::try_from(job.expected_edge_bps()).unwrap_or(Decimal::ZERO);
        let pnl = job.notional() * edge / Decimal::from(10_000) - fees;

        info!(
            job_id = %job.id(),
            legs = fills.len(),
            volume = %volume,
            pnl = %pnl,
            "[dry-run] Job filled"
        );
        JobOutcome::success(fills, pnl, volume)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
