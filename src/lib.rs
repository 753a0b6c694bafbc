//! Hedgeward - admission control for cross-venue hedge jobs.
//!
//! A hedge job is a set of legs placed across several venues at once. Before
//! a job reaches an executor it passes three gates:
//!
//! - **Capital** - the [`CapitalLedger`](application::CapitalLedger) reserves
//!   notional on every participating venue, all-or-nothing, inside per-job,
//!   total and per-tier caps.
//! - **Risk** - the [`RiskEvaluator`](application::RiskEvaluator) applies hard
//!   thresholds, scores the job and consults the circuit breaker.
//! - **Concurrency** - the [`JobScheduler`](application::JobScheduler) admits
//!   within global and per-venue ceilings and queues the rest by score.
//!
//! # Modules
//!
//! - [`domain`] - Jobs, legs, market snapshots, outcomes and risk verdicts
//! - [`port`] - Executor, market data and clock traits
//! - [`application`] - Ledger, risk, scheduler and monitoring services
//! - [`adapter`] - Dry-run executor and in-memory market book
//! - [`app`] - [`Coordinator`](app::Coordinator) wiring and maintenance loop
//! - [`config`] - TOML configuration
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hedgeward::adapter::{DryRunExecutor, InMemoryMarketBook};
//! use hedgeward::app::Coordinator;
//! use hedgeward::config::Config;
//! use hedgeward::port::MarketDataSource;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     let market: Arc<dyn MarketDataSource> = Arc::new(InMemoryMarketBook::new());
//!     let coordinator = Coordinator::builder(config)
//!         .executor(Arc::new(DryRunExecutor::new(Arc::clone(&market))))
//!         .market(market)
//!         .build()?;
//!     println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
