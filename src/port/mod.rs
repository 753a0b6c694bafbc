//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the admission core and the outside world:
//! order execution, market data and time. Adapters implement them.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │  Ledger · Risk · Sched  │
//!     ┌──────────────┤     Domain + Port       ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │Executor │            │ Market data │              │   Clock   │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`JobExecutor`] - Places and manages the orders of an admitted job
//! - [`MarketDataSource`] - Latest per-venue, per-symbol market snapshots
//! - [`Clock`] - Wall-clock time, swappable in tests

mod clock;
mod executor;
mod market;

pub use clock::{Clock, SystemClock};
pub use executor::JobExecutor;
pub use market::MarketDataSource;
