//! Implementations of ports (hexagonal adapters).

mod executor;
mod market;

pub use executor::DryRunExecutor;
pub use market::InMemoryMarketBook;
