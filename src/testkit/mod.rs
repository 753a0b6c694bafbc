//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - [`ManualClock`](clock::ManualClock), a clock tests move by hand.
//! - [`executor`] - Executors that resolve instantly or wait for the test.
//! - [`domain`] - Builders for jobs and market snapshots.
//! - [`config`] - Canonical test configurations.
//! - [`harness`] - A coordinator wired to the fakes above.

pub mod clock;
pub mod config;
pub mod domain;
pub mod executor;
pub mod harness;
