//! A coordinator wired to a manual clock, a manual executor and an
//! in-memory market book.

use std::sync::Arc;

use crate::adapter::InMemoryMarketBook;
use crate::app::Coordinator;
use crate::config::Config;
use crate::port::{Clock, JobExecutor, MarketDataSource};

use super::clock::ManualClock;
use super::domain::healthy_snapshot;
use super::executor::ManualExecutor;

pub struct Harness {
    pub coordinator: Coordinator,
    pub clock: Arc<ManualClock>,
    pub executor: Arc<ManualExecutor>,
    pub book: Arc<InMemoryMarketBook>,
}

impl Harness {
    /// Build from `config`, quoting a healthy market on every configured venue.
    pub fn new(config: Config) -> Self {
        let executor = Arc::new(ManualExecutor::new());
        let (coordinator, clock, book) =
            build(config, Arc::clone(&executor) as Arc<dyn JobExecutor>);
        Self {
            coordinator,
            clock,
            executor,
            book,
        }
    }

    /// Re-quote every configured venue at the current clock time.
    pub fn refresh_market(&self) {
        let now = self.clock.now();
        for venue in self.coordinator.config().venues.keys() {
            self.book.update(healthy_snapshot(venue, now));
        }
    }
}

/// Build a coordinator around `executor`, returning its clock and book.
pub fn build(
    config: Config,
    executor: Arc<dyn JobExecutor>,
) -> (Coordinator, Arc<ManualClock>, Arc<InMemoryMarketBook>) {
    let clock = Arc::new(ManualClock::fixed());
    let book = Arc::new(InMemoryMarketBook::new());
    let now = clock.now();
    for venue in config.venues.keys() {
        book.update(healthy_snapshot(venue, now));
    }
    let coordinator = Coordinator::builder(config)
        .executor(executor)
        .market(Arc::clone(&book) as Arc<dyn MarketDataSource>)
        .clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .build()
        .unwrap();
    (coordinator, clock, book)
}
