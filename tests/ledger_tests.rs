//! Capital ledger behaviour through the public API.

use std::sync::{Arc, Barrier};
use std::thread;

use hedgeward::application::CapitalLedger;
use hedgeward::config::CapitalConfig;
use hedgeward::domain::{CapitalTier, VenueId};
use hedgeward::error::ReserveError;
use hedgeward::testkit::domain::job;
use rust_decimal_macros::dec;

fn ledger_with(venues: &[&str]) -> CapitalLedger {
    let ledger = CapitalLedger::new(CapitalConfig::default());
    for venue in venues {
        ledger
            .update_equity(&VenueId::from(*venue), dec!(100000))
            .unwrap();
    }
    ledger
}

#[test]
fn total_cap_admits_three_ten_percent_jobs() {
    let ledger = ledger_with(&["binance"]);

    for i in 0..3 {
        let tickets = ledger
            .reserve_for_job(&job(&format!("j{i}"), &["binance"], dec!(10000)))
            .unwrap();
        assert_eq!(tickets.len(), 1);
    }

    let err = ledger
        .reserve_for_job(&job("j3", &["binance"], dec!(10000)))
        .unwrap_err();
    assert!(matches!(err, ReserveError::OverTotalCap { .. }), "{err:?}");

    let venue = ledger.venue(&VenueId::from("binance")).unwrap();
    assert_eq!(venue.in_flight(), dec!(30000));
}

#[test]
fn per_job_cap_is_checked_before_total_cap() {
    let ledger = ledger_with(&["binance"]);
    let err = ledger
        .reserve_for_job(&job("big", &["binance"], dec!(10001)))
        .unwrap_err();
    assert!(matches!(err, ReserveError::OverPerJobCap { .. }));
}

#[test]
fn failed_multi_venue_job_leaves_every_venue_untouched() {
    let ledger = ledger_with(&["binance"]);
    ledger
        .update_equity(&VenueId::from("okx"), dec!(10000))
        .unwrap();
    let before = ledger.venues();
    let issued = ledger.issued_tickets();

    // 5000 fits binance's 10000 cap but not okx's 1000 cap.
    let err = ledger
        .reserve_for_job(&job("j1", &["binance", "okx"], dec!(5000)))
        .unwrap_err();

    assert!(matches!(err, ReserveError::OverPerJobCap { .. }));
    assert_eq!(ledger.venues(), before);
    assert_eq!(ledger.issued_tickets(), issued);
    assert_eq!(ledger.outstanding_tickets(), 0);
}

#[test]
fn release_restores_the_exact_prior_state() {
    let ledger = ledger_with(&["binance", "okx"]);
    let before = ledger.venues();

    let tickets = ledger
        .reserve_for_job(&job("j1", &["binance", "okx"], dec!(8000)))
        .unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(ledger.release_all(&tickets), 2);

    assert_eq!(ledger.venues(), before);
    assert!(ledger.release(&tickets[0]).is_err());
}

#[test]
fn tier_budget_binds_before_total_cap() {
    // Reserve tier gets 20% of 1000 equity = 200; per-job cap is 100.
    let ledger = CapitalLedger::new(CapitalConfig::default());
    let venue = VenueId::from("okx");
    ledger.update_equity(&venue, dec!(1000)).unwrap();

    ledger
        .reserve_for_tier(&venue, CapitalTier::Reserve, dec!(100))
        .unwrap();
    ledger
        .reserve_for_tier(&venue, CapitalTier::Reserve, dec!(100))
        .unwrap();
    let err = ledger
        .reserve_for_tier(&venue, CapitalTier::Reserve, dec!(50))
        .unwrap_err();
    assert!(matches!(err, ReserveError::TierExhausted { .. }), "{err:?}");
}

#[test]
fn concurrent_reservations_never_exceed_the_total_cap() {
    let ledger = Arc::new(ledger_with(&["binance", "okx"]));
    let threads = 12;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // Alternate venue order so lock ordering is exercised.
                let venues: &[&str] = if i % 2 == 0 {
                    &["binance", "okx"]
                } else {
                    &["okx", "binance"]
                };
                barrier.wait();
                ledger
                    .reserve_for_job(&job(&format!("j{i}"), venues, dec!(10000)))
                    .is_ok()
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(admitted, 3);
    for venue in ledger.venues() {
        assert_eq!(venue.in_flight(), dec!(30000), "{}", venue.venue());
    }
    assert_eq!(ledger.outstanding_tickets(), 6);
}

#[test]
fn shrinking_equity_blocks_new_reservations_but_keeps_old_ones() {
    let ledger = ledger_with(&["binance"]);
    let venue = VenueId::from("binance");
    let tickets = ledger
        .reserve_for_job(&job("j1", &["binance"], dec!(10000)))
        .unwrap();

    ledger.update_equity(&venue, dec!(20000)).unwrap();
    assert!(ledger
        .reserve_for_job(&job("j2", &["binance"], dec!(1000)))
        .is_err());

    assert_eq!(ledger.release_all(&tickets), 1);
    assert!(ledger
        .reserve_for_job(&job("j3", &["binance"], dec!(1000)))
        .is_ok());
}
