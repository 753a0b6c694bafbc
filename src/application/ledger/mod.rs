//! Capital ledger.
//!
//! Authoritative record of per-venue capital commitments. Every venue holds
//! its [`VenueCapitalState`] behind its own mutex inside a `BTreeMap`, so
//! iterating the map yields venues in lexicographic id order. Multi-venue
//! operations lock venues in that order and nowhere else, which is what
//! keeps concurrent multi-venue reservations deadlock-free.

mod ticket;
mod venue;

pub use ticket::ReservationTicket;
pub use venue::VenueCapitalState;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::config::CapitalConfig;
use crate::domain::{Amount, CapitalTier, HedgeJob, VenueId};
use crate::error::{EquityError, ReleaseError, ReserveError};
use ticket::TicketBook;

type VenueMap = BTreeMap<VenueId, Arc<Mutex<VenueCapitalState>>>;

/// Concurrency-safe capital ledger with atomic reserve/release.
pub struct CapitalLedger {
    limits: CapitalConfig,
    venues: RwLock<VenueMap>,
    tickets: Mutex<TicketBook>,
    safe_mode: AtomicBool,
}

impl CapitalLedger {
    /// Create an empty ledger with the given limits.
    #[must_use]
    pub fn new(limits: CapitalConfig) -> Self {
        Self {
            limits,
            venues: RwLock::new(BTreeMap::new()),
            tickets: Mutex::new(TicketBook::default()),
            safe_mode: AtomicBool::new(false),
        }
    }

    /// Limits this ledger enforces.
    #[must_use]
    pub fn limits(&self) -> &CapitalConfig {
        &self.limits
    }

    /// Replace a venue's equity and rescale its tier budgets.
    ///
    /// Registers the venue on first sight. Amounts already reserved are left
    /// as they are, even if the new budgets are smaller.
    ///
    /// # Errors
    ///
    /// Returns [`EquityError::Negative`] for negative equity.
    pub fn update_equity(&self, venue: &VenueId, equity: Amount) -> Result<(), EquityError> {
        if equity < Decimal::ZERO {
            return Err(EquityError::Negative {
                venue: venue.clone(),
                equity,
            });
        }

        if let Some(cell) = self.venues.read().get(venue) {
            cell.lock().rescale(equity, &self.limits.tiers);
            debug!(venue = %venue, equity = %equity, "Equity updated");
            return Ok(());
        }

        let mut venues = self.venues.write();
        venues
            .entry(venue.clone())
            .and_modify(|cell| cell.lock().rescale(equity, &self.limits.tiers))
            .or_insert_with(|| {
                info!(venue = %venue, equity = %equity, "Venue registered");
                Arc::new(Mutex::new(VenueCapitalState::new(
                    venue.clone(),
                    equity,
                    &self.limits.tiers,
                )))
            });
        Ok(())
    }

    /// Reserve `amount` from one tier of one venue.
    ///
    /// # Errors
    ///
    /// Returns the first failed condition; the ledger is unchanged.
    pub fn reserve_for_tier(
        &self,
        venue: &VenueId,
        tier: CapitalTier,
        amount: Amount,
    ) -> Result<ReservationTicket, ReserveError> {
        let venues = self.venues.read();
        let cell = venues
            .get(venue)
            .ok_or_else(|| ReserveError::UnknownVenue(venue.clone()))?;
        let mut state = cell.lock();

        state.check(tier, amount, &self.limits, self.is_safe_mode())?;

        let ticket = self.tickets.lock().issue(venue.clone(), tier, amount, None);
        state.debit(tier, amount);
        debug!(%ticket, in_flight = %state.in_flight(), "Capital reserved");
        Ok(ticket)
    }

    /// Reserve a job's capital on every participating venue, or on none.
    ///
    /// Venue locks are taken in lexicographic venue-id order and all of them
    /// are held across both phases: every venue is checked first, and only
    /// when all pass is every venue debited. A failure in the check phase
    /// leaves no venue touched.
    ///
    /// # Errors
    ///
    /// Returns the first venue's failure in lock order.
    pub fn reserve_for_job(&self, job: &HedgeJob) -> Result<Vec<ReservationTicket>, ReserveError> {
        let requirements = job.capital_requirements();
        let tier = job.tier();
        let venues = self.venues.read();
        let mut guards = lock_in_order(&venues, &requirements)?;

        let global_safe_mode = self.is_safe_mode();
        for (state, amount) in &guards {
            state.check(tier, *amount, &self.limits, global_safe_mode)?;
        }

        let mut book = self.tickets.lock();
        let tickets = guards
            .iter_mut()
            .map(|(state, amount)| {
                state.debit(tier, *amount);
                book.issue(
                    state.venue().clone(),
                    tier,
                    *amount,
                    Some(job.id().clone()),
                )
            })
            .collect::<Vec<_>>();

        debug!(
            job_id = %job.id(),
            tier = %tier,
            venues = tickets.len(),
            "Job capital reserved"
        );
        Ok(tickets)
    }

    /// Run the checks of [`reserve_for_job`](Self::reserve_for_job) without committing.
    ///
    /// # Errors
    ///
    /// Returns the failure `reserve_for_job` would return right now.
    pub fn check_job(&self, job: &HedgeJob) -> Result<(), ReserveError> {
        let requirements = job.capital_requirements();
        let tier = job.tier();
        let venues = self.venues.read();
        let guards = lock_in_order(&venues, &requirements)?;

        let global_safe_mode = self.is_safe_mode();
        for (state, amount) in &guards {
            state.check(tier, *amount, &self.limits, global_safe_mode)?;
        }
        Ok(())
    }

    /// Credit a reservation back to its venue.
    ///
    /// The ledger's own record of the ticket decides what is credited.
    ///
    /// # Errors
    ///
    /// A ticket released before returns [`ReleaseError::DoubleReleaseAttempt`]
    /// and credits nothing.
    pub fn release(&self, ticket: &ReservationTicket) -> Result<(), ReleaseError> {
        let record = match self.tickets.lock().redeem(ticket) {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, %ticket, "Rejected ticket release");
                return Err(e);
            }
        };

        let venues = self.venues.read();
        if let Some(cell) = venues.get(record.venue()) {
            let mut state = cell.lock();
            state.credit(record.tier(), record.amount());
            debug!(ticket = %record, in_flight = %state.in_flight(), "Capital released");
        }
        Ok(())
    }

    /// Release every ticket, logging and skipping contract violations.
    ///
    /// Returns how many tickets were actually credited.
    pub fn release_all(&self, tickets: &[ReservationTicket]) -> usize {
        tickets
            .iter()
            .filter(|ticket| self.release(ticket).is_ok())
            .count()
    }

    /// Block or allow new reservations on every venue.
    pub fn set_safe_mode(&self, on: bool) {
        let was = self.safe_mode.swap(on, Ordering::SeqCst);
        if was != on {
            if on {
                warn!("Ledger safe mode enabled, new reservations blocked");
            } else {
                info!("Ledger safe mode cleared");
            }
        }
    }

    #[must_use]
    pub fn is_safe_mode(&self) -> bool {
        self.safe_mode.load(Ordering::SeqCst)
    }

    /// Block or allow new reservations on one venue. Returns `false` for an unknown venue.
    pub fn set_venue_safe_mode(&self, venue: &VenueId, on: bool) -> bool {
        let Some(cell) = self.venues.read().get(venue).cloned() else {
            return false;
        };
        cell.lock().set_safe_mode(on);
        warn!(venue = %venue, safe_mode = on, "Venue safe mode changed");
        true
    }

    /// Enable or disable a venue. Returns `false` for an unknown venue.
    pub fn set_venue_enabled(&self, venue: &VenueId, on: bool) -> bool {
        let Some(cell) = self.venues.read().get(venue).cloned() else {
            return false;
        };
        cell.lock().set_enabled(on);
        warn!(venue = %venue, enabled = on, "Venue availability changed");
        true
    }

    /// Copy of one venue's state.
    #[must_use]
    pub fn venue(&self, venue: &VenueId) -> Option<VenueCapitalState> {
        self.venues.read().get(venue).map(|cell| cell.lock().clone())
    }

    /// Copies of every venue's state, in venue-id order.
    #[must_use]
    pub fn venues(&self) -> Vec<VenueCapitalState> {
        self.venues
            .read()
            .values()
            .map(|cell| cell.lock().clone())
            .collect()
    }

    /// Like [`venues`](Self::venues), but gives up after `timeout` on any lock.
    #[must_use]
    pub fn try_venues(&self, timeout: Duration) -> Option<Vec<VenueCapitalState>> {
        let venues = self.venues.try_read_for(timeout)?;
        venues
            .values()
            .map(|cell| cell.try_lock_for(timeout).map(|state| state.clone()))
            .collect()
    }

    /// Number of tickets not yet released.
    #[must_use]
    pub fn outstanding_tickets(&self) -> usize {
        self.tickets.lock().outstanding()
    }

    /// Number of tickets ever issued.
    #[must_use]
    pub fn issued_tickets(&self) -> u64 {
        self.tickets.lock().next_id()
    }
}

/// Lock the venues named in `requirements` in map order.
fn lock_in_order<'a>(
    venues: &'a VenueMap,
    requirements: &BTreeMap<VenueId, Amount>,
) -> Result<Vec<(MutexGuard<'a, VenueCapitalState>, Amount)>, ReserveError> {
    requirements
        .iter()
        .map(|(venue, amount)| {
            venues
                .get(venue)
                .map(|cell| (cell.lock(), *amount))
                .ok_or_else(|| ReserveError::UnknownVenue(venue.clone()))
        })
        .collect()
}
