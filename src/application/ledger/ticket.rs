//! Reservation tickets.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::domain::{Amount, CapitalTier, JobId, VenueId};
use crate::error::ReleaseError;

/// Proof of a capital reservation on one venue.
///
/// Returned by the ledger on success and handed back to
/// [`CapitalLedger::release`](super::CapitalLedger::release) exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationTicket {
    id: u64,
    venue: VenueId,
    tier: CapitalTier,
    amount: Amount,
    job_id: Option<JobId>,
}

impl ReservationTicket {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    #[must_use]
    pub const fn tier(&self) -> CapitalTier {
        self.tier
    }

    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Job the reservation was made for, if it came from `reserve_for_job`.
    #[must_use]
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }
}

impl fmt::Display for ReservationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticket-{} ({} {} {})",
            self.id, self.venue, self.tier, self.amount
        )
    }
}

/// Outstanding tickets plus the id counter.
///
/// Ids are issued sequentially, so any id below `next_id` that is no longer
/// outstanding has been released.
#[derive(Debug, Default)]
pub(crate) struct TicketBook {
    outstanding: HashMap<u64, ReservationTicket>,
    next_id: u64,
}

impl TicketBook {
    pub(crate) fn issue(
        &mut self,
        venue: VenueId,
        tier: CapitalTier,
        amount: Amount,
        job_id: Option<JobId>,
    ) -> ReservationTicket {
        let ticket = ReservationTicket {
            id: self.next_id,
            venue,
            tier,
            amount,
            job_id,
        };
        self.next_id += 1;
        self.outstanding.insert(ticket.id, ticket.clone());
        ticket
    }

    /// Remove a ticket, returning the ledger's own record of it.
    pub(crate) fn redeem(
        &mut self,
        ticket: &ReservationTicket,
    ) -> Result<ReservationTicket, ReleaseError> {
        match self.outstanding.remove(&ticket.id) {
            Some(record) => Ok(record),
            None if ticket.id < self.next_id => Err(ReleaseError::DoubleReleaseAttempt {
                ticket: ticket.id,
                venue: ticket.venue.clone(),
            }),
            None => Err(ReleaseError::UnknownTicket(ticket.id)),
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }
}
