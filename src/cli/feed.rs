//! JSON-lines feed consumed by `hedgeward run`.
//!
//! One record per line, tagged by `type`:
//!
//! ```text
//! {"type":"equity","venue":"binance","equity":"100000"}
//! {"type":"market","venue":"binance","symbol":"BTC-PERP","bid":"64000","ask":"64001","depth":"2000000","latency_ms":40,"observed_at":"2024-03-01T12:00:00Z"}
//! {"type":"latency","venue":"okx","latency_ms":120}
//! {"type":"job","id":"j1","strategy":"arbitrage","symbol":"BTC-PERP","notional":"5000","legs":[...]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Market records must
//! carry `observed_at`; one without `latency_ms` keeps the venue's last probe.

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::adapter::InMemoryMarketBook;
use crate::app::Coordinator;
use crate::domain::{Amount, HedgeJob, JobId, MarketSnapshot, RiskMode, VenueId};
use crate::error::Result;

/// One feed line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedRecord {
    /// Venue quote for the market book.
    Market(MarketSnapshot),
    /// Latency probe for a venue without a new quote.
    Latency { venue: VenueId, latency_ms: u64 },
    /// Ledger equity update.
    Equity { venue: VenueId, equity: Amount },
    /// Job submission.
    Job(HedgeJob),
    /// Remove a queued job.
    Withdraw { job_id: JobId },
    /// Let a job through its next soft rejection.
    Override { job_id: JobId },
    /// Toggle safe mode, globally or for one venue.
    SafeMode {
        #[serde(default)]
        venue: Option<VenueId>,
        on: bool,
    },
    /// Enable or disable a venue.
    VenueEnabled { venue: VenueId, on: bool },
    /// Switch the risk mode.
    RiskMode { mode: RiskMode },
    /// Clear a circuit-breaker halt.
    ClearHalt,
}

/// Tally of what a feed did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub records: usize,
    pub admitted: usize,
    pub queued: usize,
    pub rejected: usize,
    pub malformed: usize,
}

/// Apply every record of `reader` to the coordinator and the market book.
///
/// Malformed lines and refused operations are logged and counted; only I/O
/// errors abort the feed.
pub async fn apply<R>(
    reader: R,
    coordinator: &Coordinator,
    book: &InMemoryMarketBook,
) -> Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = FeedSummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record = match serde_json::from_str::<FeedRecord>(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed feed line");
                summary.malformed += 1;
                continue;
            }
        };
        summary.records += 1;
        apply_record(record, coordinator, book, &mut summary);
    }

    info!(
        records = summary.records,
        admitted = summary.admitted,
        queued = summary.queued,
        rejected = summary.rejected,
        malformed = summary.malformed,
        "Feed consumed"
    );
    Ok(summary)
}

/// Apply `reader` while the coordinator's maintenance loop runs, so ticks,
/// reclamation and the daily roll keep going on a feed that stays open.
///
/// The loop stops when the feed ends.
pub async fn apply_with_maintenance<R>(
    reader: R,
    coordinator: &Coordinator,
    book: &InMemoryMarketBook,
) -> Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let (done_tx, done_rx) = oneshot::channel::<()>();
    let feed = async {
        let result = apply(reader, coordinator, book).await;
        let _ = done_tx.send(());
        result
    };
    let maintenance = coordinator.run_until(async {
        let _ = done_rx.await;
    });
    let (summary, ()) = tokio::join!(feed, maintenance);
    summary
}

fn apply_record(
    record: FeedRecord,
    coordinator: &Coordinator,
    book: &InMemoryMarketBook,
    summary: &mut FeedSummary,
) {
    match record {
        FeedRecord::Market(snapshot) => book.update(snapshot),
        FeedRecord::Latency { venue, latency_ms } => book.set_latency(venue, latency_ms),
        FeedRecord::Equity { venue, equity } => {
            if let Err(e) = coordinator.update_equity(&venue, equity) {
                warn!(error = %e, "Equity update refused");
            }
        }
        FeedRecord::Job(job) => {
            let job_id = job.id().clone();
            match coordinator.submit_job(job) {
                Ok(crate::application::Admission::Admitted) => summary.admitted += 1,
                Ok(crate::application::Admission::Queued) => summary.queued += 1,
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "Job rejected");
                    summary.rejected += 1;
                }
            }
        }
        FeedRecord::Withdraw { job_id } => {
            let result = coordinator.withdraw_job(&job_id);
            info!(job_id = %job_id, result = ?result, "Withdraw requested");
        }
        FeedRecord::Override { job_id } => coordinator.grant_override(job_id),
        FeedRecord::SafeMode { venue: None, on } => coordinator.set_safe_mode(on),
        FeedRecord::SafeMode {
            venue: Some(venue),
            on,
        } => {
            if !coordinator.set_venue_safe_mode(&venue, on) {
                warn!(venue = %venue, "Safe mode requested for unknown venue");
            }
        }
        FeedRecord::VenueEnabled { venue, on } => {
            if !coordinator.set_venue_enabled(&venue, on) {
                warn!(venue = %venue, "Enable requested for unknown venue");
            }
        }
        FeedRecord::RiskMode { mode } => coordinator.set_risk_mode(mode),
        FeedRecord::ClearHalt => {
            coordinator.clear_halt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_records() {
        let equity: FeedRecord =
            serde_json::from_str(r#"{"type":"equity","venue":"okx","equity":"2500"}"#).unwrap();
        assert!(matches!(equity, FeedRecord::Equity { .. }));

        let market: FeedRecord = serde_json::from_str(
            r#"{"type":"market","venue":"okx","symbol":"BTC-PERP","bid":"100","ask":"101","depth":"5000",
                "observed_at":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        let FeedRecord::Market(snapshot) = market else {
            panic!("expected market record");
        };
        assert_eq!(snapshot.latency_ms, None);

        let unstamped = serde_json::from_str::<FeedRecord>(
            r#"{"type":"market","venue":"okx","symbol":"BTC-PERP","bid":"100","ask":"101","depth":"5000"}"#,
        );
        assert!(unstamped.is_err());

        let latency: FeedRecord =
            serde_json::from_str(r#"{"type":"latency","venue":"okx","latency_ms":900}"#).unwrap();
        assert!(matches!(latency, FeedRecord::Latency { latency_ms: 900, .. }));

        let halt: FeedRecord = serde_json::from_str(r#"{"type":"clear_halt"}"#).unwrap();
        assert!(matches!(halt, FeedRecord::ClearHalt));
    }

    #[test]
    fn parses_job_record() {
        let record: FeedRecord = serde_json::from_str(
            r#"{"type":"job","id":"j1","strategy":"arbitrage","symbol":"BTC-PERP","notional":"5000",
                "legs":[{"venue":"okx","side":"buy","quantity":"1","instrument":"BTC-PERP"}]}"#,
        )
        .unwrap();
        let FeedRecord::Job(job) = record else {
            panic!("expected job record");
        };
        assert_eq!(job.id().as_str(), "j1");
        assert_eq!(job.legs().len(), 1);
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(serde_json::from_str::<FeedRecord>(r#"{"type":"nope"}"#).is_err());
    }

    #[tokio::test]
    async fn applies_operator_records() {
        use crate::testkit::config::two_venues;
        use crate::testkit::harness::Harness;

        let h = Harness::new(two_venues());
        let feed = r#"
# operator controls
{"type":"equity","venue":"kraken","equity":"5000"}
{"type":"venue_enabled","venue":"kraken","on":false}
{"type":"safe_mode","venue":"okx","on":true}
{"type":"override","job_id":"later"}
{"type":"risk_mode","mode":"aggressive"}
{"type":"job","id":"j1","strategy":"arbitrage","symbol":"BTC-PERP","notional":"1000","legs":[{"venue":"okx","side":"buy","quantity":"0.01","instrument":"BTC-PERP"}]}
{"type":"job","id":"j2","strategy":"arbitrage","symbol":"BTC-PERP","notional":"1000","legs":[{"venue":"binance","side":"buy","quantity":"0.01","instrument":"BTC-PERP"}]}
{"type":"equity","venue":"binance","equity":"-1"}
garbage
"#;

        let summary = apply(feed.as_bytes(), &h.coordinator, &h.book).await.unwrap();

        assert_eq!(summary.records, 8);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.admitted, 1);
        assert_eq!(summary.rejected, 1);

        let kraken = h.coordinator.ledger().venue(&VenueId::from("kraken")).unwrap();
        assert!(!kraken.is_enabled());
        assert!(h.coordinator.risk().has_override(&JobId::from("later")));
        assert_eq!(h.coordinator.risk().mode(), RiskMode::Aggressive);
    }

    #[tokio::test]
    async fn maintenance_runs_while_the_feed_is_open() {
        use std::time::Duration;

        use crate::domain::{FailureReason, JobStatus};
        use crate::testkit::config::two_venues;
        use crate::testkit::harness::Harness;
        use tokio::io::{AsyncWriteExt, BufReader};

        let mut config = two_venues();
        config.scheduler.max_hold_secs = 60;
        config.scheduler.tick_interval_ms = 10;
        let h = Harness::new(config);
        let (mut writer, reader) = tokio::io::duplex(4096);

        let operator = async {
            writer
                .write_all(
                    br#"{"type":"job","id":"held","strategy":"arbitrage","symbol":"BTC-PERP","notional":"1000","legs":[{"venue":"okx","side":"buy","quantity":"0.01","instrument":"BTC-PERP"}]}
"#,
                )
                .await
                .unwrap();
            h.executor.wait_for_dispatched(1).await;
            h.clock.advance(Duration::from_secs(61));

            let id = JobId::from("held");
            tokio::time::timeout(Duration::from_secs(2), async {
                while !matches!(h.coordinator.job_status(&id), Some(JobStatus::Failed { .. })) {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .expect("job reclaimed before the feed closed");
            drop(writer);
        };

        let (summary, ()) = tokio::join!(
            apply_with_maintenance(BufReader::new(reader), &h.coordinator, &h.book),
            operator
        );

        assert_eq!(summary.unwrap().admitted, 1);
        assert!(matches!(
            h.coordinator.job_status(&JobId::from("held")),
            Some(JobStatus::Failed {
                reason: FailureReason::StuckJobReclaimed { .. }
            })
        ));
    }
}
