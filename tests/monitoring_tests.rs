//! Monitoring snapshots and the status file.

mod support;

use hedgeward::application::monitoring::SystemStatus;
use hedgeward::domain::{JobId, JobOutcome, RiskMode, VenueId};
use hedgeward::testkit::config::two_venues;
use hedgeward::testkit::domain::job;
use hedgeward::testkit::harness::Harness;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn snapshot_reflects_running_jobs_and_reservations() {
    let mut config = two_venues();
    config.scheduler.max_concurrent_jobs = 1;
    let h = Harness::new(config);

    h.coordinator
        .submit_job(job("j1", &["binance", "okx"], dec!(8000)))
        .unwrap();
    h.coordinator
        .submit_job(job("j2", &["okx"], dec!(1000)))
        .unwrap();
    h.executor.wait_for_dispatched(1).await;

    let snapshot = h.coordinator.snapshot();

    assert_eq!(snapshot.version, "1");
    assert_eq!(snapshot.global.status, SystemStatus::Active);
    assert_eq!(snapshot.global.risk_mode, RiskMode::Balanced);
    assert!(!snapshot.venues.stale && !snapshot.jobs.stale && !snapshot.risk.stale);

    assert_eq!(snapshot.jobs.data.running.len(), 1);
    assert_eq!(snapshot.jobs.data.running[0].job_id, JobId::from("j1"));
    assert_eq!(snapshot.jobs.data.pending, 1);

    let okx = snapshot
        .venues
        .data
        .iter()
        .find(|v| v.venue == VenueId::from("okx"))
        .unwrap();
    assert_eq!(okx.equity, dec!(100000));
    assert_eq!(okx.in_flight, dec!(8000));
    assert_eq!(okx.total_cap, dec!(30000));
    assert_eq!(okx.per_job_cap, dec!(10000));
    assert_eq!(okx.concurrent_jobs, 1);
    assert_eq!(okx.latency_ms, Some(20));
    assert!(okx.enabled && !okx.safe_mode);
}

#[tokio::test]
async fn snapshot_reports_daily_totals_and_halts() {
    let mut config = two_venues();
    config.circuit_breaker.daily_loss_limit = dec!(100);
    let h = Harness::new(config);

    h.coordinator
        .submit_job(job("j1", &["okx"], dec!(1000)))
        .unwrap();
    h.executor.wait_for_dispatched(1).await;
    h.executor.complete(
        &JobId::from("j1"),
        JobOutcome::success(Vec::new(), dec!(-150), dec!(1000)),
    );
    let risk = std::sync::Arc::clone(h.coordinator.risk());
    support::wait::until("breaker to trip", || risk.is_halted()).await;

    let snapshot = h.coordinator.snapshot();
    assert_eq!(snapshot.global.status, SystemStatus::Halted);
    assert_eq!(snapshot.global.pnl_today, dec!(-150));
    assert_eq!(snapshot.global.volume_today, dec!(1000));
    assert_eq!(snapshot.global.daily_loss_used, dec!(150));
    assert_eq!(snapshot.jobs.data.completed_today, 1);
    assert!(snapshot.risk.data.auto_halt);
    assert!(snapshot.risk.data.halt_reason.is_some());

    h.coordinator.clear_halt();
    h.coordinator.set_safe_mode(true);
    assert_eq!(h.coordinator.snapshot().global.status, SystemStatus::SafeMode);
}

#[tokio::test]
async fn override_grants_are_listed() {
    let h = Harness::new(two_venues());
    h.coordinator.grant_override(JobId::from("b"));
    h.coordinator.grant_override(JobId::from("a"));

    let snapshot = h.coordinator.snapshot();
    assert_eq!(
        snapshot.risk.data.manual_overrides,
        vec![JobId::from("a"), JobId::from("b")]
    );

    assert!(h.coordinator.revoke_override(&JobId::from("a")));
    assert_eq!(h.coordinator.snapshot().risk.data.manual_overrides.len(), 1);
}

#[tokio::test]
async fn snapshot_serializes_with_stable_field_names() {
    let h = Harness::new(two_venues());
    let json = serde_json::to_value(h.coordinator.snapshot()).unwrap();

    assert_eq!(json["version"], "1");
    assert_eq!(json["global"]["status"], "active");
    assert_eq!(json["venues"]["stale"], false);
    assert!(json["venues"]["data"].as_array().is_some_and(|v| v.len() == 2));
    assert!(json["jobs"]["data"]["running"].as_array().is_some());
    assert!(json["risk"]["data"]["halt_reason"].is_null());
}

#[tokio::test]
async fn maintenance_writes_the_status_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("status.json");
    let mut config = two_venues();
    config.monitoring.status_file = Some(path.clone());
    let h = Harness::new(config);

    h.coordinator.maintain();

    let content = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["version"], "1");
    assert_eq!(json["venues"]["data"][0]["equity"], "100000");
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(
        h.coordinator
            .ledger()
            .venue(&VenueId::from("binance"))
            .map(|v| v.in_flight()),
        Some(Decimal::ZERO)
    );
}
