//! End-to-end tests of the `hedgeward` binary.

mod support;

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use support::config::{write_temp_config, TWO_VENUES};

fn hedgeward() -> Command {
    let mut cmd = Command::cargo_bin("hedgeward").unwrap();
    cmd.env_remove("HEDGEWARD_RISK_MODE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_prints_effective_limits() {
    let config = write_temp_config(TWO_VENUES);

    hedgeward()
        .arg("check")
        .arg("--config")
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("balanced"))
        .stdout(predicate::str::contains("10% of equity"))
        .stdout(predicate::str::contains("max clock skew (ms)"))
        .stdout(predicate::str::contains("binance"));
}

#[test]
fn check_fails_on_invalid_config() {
    let config = write_temp_config(
        r#"
[capital]
per_job_cap = 0.5
total_cap = 0.3
"#,
    );

    hedgeward()
        .arg("check")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("per_job_cap"));
}

#[test]
fn check_fails_on_missing_file() {
    hedgeward()
        .args(["check", "--config", "/nonexistent/hedgeward.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn run_replays_a_feed_and_prints_the_snapshot() {
    let config = write_temp_config(TWO_VENUES);
    let now = chrono::Utc::now().to_rfc3339();
    let mut feed = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        feed,
        r#"# quotes first
{{"type":"market","venue":"binance","symbol":"BTC-PERP","bid":"64000","ask":"64001","depth":"5000000","latency_ms":20,"observed_at":"{now}"}}
{{"type":"market","venue":"okx","symbol":"BTC-PERP","bid":"64000","ask":"64002","depth":"5000000","latency_ms":30,"observed_at":"{now}"}}
{{"type":"job","id":"j1","strategy":"arbitrage","symbol":"BTC-PERP","notional":"6400","expected_edge_bps":15.0,"legs":[{{"venue":"binance","side":"buy","quantity":"0.1","instrument":"BTC-PERP"}},{{"venue":"okx","side":"sell","quantity":"0.1","instrument":"BTC-PERP"}}]}}
{{"type":"job","id":"too-big","strategy":"arbitrage","symbol":"BTC-PERP","notional":"64000","legs":[{{"venue":"binance","side":"buy","quantity":"1","instrument":"BTC-PERP"}}]}}
not json"#
    )
    .unwrap();

    let output = hedgeward()
        .arg("run")
        .arg("--config")
        .arg(config.path())
        .arg("--jobs")
        .arg(feed.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["version"], "1");
    assert_eq!(snapshot["jobs"]["data"]["completed_total"], 1);
    assert_eq!(snapshot["jobs"]["data"]["pending"], 0);
    for venue in snapshot["venues"]["data"].as_array().unwrap() {
        let in_flight: f64 = venue["in_flight"].as_str().unwrap().parse().unwrap();
        assert_eq!(in_flight, 0.0);
    }
}

#[test]
fn run_reads_the_feed_from_stdin() {
    let config = write_temp_config(TWO_VENUES);

    hedgeward()
        .arg("run")
        .arg("--config")
        .arg(config.path())
        .arg("--risk-mode")
        .arg("conservative")
        .write_stdin("{\"type\":\"equity\",\"venue\":\"kraken\",\"equity\":\"5000\"}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"risk_mode\": \"conservative\""))
        .stdout(predicate::str::contains("kraken"));
}
