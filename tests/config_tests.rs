//! Configuration loading from files.

mod support;

use hedgeward::config::{Config, RISK_MODE_ENV};
use hedgeward::domain::{RiskMode, VenueId};
use hedgeward::error::{ConfigError, Error};
use rust_decimal_macros::dec;
use support::config::{write_temp_config, TWO_VENUES};

#[test]
fn loads_venues_and_limits_from_file() {
    let file = write_temp_config(TWO_VENUES);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.capital.per_job_cap, dec!(0.1));
    assert_eq!(config.venues.len(), 2);
    assert_eq!(config.venues["okx"].equity, Some(dec!(100000)));
    assert_eq!(config.venue_ceiling(&VenueId::from("okx")), 3);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn invalid_values_name_the_field() {
    let file = write_temp_config(
        r#"
[scheduler]
max_concurrent_jobs = 0
"#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(
        err.to_string().contains("max_concurrent_jobs"),
        "unexpected error: {err}"
    );
}

#[test]
fn profile_overrides_are_range_checked() {
    let file = write_temp_config(
        r#"
[risk.overrides]
min_final_score = 1.5
"#,
    );
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "overrides.min_final_score",
            ..
        }))
    ));
}

#[test]
fn monitoring_section_parses() {
    let file = write_temp_config(
        r#"
[monitoring]
lock_timeout_ms = 20
status_file = "/tmp/hedgeward-status.json"
"#,
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.monitoring.lock_timeout().as_millis(), 20);
    assert!(config.monitoring.status_file.is_some());
}

#[test]
fn environment_overrides_risk_mode() {
    let file = write_temp_config(
        r#"
[risk]
mode = "conservative"
"#,
    );

    std::env::set_var(RISK_MODE_ENV, "aggressive");
    let result = Config::load(file.path());
    std::env::remove_var(RISK_MODE_ENV);

    assert_eq!(result.unwrap().risk.mode, RiskMode::Aggressive);
}
