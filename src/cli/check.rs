//! Handler for the `check` command.

use std::path::Path;

use crate::application::RiskProfile;
use crate::cli::output;
use crate::config::Config;
use crate::domain::VenueId;
use crate::error::Result;

/// Validate a configuration file and print the limits it resolves to.
#[allow(clippy::result_large_err)]
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());

    let config = Config::load(path)?;
    output::ok("Configuration file is valid");

    print_capital(&config);
    print_risk(&config);
    print_scheduler(&config);
    print_venues(&config);

    println!();
    output::ok("Configuration is ready to use");
    Ok(())
}

fn print_capital(config: &Config) {
    let capital = &config.capital;
    output::section("Capital");
    output::fraction("per-job cap", capital.per_job_cap);
    output::fraction("total cap", capital.total_cap);
    output::fraction("reserve tier", capital.tiers.reserve);
    output::fraction("wash tier", capital.tiers.wash);
    output::fraction("arb tier", capital.tiers.arb);
}

fn print_risk(config: &Config) {
    let profile = RiskProfile::from_config(&config.risk);
    let breaker = &config.circuit_breaker;

    output::section("Risk");
    output::key_value("mode", profile.mode);
    output::key_value("min final score", profile.min_final_score);
    output::key_value("min safety score", profile.min_safety_score);
    output::key_value(
        "safety / volume",
        format!("{} / {}", profile.safety_weight, profile.volume_weight),
    );
    output::key_value("max latency (ms)", profile.max_latency_ms);
    output::key_value("staleness (ms)", profile.staleness_ms);
    output::key_value("max clock skew (ms)", profile.max_clock_skew_ms);
    output::key_value(
        "funding (bps)",
        format!(
            "{} soft / {} hard",
            profile.funding_threshold_bps, profile.emergency_funding_bps
        ),
    );
    output::key_value("max slippage (bps)", profile.max_slippage_bps);
    output::key_value("max leverage", profile.max_leverage);

    output::section("Circuit breaker");
    output::key_value("max failures", breaker.max_consecutive_failures);
    output::key_value("daily loss limit", breaker.daily_loss_limit);
    output::flag("auto clear at UTC day", breaker.auto_clear_daily_loss);
}

fn print_scheduler(config: &Config) {
    let scheduler = &config.scheduler;
    output::section("Scheduler");
    output::key_value("max concurrent jobs", scheduler.max_concurrent_jobs);
    output::key_value("max per venue", scheduler.max_concurrent_per_venue);
    output::key_value("max hold (s)", scheduler.max_hold_secs);
    output::key_value("tick interval (ms)", scheduler.tick_interval_ms);
    output::key_value("monitor lock (ms)", config.monitoring.lock_timeout_ms);
    if let Some(path) = &config.monitoring.status_file {
        output::key_value("status file", path.display());
    }
}

fn print_venues(config: &Config) {
    output::section("Venues");
    if config.venues.is_empty() {
        output::warn("No venues configured; equity must arrive through the feed");
        return;
    }
    for (name, venue) in &config.venues {
        let equity = venue
            .equity
            .map_or_else(|| "unset".to_string(), |e| e.to_string());
        let ceiling = config.venue_ceiling(&VenueId::from(name.as_str()));
        let state = if venue.enabled { "enabled" } else { "disabled" };
        output::key_value(
            name,
            format!("equity {equity}, max {ceiling} concurrent, {state}"),
        );
    }
}
