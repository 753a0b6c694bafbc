use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a temporary `.toml` file that lives as long as the handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("hedgeward-config-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// Two funded venues with the default limits.
pub const TWO_VENUES: &str = r#"
[logging]
level = "warn"

[capital]
per_job_cap = 0.1
total_cap = 0.3

[venues.binance]
equity = 100000

[venues.okx]
equity = 100000
"#;
