//! Operator-facing text for `hedgeward check` and `hedgeward run`.

use std::fmt::Display;

use rust_decimal::Decimal;

const LABEL_WIDTH: usize = 24;
const RULE: &str = "────────────────────────────────────────────────────────";

pub fn section(title: &str) {
    println!("\n{title}\n{RULE}");
}

pub fn key_value(label: &str, value: impl Display) {
    println!("{}", line(label, value));
}

/// A capital fraction, shown as a share of venue equity.
pub fn fraction(label: &str, value: Decimal) {
    key_value(label, percent_of_equity(value));
}

pub fn flag(label: &str, on: bool) {
    key_value(label, if on { "on" } else { "off" });
}

pub fn ok(message: &str) {
    println!("✓ {message}");
}

pub fn warn(message: &str) {
    println!("⚠ {message}");
}

/// Errors go to stderr so `run` keeps stdout for the snapshot JSON.
pub fn error(message: &str) {
    eprintln!("✗ {message}");
}

fn line(label: &str, value: impl Display) -> String {
    format!("{label:<LABEL_WIDTH$} {value}")
}

fn percent_of_equity(value: Decimal) -> String {
    let percent = (value * Decimal::ONE_HUNDRED).normalize();
    format!("{percent}% of equity")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn labels_are_padded_to_a_column() {
        let text = line("max hold (s)", 120);
        assert_eq!(text.find("120"), Some(LABEL_WIDTH + 1));
    }

    #[test]
    fn fractions_read_as_percent_of_equity() {
        assert_eq!(percent_of_equity(dec!(0.1)), "10% of equity");
        assert_eq!(percent_of_equity(dec!(0.25)), "25% of equity");
    }
}
