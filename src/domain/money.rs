//! Monetary types for capital and quantity representation.

use rust_decimal::Decimal;

/// Capital amount in quote currency, represented as a Decimal for precision.
pub type Amount = Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Order quantity in base units.
pub type Quantity = Decimal;
