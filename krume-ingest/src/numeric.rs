//! Locale helpers for the number formats in the source files

use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Parse a comma-decimal string (`"2,45"`) into an exact decimal value.
/// Dot-decimal input is accepted too; the journal mixes both.
pub fn parse_comma_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .with_context(|| format!("not a decimal number: {s:?}"))
}

/// Pre-order CSV prices are integer cents; convert to euros
pub fn cents_to_euros(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_comma_decimal("2,45").unwrap(), Decimal::new(245, 2));
        assert_eq!(parse_comma_decimal("0,5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_comma_decimal("12").unwrap(), Decimal::from(12));
    }

    #[test]
    fn test_dot_decimal_accepted() {
        assert_eq!(parse_comma_decimal("0.5").unwrap(), Decimal::new(5, 1));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_comma_decimal("Summe").is_err());
        assert!(parse_comma_decimal("").is_err());
    }

    #[test]
    fn test_cents_to_euros_is_exact() {
        assert_eq!(cents_to_euros(245).to_string(), "2.45");
        assert_eq!(cents_to_euros(100), Decimal::ONE);
        assert_eq!(cents_to_euros(5).to_string(), "0.05");
    }
}
