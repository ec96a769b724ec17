use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest amount a single expense may carry (10 trillion units).
///
/// Keeps monthly sums far from the limits of [Cents].
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000_000_000;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// More than two decimal places is an error: amounts are stored exactly as
/// given, never rounded.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.as_slice() {
        [units] => parse_units(units)?
            .checked_mul(100)
            .ok_or(ParseCentsError::OutOfRange)?,
        [units, decimals] => {
            let units = if units.is_empty() {
                0
            } else {
                parse_units(units)?
            };

            let decimal_cents: i64 = match decimals.len() {
                0 => 0,
                // Single digit like "5" means 50 cents
                1 => parse_units(decimals)? * 10,
                2 => parse_units(decimals)?,
                _ => return Err(ParseCentsError::TooPrecise),
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::OutOfRange)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

fn parse_units(digits: &str) -> Result<i64, ParseCentsError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    digits.parse().map_err(|_| ParseCentsError::OutOfRange)
}

/// Convert a decimal amount (as received in JSON) into cents.
///
/// Rejects non-finite values and values with sub-cent precision.
pub fn cents_from_f64(amount: f64) -> Result<Cents, ParseCentsError> {
    if !amount.is_finite() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let scaled = amount * 100.0;
    if scaled.abs() >= i64::MAX as f64 {
        return Err(ParseCentsError::OutOfRange);
    }

    let rounded = scaled.round();
    // Tolerance absorbs binary representation error, e.g. 0.29 * 100 = 28.999999999999996
    if (scaled - rounded).abs() > 1e-6 {
        return Err(ParseCentsError::TooPrecise);
    }

    Ok(rounded as Cents)
}

/// Convert cents into a decimal amount for the JSON wire format.
pub fn cents_to_f64(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Halve an amount of cents, rounding exact half-cents to the nearest even cent.
/// Example: 5000 -> 2500, 3 -> 2, 1 -> 0, -3 -> -2
pub fn halve_cents(cents: Cents) -> Cents {
    let quotient = cents / 2;
    let remainder = cents % 2;
    if remainder == 0 || quotient % 2 == 0 {
        quotient
    } else {
        quotient + remainder
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooPrecise,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooPrecise => write!(f, "more than two decimal places"),
            ParseCentsError::OutOfRange => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter writing cents as a decimal JSON number.
pub mod decimal {
    use serde::Serializer;

    use super::{Cents, cents_to_f64};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_f64(*cents))
    }
}
