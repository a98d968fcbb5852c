//! Field parsing utilities for measurement rows
//!
//! Each parser returns `None` when the raw text does not have the expected
//! shape; range and sign policy live in [`super::validator`].

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::constants::{
    MICROS_PER_FRACTION_UNIT, STORE_VALUE_PRECISION, STORE_VALUE_SCALE, TIMESTAMP_SECONDS_FORMAT,
    TIMESTAMP_TEMPLATE,
};

/// Parse a `yyyy-MM-ddTHH-mm-ss.ffffZ` timestamp as UTC
///
/// The layout is strict: four fractional digits, hyphens as time separators and
/// literal `T` and `Z`. Surrounding whitespace is ignored.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if !matches_template(value, TIMESTAMP_TEMPLATE) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(&value[..19], TIMESTAMP_SECONDS_FORMAT).ok()?;
    // chrono encodes a `60` second as a leap second
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }

    let fraction: i64 = value[20..24].parse().ok()?;
    Some(naive.and_utc() + TimeDelta::microseconds(fraction * MICROS_PER_FRACTION_UNIT))
}

/// Format a timestamp in the input file layout
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let fraction = timestamp.timestamp_subsec_micros() as i64 / MICROS_PER_FRACTION_UNIT;
    format!(
        "{}.{:04}Z",
        timestamp.format(TIMESTAMP_SECONDS_FORMAT),
        fraction
    )
}

/// Parse an execution time in whole seconds
pub fn parse_execution_seconds(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Parse a store value in invariant notation
///
/// Accepts a leading or trailing sign (`-5`, `5-`), `,` group separators, a
/// decimal point, an exponent (`1.5e3`) and accounting parentheses for
/// negatives (`(12.5)`). At most one sign form may be used.
pub fn parse_store_value(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();

    let (parenthesized, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let (trailing_negative, body) = match body.strip_suffix(['+', '-']) {
        Some(rest) => (Some(body.ends_with('-')), rest.trim_end()),
        None => (None, body),
    };

    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    let leading_sign = cleaned.starts_with(['+', '-']);
    let number = cleaned.strip_prefix('+').unwrap_or(cleaned.as_str());
    if number.is_empty() {
        return None;
    }
    let sign_forms = [parenthesized, trailing_negative.is_some(), leading_sign];
    if sign_forms.iter().filter(|used| **used).count() > 1 || number.ends_with(['e', 'E']) {
        return None;
    }

    let negated = parenthesized || trailing_negative == Some(true);

    let parsed = if number.contains(['e', 'E']) {
        Decimal::from_scientific(number).ok()?
    } else {
        Decimal::from_str(number).ok()?
    };

    Some(if negated { -parsed } else { parsed })
}

/// Round a value to the storage scale (half away from zero)
pub fn normalize_store_value(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(
        STORE_VALUE_SCALE,
        RoundingStrategy::MidpointAwayFromZero,
    );
    rounded.rescale(STORE_VALUE_SCALE);
    rounded
}

/// Check that a normalized value fits `decimal(18,4)`
pub fn fits_storage_precision(value: Decimal) -> bool {
    let limit = Decimal::from_i128_with_scale(
        10_i128.pow(STORE_VALUE_PRECISION - STORE_VALUE_SCALE),
        0,
    );
    value.abs() < limit
}

fn matches_template(value: &str, template: &str) -> bool {
    value.len() == template.len()
        && value
            .bytes()
            .zip(template.bytes())
            .all(|(actual, expected)| match expected {
                b'd' => actual.is_ascii_digit(),
                literal => actual == literal,
            })
}
