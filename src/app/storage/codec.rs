//! Column encoding for fixed-point decimals and timestamps

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::app::services::dataset_query::Comparison;
use crate::constants::STORE_VALUE_SCALE;
use crate::{Error, Result};

const SCALE_FACTOR: i64 = 10_i64.pow(STORE_VALUE_SCALE);

/// Encode a decimal as an integer scaled by 10^4 (half away from zero)
///
/// Returns `None` when the value does not fit the integer column.
pub fn decimal_to_scaled(value: Decimal) -> Option<i64> {
    let rounded = value.round_dp_with_strategy(
        STORE_VALUE_SCALE,
        RoundingStrategy::MidpointAwayFromZero,
    );
    scale_up(rounded)
}

/// Decode an integer scaled by 10^4
pub fn scaled_to_decimal(scaled: i64) -> Decimal {
    Decimal::new(scaled, STORE_VALUE_SCALE)
}

/// Encode a filter bound so the integer comparison keeps the decimal meaning
///
/// Lower bounds round up and upper bounds round down to the storage scale;
/// out-of-range bounds saturate.
pub fn decimal_bound_to_scaled(value: Decimal, comparison: Comparison) -> i64 {
    let strategy = match comparison {
        Comparison::AtLeast => RoundingStrategy::ToPositiveInfinity,
        Comparison::AtMost => RoundingStrategy::ToNegativeInfinity,
        Comparison::Equal => RoundingStrategy::MidpointAwayFromZero,
    };
    let rounded = value.round_dp_with_strategy(STORE_VALUE_SCALE, strategy);

    scale_up(rounded).unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Encode a timestamp as microseconds since the Unix epoch
pub fn timestamp_to_micros(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros()
}

/// Decode microseconds since the Unix epoch
pub fn micros_to_timestamp(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| Error::value_out_of_range("start_timestamp_us", micros))
}

fn scale_up(value: Decimal) -> Option<i64> {
    value
        .checked_mul(Decimal::from(SCALE_FACTOR))?
        .trunc()
        .to_i64()
}
