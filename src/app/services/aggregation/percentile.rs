//! Order statistics over fixed-point values

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::STORE_VALUE_SCALE;

/// Continuous percentile of an ascending slice
///
/// Uses linear interpolation between the closest ranks: with `n` values the
/// fractional rank is `p * (n - 1)`. The result is rounded to the storage
/// scale. Returns `None` for an empty slice or `p` outside `[0, 1]`.
pub fn continuous_percentile(sorted: &[Decimal], percentile: f64) -> Option<Decimal> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&percentile) {
        return None;
    }

    let last_index = Decimal::from(sorted.len() - 1);
    let rank = Decimal::try_from(percentile).ok()?.checked_mul(last_index)?;
    let lower_rank = rank.floor();
    let fraction = rank - lower_rank;

    let lower_index = lower_rank.to_usize()?;
    let lower = *sorted.get(lower_index)?;
    if fraction.is_zero() {
        return Some(round_to_scale(lower));
    }

    let upper = *sorted.get(lower_index + 1)?;
    let interpolated = lower.checked_add((upper - lower).checked_mul(fraction)?)?;
    Some(round_to_scale(interpolated))
}

/// Arithmetic mean rounded to the storage scale
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))?;
    let average = sum.checked_div(Decimal::from(values.len()))?;
    Some(round_to_scale(average))
}

fn round_to_scale(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(STORE_VALUE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(STORE_VALUE_SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &[i64]) -> Vec<Decimal> {
        raw.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn test_median_of_even_count_interpolates() {
        let median = continuous_percentile(&values(&[10, 20, 30, 40]), 0.5).unwrap();
        assert_eq!(median, Decimal::from(25));
    }

    #[test]
    fn test_median_of_odd_count_is_middle_value() {
        let median = continuous_percentile(&values(&[5, 15, 25]), 0.5).unwrap();
        assert_eq!(median, Decimal::from(15));
    }

    #[test]
    fn test_single_value() {
        assert_eq!(
            continuous_percentile(&values(&[7]), 0.5),
            Some(Decimal::from(7))
        );
    }

    #[test]
    fn test_other_percentiles() {
        let sorted = values(&[10, 20, 30, 40, 50]);
        assert_eq!(continuous_percentile(&sorted, 0.0), Some(Decimal::from(10)));
        assert_eq!(continuous_percentile(&sorted, 1.0), Some(Decimal::from(50)));
        assert_eq!(
            continuous_percentile(&sorted, 0.9),
            Some(Decimal::new(460_000, 4))
        );
    }

    #[test]
    fn test_median_rounds_to_storage_scale() {
        let sorted = vec![Decimal::new(1, 4), Decimal::new(2, 4)];
        // 0.00015 rounds half away from zero
        assert_eq!(
            continuous_percentile(&sorted, 0.5),
            Some(Decimal::new(2, 4))
        );
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(continuous_percentile(&[], 0.5), None);
        assert_eq!(continuous_percentile(&values(&[1]), 1.5), None);
        assert_eq!(continuous_percentile(&values(&[1]), f64::NAN), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&values(&[10, 20, 30, 40])), Some(Decimal::from(25)));
        assert_eq!(
            mean(&values(&[1, 1, 2])).map(|m| m.to_string()),
            Some("1.3333".to_string())
        );
        assert_eq!(mean(&[]), None);
    }
}
