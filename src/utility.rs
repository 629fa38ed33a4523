//! General utility functions.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Round `value` to the nearest multiple of `target` in decimal arithmetic,
/// so that e.g. pips come out as exact two-decimal figures.
///
/// Values that have no decimal form (NaN, infinities, magnitudes beyond
/// `Decimal::MAX`), a zero target, and results that would overflow return
/// `value` unchanged.
pub fn round_to(value: f64, target: f64) -> f64 {
    let (Some(value_dec), Some(target_dec)) = (Decimal::from_f64(value), Decimal::from_f64(target)) else {
        return value;
    };

    value_dec
        .checked_div(target_dec)
        .and_then(|steps| steps.round().checked_mul(target_dec))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234, 0.01), 1.23);
        assert_eq!(round_to(-12.3456, 0.01), -12.35);
        assert_eq!(round_to(0.66666, 0.0001), 0.6667);
        assert_eq!(round_to(25.000000000000004, 0.01), 25.0);
    }

    #[test]
    fn test_round_to_passthrough() {
        assert_eq!(round_to(1.234, 0.0), 1.234);
        assert!(round_to(f64::NAN, 0.01).is_nan());
    }

    #[test]
    fn test_round_to_overflow_passthrough() {
        assert_eq!(round_to(1e27, 0.01), 1e27);
        assert_eq!(round_to(-1e27, 0.01), -1e27);
        assert_eq!(round_to(1e40, 0.01), 1e40);
    }
}
