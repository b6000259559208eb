//! Numeric canonicalization.
//!
//! Every cell written into a [`Matrix`](crate::Matrix) passes through
//! [`canonicalize`], and every comparison the engine makes is between
//! canonical values. Raw floating-point results are never compared directly.

/// Number of fractional decimal digits kept by [`canonicalize`].
pub const DECIMALS: i32 = 2;

const SCALE: f64 = 100.0;

/// From here on every `f64` is already integral, and scaling could overflow.
const EXACT_LIMIT: f64 = 4_503_599_627_370_496.0 / SCALE;

/// Round `x` to at most two fractional digits.
///
/// Ties round half away from zero (`2.345 -> 2.35`, `-2.345 -> -2.35`),
/// applied to the binary value scaled by 100. Negative zero becomes zero.
/// Non-finite input, and magnitudes too large to carry a fraction, are
/// returned unchanged.
///
/// Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`.
pub fn canonicalize(x: f64) -> f64 {
    if !x.is_finite() || x.abs() >= EXACT_LIMIT {
        return x;
    }
    let rounded = (x * SCALE).round() / SCALE;
    if rounded == 0.0 {
        // drops the sign of -0.0
        0.0
    } else {
        rounded
    }
}

/// Canonicalize every entry of a row.
pub fn canonicalize_row(row: &[f64]) -> Vec<f64> {
    row.iter().map(|&x| canonicalize(x)).collect()
}

/// `true` if both values are equal after canonicalization.
pub fn canonical_eq(a: f64, b: f64) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// `true` if the canonical value is mathematically integral.
pub fn is_integral(x: f64) -> bool {
    let c = canonicalize(x);
    c.is_finite() && c.fract() == 0.0
}

/// Render a number the way operation strings and displays show it.
///
/// Integral canonical values print without a fractional part (`3`, `-2`),
/// everything else prints with trailing zeros stripped (`0.5`, `1.25`).
pub fn format_number(x: f64) -> String {
    let c = canonicalize(x);
    if !c.is_finite() {
        return c.to_string();
    }
    if c.fract() == 0.0 && c.abs() < 1e15 {
        return format!("{}", c as i64);
    }
    let text = format!("{:.2}", c);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(canonicalize(1.0 / 3.0), 0.33);
        assert_eq!(canonicalize(2.0 / 3.0), 0.67);
        assert_eq!(canonicalize(0.1 + 0.2), 0.3);
        assert_eq!(canonicalize(4.0), 4.0);
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(canonicalize(0.125), 0.13);
        assert_eq!(canonicalize(-0.125), -0.13);
        assert_eq!(canonicalize(2.5), 2.5);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let c = canonicalize(-0.001);
        assert_eq!(c, 0.0);
        assert!(c.is_sign_positive());
        assert!(canonicalize(-0.0).is_sign_positive());
    }

    #[test]
    fn test_noise_collapses_to_integer() {
        // 0.99999999 style artifacts from repeated row operations
        assert_eq!(canonicalize(0.999_999_999), 1.0);
        assert_eq!(canonicalize(3.000_000_000_4), 3.0);
        assert!(is_integral(0.999_999_999));
        assert!(!is_integral(0.5));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.333), "0.33");
        assert_eq!(format_number(1.1 * 3.0), "3.3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_huge_values_stay_finite() {
        assert_eq!(canonicalize(1.5e306), 1.5e306);
        assert_eq!(canonicalize(-f64::MAX), -f64::MAX);
        assert_eq!(canonicalize(1.0e14 + 0.25), 1.0e14 + 0.25);
    }

    #[test]
    fn test_canonical_eq() {
        assert!(canonical_eq(0.1 + 0.2, 0.3));
        assert!(!canonical_eq(0.3, 0.31));
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(x in -1.0e9f64..1.0e9f64) {
            let once = canonicalize(x);
            prop_assert_eq!(canonicalize(once), once);
        }

        #[test]
        fn canonical_values_format_and_reparse(x in -1.0e6f64..1.0e6f64) {
            let c = canonicalize(x);
            let parsed: f64 = format_number(c).parse().unwrap();
            prop_assert_eq!(canonicalize(parsed), c);
        }
    }
}
