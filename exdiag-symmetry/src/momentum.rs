//! Fractional momenta as exact rationals
//!
//! A momentum component `k_i = m_i / R_i` is stored as a [`Rational64`], so
//! compatibility checks against identity translations are exact.

pub use num_rational::Rational64;

/// Fractional part of `k` in `[0, 1)`
///
/// ```
/// use exdiag_symmetry::{fractional_part, Rational64};
///
/// assert_eq!(fractional_part(&Rational64::new(7, 3)), Rational64::new(1, 3));
/// assert_eq!(fractional_part(&Rational64::new(-1, 4)), Rational64::new(3, 4));
/// ```
pub fn fractional_part(k: &Rational64) -> Rational64 {
    k - k.floor()
}

#[inline]
pub(crate) fn to_f64(k: &Rational64) -> f64 {
    *k.numer() as f64 / *k.denom() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_part() {
        assert_eq!(fractional_part(&Rational64::new(5, 4)), Rational64::new(1, 4));
        assert_eq!(fractional_part(&Rational64::new(-3, 4)), Rational64::new(1, 4));
        assert_eq!(fractional_part(&Rational64::from_integer(-4)), Rational64::from_integer(0));
        assert_eq!(fractional_part(&Rational64::new(2, 6)), Rational64::new(1, 3));
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(&Rational64::new(3, 4)), 0.75);
        assert_eq!(to_f64(&Rational64::new(-1, 2)), -0.5);
    }
}
