//! Double-double arithmetic.
//!
//! A value is the unevaluated sum `hi + lo` of two `f64`s with `|lo| <= ulp(hi) / 2`,
//! giving roughly 106 bits of significand. Only the operations needed by the
//! circumcenter solve are provided.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// An extended-precision value built from a pair of doubles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

/// Error-free sum: `a + b == s + e` exactly.
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// Error-free sum assuming `|a| >= |b|`.
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Error-free product using a fused multiply-add.
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

impl DoubleDouble {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    #[must_use]
    fn renormalized(hi: f64, lo: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Rounds to the nearest double.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[must_use]
    pub fn hi(self) -> f64 {
        self.hi
    }

    #[must_use]
    pub fn lo(self) -> f64 {
        self.lo
    }

    #[must_use]
    pub fn sqr(self) -> Self {
        self * self
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.hi == 0.0 && self.lo == 0.0
    }

    /// Multiplies by a plain double.
    #[must_use]
    pub fn mul_f64(self, rhs: f64) -> Self {
        let (p, e) = two_prod(self.hi, rhs);
        Self::renormalized(p, self.lo.mul_add(rhs, e))
    }
}

impl From<f64> for DoubleDouble {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        Self::renormalized(s, e + f)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let e = e + (self.hi * rhs.lo + self.lo * rhs.hi);
        Self::renormalized(p, e)
    }
}

impl Div for DoubleDouble {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs.mul_f64(q1);
        let q2 = r.hi / rhs.hi;
        let r = r - rhs.mul_f64(q2);
        let q3 = r.hi / rhs.hi;
        let (q1, q2) = quick_two_sum(q1, q2);
        Self { hi: q1, lo: q2 } + Self::new(q3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_keeps_bits_lost_by_f64() {
        let big = DoubleDouble::new(1e16);
        let small = DoubleDouble::new(1.0);
        let sum = big + small;
        assert!(((sum - big).to_f64() - 1.0).abs() < f64::EPSILON);
        // Plain doubles lose the unit entirely.
        assert!((1e16_f64 + 1.0) - 1e16 != 1.0);
    }

    #[test]
    fn product_is_exact_for_representable_factors() {
        let a = DoubleDouble::new(134_217_729.0); // 2^27 + 1
        let sq = a.sqr();
        // (2^27 + 1)^2 = 2^54 + 2^28 + 1, not representable as one double.
        assert!(sq.lo().abs() > 0.0);
        let back = sq - DoubleDouble::new(18_014_398_509_481_984.0) - DoubleDouble::new(268_435_456.0);
        assert!((back.to_f64() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn division_round_trips() {
        let a = DoubleDouble::new(1.0);
        let three = DoubleDouble::new(3.0);
        let third = a / three;
        let one = third * three;
        assert!((one.to_f64() - 1.0).abs() < 1e-15);
        assert!(!third.is_zero());
    }

    #[test]
    fn negation_and_scaling() {
        let v = DoubleDouble::new(2.5);
        assert!(((-v).to_f64() + 2.5).abs() < f64::EPSILON);
        assert!((v.mul_f64(4.0).to_f64() - 10.0).abs() < 1e-15);
    }
}
