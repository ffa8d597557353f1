//! Exact rational arithmetic with ±∞ sentinels.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{One, Zero};

/// An exact rational number over `i64`, extended with ±∞ sentinels.
///
/// The fraction is always normalized: the denominator is positive and the
/// numerator carries the sign, reduced by their gcd. A zero denominator
/// encodes an infinity whose sign is the numerator's (+1 or -1). Infinities
/// absorb arithmetic instead of overflowing; combining them in ways with no
/// defined answer (∞ − ∞, 0 · ∞, ∞ / ∞) is a contract violation and panics.
///
/// # Examples
///
/// ```
/// use sibyl_num::Rational;
///
/// let a = Rational::new(1, 3);
/// let b = Rational::new(1, 6);
/// assert_eq!(a + b, Rational::new(1, 2));
///
/// assert!(Rational::NEGATIVE_INFINITY < Rational::new(i64::MIN, 1));
/// assert_eq!(Rational::POSITIVE_INFINITY + a, Rational::POSITIVE_INFINITY);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational {
    num: i64,
    den: i64,
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.abs()
}

impl Rational {
    /// The zero rational.
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// The rational one.
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// The +∞ sentinel.
    pub const POSITIVE_INFINITY: Rational = Rational { num: 1, den: 0 };

    /// The −∞ sentinel.
    pub const NEGATIVE_INFINITY: Rational = Rational { num: -1, den: 0 };

    /// Creates a normalized rational.
    ///
    /// A zero denominator yields the infinity matching the numerator's sign;
    /// `0/0` has no value and panics.
    pub fn new(num: i64, den: i64) -> Self {
        Self::from_i128(num as i128, den as i128)
    }

    fn from_i128(num: i128, den: i128) -> Self {
        if den == 0 {
            assert!(num != 0, "0/0 is not a rational");
            return if num > 0 {
                Self::POSITIVE_INFINITY
            } else {
                Self::NEGATIVE_INFINITY
            };
        }
        let sign = if (num < 0) != (den < 0) { -1 } else { 1 };
        let (num, den) = (num.abs(), den.abs());
        let g = gcd(num, den);
        let (num, den) = if g == 0 { (0, 1) } else { (num / g, den / g) };
        let num = sign * num;
        assert!(
            num >= i64::MIN as i128 && num <= i64::MAX as i128 && den <= i64::MAX as i128,
            "rational overflow: {num}/{den}"
        );
        Rational {
            num: num as i64,
            den: den as i64,
        }
    }

    /// Returns the numerator (±1 for the infinities).
    #[inline]
    pub const fn numerator(&self) -> i64 {
        self.num
    }

    /// Returns the denominator (0 for the infinities).
    #[inline]
    pub const fn denominator(&self) -> i64 {
        self.den
    }

    /// Returns true for either infinity sentinel.
    #[inline]
    pub const fn is_infinite(&self) -> bool {
        self.den == 0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.num == 0 && self.den != 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.num > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Largest integer ≤ self. Panics on the infinities.
    pub fn floor(&self) -> i64 {
        assert!(!self.is_infinite(), "floor of an infinite rational");
        self.num.div_euclid(self.den)
    }

    /// Smallest integer ≥ self. Panics on the infinities.
    pub fn ceil(&self) -> i64 {
        assert!(!self.is_infinite(), "ceil of an infinite rational");
        -(-self.num).div_euclid(self.den)
    }

    /// The multiplicative inverse. Zero inverts to +∞, infinities to zero.
    pub fn recip(&self) -> Self {
        if self.is_infinite() {
            return Self::ZERO;
        }
        Self::from_i128(self.den as i128, self.num as i128)
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational { num: value, den: 1 }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        if self.is_infinite() {
            assert!(
                !rhs.is_infinite() || rhs.num == self.num,
                "adding opposite infinities"
            );
            return self;
        }
        if rhs.is_infinite() {
            return rhs;
        }
        Self::from_i128(
            self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128,
            self.den as i128 * rhs.den as i128,
        )
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        if self.is_infinite() || rhs.is_infinite() {
            assert!(
                !self.is_zero() && !rhs.is_zero(),
                "multiplying zero by an infinity"
            );
            return if self.is_negative() == rhs.is_negative() {
                Self::POSITIVE_INFINITY
            } else {
                Self::NEGATIVE_INFINITY
            };
        }
        Self::from_i128(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }
}

impl Div for Rational {
    type Output = Rational;

    fn div(self, rhs: Rational) -> Rational {
        if rhs.is_infinite() {
            assert!(!self.is_infinite(), "dividing infinity by infinity");
            return Self::ZERO;
        }
        if rhs.is_zero() {
            assert!(!self.is_zero(), "dividing zero by zero");
            return if self.is_negative() {
                Self::NEGATIVE_INFINITY
            } else {
                Self::POSITIVE_INFINITY
            };
        }
        Self::from_i128(
            self.num as i128 * rhs.den as i128,
            self.den as i128 * rhs.num as i128,
        )
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Rational) {
        *self = *self - rhs;
    }
}

impl MulAssign for Rational {
    fn mul_assign(&mut self, rhs: Rational) {
        *self = *self * rhs;
    }
}

impl DivAssign for Rational {
    fn div_assign(&mut self, rhs: Rational) {
        *self = *self / rhs;
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Rational) -> Ordering {
        // Cross multiplication misorders opposite infinities, so handle the
        // sentinels first.
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => self.num.cmp(&other.num),
            (true, false) => {
                if self.is_positive() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, true) => {
                if other.is_positive() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, false) => {
                let lhs = self.num as i128 * other.den as i128;
                let rhs = other.num as i128 * self.den as i128;
                lhs.cmp(&rhs)
            }
        }
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }
}

impl One for Rational {
    fn one() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            return write!(f, "{}inf", if self.is_positive() { "+" } else { "-" });
        }
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
