//! Rationals extended with a signed infinitesimal, for strict bound edges.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::Rational;

/// A rational adjusted by a signed infinitesimal: `rat + inf · ε`.
///
/// ε is positive but smaller than every positive rational, which lets a bound
/// distinguish strict from non-strict edges: `x < 3` has upper bound
/// `3 − ε`, `x ≤ 3` has upper bound `3`. The rational part may be one of the
/// ±∞ sentinels, in which case the infinitesimal is irrelevant.
///
/// # Examples
///
/// ```
/// use sibyl_num::{InfRational, Rational};
///
/// let strict = InfRational::with_infinitesimal(Rational::from(3), -Rational::ONE);
/// let closed = InfRational::new(Rational::from(3));
/// assert!(strict < closed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfRational {
    rat: Rational,
    inf: Rational,
}

impl InfRational {
    /// The zero value.
    pub const ZERO: InfRational = InfRational {
        rat: Rational::ZERO,
        inf: Rational::ZERO,
    };

    /// The +∞ bound.
    pub const POSITIVE_INFINITY: InfRational = InfRational {
        rat: Rational::POSITIVE_INFINITY,
        inf: Rational::ZERO,
    };

    /// The −∞ bound.
    pub const NEGATIVE_INFINITY: InfRational = InfRational {
        rat: Rational::NEGATIVE_INFINITY,
        inf: Rational::ZERO,
    };

    /// A value with no infinitesimal part.
    pub const fn new(rat: Rational) -> Self {
        InfRational {
            rat,
            inf: Rational::ZERO,
        }
    }

    /// A value with an explicit infinitesimal coefficient.
    pub const fn with_infinitesimal(rat: Rational, inf: Rational) -> Self {
        InfRational { rat, inf }
    }

    /// The rational part.
    #[inline]
    pub const fn rational(&self) -> Rational {
        self.rat
    }

    /// The infinitesimal coefficient.
    #[inline]
    pub const fn infinitesimal(&self) -> Rational {
        self.inf
    }

    #[inline]
    pub const fn is_infinite(&self) -> bool {
        self.rat.is_infinite()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.rat.is_zero() && self.inf.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.rat.is_positive() || (self.rat.is_zero() && self.inf.is_positive())
    }

    pub fn is_negative(&self) -> bool {
        self.rat.is_negative() || (self.rat.is_zero() && self.inf.is_negative())
    }
}

impl From<Rational> for InfRational {
    fn from(rat: Rational) -> Self {
        InfRational::new(rat)
    }
}

impl From<i64> for InfRational {
    fn from(value: i64) -> Self {
        InfRational::new(Rational::from(value))
    }
}

impl Default for InfRational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for InfRational {
    type Output = InfRational;

    fn add(self, rhs: InfRational) -> InfRational {
        InfRational {
            rat: self.rat + rhs.rat,
            inf: self.inf + rhs.inf,
        }
    }
}

impl Sub for InfRational {
    type Output = InfRational;

    fn sub(self, rhs: InfRational) -> InfRational {
        InfRational {
            rat: self.rat - rhs.rat,
            inf: self.inf - rhs.inf,
        }
    }
}

impl Mul<Rational> for InfRational {
    type Output = InfRational;

    fn mul(self, rhs: Rational) -> InfRational {
        InfRational {
            rat: self.rat * rhs,
            inf: if self.inf.is_zero() {
                self.inf
            } else {
                self.inf * rhs
            },
        }
    }
}

impl Div<Rational> for InfRational {
    type Output = InfRational;

    fn div(self, rhs: Rational) -> InfRational {
        InfRational {
            rat: self.rat / rhs,
            inf: if self.inf.is_zero() {
                self.inf
            } else {
                self.inf / rhs
            },
        }
    }
}

impl Neg for InfRational {
    type Output = InfRational;

    fn neg(self) -> InfRational {
        InfRational {
            rat: -self.rat,
            inf: -self.inf,
        }
    }
}

impl AddAssign for InfRational {
    fn add_assign(&mut self, rhs: InfRational) {
        *self = *self + rhs;
    }
}

impl SubAssign for InfRational {
    fn sub_assign(&mut self, rhs: InfRational) {
        *self = *self - rhs;
    }
}

impl PartialOrd for InfRational {
    fn partial_cmp(&self, other: &InfRational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InfRational {
    fn cmp(&self, other: &InfRational) -> Ordering {
        self.rat
            .cmp(&other.rat)
            .then_with(|| self.inf.cmp(&other.inf))
    }
}

impl fmt::Display for InfRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inf.is_zero() {
            write!(f, "{}", self.rat)
        } else if self.inf.is_positive() {
            write!(f, "{} + {}ε", self.rat, self.inf)
        } else {
            write!(f, "{} - {}ε", self.rat, -self.inf)
        }
    }
}

impl fmt::Debug for InfRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
