//! Symbolic linear combinations of rational-weighted terms.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use smallvec::SmallVec;

use crate::Rational;

/// Identifier of an arithmetic variable inside the backend's numeric theory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub u32);

/// A linear expression: a constant plus rational-weighted variable terms.
///
/// Terms are kept sorted by `VarId` with no zero coefficients, so two equal
/// expressions are structurally equal. Most expressions touch only a handful
/// of variables, hence the inline small-vector storage.
///
/// # Examples
///
/// ```
/// use sibyl_num::{Lin, Rational, VarId};
///
/// let x = Lin::from_var(VarId(0));
/// let y = Lin::from_var(VarId(1));
/// let expr = x.clone() * Rational::from(2) + y - x;
/// assert_eq!(expr.coefficient(VarId(0)), Rational::ONE);
/// assert_eq!(expr.coefficient(VarId(1)), Rational::ONE);
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lin {
    terms: SmallVec<[(VarId, Rational); 4]>,
    known: Rational,
}

impl Lin {
    /// The constant zero expression.
    pub fn zero() -> Self {
        Lin::default()
    }

    /// A constant expression.
    pub fn from_constant(known: Rational) -> Self {
        Lin {
            terms: SmallVec::new(),
            known,
        }
    }

    /// A single variable with coefficient one.
    pub fn from_var(var: VarId) -> Self {
        Lin {
            terms: smallvec::smallvec![(var, Rational::ONE)],
            known: Rational::ZERO,
        }
    }

    /// The constant term.
    #[inline]
    pub fn known(&self) -> Rational {
        self.known
    }

    /// The variable terms, sorted by `VarId`.
    #[inline]
    pub fn terms(&self) -> &[(VarId, Rational)] {
        &self.terms
    }

    /// The coefficient of `var`, zero if absent.
    pub fn coefficient(&self, var: VarId) -> Rational {
        match self.terms.binary_search_by_key(&var, |&(v, _)| v) {
            Ok(i) => self.terms[i].1,
            Err(_) => Rational::ZERO,
        }
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    fn add_term(&mut self, var: VarId, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.binary_search_by_key(&var, |&(v, _)| v) {
            Ok(i) => {
                self.terms[i].1 += coeff;
                if self.terms[i].1.is_zero() {
                    self.terms.remove(i);
                }
            }
            Err(i) => self.terms.insert(i, (var, coeff)),
        }
    }
}

impl From<Rational> for Lin {
    fn from(known: Rational) -> Self {
        Lin::from_constant(known)
    }
}

impl From<VarId> for Lin {
    fn from(var: VarId) -> Self {
        Lin::from_var(var)
    }
}

impl Add for Lin {
    type Output = Lin;

    fn add(mut self, rhs: Lin) -> Lin {
        self += rhs;
        self
    }
}

impl AddAssign for Lin {
    fn add_assign(&mut self, rhs: Lin) {
        self.known += rhs.known;
        for (var, coeff) in rhs.terms {
            self.add_term(var, coeff);
        }
    }
}

impl Sub for Lin {
    type Output = Lin;

    fn sub(mut self, rhs: Lin) -> Lin {
        self -= rhs;
        self
    }
}

impl SubAssign for Lin {
    fn sub_assign(&mut self, rhs: Lin) {
        self.known -= rhs.known;
        for (var, coeff) in rhs.terms {
            self.add_term(var, -coeff);
        }
    }
}

impl Mul<Rational> for Lin {
    type Output = Lin;

    fn mul(mut self, rhs: Rational) -> Lin {
        if rhs.is_zero() {
            return Lin::zero();
        }
        self.known *= rhs;
        for term in &mut self.terms {
            term.1 *= rhs;
        }
        self
    }
}

impl Div<Rational> for Lin {
    type Output = Lin;

    fn div(mut self, rhs: Rational) -> Lin {
        self.known /= rhs;
        for term in &mut self.terms {
            term.1 /= rhs;
        }
        self
    }
}

impl Neg for Lin {
    type Output = Lin;

    fn neg(mut self) -> Lin {
        self.known = -self.known;
        for term in &mut self.terms {
            term.1 = -term.1;
        }
        self
    }
}

impl fmt::Debug for Lin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, coeff)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{coeff}·x{}", var.0)?;
        }
        if self.terms.is_empty() || !self.known.is_zero() {
            if !self.terms.is_empty() {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.known)?;
        }
        Ok(())
    }
}
