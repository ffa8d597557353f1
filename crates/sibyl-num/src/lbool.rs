//! Three-valued (Kleene) truth.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A three-valued truth value.
///
/// `Undefined` stands for "not yet decided by the backend", which is distinct
/// from both truth values; conjunction and disjunction follow Kleene logic.
///
/// # Examples
///
/// ```
/// use sibyl_num::LBool;
///
/// assert_eq!(LBool::True & LBool::Undefined, LBool::Undefined);
/// assert_eq!(LBool::False & LBool::Undefined, LBool::False);
/// assert_eq!(!LBool::Undefined, LBool::Undefined);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LBool {
    False,
    True,
    #[default]
    Undefined,
}

impl LBool {
    /// Returns true only for `True`.
    #[inline]
    pub const fn is_true(&self) -> bool {
        matches!(self, LBool::True)
    }

    /// Returns true only for `False`.
    #[inline]
    pub const fn is_false(&self) -> bool {
        matches!(self, LBool::False)
    }

    /// Returns true only for `Undefined`.
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, LBool::Undefined)
    }
}

impl From<bool> for LBool {
    fn from(value: bool) -> Self {
        if value {
            LBool::True
        } else {
            LBool::False
        }
    }
}

impl Not for LBool {
    type Output = LBool;

    fn not(self) -> LBool {
        match self {
            LBool::True => LBool::False,
            LBool::False => LBool::True,
            LBool::Undefined => LBool::Undefined,
        }
    }
}

impl BitAnd for LBool {
    type Output = LBool;

    fn bitand(self, rhs: LBool) -> LBool {
        match (self, rhs) {
            (LBool::False, _) | (_, LBool::False) => LBool::False,
            (LBool::True, LBool::True) => LBool::True,
            _ => LBool::Undefined,
        }
    }
}

impl BitOr for LBool {
    type Output = LBool;

    fn bitor(self, rhs: LBool) -> LBool {
        match (self, rhs) {
            (LBool::True, _) | (_, LBool::True) => LBool::True,
            (LBool::False, LBool::False) => LBool::False,
            _ => LBool::Undefined,
        }
    }
}

impl fmt::Display for LBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LBool::True => write!(f, "true"),
            LBool::False => write!(f, "false"),
            LBool::Undefined => write!(f, "undefined"),
        }
    }
}
