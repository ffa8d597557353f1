//! Error types for the Sibyl core.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An unknown type, predicate, method, or field name.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// An expression was used as a leaf kind it does not have, or an atom was
    /// built from a type that is not a predicate.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A name was re-declared in the same scope or registry table.
    #[error("{kind} '{name}' is already declared")]
    DuplicateDeclaration { kind: &'static str, name: String },

    /// The model cannot be reconciled: an empty enum domain or a rejected
    /// fact batch. Available to the search driver to trigger backtracking.
    #[error("inconsistency: {0}")]
    Inconsistency(String),

    /// No alternative remains after exhausting all choice points.
    #[error("the problem is unsolvable")]
    Unsolvable,

    /// A file named in a multi-file read could not be opened.
    #[error("cannot open file '{}'", path.display())]
    FileNotFound { path: PathBuf },

    /// The parser collaborator rejected a script.
    #[error("parse error: {0}")]
    Parse(String),

    /// A structurally invalid model element, such as a negative conjunction
    /// cost or an empty disjunction.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl CoreError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CoreError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        CoreError::DuplicateDeclaration {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
