//! The seam toward the textual-language parser.
//!
//! The parser itself is an external collaborator: it turns script text into
//! an ordered sequence of declarations, which the registry registers in the
//! order received.

use crate::conjunction::Statement;
use crate::error::Result;

/// A named, type-annotated parameter of a predicate or method declaration.
/// Type names are resolved against the registry at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// One top-level construct of a script, in the order the parser saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// A composite type declaration.
    Type { name: String },
    /// A type alias.
    Typedef { name: String, base: String },
    /// A predicate declaration with its ordered arguments.
    Predicate { name: String, params: Vec<Param> },
    /// A method declaration with its ordered parameters.
    Method {
        name: String,
        params: Vec<Param>,
        returns: Option<String>,
    },
    /// A formula statement to execute against the registry.
    Formula(Statement),
}

/// The parser collaborator interface.
pub trait Parse {
    /// Parses a script into its top-level constructs, in textual order.
    fn parse(&self, text: &str) -> Result<Vec<Declaration>>;
}

/// The parser the core ships: accepts any script and produces no
/// declarations. A real language front end replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertParser;

impl Parse for InertParser {
    fn parse(&self, _text: &str) -> Result<Vec<Declaration>> {
        Ok(Vec::new())
    }
}
