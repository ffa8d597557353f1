//! Predicate schemas.

use crate::model::scope::{Field, ScopeId};
use crate::model::types::TypeRef;

/// Handle to a predicate owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredRef(pub(crate) u32);

/// A relation/fact schema: a type that declares an ordered list of named
/// argument fields and manufactures atom instances.
///
/// The argument order is the declaration order; the same fields are also
/// declared in the predicate's scope for name lookup.
#[derive(Debug, Clone)]
pub struct PredicateData {
    pub name: String,
    /// The type this predicate registers as.
    pub ty: TypeRef,
    /// The scope holding the argument fields, enclosed by the registry root.
    pub scope: ScopeId,
    /// The arguments, in declaration order.
    pub params: Vec<Field>,
}

impl PredicateData {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param(&self, name: &str) -> Option<&Field> {
        self.params.iter().find(|f| f.name == name)
    }
}
