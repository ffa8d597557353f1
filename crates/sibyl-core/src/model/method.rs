//! Method metadata.

use crate::model::scope::{Field, ScopeId};
use crate::model::types::TypeRef;

/// A named, overloadable, positionally-typed callable declared in a scope.
///
/// The registry keeps one ordered list per name; resolution scans that list
/// in declaration order and the first assignable overload wins.
#[derive(Debug, Clone)]
pub struct MethodData {
    pub name: String,
    /// The scope the method is declared in.
    pub scope: ScopeId,
    /// The parameters, in positional order.
    pub params: Vec<Field>,
    /// The return type, if the method returns a value.
    pub returns: Option<TypeRef>,
}

impl MethodData {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
