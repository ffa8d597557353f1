//! Lexical scopes: field and type namespaces rooted at the registry.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::model::types::TypeRef;

/// Handle to a scope in the registry's scope tree. Defaults to the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The root scope: the registry itself.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// A named, typed slot declared within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Default)]
struct ScopeData {
    parent: ScopeId,
    fields: HashMap<String, Field>,
    types: HashMap<String, TypeRef>,
}

/// The tree of scopes owned by one registry.
///
/// The root's enclosing link points to itself, terminating upward traversal;
/// every other scope is constructed with a mandatory enclosing scope. All
/// lookups are local to one scope; callers wanting lexical fallback walk
/// `enclosing_scope` themselves.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    /// Creates a tree holding only the root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![ScopeData::default()],
        }
    }

    /// Creates a scope enclosed by `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        assert!((parent.0 as usize) < self.scopes.len(), "unknown parent scope");
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent,
            ..ScopeData::default()
        });
        id
    }

    /// The enclosing scope; the root encloses itself.
    pub fn enclosing_scope(&self, scope: ScopeId) -> ScopeId {
        self.scopes[scope.0 as usize].parent
    }

    pub fn is_root(&self, scope: ScopeId) -> bool {
        scope == ScopeId::ROOT
    }

    /// Declares a field, failing on a same-scope name collision. No shadow
    /// check is made against enclosing scopes.
    pub fn declare_field(&mut self, scope: ScopeId, field: Field) -> Result<()> {
        let data = &mut self.scopes[scope.0 as usize];
        if data.fields.contains_key(&field.name) {
            return Err(CoreError::duplicate("field", field.name));
        }
        data.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// A field declared directly in `scope`; absence is a normal empty
    /// result.
    pub fn field(&self, scope: ScopeId, name: &str) -> Option<&Field> {
        self.scopes[scope.0 as usize].fields.get(name)
    }

    /// All fields declared directly in `scope`.
    pub fn fields(&self, scope: ScopeId) -> &HashMap<String, Field> {
        &self.scopes[scope.0 as usize].fields
    }

    /// Binds a type name in `scope`, failing on a same-scope collision.
    pub fn declare_type(&mut self, scope: ScopeId, name: &str, ty: TypeRef) -> Result<()> {
        let data = &mut self.scopes[scope.0 as usize];
        if data.types.contains_key(name) {
            return Err(CoreError::duplicate("type", name.to_owned()));
        }
        data.types.insert(name.to_owned(), ty);
        Ok(())
    }

    /// A type declared directly in `scope`.
    pub fn get_type(&self, scope: ScopeId, name: &str) -> Option<TypeRef> {
        self.scopes[scope.0 as usize].types.get(name).copied()
    }

    /// All types declared directly in `scope`, keyed by name.
    pub fn get_types(&self, scope: ScopeId) -> &HashMap<String, TypeRef> {
        &self.scopes[scope.0 as usize].types
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
