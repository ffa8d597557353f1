//! Nominal types and the assignability relation.

use crate::error::{CoreError, Result};
use crate::model::predicate::PredRef;
use crate::model::scope::ScopeId;

/// Handle to a type owned by the registry.
///
/// Types carry no runtime payload; a `TypeRef` is only an identity plus,
/// through the table, the assignability relation used for overload and
/// domain compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(pub(crate) u32);

/// What a type is, structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Bool,
    Int,
    Real,
    TimePoint,
    Str,
    /// An alias resolving to `base` for assignability purposes.
    Typedef { base: TypeRef },
    /// A user type owning a scope of fields.
    Composite { scope: ScopeId },
    /// A predicate: a type that declares argument fields and manufactures
    /// atoms.
    Predicate(PredRef),
}

/// A registered type.
#[derive(Debug, Clone)]
pub struct TypeData {
    pub name: String,
    pub kind: TypeKind,
}

/// Handles to the primitive types every registry pre-registers.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub bool_t: TypeRef,
    pub int_t: TypeRef,
    pub real_t: TypeRef,
    pub time_point_t: TypeRef,
    pub string_t: TypeRef,
}

/// Arena of all types owned by one registry.
///
/// Types are created during loading and live as long as the registry; there
/// is no deletion operation.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeData>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    pub fn alloc(&mut self, data: TypeData) -> TypeRef {
        let r = TypeRef(self.types.len() as u32);
        self.types.push(data);
        r
    }

    pub fn get(&self, t: TypeRef) -> &TypeData {
        &self.types[t.0 as usize]
    }

    /// Follows typedef chains down to the underlying type.
    ///
    /// Chains are acyclic by construction: a typedef's base must already be
    /// registered when the typedef is declared.
    pub fn resolve(&self, t: TypeRef) -> TypeRef {
        let mut t = t;
        while let TypeKind::Typedef { base } = self.get(t).kind {
            t = base;
        }
        t
    }

    /// The subtyping relation: may a value of type `source` stand where a
    /// `target` is declared?
    ///
    /// Typedefs resolve to their base on both sides; beyond identity, `real`
    /// accepts `int`, and `time` accepts both numeric primitives.
    pub fn is_assignable_from(&self, target: TypeRef, source: TypeRef) -> bool {
        let target = self.resolve(target);
        let source = self.resolve(source);
        if target == source {
            return true;
        }
        matches!(
            (&self.get(target).kind, &self.get(source).kind),
            (TypeKind::Real, TypeKind::Int)
                | (TypeKind::TimePoint, TypeKind::Int)
                | (TypeKind::TimePoint, TypeKind::Real)
        )
    }

    /// The field scope of a composite or predicate type, if it has one.
    pub fn scope_of(&self, t: TypeRef, predicates: &[crate::model::PredicateData]) -> Option<ScopeId> {
        match self.get(self.resolve(t)).kind {
            TypeKind::Composite { scope } => Some(scope),
            TypeKind::Predicate(p) => Some(predicates[p.0 as usize].scope),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Ensures `t` denotes a predicate, for atom construction.
    pub fn as_predicate(&self, t: TypeRef) -> Result<PredRef> {
        match self.get(self.resolve(t)).kind {
            TypeKind::Predicate(p) => Ok(p),
            _ => Err(CoreError::mismatch(
                "a predicate type",
                self.get(t).name.clone(),
            )),
        }
    }
}
