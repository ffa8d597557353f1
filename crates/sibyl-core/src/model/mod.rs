//! The value and namespace model underlying the registry.
//!
//! - `TypeTable`: nominal types and the assignability relation
//! - `ScopeTree`: lexical field/type namespaces rooted at the registry
//! - `Env`: name→expression binding tables, disjoint from scope namespaces
//! - `Model`: the item arena behind every `Expr` handle, with enum domains
//!   held in a copy-on-branch side table
//! - Predicate and method metadata

mod env;
mod item;
mod method;
mod predicate;
mod scope;
mod types;


pub use env::Env;
pub use item::{DomainSnapshot, Expr, Item, Kind, Lit, Model, Payload};
pub use method::MethodData;
pub use predicate::{PredRef, PredicateData};
pub use scope::{Field, ScopeId, ScopeTree};
pub use types::{Builtins, TypeData, TypeKind, TypeRef, TypeTable};
