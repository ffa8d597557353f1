//! The semantic core of the Sibyl modeling language.
//!
//! Sibyl models problems as typed predicates over boolean, arithmetic,
//! enumerative, and string expressions. This crate provides the [`Registry`]
//! that owns one loaded problem instance: its types, predicates, methods,
//! scopes, and the item arena every [`Expr`] handle points into. Reasoning is
//! delegated to a pluggable [`Backend`]; parsing to a pluggable [`Parse`]
//! front end. The core ships inert defaults for both, so a model can be
//! built, loaded, and inspected with no theory attached.
//!
//! # Examples
//!
//! ```
//! use sibyl_core::{LBool, Registry};
//!
//! let mut reg = Registry::new();
//! let robot = reg.new_type("Robot")?;
//! let at = reg.new_predicate("At", vec![("where".to_owned(), robot)])?;
//!
//! let atom = reg.new_instance(at)?;
//! let place = reg.enum_get(reg.model().env(atom)?.get("where").unwrap(), "x");
//! assert!(place.is_err()); // no Robot instance exists to project over
//!
//! // the inert backend never decides anything
//! let flag = reg.new_bool(true);
//! let negated = reg.negate(flag)?;
//! assert_eq!(reg.bool_value(negated)?, LBool::Undefined);
//! # Ok::<(), sibyl_core::CoreError>(())
//! ```

pub mod backend;
pub mod config;
pub mod conjunction;
pub mod error;
pub mod model;
pub mod parse;
pub mod registry;

#[cfg(test)]
mod registry_tests;

pub use backend::{Backend, InertBackend};
pub use config::{ConfigError, ModelConfig};
pub use conjunction::{Conjunction, Disjunction, Statement};
pub use error::{CoreError, Result};
pub use model::{
    Builtins, DomainSnapshot, Env, Expr, Field, Item, Kind, Lit, MethodData, Model, Payload,
    PredRef, PredicateData, ScopeId, TypeData, TypeKind, TypeRef,
};
pub use parse::{Declaration, InertParser, Param, Parse};
pub use registry::Registry;

pub use sibyl_num::{InfRational, LBool, Lin, Rational, VarId};
