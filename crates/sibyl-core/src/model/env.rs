//! Name→expression binding tables.

use std::collections::HashMap;

use crate::model::item::Expr;

/// A binding namespace, orthogonal to a scope's type/field namespace.
///
/// `get` is local lookup only: it never consults an enclosing environment.
/// Unlike declaration tables, bindings may be replaced: an `Env` tracks the
/// current value of each name, so `bind` is last-write-wins.
///
/// The registry owns the root `Env`; every complex item owns an independent
/// one giving it named sub-expressions.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, Expr>,
}

impl Env {
    pub fn new() -> Self {
        Env::default()
    }

    /// Local lookup; absence is a normal empty result.
    pub fn get(&self, name: &str) -> Option<Expr> {
        self.vars.get(name).copied()
    }

    /// Binds `name`, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Expr) {
        self.vars.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates the bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Expr)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
