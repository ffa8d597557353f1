//! The item arena: every `Expr` is a handle into one `Model`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use sibyl_num::{Lin, VarId};

use crate::error::{CoreError, Result};
use crate::model::env::Env;
use crate::model::types::{Builtins, TypeRef};

/// Opaque shared handle to an item: the only value type crossing the
/// boundary to callers. Copyable and stable for the life of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr(pub(crate) u32);

/// A boolean-literal token: a propositional variable index plus a sign,
/// interpreted by the backend's theory. `var` 0 is reserved for the two
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    pub var: u32,
    pub positive: bool,
}

impl Lit {
    pub const TRUE: Lit = Lit {
        var: 0,
        positive: true,
    };
    pub const FALSE: Lit = Lit {
        var: 0,
        positive: false,
    };

    pub fn negate(self) -> Lit {
        Lit {
            var: self.var,
            positive: !self.positive,
        }
    }
}

/// The leaf payload of an item.
///
/// Enum items keep their candidate domain in the model's side table rather
/// than in the payload, so branch-local snapshots copy domains without
/// touching the item graph.
#[derive(Debug, Clone)]
pub enum Payload {
    Bool(Lit),
    Arith(Lin),
    Enum,
    Str(String),
    Complex(Env),
}

/// The tag of a payload, matched explicitly wherever an expression is used
/// as a concrete leaf kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Arith,
    Enum,
    String,
    Complex,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "a boolean item"),
            Kind::Arith => write!(f, "an arithmetic item"),
            Kind::Enum => write!(f, "an enumerative item"),
            Kind::String => write!(f, "a string item"),
            Kind::Complex => write!(f, "a complex item"),
        }
    }
}

/// An immutable (type, payload) pair. The type never changes after
/// construction; a complex item's environment may rebind names, but the
/// payload's identity does not change.
#[derive(Debug, Clone)]
pub struct Item {
    ty: TypeRef,
    payload: Payload,
}

impl Item {
    pub fn new(ty: TypeRef, payload: Payload) -> Self {
        Item { ty, payload }
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> Kind {
        match self.payload {
            Payload::Bool(_) => Kind::Bool,
            Payload::Arith(_) => Kind::Arith,
            Payload::Enum => Kind::Enum,
            Payload::Str(_) => Kind::String,
            Payload::Complex(_) => Kind::Complex,
        }
    }
}

/// A branch-local copy of every enum domain, taken before exploring one
/// alternative of a disjunction and restored on backtrack. Domains must
/// never alias across alternatives.
#[derive(Debug, Clone)]
pub struct DomainSnapshot(HashMap<Expr, BTreeSet<Expr>>);

/// The arena of items for one loaded problem instance.
///
/// Items are shared by handle and released together when the model is
/// discarded; there is no per-item deallocation and no process-wide
/// singleton.
#[derive(Debug)]
pub struct Model {
    items: Vec<Item>,
    domains: HashMap<Expr, BTreeSet<Expr>>,
    builtins: Builtins,
    next_bool_var: u32,
    next_arith_var: u32,
}

impl Model {
    pub(crate) fn new(builtins: Builtins) -> Self {
        Model {
            items: Vec::new(),
            domains: HashMap::new(),
            builtins,
            // var 0 is the constant literal
            next_bool_var: 1,
            next_arith_var: 0,
        }
    }

    /// The primitive type handles of the owning registry.
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    pub fn alloc(&mut self, item: Item) -> Expr {
        let x = Expr(self.items.len() as u32);
        self.items.push(item);
        x
    }

    /// Allocates an enum item and records its candidate domain.
    pub fn alloc_enum(&mut self, ty: TypeRef, domain: BTreeSet<Expr>) -> Expr {
        let x = self.alloc(Item::new(ty, Payload::Enum));
        self.domains.insert(x, domain);
        x
    }

    /// A fresh propositional literal for the backend's theory.
    pub fn fresh_lit(&mut self) -> Lit {
        let var = self.next_bool_var;
        self.next_bool_var += 1;
        Lit {
            var,
            positive: true,
        }
    }

    /// A fresh arithmetic variable for the backend's theory.
    pub fn fresh_arith_var(&mut self) -> VarId {
        let var = VarId(self.next_arith_var);
        self.next_arith_var += 1;
        var
    }

    pub fn item(&self, x: Expr) -> &Item {
        &self.items[x.0 as usize]
    }

    pub fn kind(&self, x: Expr) -> Kind {
        self.item(x).kind()
    }

    pub fn ty(&self, x: Expr) -> TypeRef {
        self.item(x).ty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn wrong_kind(&self, expected: Kind, x: Expr) -> CoreError {
        CoreError::mismatch(expected.to_string(), self.kind(x).to_string())
    }

    /// The literal behind a boolean item; `TypeMismatch` on any other kind.
    pub fn bool_lit(&self, x: Expr) -> Result<Lit> {
        match self.item(x).payload() {
            Payload::Bool(l) => Ok(*l),
            _ => Err(self.wrong_kind(Kind::Bool, x)),
        }
    }

    /// The linear expression behind an arithmetic item.
    pub fn arith_lin(&self, x: Expr) -> Result<&Lin> {
        match self.item(x).payload() {
            Payload::Arith(lin) => Ok(lin),
            _ => Err(self.wrong_kind(Kind::Arith, x)),
        }
    }

    /// The text behind a string item.
    pub fn string_value(&self, x: Expr) -> Result<&str> {
        match self.item(x).payload() {
            Payload::Str(s) => Ok(s),
            _ => Err(self.wrong_kind(Kind::String, x)),
        }
    }

    /// The named sub-expressions of a complex item.
    pub fn env(&self, x: Expr) -> Result<&Env> {
        match self.item(x).payload() {
            Payload::Complex(env) => Ok(env),
            _ => Err(self.wrong_kind(Kind::Complex, x)),
        }
    }

    pub fn env_mut(&mut self, x: Expr) -> Result<&mut Env> {
        let err = self.wrong_kind(Kind::Complex, x);
        match &mut self.items[x.0 as usize].payload {
            Payload::Complex(env) => Ok(env),
            _ => Err(err),
        }
    }

    /// The candidate domain of an enum item.
    pub fn domain(&self, x: Expr) -> Result<&BTreeSet<Expr>> {
        if self.kind(x) != Kind::Enum {
            return Err(self.wrong_kind(Kind::Enum, x));
        }
        Ok(self
            .domains
            .get(&x)
            .expect("enum item without a recorded domain"))
    }

    /// Removes `val` from the domain of `var`.
    ///
    /// Returns whether the domain actually shrank; removing an absent value
    /// is a no-op. A domain emptied by the removal is an `Inconsistency`
    /// surfaced to the discoverer, never a silently-ignored state.
    pub fn remove_value(&mut self, var: Expr, val: Expr) -> Result<bool> {
        if self.kind(var) != Kind::Enum {
            return Err(self.wrong_kind(Kind::Enum, var));
        }
        let domain = self
            .domains
            .get_mut(&var)
            .expect("enum item without a recorded domain");
        if !domain.remove(&val) {
            return Ok(false);
        }
        if domain.is_empty() {
            return Err(CoreError::Inconsistency(format!(
                "the domain of enum item {} became empty",
                var.0
            )));
        }
        Ok(true)
    }

    /// Copies every enum domain for branch-local exploration.
    pub fn domains_snapshot(&self) -> DomainSnapshot {
        DomainSnapshot(self.domains.clone())
    }

    /// Restores the domains captured by a snapshot, discarding any shrinking
    /// done since. Enum items allocated after the snapshot keep their current
    /// domains; they stay queryable across a backtrack.
    pub fn restore_domains(&mut self, snapshot: DomainSnapshot) {
        for (var, domain) in snapshot.0 {
            self.domains.insert(var, domain);
        }
    }
}
