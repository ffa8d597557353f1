//! Conjunctions and disjunction choice points.

use sibyl_num::Rational;

use crate::error::{CoreError, Result};
use crate::model::{Expr, ScopeId};

/// One statement within a conjunction's body, produced by the loader or the
/// search driver against already-built expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// A boolean expression that must hold.
    Require(Expr),
    /// An atom committed as an asserted fact.
    Fact(Expr),
    /// An atom posted as a goal to be achieved.
    Goal(Expr),
    /// A name bound in the enclosing environment.
    Bind { name: String, value: Expr },
}

/// One costed, immutable alternative way to satisfy a goal.
///
/// The cost and the ordered statement list are fixed at construction and
/// never mutated afterward; lower cost denotes preference. Conjunctions are
/// created by the search driver when it expands a disjunctive goal and are
/// discarded by that same driver on commitment or backtrack.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    scope: ScopeId,
    cost: Rational,
    statements: Vec<Statement>,
}

impl Conjunction {
    /// Creates a conjunction; a negative cost is a modeling error.
    pub fn new(scope: ScopeId, cost: Rational, statements: Vec<Statement>) -> Result<Self> {
        if cost.is_negative() {
            return Err(CoreError::InvalidModel(format!(
                "conjunction cost {cost} is negative"
            )));
        }
        Ok(Conjunction {
            scope,
            cost,
            statements,
        })
    }

    /// The cost of applying this conjunction.
    pub fn cost(&self) -> Rational {
        self.cost
    }

    /// The statements within this conjunction's body, in order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The scope this conjunction was expanded in.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

/// A registered set of mutually exclusive conjunction alternatives awaiting
/// external commitment.
///
/// The registry stores and exposes the alternatives unmodified and
/// unreordered; which one to commit to, when to backtrack, and how to
/// discard the rest is entirely the search driver's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunction {
    alternatives: Vec<Conjunction>,
}

impl Disjunction {
    /// Creates a choice point; a disjunction with no alternative is vacuous
    /// and rejected.
    pub fn new(alternatives: Vec<Conjunction>) -> Result<Self> {
        if alternatives.is_empty() {
            return Err(CoreError::InvalidModel(
                "a disjunction needs at least one alternative".to_owned(),
            ));
        }
        Ok(Disjunction { alternatives })
    }

    /// The alternatives, in the order supplied.
    pub fn alternatives(&self) -> &[Conjunction] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}
