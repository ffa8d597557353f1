//! The capability interface a theory backend implements, and the inert
//! default the core ships.

use std::collections::BTreeSet;

use sibyl_num::{InfRational, LBool, Lin, Rational};

use crate::conjunction::Disjunction;
use crate::error::{CoreError, Result};
use crate::model::{Expr, Item, Model, Payload, PredRef, TypeRef};

/// The extension points through which a reasoning backend gives expressions
/// real semantics.
///
/// Every method is required: there are no default bodies, so a backend
/// implements the whole capability surface explicitly. The registry performs
/// all kind/tag checking before delegating, so hooks may assume operands have
/// the right leaf kind. Construction hooks are pure with respect to their
/// operands: they return a new expression and never mutate the ones given.
///
/// `assert_facts` must be atomic over its batch: either the whole batch is
/// applied or the call fails with one `Inconsistency` and nothing is.
pub trait Backend {
    /// A fresh, unresolved boolean variable.
    fn new_bool_var(&mut self, model: &mut Model) -> Expr;

    /// A fresh, unresolved arithmetic variable of the given numeric type.
    fn new_arith_var(&mut self, model: &mut Model, ty: TypeRef) -> Expr;

    /// A fresh enum variable ranging over the given candidates.
    fn new_enum_var(&mut self, model: &mut Model, ty: TypeRef, domain: BTreeSet<Expr>) -> Expr;

    fn negate(&mut self, model: &mut Model, x: Expr) -> Result<Expr>;
    fn conj(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn disj(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn exactly_one(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;

    fn add(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn sub(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn mul(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn div(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr>;
    fn minus(&mut self, model: &mut Model, x: Expr) -> Result<Expr>;

    fn lt(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr>;
    fn leq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr>;
    fn eq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr>;
    fn geq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr>;
    fn gt(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr>;

    /// The current truth of a boolean item.
    fn bool_value(&self, model: &Model, x: Expr) -> LBool;

    /// A point estimate for an arithmetic item, within `arith_bounds`
    /// whenever both are defined.
    fn arith_value(&self, model: &Model, x: Expr) -> InfRational;

    /// The current (lower, upper) bounds of an arithmetic item.
    fn arith_bounds(&self, model: &Model, x: Expr) -> (InfRational, InfRational);

    /// The current candidate set of an enum item.
    fn enum_value(&self, model: &Model, x: Expr) -> BTreeSet<Expr>;

    /// Applies a batch of boolean expressions as newly-true facts,
    /// atomically.
    fn assert_facts(&mut self, model: &mut Model, facts: &[Expr]) -> Result<()>;

    /// Runs a predicate's behavior against one committed atom. The registry
    /// guarantees at most one invocation per atom.
    fn apply_rule(&mut self, model: &mut Model, pred: PredRef, atom: Expr) -> Result<()>;

    /// Notification that `removed` left the domain of `var`.
    fn on_domain_shrink(&mut self, model: &mut Model, var: Expr, removed: Expr) -> Result<()>;

    /// Notification of a newly registered choice point.
    fn on_disjunction(&mut self, model: &mut Model, disjunction: &Disjunction) -> Result<()>;
}

/// The backend the core ships: structurally sound, semantically inert.
///
/// Evaluation always answers the neutral values (`Undefined`, the zero
/// `InfRational`, the (−∞, +∞) bounds, the recorded domain) regardless of
/// the expression queried. Construction composes linear arithmetic
/// symbolically and allocates fresh placeholder variables for everything a
/// theory would have to decide; no constraint is ever attached. Commitment
/// hooks accept and do nothing. An inert backend is not an error, it is
/// simply inert.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertBackend;

impl InertBackend {
    pub fn new() -> Self {
        InertBackend
    }

    fn combined_arith_type(model: &Model, xs: &[Expr]) -> TypeRef {
        let first = model.ty(xs[0]);
        if xs.iter().all(|&x| model.ty(x) == first) {
            first
        } else {
            model.builtins().real_t
        }
    }
}

impl Backend for InertBackend {
    fn new_bool_var(&mut self, model: &mut Model) -> Expr {
        let lit = model.fresh_lit();
        let bool_t = model.builtins().bool_t;
        model.alloc(Item::new(bool_t, Payload::Bool(lit)))
    }

    fn new_arith_var(&mut self, model: &mut Model, ty: TypeRef) -> Expr {
        let var = model.fresh_arith_var();
        model.alloc(Item::new(ty, Payload::Arith(Lin::from_var(var))))
    }

    fn new_enum_var(&mut self, model: &mut Model, ty: TypeRef, domain: BTreeSet<Expr>) -> Expr {
        model.alloc_enum(ty, domain)
    }

    fn negate(&mut self, model: &mut Model, _x: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn conj(&mut self, model: &mut Model, _xs: &[Expr]) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn disj(&mut self, model: &mut Model, _xs: &[Expr]) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn exactly_one(&mut self, model: &mut Model, _xs: &[Expr]) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn add(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        let mut sum = Lin::zero();
        for &x in xs {
            sum += model.arith_lin(x)?.clone();
        }
        let ty = Self::combined_arith_type(model, xs);
        Ok(model.alloc(Item::new(ty, Payload::Arith(sum))))
    }

    fn sub(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        let mut diff = model.arith_lin(xs[0])?.clone();
        for &x in &xs[1..] {
            diff -= model.arith_lin(x)?.clone();
        }
        let ty = Self::combined_arith_type(model, xs);
        Ok(model.alloc(Item::new(ty, Payload::Arith(diff))))
    }

    fn mul(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        // A product stays symbolic only while at most one factor is
        // non-constant; anything nonlinear needs a real theory and becomes a
        // fresh variable here.
        let mut scale = Rational::ONE;
        let mut symbolic: Option<Lin> = None;
        for &x in xs {
            let lin = model.arith_lin(x)?.clone();
            if lin.is_constant() {
                scale *= lin.known();
            } else if symbolic.is_none() {
                symbolic = Some(lin);
            } else {
                let ty = Self::combined_arith_type(model, xs);
                return Ok(self.new_arith_var(model, ty));
            }
        }
        let product = match symbolic {
            Some(lin) => lin * scale,
            None => Lin::from_constant(scale),
        };
        let ty = Self::combined_arith_type(model, xs);
        Ok(model.alloc(Item::new(ty, Payload::Arith(product))))
    }

    fn div(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        let mut quotient = model.arith_lin(xs[0])?.clone();
        for &x in &xs[1..] {
            let divisor = model.arith_lin(x)?.clone();
            if !divisor.is_constant() {
                let ty = Self::combined_arith_type(model, xs);
                return Ok(self.new_arith_var(model, ty));
            }
            if divisor.known().is_zero() {
                return Err(CoreError::InvalidModel(
                    "division by a zero constant".to_owned(),
                ));
            }
            quotient = quotient / divisor.known();
        }
        let ty = Self::combined_arith_type(model, xs);
        Ok(model.alloc(Item::new(ty, Payload::Arith(quotient))))
    }

    fn minus(&mut self, model: &mut Model, x: Expr) -> Result<Expr> {
        let lin = -model.arith_lin(x)?.clone();
        let ty = model.ty(x);
        Ok(model.alloc(Item::new(ty, Payload::Arith(lin))))
    }

    fn lt(&mut self, model: &mut Model, _lhs: Expr, _rhs: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn leq(&mut self, model: &mut Model, _lhs: Expr, _rhs: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn eq(&mut self, model: &mut Model, _lhs: Expr, _rhs: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn geq(&mut self, model: &mut Model, _lhs: Expr, _rhs: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn gt(&mut self, model: &mut Model, _lhs: Expr, _rhs: Expr) -> Result<Expr> {
        Ok(self.new_bool_var(model))
    }

    fn bool_value(&self, _model: &Model, _x: Expr) -> LBool {
        LBool::Undefined
    }

    fn arith_value(&self, _model: &Model, _x: Expr) -> InfRational {
        InfRational::ZERO
    }

    fn arith_bounds(&self, _model: &Model, _x: Expr) -> (InfRational, InfRational) {
        (
            InfRational::NEGATIVE_INFINITY,
            InfRational::POSITIVE_INFINITY,
        )
    }

    fn enum_value(&self, model: &Model, x: Expr) -> BTreeSet<Expr> {
        model.domain(x).cloned().unwrap_or_default()
    }

    fn assert_facts(&mut self, _model: &mut Model, _facts: &[Expr]) -> Result<()> {
        Ok(())
    }

    fn apply_rule(&mut self, _model: &mut Model, _pred: PredRef, _atom: Expr) -> Result<()> {
        Ok(())
    }

    fn on_domain_shrink(&mut self, _model: &mut Model, _var: Expr, _removed: Expr) -> Result<()> {
        Ok(())
    }

    fn on_disjunction(&mut self, _model: &mut Model, _disjunction: &Disjunction) -> Result<()> {
        Ok(())
    }
}
