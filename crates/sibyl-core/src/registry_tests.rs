use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use sibyl_num::{InfRational, LBool, Rational};

use crate::backend::{Backend, InertBackend};
use crate::conjunction::{Conjunction, Disjunction, Statement};
use crate::error::{CoreError, Result};
use crate::model::{Expr, Kind, Lit, Model, PredRef, ScopeId, TypeKind, TypeRef};
use crate::parse::{Declaration, Param, Parse};
use crate::registry::Registry;
use crate::ModelConfig;

/// Wraps the inert backend and counts the commitment hooks, so tests can
/// observe how often the registry delegates.
#[derive(Clone, Default)]
struct CountingBackend {
    inner: InertBackend,
    rules: Rc<Cell<usize>>,
    shrinks: Rc<Cell<usize>>,
    /// How many upcoming rule applications to reject.
    failing_rules: Rc<Cell<usize>>,
}

impl Backend for CountingBackend {
    fn new_bool_var(&mut self, model: &mut Model) -> Expr {
        self.inner.new_bool_var(model)
    }

    fn new_arith_var(&mut self, model: &mut Model, ty: TypeRef) -> Expr {
        self.inner.new_arith_var(model, ty)
    }

    fn new_enum_var(&mut self, model: &mut Model, ty: TypeRef, domain: BTreeSet<Expr>) -> Expr {
        self.inner.new_enum_var(model, ty, domain)
    }

    fn negate(&mut self, model: &mut Model, x: Expr) -> Result<Expr> {
        self.inner.negate(model, x)
    }

    fn conj(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.conj(model, xs)
    }

    fn disj(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.disj(model, xs)
    }

    fn exactly_one(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.exactly_one(model, xs)
    }

    fn add(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.add(model, xs)
    }

    fn sub(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.sub(model, xs)
    }

    fn mul(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.mul(model, xs)
    }

    fn div(&mut self, model: &mut Model, xs: &[Expr]) -> Result<Expr> {
        self.inner.div(model, xs)
    }

    fn minus(&mut self, model: &mut Model, x: Expr) -> Result<Expr> {
        self.inner.minus(model, x)
    }

    fn lt(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.inner.lt(model, lhs, rhs)
    }

    fn leq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.inner.leq(model, lhs, rhs)
    }

    fn eq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.inner.eq(model, lhs, rhs)
    }

    fn geq(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.inner.geq(model, lhs, rhs)
    }

    fn gt(&mut self, model: &mut Model, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.inner.gt(model, lhs, rhs)
    }

    fn bool_value(&self, model: &Model, x: Expr) -> LBool {
        self.inner.bool_value(model, x)
    }

    fn arith_value(&self, model: &Model, x: Expr) -> InfRational {
        self.inner.arith_value(model, x)
    }

    fn arith_bounds(&self, model: &Model, x: Expr) -> (InfRational, InfRational) {
        self.inner.arith_bounds(model, x)
    }

    fn enum_value(&self, model: &Model, x: Expr) -> BTreeSet<Expr> {
        self.inner.enum_value(model, x)
    }

    fn assert_facts(&mut self, model: &mut Model, facts: &[Expr]) -> Result<()> {
        self.inner.assert_facts(model, facts)
    }

    fn apply_rule(&mut self, model: &mut Model, pred: PredRef, atom: Expr) -> Result<()> {
        if self.failing_rules.get() > 0 {
            self.failing_rules.set(self.failing_rules.get() - 1);
            return Err(CoreError::Inconsistency("rule rejected".to_owned()));
        }
        self.rules.set(self.rules.get() + 1);
        self.inner.apply_rule(model, pred, atom)
    }

    fn on_domain_shrink(&mut self, model: &mut Model, var: Expr, removed: Expr) -> Result<()> {
        self.shrinks.set(self.shrinks.get() + 1);
        self.inner.on_domain_shrink(model, var, removed)
    }

    fn on_disjunction(&mut self, model: &mut Model, disjunction: &Disjunction) -> Result<()> {
        self.inner.on_disjunction(model, disjunction)
    }
}

fn counting_registry() -> (Registry, Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let backend = CountingBackend::default();
    let rules = backend.rules.clone();
    let shrinks = backend.shrinks.clone();
    (Registry::with_backend(Box::new(backend)), rules, shrinks)
}

/// A minimal line-oriented front end: `type Name` and `predicate Name`.
struct LineParser;

impl Parse for LineParser {
    fn parse(&self, text: &str) -> Result<Vec<Declaration>> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                if let Some(name) = line.strip_prefix("type ") {
                    Ok(Declaration::Type {
                        name: name.to_owned(),
                    })
                } else if let Some(name) = line.strip_prefix("predicate ") {
                    Ok(Declaration::Predicate {
                        name: name.to_owned(),
                        params: Vec::new(),
                    })
                } else {
                    Err(CoreError::Parse(format!("unknown construct '{line}'")))
                }
            })
            .collect()
    }
}

fn composite_scope(reg: &Registry, ty: TypeRef) -> ScopeId {
    match &reg.type_data(ty).kind {
        TypeKind::Composite { scope } => *scope,
        other => panic!("expected a composite type, found {other:?}"),
    }
}

// ----------------------------------------------------------- registration

#[test]
fn test_builtins_are_preregistered() {
    let reg = Registry::new();
    let b = reg.builtins();
    assert_eq!(reg.get_type("bool").unwrap(), b.bool_t);
    assert_eq!(reg.get_type("int").unwrap(), b.int_t);
    assert_eq!(reg.get_type("real").unwrap(), b.real_t);
    assert_eq!(reg.get_type("time").unwrap(), b.time_point_t);
    assert_eq!(reg.get_type("string").unwrap(), b.string_t);
    assert!(matches!(
        reg.get_type("void"),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn test_duplicate_type_rejected() {
    let mut reg = Registry::new();
    reg.new_type("Robot").unwrap();
    assert!(matches!(
        reg.new_type("Robot"),
        Err(CoreError::DuplicateDeclaration { .. })
    ));
    assert!(matches!(
        reg.new_typedef("Robot", reg.builtins().int_t),
        Err(CoreError::DuplicateDeclaration { .. })
    ));
}

#[test]
fn test_predicate_name_collides_with_types() {
    let mut reg = Registry::new();
    reg.new_type("At").unwrap();
    assert!(matches!(
        reg.new_predicate("At", Vec::new()),
        Err(CoreError::DuplicateDeclaration { .. })
    ));
}

#[test]
fn test_typedef_resolves_through_registry() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let step = reg.new_typedef("step", b.int_t).unwrap();
    assert_eq!(reg.get_type("step").unwrap(), step);
    assert!(reg.is_assignable_from(b.real_t, step));
    assert!(!reg.is_assignable_from(step, b.real_t));
}

#[test]
fn test_predicate_registers_as_a_type() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let at = reg
        .new_predicate("At", vec![("when".to_owned(), b.time_point_t)])
        .unwrap();
    assert_eq!(reg.get_predicate("At").unwrap(), at);
    let data = reg.predicate(at);
    assert_eq!(data.arity(), 1);
    assert_eq!(data.params[0].name, "when");
    // the predicate's type is visible in the root type table
    let ty = reg.get_type("At").unwrap();
    assert_eq!(data.ty, ty);
    // and its argument fields live in its own scope, not the root
    assert!(reg.field(data.scope, "when").is_some());
    assert!(reg.field(reg.root_scope(), "when").is_none());
}

#[test]
fn test_root_fields() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let root = reg.root_scope();
    reg.declare_field(root, "horizon", b.time_point_t).unwrap();
    assert_eq!(reg.get_field("horizon").unwrap().ty, b.time_point_t);
    assert!(matches!(
        reg.get_field("deadline"),
        Err(CoreError::NotFound { .. })
    ));
}

// --------------------------------------------------------------- methods

#[test]
fn test_method_resolution_is_first_match_in_declaration_order() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    reg.new_method("f", vec![("x".to_owned(), b.int_t)], None).unwrap();
    reg.new_method("f", vec![("x".to_owned(), b.real_t)], Some(b.real_t))
        .unwrap();

    let exact = reg.get_method("f", &[b.int_t]).unwrap();
    assert_eq!(exact.params[0].ty, b.int_t);
    let widened = reg.get_method("f", &[b.real_t]).unwrap();
    assert_eq!(widened.params[0].ty, b.real_t);
    assert_eq!(widened.returns, Some(b.real_t));

    // arity must match exactly
    assert!(reg.get_method("f", &[b.int_t, b.int_t]).is_err());
    assert!(matches!(
        reg.get_method("g", &[]),
        Err(CoreError::NotFound { .. })
    ));
    assert_eq!(reg.get_methods("f").unwrap().len(), 2);
}

#[test]
fn test_method_resolution_takes_an_earlier_wider_overload() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    reg.new_method("h", vec![("x".to_owned(), b.real_t)], None).unwrap();
    reg.new_method("h", vec![("x".to_owned(), b.int_t)], None).unwrap();
    // an int argument is assignable to the real overload declared first
    let found = reg.get_method("h", &[b.int_t]).unwrap();
    assert_eq!(found.params[0].ty, b.real_t);
}

#[test]
fn test_method_params_are_declared_in_its_scope() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    reg.new_method("speed", vec![("r".to_owned(), b.real_t)], Some(b.real_t))
        .unwrap();
    let speed = reg.get_method("speed", &[b.real_t]).unwrap();
    assert_eq!(reg.field(speed.scope, "r").unwrap().ty, b.real_t);
}

#[test]
fn test_duplicate_method_params_rejected() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let r = reg.new_method(
        "f",
        vec![("x".to_owned(), b.int_t), ("x".to_owned(), b.int_t)],
        None,
    );
    assert!(matches!(r, Err(CoreError::DuplicateDeclaration { .. })));
}

// --------------------------------------------------------- inert defaults

#[test]
fn test_inert_backend_never_decides_truth() {
    let mut reg = Registry::new();
    let t = reg.new_bool(true);
    let f = reg.new_bool(false);
    // the constants themselves carry their literal
    assert_eq!(reg.model().bool_lit(t).unwrap(), Lit::TRUE);
    assert_eq!(reg.model().bool_lit(f).unwrap(), Lit::FALSE);
    // but evaluation is the backend's business, and the inert one abstains
    assert_eq!(reg.bool_value(t).unwrap(), LBool::Undefined);
    let c = reg.conj(&[t, f]).unwrap();
    assert_eq!(reg.bool_value(c).unwrap(), LBool::Undefined);
}

#[test]
fn test_inert_arith_evaluation_is_neutral() {
    let mut reg = Registry::new();
    let x = reg.new_int(42);
    let value = reg.arith_value(x).unwrap();
    assert_eq!(value, InfRational::ZERO);
    let (lower, upper) = reg.arith_bounds(x).unwrap();
    assert_eq!(lower, InfRational::NEGATIVE_INFINITY);
    assert_eq!(upper, InfRational::POSITIVE_INFINITY);
    assert!(lower <= value && value <= upper);
}

#[test]
fn test_comparisons_yield_unresolved_booleans() {
    let mut reg = Registry::new();
    let x = reg.new_int(1);
    let y = reg.new_int(2);
    let comparisons: [fn(&mut Registry, Expr, Expr) -> Result<Expr>; 4] =
        [Registry::lt, Registry::leq, Registry::geq, Registry::gt];
    for cmp in comparisons {
        let r = cmp(&mut reg, x, y).unwrap();
        assert_eq!(reg.model().kind(r), Kind::Bool);
        assert_eq!(reg.bool_value(r).unwrap(), LBool::Undefined);
    }
}

// ------------------------------------------------------------ arithmetic

#[test]
fn test_constant_arithmetic_stays_symbolic() {
    let mut reg = Registry::new();
    let two = reg.new_int(2);
    let three = reg.new_int(3);

    let sum = reg.add(&[two, three]).unwrap();
    assert_eq!(reg.model().arith_lin(sum).unwrap().known(), Rational::from(5));

    let diff = reg.sub(&[two, three]).unwrap();
    assert_eq!(
        reg.model().arith_lin(diff).unwrap().known(),
        Rational::from(-1)
    );

    let product = reg.mul(&[two, three]).unwrap();
    assert_eq!(
        reg.model().arith_lin(product).unwrap().known(),
        Rational::from(6)
    );

    let quotient = reg.div(&[three, two]).unwrap();
    assert_eq!(
        reg.model().arith_lin(quotient).unwrap().known(),
        Rational::new(3, 2)
    );

    let negated = reg.minus(three).unwrap();
    assert_eq!(
        reg.model().arith_lin(negated).unwrap().known(),
        Rational::from(-3)
    );
}

#[test]
fn test_division_by_a_zero_constant_is_rejected() {
    let mut reg = Registry::new();
    let zero = reg.new_int(0);
    let one = reg.new_int(1);
    assert!(matches!(
        reg.div(&[zero, zero]),
        Err(CoreError::InvalidModel(_))
    ));
    assert!(matches!(
        reg.div(&[one, zero]),
        Err(CoreError::InvalidModel(_))
    ));
    // a non-constant divisor still becomes an unresolved variable
    let v = reg.new_var(reg.builtins().int_t).unwrap();
    assert!(reg.div(&[one, v]).is_ok());
}

#[test]
fn test_scaling_a_variable_stays_symbolic() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let two = reg.new_int(2);
    let v = reg.new_var(b.int_t).unwrap();
    let scaled = reg.mul(&[two, v]).unwrap();
    let lin = reg.model().arith_lin(scaled).unwrap();
    assert!(!lin.is_constant());
    assert_eq!(lin.known(), Rational::ZERO);
}

#[test]
fn test_mixed_numeric_types_widen_to_real() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let i = reg.new_int(1);
    let r = reg.new_real(Rational::new(1, 2));
    let sum = reg.add(&[i, r]).unwrap();
    assert_eq!(reg.model().ty(sum), b.real_t);
    let same = reg.add(&[i, i]).unwrap();
    assert_eq!(reg.model().ty(same), b.int_t);
}

#[test]
fn test_operators_reject_empty_and_foreign_operands() {
    let mut reg = Registry::new();
    let flag = reg.new_bool(true);
    let num = reg.new_int(1);
    assert!(matches!(reg.add(&[]), Err(CoreError::InvalidModel(_))));
    assert!(matches!(reg.conj(&[]), Err(CoreError::InvalidModel(_))));
    assert!(matches!(
        reg.add(&[flag]),
        Err(CoreError::TypeMismatch { .. })
    ));
    assert!(matches!(
        reg.negate(num),
        Err(CoreError::TypeMismatch { .. })
    ));
    assert!(matches!(
        reg.lt(flag, num),
        Err(CoreError::TypeMismatch { .. })
    ));
}

// -------------------------------------------------------------- equality

#[test]
fn test_eq_on_the_same_handle_is_true() {
    let mut reg = Registry::new();
    let x = reg.new_int(1);
    let r = reg.eq(x, x).unwrap();
    assert_eq!(reg.model().bool_lit(r).unwrap(), Lit::TRUE);
}

#[test]
fn test_eq_on_strings_is_structural() {
    let mut reg = Registry::new();
    let a = reg.new_string("north");
    let b = reg.new_string("north");
    let c = reg.new_string("south");
    let same = reg.eq(a, b).unwrap();
    assert_eq!(reg.model().bool_lit(same).unwrap(), Lit::TRUE);
    let differ = reg.eq(a, c).unwrap();
    assert_eq!(reg.model().bool_lit(differ).unwrap(), Lit::FALSE);
}

#[test]
fn test_eq_across_leaf_kinds_is_false() {
    let mut reg = Registry::new();
    let s = reg.new_string("north");
    let n = reg.new_int(0);
    let r = reg.eq(s, n).unwrap();
    assert_eq!(reg.model().bool_lit(r).unwrap(), Lit::FALSE);
}

#[test]
fn test_eq_between_distinct_arith_items_is_for_the_theory() {
    let mut reg = Registry::new();
    let x = reg.new_int(1);
    let y = reg.new_int(1);
    let r = reg.eq(x, y).unwrap();
    // same value, different handles: only a theory could confirm it
    assert_eq!(reg.bool_value(r).unwrap(), LBool::Undefined);
}

// ------------------------------------------------------ atoms and rules

#[test]
fn test_new_instance_binds_one_placeholder_per_param() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    let robot = reg.new_type("Robot").unwrap();
    let at = reg
        .new_predicate(
            "At",
            vec![
                ("who".to_owned(), robot),
                ("since".to_owned(), b.time_point_t),
                ("active".to_owned(), b.bool_t),
            ],
        )
        .unwrap();
    let atom = reg.new_instance(at).unwrap();

    let env = reg.model().env(atom).unwrap();
    assert_eq!(env.len(), 3);
    let who = env.get("who").unwrap();
    let since = env.get("since").unwrap();
    let active = env.get("active").unwrap();
    assert_eq!(reg.model().kind(who), Kind::Enum);
    assert_eq!(reg.model().kind(since), Kind::Arith);
    assert_eq!(reg.model().kind(active), Kind::Bool);
    // every placeholder is unresolved
    assert_eq!(reg.bool_value(active).unwrap(), LBool::Undefined);
    assert!(reg.enum_value(who).unwrap().is_empty());
}

#[test]
fn test_atom_construction_requires_a_predicate_type() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    assert!(matches!(
        reg.new_atom_of(robot),
        Err(CoreError::TypeMismatch { .. })
    ));
    assert!(matches!(
        reg.new_atom_of(reg.builtins().int_t),
        Err(CoreError::TypeMismatch { .. })
    ));
}

#[test]
fn test_apply_rule_runs_once_per_atom() {
    let (mut reg, rules, _) = counting_registry();
    let at = reg.new_predicate("At", Vec::new()).unwrap();
    let atom = reg.new_instance(at).unwrap();

    reg.apply_rule(atom).unwrap();
    assert_eq!(rules.get(), 1);
    // defensive re-invocation is a no-op
    reg.apply_rule(atom).unwrap();
    assert_eq!(rules.get(), 1);

    let other = reg.new_instance(at).unwrap();
    reg.apply_rule(other).unwrap();
    assert_eq!(rules.get(), 2);
}

#[test]
fn test_a_rejected_rule_can_be_retried() {
    let backend = CountingBackend::default();
    let rules = backend.rules.clone();
    backend.failing_rules.set(1);
    let mut reg = Registry::with_backend(Box::new(backend));
    let at = reg.new_predicate("At", Vec::new()).unwrap();
    let atom = reg.new_instance(at).unwrap();

    assert!(matches!(
        reg.apply_rule(atom),
        Err(CoreError::Inconsistency(_))
    ));
    assert_eq!(rules.get(), 0);
    // the failed attempt did not mark the atom as applied
    reg.apply_rule(atom).unwrap();
    assert_eq!(rules.get(), 1);
    reg.apply_rule(atom).unwrap();
    assert_eq!(rules.get(), 1);
}

#[test]
fn test_apply_rule_rejects_non_atoms() {
    let (mut reg, rules, _) = counting_registry();
    let num = reg.new_int(3);
    assert!(matches!(
        reg.apply_rule(num),
        Err(CoreError::TypeMismatch { .. })
    ));
    assert_eq!(rules.get(), 0);
}

#[test]
fn test_assert_facts_requires_booleans() {
    let mut reg = Registry::new();
    let flag = reg.new_bool(true);
    let num = reg.new_int(1);
    reg.assert_facts(&[flag]).unwrap();
    assert!(matches!(
        reg.assert_facts(&[flag, num]),
        Err(CoreError::TypeMismatch { .. })
    ));
}

// ----------------------------------------------------------------- enums

#[test]
fn test_enum_value_is_the_recorded_domain() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let var = reg.new_enum(robot, vec![r1, r2]).unwrap();
    let domain: BTreeSet<Expr> = [r1, r2].into_iter().collect();
    assert_eq!(reg.enum_value(var).unwrap(), domain);
}

#[test]
fn test_enum_rejects_foreign_values() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    let num = reg.new_int(1);
    assert!(matches!(
        reg.new_enum(robot, vec![num]),
        Err(CoreError::TypeMismatch { .. })
    ));
}

#[test]
fn test_unresolved_variable_ranges_over_recorded_instances() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    assert_eq!(reg.instances_of(robot), &[r1, r2]);
    let var = reg.new_var(robot).unwrap();
    let domain: BTreeSet<Expr> = [r1, r2].into_iter().collect();
    assert_eq!(reg.enum_value(var).unwrap(), domain);
}

#[test]
fn test_remove_notifies_the_backend_once_per_shrink() {
    let (mut reg, _, shrinks) = counting_registry();
    let robot = reg.new_type("Robot").unwrap();
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let var = reg.new_enum(robot, vec![r1, r2]).unwrap();

    reg.remove(var, r1).unwrap();
    assert_eq!(shrinks.get(), 1);
    // absent value: no shrink, no notification
    reg.remove(var, r1).unwrap();
    assert_eq!(shrinks.get(), 1);
    // emptying the domain is an inconsistency
    assert!(matches!(
        reg.remove(var, r2),
        Err(CoreError::Inconsistency(_))
    ));
}

#[test]
fn test_domain_snapshot_round_trip() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let var = reg.new_enum(robot, vec![r1, r2]).unwrap();

    let snapshot = reg.domains_snapshot();
    reg.remove(var, r1).unwrap();
    assert_eq!(reg.enum_value(var).unwrap().len(), 1);
    reg.restore_domains(snapshot);
    assert_eq!(reg.enum_value(var).unwrap().len(), 2);
}

#[test]
fn test_backtracking_keeps_branch_allocated_variables_queryable() {
    let mut reg = Registry::new();
    let robot = reg.new_type("Robot").unwrap();
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let early = reg.new_enum(robot, vec![r1, r2]).unwrap();

    let snapshot = reg.domains_snapshot();
    reg.remove(early, r1).unwrap();
    // a variable allocated while exploring the branch
    let late = reg.new_enum(robot, vec![r1, r2]).unwrap();
    reg.restore_domains(snapshot);

    assert_eq!(reg.enum_value(early).unwrap().len(), 2);
    assert_eq!(reg.enum_value(late).unwrap().len(), 2);
}

// ----------------------------------------------------------- projections

fn robot_with_spot(reg: &mut Registry) -> TypeRef {
    let robot = reg.new_type("Robot").unwrap();
    let int_t = reg.builtins().int_t;
    let scope = composite_scope(reg, robot);
    reg.declare_field(scope, "spot", int_t).unwrap();
    robot
}

#[test]
fn test_enum_get_short_circuits_a_uniform_projection() {
    let mut reg = Registry::new();
    let robot = robot_with_spot(&mut reg);
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let shared = reg.new_int(7);
    reg.model_mut().env_mut(r1).unwrap().bind("spot", shared);
    reg.model_mut().env_mut(r2).unwrap().bind("spot", shared);

    let var = reg.new_var(robot).unwrap();
    let before = reg.model().len();
    let got = reg.enum_get(var, "spot").unwrap();
    assert_eq!(got, shared);
    // no fresh variable, no constraints
    assert_eq!(reg.model().len(), before);
}

#[test]
fn test_enum_get_compiles_divergent_projections_to_a_fresh_variable() {
    let mut reg = Registry::new();
    let robot = robot_with_spot(&mut reg);
    let r1 = reg.new_instance_of(robot).unwrap();
    let r2 = reg.new_instance_of(robot).unwrap();
    let p1 = reg.model().env(r1).unwrap().get("spot").unwrap();
    let p2 = reg.model().env(r2).unwrap().get("spot").unwrap();
    assert_ne!(p1, p2);

    let var = reg.new_var(robot).unwrap();
    let fresh = reg.enum_get(var, "spot").unwrap();
    assert_eq!(reg.model().kind(fresh), Kind::Arith);
    assert_ne!(fresh, p1);
    assert_ne!(fresh, p2);

    // memoized: asking again builds nothing new
    let len = reg.model().len();
    let again = reg.enum_get(var, "spot").unwrap();
    assert_eq!(again, fresh);
    assert_eq!(reg.model().len(), len);
}

#[test]
fn test_enum_get_on_an_empty_domain_is_inconsistent() {
    let mut reg = Registry::new();
    let robot = robot_with_spot(&mut reg);
    let var = reg.new_var(robot).unwrap();
    assert!(matches!(
        reg.enum_get(var, "spot"),
        Err(CoreError::Inconsistency(_))
    ));
}

#[test]
fn test_enum_get_on_an_unknown_field() {
    let mut reg = Registry::new();
    let robot = robot_with_spot(&mut reg);
    reg.new_instance_of(robot).unwrap();
    let var = reg.new_var(robot).unwrap();
    assert!(matches!(
        reg.enum_get(var, "velocity"),
        Err(CoreError::NotFound { .. })
    ));
}

// ------------------------------------------------------------ commitment

#[test]
fn test_disjunction_alternatives_are_exposed_verbatim() {
    let mut reg = Registry::new();
    let flag = reg.new_bool(true);
    let root = reg.root_scope();
    let cheap = Conjunction::new(root, Rational::from(1), Vec::new()).unwrap();
    let costly = Conjunction::new(
        root,
        Rational::from(3),
        vec![Statement::Require(flag)],
    )
    .unwrap();

    reg.new_disjunction(vec![cheap.clone(), costly.clone()]).unwrap();
    let registered = reg.disjunctions();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].alternatives(), &[cheap, costly]);
}

#[test]
fn test_apply_executes_statements_in_order() {
    let (mut reg, rules, _) = counting_registry();
    let at = reg.new_predicate("At", Vec::new()).unwrap();
    let atom = reg.new_instance(at).unwrap();
    let flag = reg.new_bool(true);
    let conjunction = Conjunction::new(
        reg.root_scope(),
        Rational::ZERO,
        vec![
            Statement::Bind {
                name: "chosen".to_owned(),
                value: flag,
            },
            Statement::Require(flag),
            Statement::Goal(atom),
        ],
    )
    .unwrap();

    reg.apply(&conjunction).unwrap();
    assert_eq!(reg.get("chosen"), Some(flag));
    assert_eq!(rules.get(), 1);
    // re-application re-runs requirements but not the atom's rule
    reg.apply(&conjunction).unwrap();
    assert_eq!(rules.get(), 1);
}

#[test]
fn test_root_bindings_are_last_write_wins() {
    let mut reg = Registry::new();
    let a = reg.new_int(1);
    let b = reg.new_int(2);
    reg.bind("x", a);
    reg.bind("x", b);
    assert_eq!(reg.get("x"), Some(b));
    assert_eq!(reg.get("y"), None);
}

// --------------------------------------------------------------- loading

#[test]
fn test_load_registers_declarations_in_order() {
    let mut reg = Registry::new();
    let b = reg.builtins();
    reg.load(vec![
        Declaration::Type {
            name: "Robot".to_owned(),
        },
        Declaration::Typedef {
            name: "step".to_owned(),
            base: "int".to_owned(),
        },
        Declaration::Predicate {
            name: "At".to_owned(),
            params: vec![Param::new("who", "Robot"), Param::new("when", "time")],
        },
        Declaration::Method {
            name: "speed".to_owned(),
            params: vec![Param::new("r", "Robot")],
            returns: Some("real".to_owned()),
        },
    ])
    .unwrap();

    let robot = reg.get_type("Robot").unwrap();
    let step = reg.get_type("step").unwrap();
    assert!(reg.is_assignable_from(b.real_t, step));
    let at = reg.get_predicate("At").unwrap();
    assert_eq!(reg.predicate(at).arity(), 2);
    let speed = reg.get_method("speed", &[robot]).unwrap();
    assert_eq!(speed.returns, Some(b.real_t));
}

#[test]
fn test_load_rejects_unknown_param_types() {
    let mut reg = Registry::new();
    let r = reg.load(vec![Declaration::Predicate {
        name: "Q".to_owned(),
        params: vec![Param::new("x", "nope")],
    }]);
    assert!(matches!(r, Err(CoreError::NotFound { .. })));
}

#[test]
fn test_read_with_the_inert_parser_registers_nothing() {
    let mut reg = Registry::new();
    let types_before = reg.get_types().len();
    reg.read("anything at all").unwrap();
    assert_eq!(reg.get_types().len(), types_before);
}

#[test]
fn test_read_files_aborts_on_the_first_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("domain.sbl");
    let missing = dir.path().join("missing.sbl");
    let last = dir.path().join("problem.sbl");
    std::fs::write(&first, "predicate At\n").unwrap();
    std::fs::write(&last, "predicate Near\n").unwrap();

    let mut reg = Registry::new();
    reg.set_parser(Box::new(LineParser));
    let err = reg
        .read_files(&[first.clone(), missing.clone(), last.clone()])
        .unwrap_err();
    match err {
        CoreError::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
    // the first file's declarations persist; the last file was never read
    assert!(reg.get_predicate("At").is_ok());
    assert!(reg.get_predicate("Near").is_err());
}

#[test]
fn test_read_config_ingests_every_manifest_script() {
    let dir = tempfile::tempdir().unwrap();
    let domain = dir.path().join("domain.sbl");
    let problem = dir.path().join("problem.sbl");
    std::fs::write(&domain, "type Robot\npredicate At\n").unwrap();
    std::fs::write(&problem, "predicate Near\n").unwrap();

    let mut reg = Registry::new();
    reg.set_parser(Box::new(LineParser));
    let config = ModelConfig {
        scripts: vec![domain, problem],
    };
    reg.read_config(&config).unwrap();
    assert!(reg.get_type("Robot").is_ok());
    assert!(reg.get_predicate("At").is_ok());
    assert!(reg.get_predicate("Near").is_ok());
}

#[test]
fn test_parse_errors_surface_through_read() {
    let mut reg = Registry::new();
    reg.set_parser(Box::new(LineParser));
    assert!(matches!(
        reg.read("gibberish"),
        Err(CoreError::Parse(_))
    ));
}
