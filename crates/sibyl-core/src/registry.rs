//! The registry: root scope, root environment, and sole entry point for
//! loading, expression construction, and evaluation.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use sibyl_num::{InfRational, LBool, Lin, Rational};
use tracing::{debug, info};

use crate::backend::{Backend, InertBackend};
use crate::config::ModelConfig;
use crate::conjunction::{Conjunction, Disjunction, Statement};
use crate::error::{CoreError, Result};
use crate::model::{
    Builtins, DomainSnapshot, Env, Expr, Field, Item, Kind, Lit, MethodData, Model, Payload,
    PredRef, PredicateData, ScopeId, ScopeTree, TypeData, TypeKind, TypeRef, TypeTable,
};
use crate::parse::{Declaration, InertParser, Param, Parse};

/// The root of one loaded problem instance.
///
/// The registry owns every type, predicate, and method, the scope tree, the
/// item arena, and the root binding environment. It is populated during a
/// synchronous, single-writer loading phase and its declaration tables are
/// read-only thereafter. A theory backend plugs in through [`Backend`]; a
/// language front end plugs in through [`Parse`]. Discarding the registry
/// releases the whole instance; there is no process-wide state.
pub struct Registry {
    types: TypeTable,
    scopes: ScopeTree,
    predicates: Vec<PredicateData>,
    predicate_index: HashMap<String, PredRef>,
    methods: HashMap<String, Vec<MethodData>>,
    model: Model,
    env: Env,
    backend: Box<dyn Backend>,
    parser: Box<dyn Parse>,
    /// Instances recorded per (resolved) type, feeding placeholder domains.
    instances: HashMap<TypeRef, Vec<Expr>>,
    /// Atoms whose predicate rule has already run.
    applied: HashSet<Expr>,
    /// Memoized enum projections, keyed by (enum item, field name).
    projections: HashMap<(Expr, String), Expr>,
    choice_points: Vec<Disjunction>,
}

impl Registry {
    /// Creates a registry with the inert backend and the inert parser, and
    /// the primitive types pre-registered.
    pub fn new() -> Self {
        Self::with_backend(Box::new(InertBackend::new()))
    }

    /// Creates a registry driven by the given theory backend.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        let mut types = TypeTable::new();
        let mut scopes = ScopeTree::new();
        let register = |types: &mut TypeTable, scopes: &mut ScopeTree, name: &str, kind| {
            let t = types.alloc(TypeData {
                name: name.to_owned(),
                kind,
            });
            scopes
                .declare_type(ScopeId::ROOT, name, t)
                .expect("builtin names are distinct");
            t
        };
        let builtins = Builtins {
            bool_t: register(&mut types, &mut scopes, "bool", TypeKind::Bool),
            int_t: register(&mut types, &mut scopes, "int", TypeKind::Int),
            real_t: register(&mut types, &mut scopes, "real", TypeKind::Real),
            time_point_t: register(&mut types, &mut scopes, "time", TypeKind::TimePoint),
            string_t: register(&mut types, &mut scopes, "string", TypeKind::Str),
        };
        Registry {
            types,
            scopes,
            predicates: Vec::new(),
            predicate_index: HashMap::new(),
            methods: HashMap::new(),
            model: Model::new(builtins),
            env: Env::new(),
            backend,
            parser: Box::new(InertParser),
            instances: HashMap::new(),
            applied: HashSet::new(),
            projections: HashMap::new(),
            choice_points: Vec::new(),
        }
    }

    /// Replaces the theory backend.
    pub fn set_backend(&mut self, backend: Box<dyn Backend>) {
        self.backend = backend;
    }

    /// Replaces the parser collaborator.
    pub fn set_parser(&mut self, parser: Box<dyn Parse>) {
        self.parser = parser;
    }

    pub fn builtins(&self) -> Builtins {
        self.model.builtins()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    // ------------------------------------------------------------------
    // Scopes and fields
    // ------------------------------------------------------------------

    /// The root scope: the registry itself.
    pub fn root_scope(&self) -> ScopeId {
        ScopeId::ROOT
    }

    /// Creates a scope enclosed by `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.new_scope(parent)
    }

    /// The enclosing scope; the root encloses itself.
    pub fn enclosing_scope(&self, scope: ScopeId) -> ScopeId {
        self.scopes.enclosing_scope(scope)
    }

    pub fn declare_field(&mut self, scope: ScopeId, name: &str, ty: TypeRef) -> Result<()> {
        self.scopes.declare_field(
            scope,
            Field {
                name: name.to_owned(),
                ty,
            },
        )
    }

    /// A field declared directly in `scope`; no enclosing-scope fallback.
    pub fn field(&self, scope: ScopeId, name: &str) -> Option<&Field> {
        self.scopes.field(scope, name)
    }

    /// A type declared directly in `scope`; no enclosing-scope fallback.
    pub fn scope_type(&self, scope: ScopeId, name: &str) -> Option<TypeRef> {
        self.scopes.get_type(scope, name)
    }

    pub fn scope_types(&self, scope: ScopeId) -> &HashMap<String, TypeRef> {
        self.scopes.get_types(scope)
    }

    // ------------------------------------------------------------------
    // Name-indexed accessors over the registry's own tables
    // ------------------------------------------------------------------

    pub fn get_type(&self, name: &str) -> Result<TypeRef> {
        self.scopes
            .get_type(ScopeId::ROOT, name)
            .ok_or_else(|| CoreError::not_found("type", name))
    }

    pub fn get_types(&self) -> &HashMap<String, TypeRef> {
        self.scopes.get_types(ScopeId::ROOT)
    }

    pub fn get_field(&self, name: &str) -> Result<&Field> {
        self.scopes
            .field(ScopeId::ROOT, name)
            .ok_or_else(|| CoreError::not_found("field", name))
    }

    pub fn get_predicate(&self, name: &str) -> Result<PredRef> {
        self.predicate_index
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::not_found("predicate", name))
    }

    pub fn get_predicates(&self) -> &HashMap<String, PredRef> {
        &self.predicate_index
    }

    /// Resolves a method by name and actual argument types.
    ///
    /// Overloads are scanned in declaration order; the first one with
    /// matching arity whose every parameter type is assignable from the
    /// corresponding argument type wins. No ambiguity detection is
    /// performed.
    pub fn get_method(&self, name: &str, args: &[TypeRef]) -> Result<&MethodData> {
        let overloads = self
            .methods
            .get(name)
            .ok_or_else(|| CoreError::not_found("method", name))?;
        overloads
            .iter()
            .find(|m| {
                m.arity() == args.len()
                    && m.params
                        .iter()
                        .zip(args)
                        .all(|(p, &a)| self.types.is_assignable_from(p.ty, a))
            })
            .ok_or_else(|| CoreError::not_found("method", name))
    }

    /// All overloads registered under `name`, in declaration order.
    pub fn get_methods(&self, name: &str) -> Result<&[MethodData]> {
        self.methods
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| CoreError::not_found("method", name))
    }

    pub fn predicate(&self, pred: PredRef) -> &PredicateData {
        &self.predicates[pred.0 as usize]
    }

    pub fn type_data(&self, ty: TypeRef) -> &TypeData {
        self.types.get(ty)
    }

    /// May a value of type `source` stand where a `target` is declared?
    pub fn is_assignable_from(&self, target: TypeRef, source: TypeRef) -> bool {
        self.types.is_assignable_from(target, source)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Registers a composite type owning a fresh scope.
    pub fn new_type(&mut self, name: &str) -> Result<TypeRef> {
        if self.scopes.get_type(ScopeId::ROOT, name).is_some() {
            return Err(CoreError::duplicate("type", name));
        }
        let scope = self.scopes.new_scope(ScopeId::ROOT);
        let ty = self.types.alloc(TypeData {
            name: name.to_owned(),
            kind: TypeKind::Composite { scope },
        });
        self.scopes.declare_type(ScopeId::ROOT, name, ty)?;
        debug!(name, "registered type");
        Ok(ty)
    }

    /// Registers a type alias resolving to `base`.
    pub fn new_typedef(&mut self, name: &str, base: TypeRef) -> Result<TypeRef> {
        if self.scopes.get_type(ScopeId::ROOT, name).is_some() {
            return Err(CoreError::duplicate("type", name));
        }
        let ty = self.types.alloc(TypeData {
            name: name.to_owned(),
            kind: TypeKind::Typedef { base },
        });
        self.scopes.declare_type(ScopeId::ROOT, name, ty)?;
        debug!(name, "registered typedef");
        Ok(ty)
    }

    /// Registers a predicate with its ordered argument fields.
    pub fn new_predicate(&mut self, name: &str, params: Vec<(String, TypeRef)>) -> Result<PredRef> {
        if self.predicate_index.contains_key(name)
            || self.scopes.get_type(ScopeId::ROOT, name).is_some()
        {
            return Err(CoreError::duplicate("predicate", name));
        }
        let scope = self.scopes.new_scope(ScopeId::ROOT);
        let mut fields = Vec::with_capacity(params.len());
        for (param_name, param_ty) in params {
            let field = Field {
                name: param_name,
                ty: param_ty,
            };
            self.scopes.declare_field(scope, field.clone())?;
            fields.push(field);
        }
        let pred = PredRef(self.predicates.len() as u32);
        let ty = self.types.alloc(TypeData {
            name: name.to_owned(),
            kind: TypeKind::Predicate(pred),
        });
        self.scopes.declare_type(ScopeId::ROOT, name, ty)?;
        self.predicates.push(PredicateData {
            name: name.to_owned(),
            ty,
            scope,
            params: fields,
        });
        self.predicate_index.insert(name.to_owned(), pred);
        debug!(name, arity = self.predicates[pred.0 as usize].arity(), "registered predicate");
        Ok(pred)
    }

    /// Registers a method overload, declaring its parameters as fields of a
    /// fresh scope. Same-name declarations accumulate in declaration order;
    /// they are resolved first-match by `get_method`.
    pub fn new_method(
        &mut self,
        name: &str,
        params: Vec<(String, TypeRef)>,
        returns: Option<TypeRef>,
    ) -> Result<()> {
        let scope = self.scopes.new_scope(ScopeId::ROOT);
        let mut fields = Vec::with_capacity(params.len());
        for (param_name, param_ty) in params {
            let field = Field {
                name: param_name,
                ty: param_ty,
            };
            self.scopes.declare_field(scope, field.clone())?;
            fields.push(field);
        }
        self.methods.entry(name.to_owned()).or_default().push(MethodData {
            name: name.to_owned(),
            scope,
            params: fields,
            returns,
        });
        debug!(name, "registered method overload");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Root environment
    // ------------------------------------------------------------------

    /// Local lookup in the registry's own binding environment.
    pub fn get(&self, name: &str) -> Option<Expr> {
        self.env.get(name)
    }

    /// Binds a name in the registry's own binding environment.
    pub fn bind(&mut self, name: impl Into<String>, value: Expr) {
        self.env.bind(name, value);
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Parses a script with the parser collaborator and registers its
    /// declarations in the order received.
    pub fn read(&mut self, script: &str) -> Result<()> {
        let declarations = self.parser.parse(script)?;
        self.load(declarations)
    }

    /// Ingests files sequentially. A path that cannot be opened aborts the
    /// whole call naming that path; declarations registered from earlier
    /// files remain, and later files are never processed.
    pub fn read_files<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<()> {
        for file in files {
            let path = file.as_ref();
            let text =
                std::fs::read_to_string(path).map_err(|_| CoreError::FileNotFound {
                    path: path.to_path_buf(),
                })?;
            info!(path = %path.display(), "reading model script");
            self.read(&text)?;
        }
        Ok(())
    }

    /// Ingests every script named by a model manifest, in manifest order.
    pub fn read_config(&mut self, config: &ModelConfig) -> Result<()> {
        self.read_files(&config.scripts)
    }

    /// Registers a sequence of declarations in the order received, without
    /// reordering.
    pub fn load(&mut self, declarations: Vec<Declaration>) -> Result<()> {
        for declaration in declarations {
            match declaration {
                Declaration::Type { name } => {
                    self.new_type(&name)?;
                }
                Declaration::Typedef { name, base } => {
                    let base = self.get_type(&base)?;
                    self.new_typedef(&name, base)?;
                }
                Declaration::Predicate { name, params } => {
                    let params = self.resolve_params(params)?;
                    self.new_predicate(&name, params)?;
                }
                Declaration::Method {
                    name,
                    params,
                    returns,
                } => {
                    let params = self.resolve_params(params)?;
                    let returns = returns.map(|r| self.get_type(&r)).transpose()?;
                    self.new_method(&name, params, returns)?;
                }
                Declaration::Formula(statement) => self.execute(&statement)?,
            }
        }
        Ok(())
    }

    fn resolve_params(&self, params: Vec<Param>) -> Result<Vec<(String, TypeRef)>> {
        params
            .into_iter()
            .map(|p| Ok((p.name, self.get_type(&p.ty)?)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Expression construction
    // ------------------------------------------------------------------

    /// A boolean constant.
    pub fn new_bool(&mut self, value: bool) -> Expr {
        let bool_t = self.builtins().bool_t;
        let lit = if value { Lit::TRUE } else { Lit::FALSE };
        self.model.alloc(Item::new(bool_t, Payload::Bool(lit)))
    }

    /// An integer constant.
    pub fn new_int(&mut self, value: i64) -> Expr {
        let int_t = self.builtins().int_t;
        self.model.alloc(Item::new(
            int_t,
            Payload::Arith(Lin::from_constant(Rational::from(value))),
        ))
    }

    /// A real constant.
    pub fn new_real(&mut self, value: Rational) -> Expr {
        let real_t = self.builtins().real_t;
        self.model
            .alloc(Item::new(real_t, Payload::Arith(Lin::from_constant(value))))
    }

    /// A time-point constant.
    pub fn new_time_point(&mut self, value: Rational) -> Expr {
        let time_t = self.builtins().time_point_t;
        self.model
            .alloc(Item::new(time_t, Payload::Arith(Lin::from_constant(value))))
    }

    /// A string constant, compared structurally.
    pub fn new_string(&mut self, value: impl Into<String>) -> Expr {
        let string_t = self.builtins().string_t;
        self.model
            .alloc(Item::new(string_t, Payload::Str(value.into())))
    }

    /// An enum variable ranging over the given candidates, each of which
    /// must be assignable to `ty`.
    pub fn new_enum(&mut self, ty: TypeRef, values: Vec<Expr>) -> Result<Expr> {
        for &value in &values {
            let value_ty = self.model.ty(value);
            if !self.types.is_assignable_from(ty, value_ty) {
                return Err(CoreError::mismatch(
                    self.types.get(ty).name.clone(),
                    self.types.get(value_ty).name.clone(),
                ));
            }
        }
        let domain: BTreeSet<Expr> = values.into_iter().collect();
        Ok(self.backend.new_enum_var(&mut self.model, ty, domain))
    }

    /// A fresh, unresolved variable of the given type: a boolean or
    /// arithmetic theory variable for the primitives, an enum over the
    /// recorded instances of the type otherwise.
    pub fn new_var(&mut self, ty: TypeRef) -> Result<Expr> {
        let resolved = self.types.resolve(ty);
        match self.types.get(resolved).kind {
            TypeKind::Bool => Ok(self.backend.new_bool_var(&mut self.model)),
            TypeKind::Int | TypeKind::Real | TypeKind::TimePoint => {
                Ok(self.backend.new_arith_var(&mut self.model, ty))
            }
            _ => {
                let domain: BTreeSet<Expr> = self
                    .instances
                    .get(&resolved)
                    .map(|v| v.iter().copied().collect())
                    .unwrap_or_default();
                Ok(self.backend.new_enum_var(&mut self.model, ty, domain))
            }
        }
    }

    /// Instantiates a predicate: an atom whose environment holds exactly one
    /// unresolved placeholder per declared argument, named identically.
    ///
    /// The predicate's rule is not run here; it runs once, when the atom is
    /// committed as a fact or goal.
    pub fn new_instance(&mut self, pred: PredRef) -> Result<Expr> {
        let params = self.predicates[pred.0 as usize].params.clone();
        let ty = self.predicates[pred.0 as usize].ty;
        self.instantiate(ty, params)
    }

    /// Instantiates a composite type or predicate by name resolution on its
    /// fields; a primitive type is not instantiable.
    pub fn new_instance_of(&mut self, ty: TypeRef) -> Result<Expr> {
        let resolved = self.types.resolve(ty);
        match self.types.get(resolved).kind {
            TypeKind::Predicate(pred) => self.new_instance(pred),
            TypeKind::Composite { scope } => {
                let fields: Vec<Field> = self.scopes.fields(scope).values().cloned().collect();
                self.instantiate(resolved, fields)
            }
            _ => Err(CoreError::mismatch(
                "an instantiable type",
                self.types.get(ty).name.clone(),
            )),
        }
    }

    /// Instantiates an atom, enforcing that `ty` is a predicate.
    pub fn new_atom_of(&mut self, ty: TypeRef) -> Result<Expr> {
        let pred = self.types.as_predicate(ty)?;
        self.new_instance(pred)
    }

    fn instantiate(&mut self, ty: TypeRef, fields: Vec<Field>) -> Result<Expr> {
        let mut env = Env::new();
        for field in &fields {
            let placeholder = self.new_var(field.ty)?;
            env.bind(field.name.clone(), placeholder);
        }
        let instance = self.model.alloc(Item::new(ty, Payload::Complex(env)));
        self.instances
            .entry(self.types.resolve(ty))
            .or_default()
            .push(instance);
        Ok(instance)
    }

    /// Instances recorded so far for a type.
    pub fn instances_of(&self, ty: TypeRef) -> &[Expr] {
        self.instances
            .get(&self.types.resolve(ty))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Builder combinators
    // ------------------------------------------------------------------

    fn expect_kind(&self, x: Expr, kind: Kind) -> Result<()> {
        let actual = self.model.kind(x);
        if actual == kind {
            Ok(())
        } else {
            Err(CoreError::mismatch(kind.to_string(), actual.to_string()))
        }
    }

    fn expect_all(&self, xs: &[Expr], kind: Kind) -> Result<()> {
        if xs.is_empty() {
            return Err(CoreError::InvalidModel(
                "an operator needs at least one operand".to_owned(),
            ));
        }
        for &x in xs {
            self.expect_kind(x, kind)?;
        }
        Ok(())
    }

    pub fn negate(&mut self, x: Expr) -> Result<Expr> {
        self.expect_kind(x, Kind::Bool)?;
        self.backend.negate(&mut self.model, x)
    }

    pub fn conj(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Bool)?;
        self.backend.conj(&mut self.model, xs)
    }

    pub fn disj(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Bool)?;
        self.backend.disj(&mut self.model, xs)
    }

    pub fn exactly_one(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Bool)?;
        self.backend.exactly_one(&mut self.model, xs)
    }

    pub fn add(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Arith)?;
        self.backend.add(&mut self.model, xs)
    }

    pub fn sub(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Arith)?;
        self.backend.sub(&mut self.model, xs)
    }

    pub fn mul(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Arith)?;
        self.backend.mul(&mut self.model, xs)
    }

    pub fn div(&mut self, xs: &[Expr]) -> Result<Expr> {
        self.expect_all(xs, Kind::Arith)?;
        self.backend.div(&mut self.model, xs)
    }

    pub fn minus(&mut self, x: Expr) -> Result<Expr> {
        self.expect_kind(x, Kind::Arith)?;
        self.backend.minus(&mut self.model, x)
    }

    pub fn lt(&mut self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.expect_all(&[lhs, rhs], Kind::Arith)?;
        self.backend.lt(&mut self.model, lhs, rhs)
    }

    pub fn leq(&mut self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.expect_all(&[lhs, rhs], Kind::Arith)?;
        self.backend.leq(&mut self.model, lhs, rhs)
    }

    pub fn geq(&mut self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.expect_all(&[lhs, rhs], Kind::Arith)?;
        self.backend.geq(&mut self.model, lhs, rhs)
    }

    pub fn gt(&mut self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        self.expect_all(&[lhs, rhs], Kind::Arith)?;
        self.backend.gt(&mut self.model, lhs, rhs)
    }

    /// Equality over any two expressions.
    ///
    /// The same handle is trivially equal to itself; string items compare
    /// structurally; items of different leaf kinds are unequal unless an
    /// enum is involved, in which case the theory decides membership.
    pub fn eq(&mut self, lhs: Expr, rhs: Expr) -> Result<Expr> {
        if lhs == rhs {
            return Ok(self.new_bool(true));
        }
        let (lk, rk) = (self.model.kind(lhs), self.model.kind(rhs));
        if lk == Kind::Enum || rk == Kind::Enum {
            return self.backend.eq(&mut self.model, lhs, rhs);
        }
        if lk != rk {
            return Ok(self.new_bool(false));
        }
        if lk == Kind::String {
            let same = self.model.string_value(lhs)? == self.model.string_value(rhs)?;
            return Ok(self.new_bool(same));
        }
        self.backend.eq(&mut self.model, lhs, rhs)
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// The current truth of a boolean expression.
    pub fn bool_value(&self, x: Expr) -> Result<LBool> {
        self.expect_kind(x, Kind::Bool)?;
        Ok(self.backend.bool_value(&self.model, x))
    }

    /// A point estimate for an arithmetic expression, within its own bounds
    /// whenever both are defined.
    pub fn arith_value(&self, x: Expr) -> Result<InfRational> {
        self.expect_kind(x, Kind::Arith)?;
        Ok(self.backend.arith_value(&self.model, x))
    }

    /// The current (lower, upper) bounds of an arithmetic expression.
    pub fn arith_bounds(&self, x: Expr) -> Result<(InfRational, InfRational)> {
        self.expect_kind(x, Kind::Arith)?;
        Ok(self.backend.arith_bounds(&self.model, x))
    }

    /// The current candidate set of an enum expression.
    pub fn enum_value(&self, x: Expr) -> Result<BTreeSet<Expr>> {
        self.expect_kind(x, Kind::Enum)?;
        Ok(self.backend.enum_value(&self.model, x))
    }

    /// Projects every candidate of an enum variable onto one of its fields.
    ///
    /// This is a constraint-compiling operation, not a lookup: unless all
    /// candidates already project to the same expression, a fresh variable
    /// of the field's type is created and tied to the enum by one
    /// implication per candidate, `(var = c) implies (proj = c.field)`,
    /// asserted as a batch. The result is memoized per (variable, field).
    pub fn enum_get(&mut self, var: Expr, field_name: &str) -> Result<Expr> {
        self.expect_kind(var, Kind::Enum)?;
        if let Some(&memo) = self.projections.get(&(var, field_name.to_owned())) {
            return Ok(memo);
        }
        let candidates: Vec<Expr> = self.model.domain(var)?.iter().copied().collect();
        if candidates.is_empty() {
            return Err(CoreError::Inconsistency(format!(
                "cannot project field '{field_name}' of an empty domain"
            )));
        }
        let mut projected = Vec::with_capacity(candidates.len());
        for &candidate in &candidates {
            let env = self.model.env(candidate)?;
            let value = env
                .get(field_name)
                .ok_or_else(|| CoreError::not_found("field", field_name))?;
            projected.push(value);
        }
        let result = if projected.iter().all(|&p| p == projected[0]) {
            projected[0]
        } else {
            let scope = self
                .types
                .scope_of(self.model.ty(var), &self.predicates)
                .ok_or_else(|| {
                    CoreError::mismatch(
                        "a composite type",
                        self.types.get(self.model.ty(var)).name.clone(),
                    )
                })?;
            let field_ty = self
                .scopes
                .field(scope, field_name)
                .ok_or_else(|| CoreError::not_found("field", field_name))?
                .ty;
            let fresh = self.new_var(field_ty)?;
            let mut links = Vec::with_capacity(candidates.len());
            for (&candidate, &value) in candidates.iter().zip(projected.iter()) {
                let chosen = self.eq(var, candidate)?;
                let not_chosen = self.negate(chosen)?;
                let tied = self.eq(fresh, value)?;
                links.push(self.disj(&[not_chosen, tied])?);
            }
            self.assert_facts(&links)?;
            fresh
        };
        self.projections
            .insert((var, field_name.to_owned()), result);
        Ok(result)
    }

    /// Removes `val` from the domain of `var`; a no-op if absent, an
    /// `Inconsistency` if the domain empties.
    pub fn remove(&mut self, var: Expr, val: Expr) -> Result<()> {
        if self.model.remove_value(var, val)? {
            self.backend.on_domain_shrink(&mut self.model, var, val)?;
        }
        Ok(())
    }

    /// Copies every enum domain for branch-local exploration.
    pub fn domains_snapshot(&self) -> DomainSnapshot {
        self.model.domains_snapshot()
    }

    /// Restores the domains captured by a snapshot.
    pub fn restore_domains(&mut self, snapshot: DomainSnapshot) {
        self.model.restore_domains(snapshot);
    }

    // ------------------------------------------------------------------
    // Commitment
    // ------------------------------------------------------------------

    /// Registers a batch of boolean expressions as newly-true facts; the
    /// backend applies the whole batch atomically.
    pub fn assert_facts(&mut self, facts: &[Expr]) -> Result<()> {
        for &fact in facts {
            self.expect_kind(fact, Kind::Bool)?;
        }
        self.backend.assert_facts(&mut self.model, facts)
    }

    /// Runs the predicate's rule against one committed atom, exactly once;
    /// defensive re-invocation is an idempotent no-op. An atom counts as
    /// applied only once the backend hook succeeds, so a rejected rule can be
    /// retried.
    pub fn apply_rule(&mut self, atom: Expr) -> Result<()> {
        let pred = self.types.as_predicate(self.model.ty(atom))?;
        if self.applied.contains(&atom) {
            debug!(predicate = %self.predicates[pred.0 as usize].name, "rule already applied");
            return Ok(());
        }
        self.backend.apply_rule(&mut self.model, pred, atom)?;
        self.applied.insert(atom);
        Ok(())
    }

    /// Registers a set of mutually exclusive alternatives as one choice
    /// point, exposed unmodified and unreordered; committing, backtracking,
    /// and discarding are the external search driver's business.
    pub fn new_disjunction(&mut self, alternatives: Vec<Conjunction>) -> Result<()> {
        let disjunction = Disjunction::new(alternatives)?;
        self.backend.on_disjunction(&mut self.model, &disjunction)?;
        self.choice_points.push(disjunction);
        Ok(())
    }

    /// Every registered choice point, in registration order.
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.choice_points
    }

    /// Executes a chosen conjunction's statements in order: bindings into
    /// the root environment, requirements as an asserted-fact batch of one,
    /// facts and goals through their predicate rules.
    pub fn apply(&mut self, conjunction: &Conjunction) -> Result<()> {
        for statement in conjunction.statements() {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Require(x) => self.assert_facts(&[*x]),
            Statement::Fact(atom) | Statement::Goal(atom) => self.apply_rule(*atom),
            Statement::Bind { name, value } => {
                self.env.bind(name.clone(), *value);
                Ok(())
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
