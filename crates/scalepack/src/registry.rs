//! # Codec Registry
//!
//! Maps type names to dynamic codecs and generic type names to factories, so a
//! payload can be decoded from nothing more than a type expression such as
//! `Vec<Option<AccountId>>`.
//!
//! ## Lifecycle
//!
//! A `RegistryBuilder` collects named codecs, factories and cycle breakers.
//! `build()` walks every codec's by-name references, checks the reference
//! graph and binds each reference to its target. After that the registry is
//! read-only; the instance cache is a memo and never changes observable
//! behavior.
//!
//! ## Invariants
//! - **Acyclic except through breakers**: every reference into a cycle
//!   breaker is lazy, and the remaining reference graph has no cycle.
//! - **Stable instances**: resolving the same parameterization twice yields
//!   the same codec instance (`Codec::ptr_eq`).

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::codec::Codec;
use crate::codec::Int;
use crate::codec::Node;
use crate::error::Error;
use crate::error::Result;

/// The type registries use to break their only intended cycle by default.
pub const DEFAULT_CYCLE_BREAKER: &str = "InstructionBox";

/// A parsed type expression: a name with optional parameters, or a length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Name(String, Vec<TypeExpr>),
    Len(usize),
}

impl TypeExpr {
    pub fn parse(input: &str) -> Result<Self> {
        let bad = || Error::BadTypeExpr(input.to_owned());
        let mut parser = Parser { src: input.as_bytes(), pos: 0 };
        let expr = parser.expr().ok_or_else(bad)?;
        parser.skip_ws();
        if parser.pos != parser.src.len() {
            return Err(bad());
        }
        Ok(expr)
    }

    /// Every name mentioned anywhere in the expression.
    fn names<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Self::Name(name, params) = self {
            out.push(name);
            for param in params {
                param.names(out);
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Len(n) => write!(f, "{}", n),
            Self::Name(name, params) if params.is_empty() => write!(f, "{}", name),
            Self::Name(name, params) => {
                write!(f, "{}<", name)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ">")
            }
        }
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.src.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &str {
        let start = self.pos;
        while self.src.get(self.pos).is_some_and(|&b| pred(b)) {
            self.pos += 1;
        }
        // only ASCII bytes are accepted by every caller's predicate
        std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default()
    }

    fn expr(&mut self) -> Option<TypeExpr> {
        self.skip_ws();
        if self.eat(b'(') {
            return self.eat(b')').then(|| TypeExpr::Name("()".to_owned(), Vec::new()));
        }
        let first = *self.src.get(self.pos)?;
        if first.is_ascii_digit() {
            return self.take_while(|b| b.is_ascii_digit()).parse().ok().map(TypeExpr::Len);
        }
        let name = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_').to_owned();
        if name.is_empty() {
            return None;
        }
        let mut params = Vec::new();
        if self.eat(b'<') {
            loop {
                params.push(self.expr()?);
                if self.eat(b'>') {
                    break;
                }
                if !self.eat(b',') {
                    return None;
                }
            }
        }
        Some(TypeExpr::Name(name, params))
    }
}

/// A resolved factory argument.
#[derive(Debug, Clone)]
pub enum Param {
    Type(Codec),
    Len(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ParamKey {
    Type(usize),
    Len(usize),
}

impl Param {
    fn key(&self) -> ParamKey {
        match self {
            Self::Type(codec) => ParamKey::Type(codec.addr()),
            Self::Len(n) => ParamKey::Len(*n),
        }
    }

    fn codec(&self) -> Option<&Codec> {
        match self {
            Self::Type(codec) => Some(codec),
            Self::Len(_) => None,
        }
    }
}

type FactoryFn = dyn Fn(&[Param]) -> Result<Codec> + Send + Sync;

#[derive(Clone)]
struct Factory {
    arity: usize,
    build: Arc<FactoryFn>,
}

/// Collects codecs and factories, then checks and binds them in `build()`.
pub struct RegistryBuilder {
    types: BTreeMap<String, Codec>,
    factories: HashMap<String, Factory>,
    breakers: BTreeSet<String>,
}

impl RegistryBuilder {
    fn empty() -> Self {
        Self { types: BTreeMap::new(), factories: HashMap::new(), breakers: BTreeSet::new() }
    }

    fn with_builtins() -> Self {
        let mut builder = Self::empty();
        let primitives = [
            ("()", Codec::unit()),
            ("bool", Codec::bool()),
            ("String", Codec::string()),
            ("Bytes", Codec::bytes()),
            ("Compact", Codec::compact()),
        ];
        let ints = [
            Int::U8,
            Int::U16,
            Int::U32,
            Int::U64,
            Int::U128,
            Int::I8,
            Int::I16,
            Int::I32,
            Int::I64,
            Int::I128,
        ];
        for (name, codec) in primitives {
            builder.types.insert(name.to_owned(), codec);
        }
        for kind in ints {
            builder.types.insert(kind.name().to_owned(), Codec::int(kind));
        }

        builder.insert_factory("Option", 1, |p| unary(p, Codec::option));
        builder.insert_factory("Vec", 1, |p| unary(p, Codec::list));
        builder.insert_factory("BTreeSet", 1, |p| unary(p, Codec::set));
        builder.insert_factory("NonZero", 1, |p| unary(p, Codec::non_zero));
        builder.insert_factory("BTreeMap", 2, |p| match (p[0].codec(), p[1].codec()) {
            (Some(k), Some(v)) => Ok(Codec::map(k.clone(), v.clone())),
            _ => Err(Error::BadTypeExpr("BTreeMap<K, V> takes two types".to_owned())),
        });
        builder.insert_factory("Array", 2, |p| match (&p[0], &p[1]) {
            (Param::Type(inner), Param::Len(len)) if *len > 0 => {
                Ok(Codec::array(inner.clone(), *len))
            }
            (Param::Type(_), Param::Len(_)) => Err(Error::BadTypeExpr("Array<T, 0>".to_owned())),
            _ => Err(Error::BadTypeExpr("Array<T, N> takes a type and a length".to_owned())),
        });
        builder.breakers.insert(DEFAULT_CYCLE_BREAKER.to_owned());
        builder
    }

    fn insert_factory(
        &mut self,
        name: &str,
        arity: usize,
        build: impl Fn(&[Param]) -> Result<Codec> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.to_owned(), Factory { arity, build: Arc::new(build) });
    }

    fn is_taken(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.factories.contains_key(name)
    }

    /// Registers a concrete type under `name`.
    pub fn register(&mut self, name: impl Into<String>, codec: Codec) -> Result<&mut Self> {
        let name = name.into();
        if self.is_taken(&name) {
            return Err(Error::DuplicateType(name));
        }
        self.types.insert(name, codec);
        Ok(self)
    }

    /// Registers a generic type taking `arity` parameters.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        factory: impl Fn(&[Param]) -> Result<Codec> + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.is_taken(&name) {
            return Err(Error::DuplicateType(name));
        }
        self.insert_factory(&name, arity, factory);
        Ok(self)
    }

    /// Marks `name` as a type every reference must reach lazily.
    pub fn cycle_breaker(&mut self, name: impl Into<String>) -> &mut Self {
        self.breakers.insert(name.into());
        self
    }

    /// Checks the reference graph and binds every reference.
    pub fn build(self) -> Result<Registry> {
        let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut pending = Vec::new();

        for (from, codec) in &self.types {
            let targets = edges.entry(from.as_str()).or_default();
            for reference in codec.unbound_refs(&[]) {
                let Node::Ref(r) = reference.node() else { continue };
                let Some(text) = &r.expr else { continue };
                let expr = TypeExpr::parse(text)?;
                let mut names = Vec::new();
                expr.names(&mut names);
                for name in names {
                    if let Some((to, _)) = self.types.get_key_value(name) {
                        if self.breakers.contains(name) {
                            if !r.lazy {
                                return Err(Error::EagerCycleBreaker {
                                    from: from.clone(),
                                    to: name.to_owned(),
                                });
                            }
                        } else {
                            targets.insert(to.as_str());
                        }
                    } else if !self.factories.contains_key(name) {
                        return Err(Error::Unregistered(name.to_owned()));
                    }
                }
                pending.push((reference.clone(), expr));
            }
        }

        check_acyclic(&edges)?;

        let registry = Registry {
            types: self.types.into_iter().collect(),
            factories: self.factories,
            instances: DashMap::new(),
        };
        for (reference, expr) in pending {
            let target = registry.resolve_expr(&expr)?;
            bind(&reference, target)?;
        }
        Ok(registry)
    }
}

/// Points a reference at its target.
///
/// Binding the same target twice is allowed: a codec registered under two
/// names is visited once per name.
fn bind(reference: &Codec, target: Codec) -> Result<()> {
    let Node::Ref(r) = reference.node() else { return Ok(()) };
    match r.slot.set(target) {
        Ok(()) => Ok(()),
        Err(target) if r.slot.get().is_some_and(|bound| Codec::ptr_eq(bound, &target)) => Ok(()),
        Err(_) => Err(Error::Rebound(r.expr.clone().unwrap_or_default())),
    }
}

fn unary(params: &[Param], make: fn(Codec) -> Codec) -> Result<Codec> {
    params[0]
        .codec()
        .map(|inner| make(inner.clone()))
        .ok_or_else(|| Error::BadTypeExpr("expected a type parameter".to_owned()))
}

/// Depth-first search over the non-breaker edges.
fn check_acyclic(edges: &BTreeMap<&str, BTreeSet<&str>>) -> Result<()> {
    fn visit<'a>(
        node: &'a str,
        edges: &BTreeMap<&'a str, BTreeSet<&'a str>>,
        temporary: &mut BTreeSet<&'a str>,
        permanent: &mut BTreeSet<&'a str>,
    ) -> Result<()> {
        if permanent.contains(node) {
            return Ok(());
        }
        if !temporary.insert(node) {
            return Err(Error::Cycle(node.to_owned()));
        }
        for &next in edges.get(node).into_iter().flatten() {
            visit(next, edges, temporary, permanent)?;
        }
        temporary.remove(node);
        permanent.insert(node);
        Ok(())
    }

    let mut temporary = BTreeSet::new();
    let mut permanent = BTreeSet::new();
    for &node in edges.keys() {
        visit(node, edges, &mut temporary, &mut permanent)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InstanceKey {
    name: String,
    params: Vec<ParamKey>,
}

struct Instance {
    // held so the addresses in the key stay unique
    _params: Vec<Param>,
    codec: Codec,
}

/// A built, read-only set of named codecs.
pub struct Registry {
    types: HashMap<String, Codec>,
    factories: HashMap<String, Factory>,
    instances: DashMap<InstanceKey, Instance>,
}

impl Registry {
    /// A builder preloaded with primitives, the standard generic factories and
    /// the default cycle breaker.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::with_builtins()
    }

    /// Resolves a type expression such as `BTreeMap<Name, Json>`.
    pub fn resolve(&self, expr: &str) -> Result<Codec> {
        self.resolve_expr(&TypeExpr::parse(expr)?)
    }

    pub fn resolve_expr(&self, expr: &TypeExpr) -> Result<Codec> {
        match expr {
            TypeExpr::Len(_) => Err(Error::BadTypeExpr(expr.to_string())),
            TypeExpr::Name(name, params) => {
                if let Some(codec) = self.types.get(name) {
                    if !params.is_empty() {
                        return Err(Error::ParamCount {
                            name: name.clone(),
                            expected: 0,
                            found: params.len(),
                        });
                    }
                    return Ok(codec.clone());
                }
                let params = params
                    .iter()
                    .map(|param| match param {
                        TypeExpr::Len(n) => Ok(Param::Len(*n)),
                        expr => self.resolve_expr(expr).map(Param::Type),
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.instantiate(name, &params)
            }
        }
    }

    /// Instantiates a generic type, reusing the cached instance for the same
    /// parameters.
    pub fn instantiate(&self, name: &str, params: &[Param]) -> Result<Codec> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::Unregistered(name.to_owned()))?;
        if params.len() != factory.arity {
            return Err(Error::ParamCount {
                name: name.to_owned(),
                expected: factory.arity,
                found: params.len(),
            });
        }
        let key = InstanceKey {
            name: name.to_owned(),
            params: params.iter().map(Param::key).collect(),
        };
        if let Some(instance) = self.instances.get(&key) {
            return Ok(instance.codec.clone());
        }
        let codec = (factory.build)(params)?;
        let boundary: Vec<&Codec> = params.iter().filter_map(Param::codec).collect();
        self.bind_refs(&codec, &boundary)?;
        let instance = self
            .instances
            .entry(key)
            .or_insert_with(|| Instance { _params: params.to_vec(), codec });
        Ok(instance.codec.clone())
    }

    /// Binds the by-name references a factory wrote into `codec` itself.
    ///
    /// The parameters are left alone; their references belong to the types
    /// they were resolved from.
    fn bind_refs(&self, codec: &Codec, params: &[&Codec]) -> Result<()> {
        for reference in codec.unbound_refs(params) {
            let Node::Ref(r) = reference.node() else { continue };
            let Some(text) = &r.expr else { continue };
            let expr = TypeExpr::parse(text)?;
            let mut names = Vec::new();
            expr.names(&mut names);
            if let Some(missing) = names.into_iter().find(|name| !self.contains(name)) {
                return Err(Error::Unregistered(missing.to_owned()));
            }
            let target = self.resolve_expr(&expr)?;
            bind(&reference, target)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name) || self.factories.contains_key(name)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.types.keys().chain(self.factories.keys()).collect();
        names.sort();
        f.debug_struct("Registry")
            .field("types", &names)
            .field("instances", &self.instances.len())
            .finish()
    }
}
