//! # Dynamic Codecs
//!
//! A `Codec` is an immutable, cheaply clonable handle that encodes `Value`s and
//! decodes bytes back into `Value`s. Combinators build new codecs out of
//! existing ones; the resulting tree is what the registry stores and what a
//! lazy cell resolves to.
//!
//! The bytes produced here are identical to those of the typed `Encode`
//! impls for the same shape, so the two layers interoperate freely.
//!
//! ## Invariants
//! - **Stateless**: a codec never changes after construction. Lazy cells and
//!   registry references are written once, before first use.
//! - **Bounded decode**: every union, lazy cell and reference spends one
//!   level of the cursor's depth budget, so hostile nesting fails with
//!   `RecursionLimit` long before the stack runs out.
//! - **Canonical order**: sets and maps are written and checked in the order
//!   the element codec defines (union variants in declaration order, record
//!   fields in declaration order), which is the order the typed
//!   `BTreeSet`/`BTreeMap` impls produce.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::compact;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::error::Result;
use crate::value::Value;

/// Depth budget for dynamic decoding. Unions, lazy cells and references each
/// spend one level.
pub const MAX_DYNAMIC_DEPTH: usize = 64;

/// Fixed-width integer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Int {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
}

impl Int {
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
        }
    }

    pub fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
            Self::U64 | Self::I64 => 8,
            Self::U128 | Self::I128 => 16,
        }
    }

    pub fn signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128)
    }

    fn encode(self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let width = self.width();
        let bits = 8 * width as u32;
        let bytes = match (self.signed(), value) {
            (false, Value::UInt(v)) => {
                if width < 16 && *v >> bits != 0 {
                    let value = i128::try_from(*v).unwrap_or(i128::MAX);
                    return Err(Error::OutOfRange { ty: self.name(), value });
                }
                v.to_le_bytes()
            }
            (true, Value::SInt(v)) => {
                if width < 16 {
                    let half = 1i128 << (bits - 1);
                    if *v < -half || *v >= half {
                        return Err(Error::OutOfRange { ty: self.name(), value: *v });
                    }
                }
                v.to_le_bytes()
            }
            (_, other) => {
                return Err(Error::TypeMismatch { expected: self.name(), found: other.kind() });
            }
        };
        out.extend_from_slice(&bytes[..width]);
        Ok(())
    }

    fn decode(self, cur: &mut Cursor<'_>) -> Result<Value> {
        let width = self.width();
        let bytes = cur.read_bytes(width)?;
        let negative = self.signed() && bytes[width - 1] & 0x80 != 0;
        let mut buf = if negative { [0xff; 16] } else { [0; 16] };
        buf[..width].copy_from_slice(bytes);
        Ok(if self.signed() {
            Value::SInt(i128::from_le_bytes(buf))
        } else {
            Value::UInt(u128::from_le_bytes(buf))
        })
    }
}

/// One entry of a union's discriminant table.
#[derive(Clone)]
pub struct Variant {
    discriminant: u8,
    tag: String,
    payload: Option<Codec>,
}

impl Variant {
    /// A variant carrying a payload.
    pub fn with(discriminant: u8, tag: impl Into<String>, payload: Codec) -> Self {
        Self { discriminant, tag: tag.into(), payload: Some(payload) }
    }

    /// A tag-only variant.
    pub fn unit(discriminant: u8, tag: impl Into<String>) -> Self {
        Self { discriminant, tag: tag.into(), payload: None }
    }
}

pub(crate) struct Union {
    name: String,
    variants: Vec<Variant>,
    by_discriminant: HashMap<u8, usize>,
    by_tag: HashMap<String, usize>,
}

impl Union {
    fn new(name: String, variants: Vec<Variant>) -> Result<Self> {
        let mut by_discriminant = HashMap::with_capacity(variants.len());
        let mut by_tag = HashMap::with_capacity(variants.len());
        for (index, variant) in variants.iter().enumerate() {
            if by_discriminant.insert(variant.discriminant, index).is_some() {
                return Err(Error::DuplicateDiscriminant {
                    ty: name,
                    discriminant: variant.discriminant,
                });
            }
            if by_tag.insert(variant.tag.clone(), index).is_some() {
                return Err(Error::DuplicateVariant { ty: name, tag: variant.tag.clone() });
            }
        }
        Ok(Self { name, variants, by_discriminant, by_tag })
    }

    fn lookup_tag(&self, tag: &str) -> Result<&Variant> {
        self.position(tag).map(|index| &self.variants[index])
    }

    fn position(&self, tag: &str) -> Result<usize> {
        self.by_tag
            .get(tag)
            .copied()
            .ok_or_else(|| Error::UnknownVariant { ty: self.name.clone(), tag: tag.to_owned() })
    }

    fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        let (Some(tag_a), Some(tag_b)) = (a.variant_tag(), b.variant_tag()) else {
            return Ok(a.cmp(b));
        };
        let (index_a, index_b) = (self.position(tag_a)?, self.position(tag_b)?);
        if index_a != index_b {
            return Ok(index_a.cmp(&index_b));
        }
        match (&self.variants[index_a].payload, a.payload(), b.payload()) {
            (Some(codec), Some(a), Some(b)) => codec.compare(a, b),
            _ => Ok(a.cmp(b)),
        }
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::Tag(tag) => {
                let variant = self.lookup_tag(tag)?;
                if variant.payload.is_some() {
                    return Err(Error::PayloadShape(tag.clone()));
                }
                out.push(variant.discriminant);
                Ok(())
            }
            Value::Variant(tag, payload) => {
                let variant = self.lookup_tag(tag)?;
                let Some(codec) = &variant.payload else {
                    return Err(Error::PayloadShape(tag.clone()));
                };
                out.push(variant.discriminant);
                codec.encode_to(payload, out)
            }
            other => Err(Error::TypeMismatch { expected: "union", found: other.kind() }),
        }
    }

    fn decode(&self, cur: &mut Cursor<'_>) -> Result<Value> {
        let discriminant = cur.read_byte()?;
        let Some(&index) = self.by_discriminant.get(&discriminant) else {
            return Err(Error::UnknownDiscriminant { ty: self.name.clone(), discriminant });
        };
        let variant = &self.variants[index];
        match &variant.payload {
            Some(codec) => Ok(Value::variant(variant.tag.clone(), codec.decode(cur)?)),
            None => Ok(Value::Tag(variant.tag.clone())),
        }
    }
}

type Check = Box<dyn Fn(&Value) -> Result<()> + Send + Sync>;
type Resolver = Box<dyn Fn() -> Codec + Send + Sync>;

/// A deferred codec, resolved by calling its resolver on first use.
pub(crate) struct Lazy {
    cell: OnceLock<Codec>,
    resolver: Resolver,
}

impl Lazy {
    fn get(&self) -> &Codec {
        self.cell.get_or_init(|| (self.resolver)())
    }
}

/// A by-name reference bound by the registry when it is built.
pub(crate) struct Ref {
    pub(crate) expr: Option<String>,
    pub(crate) lazy: bool,
    pub(crate) slot: OnceLock<Codec>,
}

impl Ref {
    fn get(&self) -> Result<&Codec> {
        self.slot.get().ok_or_else(|| {
            Error::Unresolved(self.expr.clone().unwrap_or_else(|| "<self>".to_owned()))
        })
    }
}

pub(crate) enum Node {
    Unit,
    Bool,
    Int(Int),
    Compact,
    Bytes,
    Str,
    NonZero(Codec),
    Option(Codec),
    List(Codec),
    Array(Codec, usize),
    Set(Codec),
    Map(Codec, Codec),
    Tuple(Vec<Codec>),
    Record(Vec<(String, Codec)>),
    Union(Union),
    Refine(Codec, Check),
    Lazy(Lazy),
    Ref(Ref),
}

/// An immutable, shareable codec over dynamic `Value`s.
#[derive(Clone)]
pub struct Codec(Arc<Node>);

impl Codec {
    fn from_node(node: Node) -> Self {
        Self(Arc::new(node))
    }

    pub fn unit() -> Self {
        Self::from_node(Node::Unit)
    }

    pub fn bool() -> Self {
        Self::from_node(Node::Bool)
    }

    pub fn int(kind: Int) -> Self {
        Self::from_node(Node::Int(kind))
    }

    pub fn compact() -> Self {
        Self::from_node(Node::Compact)
    }

    pub fn bytes() -> Self {
        Self::from_node(Node::Bytes)
    }

    pub fn string() -> Self {
        Self::from_node(Node::Str)
    }

    /// The inner integer codec with zero rejected in both directions.
    pub fn non_zero(inner: Codec) -> Self {
        Self::from_node(Node::NonZero(inner))
    }

    pub fn option(inner: Codec) -> Self {
        Self::from_node(Node::Option(inner))
    }

    pub fn list(inner: Codec) -> Self {
        Self::from_node(Node::List(inner))
    }

    /// Exactly `len` elements with no count prefix.
    pub fn array(inner: Codec, len: usize) -> Self {
        Self::from_node(Node::Array(inner, len))
    }

    pub fn set(inner: Codec) -> Self {
        Self::from_node(Node::Set(inner))
    }

    pub fn map(key: Codec, value: Codec) -> Self {
        Self::from_node(Node::Map(key, value))
    }

    pub fn tuple(items: impl IntoIterator<Item = Codec>) -> Self {
        Self::from_node(Node::Tuple(items.into_iter().collect()))
    }

    /// Named fields encoded in the order given here.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Codec)>) -> Self {
        let fields = fields.into_iter().map(|(name, codec)| (name.into(), codec)).collect();
        Self::from_node(Node::Record(fields))
    }

    /// A discriminated union. Fails if two variants share a discriminant or tag.
    pub fn union(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Result<Self> {
        let union = Union::new(name.into(), variants.into_iter().collect())?;
        Ok(Self::from_node(Node::Union(union)))
    }

    /// The inner codec with an extra validity check on both encode and decode.
    pub fn refine(
        inner: Codec,
        check: impl Fn(&Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(Node::Refine(inner, Box::new(check)))
    }

    /// A codec resolved by `resolver` the first time it is used.
    ///
    /// The resolver runs at most once; every later call reuses its result.
    pub fn lazy(resolver: impl Fn() -> Codec + Send + Sync + 'static) -> Self {
        Self::from_node(Node::Lazy(Lazy { cell: OnceLock::new(), resolver: Box::new(resolver) }))
    }

    /// Builds a self-referential codec. `f` receives a handle to the codec
    /// being defined.
    pub fn recursive(f: impl FnOnce(Codec) -> Result<Codec>) -> Result<Self> {
        let this = Self::by_name(None, true);
        let target = f(this.clone())?;
        if let Node::Ref(r) = &*this.0 {
            let fresh = r.slot.set(target.clone()).is_ok();
            debug_assert!(fresh, "self reference bound twice");
        }
        Ok(target)
    }

    /// A reference to a registry type, bound when the registry is built.
    pub fn reference(expr: impl Into<String>) -> Self {
        Self::by_name(Some(expr.into()), false)
    }

    /// Like `reference`, but allowed to close a cycle through a cycle breaker.
    pub fn lazy_reference(expr: impl Into<String>) -> Self {
        Self::by_name(Some(expr.into()), true)
    }

    fn by_name(expr: Option<String>, lazy: bool) -> Self {
        Self::from_node(Node::Ref(Ref { expr, lazy, slot: OnceLock::new() }))
    }

    /// Whether two handles point at the same codec instance.
    pub fn ptr_eq(a: &Codec, b: &Codec) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn describe(&self) -> &'static str {
        match &*self.0 {
            Node::Unit => "unit",
            Node::Bool => "bool",
            Node::Int(kind) => kind.name(),
            Node::Compact => "compact",
            Node::Bytes => "bytes",
            Node::Str => "string",
            Node::NonZero(_) => "non-zero",
            Node::Option(_) => "option",
            Node::List(_) => "list",
            Node::Array(_, _) => "array",
            Node::Set(_) => "set",
            Node::Map(_, _) => "map",
            Node::Tuple(_) => "tuple",
            Node::Record(_) => "record",
            Node::Union(_) => "union",
            Node::Refine(inner, _) => inner.describe(),
            Node::Lazy(_) => "lazy",
            Node::Ref(_) => "reference",
        }
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    /// Address of the shared node, stable for as long as any handle lives.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_to(value, &mut out)?;
        Ok(out)
    }

    pub fn encode_to(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let mismatch = || Error::TypeMismatch { expected: self.describe(), found: value.kind() };
        match (&*self.0, value) {
            (Node::Unit, Value::Unit) => Ok(()),
            (Node::Bool, Value::Bool(b)) => {
                out.push(u8::from(*b));
                Ok(())
            }
            (Node::Int(kind), value) => kind.encode(value, out),
            (Node::Compact, Value::UInt(v)) => {
                compact::encode(*v, out);
                Ok(())
            }
            (Node::Bytes, Value::Bytes(bytes)) => {
                compact::encode(bytes.len() as u128, out);
                out.extend_from_slice(bytes);
                Ok(())
            }
            (Node::Str, Value::Str(s)) => {
                compact::encode(s.len() as u128, out);
                out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            (Node::NonZero(inner), value) => {
                if matches!(value, Value::UInt(0) | Value::SInt(0)) {
                    return Err(Error::ZeroNonZero);
                }
                inner.encode_to(value, out)
            }
            (Node::Option(inner), Value::Option(opt)) => match opt {
                None => {
                    out.push(0);
                    Ok(())
                }
                Some(value) => {
                    out.push(1);
                    inner.encode_to(value, out)
                }
            },
            (Node::List(inner), Value::List(items)) => {
                compact::encode(items.len() as u128, out);
                items.iter().try_for_each(|item| inner.encode_to(item, out))
            }
            (Node::Array(inner, len), Value::List(items)) => {
                if items.len() != *len {
                    return Err(Error::ArityMismatch { expected: *len, found: items.len() });
                }
                items.iter().try_for_each(|item| inner.encode_to(item, out))
            }
            (Node::Set(inner), Value::Set(items)) => {
                compact::encode(items.len() as u128, out);
                inner.sorted(items)?.into_iter().try_for_each(|item| inner.encode_to(item, out))
            }
            (Node::Map(key, val), Value::Map(entries)) => {
                compact::encode(entries.len() as u128, out);
                key.sorted(entries.keys())?.into_iter().try_for_each(|k| {
                    key.encode_to(k, out)?;
                    entries.get(k).map_or(Ok(()), |v| val.encode_to(v, out))
                })
            }
            (Node::Tuple(codecs), Value::Tuple(items)) => {
                if items.len() != codecs.len() {
                    return Err(Error::ArityMismatch { expected: codecs.len(), found: items.len() });
                }
                codecs.iter().zip(items).try_for_each(|(codec, item)| codec.encode_to(item, out))
            }
            (Node::Record(fields), Value::Record(values)) => {
                for (name, codec) in fields {
                    let value = values.get(name).ok_or_else(|| Error::MissingField(name.clone()))?;
                    codec.encode_to(value, out)?;
                }
                let declared = |k: &&String| fields.iter().any(|(name, _)| name == *k);
                if let Some(extra) = values.keys().find(|k| !declared(k)) {
                    return Err(Error::UnknownField(extra.clone()));
                }
                Ok(())
            }
            (Node::Union(union), value) => union.encode(value, out),
            (Node::Refine(inner, check), value) => {
                check(value)?;
                inner.encode_to(value, out)
            }
            (Node::Lazy(lazy), value) => lazy.get().encode_to(value, out),
            (Node::Ref(r), value) => r.get()?.encode_to(value, out),
            _ => Err(mismatch()),
        }
    }

    /// Decodes exactly one value spanning all of `bytes`.
    pub fn decode_all(&self, bytes: &[u8]) -> Result<Value> {
        let mut cur = Cursor::with_depth_limit(bytes, MAX_DYNAMIC_DEPTH);
        let value = self.decode(&mut cur)?;
        cur.finish()?;
        Ok(value)
    }

    pub fn decode(&self, cur: &mut Cursor<'_>) -> Result<Value> {
        match &*self.0 {
            Node::Unit => Ok(Value::Unit),
            Node::Bool => match cur.read_byte()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(Error::InvalidBool(other)),
            },
            Node::Int(kind) => kind.decode(cur),
            Node::Compact => compact::decode(cur).map(Value::UInt),
            Node::Bytes => {
                let len = compact::decode_len(cur)?;
                Ok(Value::Bytes(cur.read_bytes(len)?.to_vec()))
            }
            Node::Str => {
                let len = compact::decode_len(cur)?;
                let bytes = cur.read_bytes(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
                Ok(Value::Str(s.to_owned()))
            }
            Node::NonZero(inner) => {
                let value = inner.decode(cur)?;
                if matches!(value, Value::UInt(0) | Value::SInt(0)) {
                    return Err(Error::ZeroNonZero);
                }
                Ok(value)
            }
            Node::Option(inner) => match cur.read_byte()? {
                0 => Ok(Value::none()),
                1 => Ok(Value::some(inner.decode(cur)?)),
                other => Err(Error::InvalidOption(other)),
            },
            Node::List(inner) => {
                let count = compact::decode_len(cur)?;
                let mut items = Vec::with_capacity(count.min(cur.remaining()));
                for _ in 0..count {
                    items.push(inner.decode(cur)?);
                }
                Ok(Value::List(items))
            }
            Node::Array(inner, len) => {
                let mut items = Vec::with_capacity(*len);
                for _ in 0..*len {
                    items.push(inner.decode(cur)?);
                }
                Ok(Value::List(items))
            }
            Node::Set(inner) => decode_set(inner, cur),
            Node::Map(key, val) => decode_map(key, val, cur),
            Node::Tuple(codecs) => {
                let items = codecs.iter().map(|codec| codec.decode(cur)).collect::<Result<_>>()?;
                Ok(Value::Tuple(items))
            }
            Node::Record(fields) => decode_record(fields, cur),
            Node::Union(union) => cur.nested(|cur| union.decode(cur)),
            Node::Refine(inner, check) => {
                let value = inner.decode(cur)?;
                check(&value)?;
                Ok(value)
            }
            Node::Lazy(lazy) => cur.nested(|cur| lazy.get().decode(cur)),
            Node::Ref(r) => {
                let target = r.get()?;
                cur.nested(|cur| target.decode(cur))
            }
        }
    }

    /// Orders two values the way the wire type they encode is ordered.
    ///
    /// Union variants compare by declaration position, records field by
    /// field in declaration order, and collections element-wise.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        match (&*self.0, a, b) {
            (Node::NonZero(inner) | Node::Refine(inner, _), a, b) => inner.compare(a, b),
            (Node::Option(inner), Value::Option(Some(a)), Value::Option(Some(b))) => {
                inner.compare(a, b)
            }
            (Node::List(inner) | Node::Array(inner, _), Value::List(a), Value::List(b)) => {
                inner.compare_seq(a.iter(), b.iter())
            }
            (Node::Set(inner), Value::Set(a), Value::Set(b)) => {
                inner.compare_seq(inner.sorted(a)?, inner.sorted(b)?)
            }
            (Node::Map(key, val), Value::Map(a), Value::Map(b)) => {
                let (keys_a, keys_b) = (key.sorted(a.keys())?, key.sorted(b.keys())?);
                for (ka, kb) in keys_a.iter().zip(&keys_b) {
                    let order = match key.compare(ka, kb)? {
                        Ordering::Equal => match (a.get(*ka), b.get(*kb)) {
                            (Some(va), Some(vb)) => val.compare(va, vb)?,
                            _ => Ordering::Equal,
                        },
                        order => order,
                    };
                    if order != Ordering::Equal {
                        return Ok(order);
                    }
                }
                Ok(keys_a.len().cmp(&keys_b.len()))
            }
            (Node::Tuple(codecs), Value::Tuple(a), Value::Tuple(b)) => {
                for ((codec, a), b) in codecs.iter().zip(a).zip(b) {
                    let order = codec.compare(a, b)?;
                    if order != Ordering::Equal {
                        return Ok(order);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (Node::Record(fields), Value::Record(a), Value::Record(b)) => {
                for (name, codec) in fields {
                    let order = match (a.get(name), b.get(name)) {
                        (Some(a), Some(b)) => codec.compare(a, b)?,
                        (a, b) => a.cmp(&b),
                    };
                    if order != Ordering::Equal {
                        return Ok(order);
                    }
                }
                Ok(Ordering::Equal)
            }
            (Node::Union(union), a, b) => union.compare(a, b),
            (Node::Lazy(lazy), a, b) => lazy.get().compare(a, b),
            (Node::Ref(r), a, b) => r.get()?.compare(a, b),
            // scalars, and `None` against anything, order the same as `Value`
            (_, a, b) => Ok(a.cmp(b)),
        }
    }

    fn compare_seq<'v>(
        &self,
        a: impl IntoIterator<Item = &'v Value>,
        b: impl IntoIterator<Item = &'v Value>,
    ) -> Result<Ordering> {
        let (mut a, mut b) = (a.into_iter(), b.into_iter());
        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => match self.compare(x, y)? {
                    Ordering::Equal => continue,
                    order => return Ok(order),
                },
                (x, y) => return Ok(x.is_some().cmp(&y.is_some())),
            }
        }
    }

    /// `items` in wire order.
    fn sorted<'v>(&self, items: impl IntoIterator<Item = &'v Value>) -> Result<Vec<&'v Value>> {
        let mut items: Vec<_> = items.into_iter().collect();
        let mut failure = None;
        items.sort_by(|a, b| {
            self.compare(a, b).unwrap_or_else(|e| {
                failure.get_or_insert(e);
                Ordering::Equal
            })
        });
        failure.map_or(Ok(items), Err)
    }

    /// Ordered collections must arrive strictly ascending.
    fn check_ascending(&self, last: Option<&Value>, next: &Value) -> Result<()> {
        let Some(last) = last else { return Ok(()) };
        match self.compare(last, next)? {
            Ordering::Less => Ok(()),
            Ordering::Equal => Err(Error::DuplicateEntry),
            Ordering::Greater => Err(Error::UnorderedEntry),
        }
    }

    /// Every unbound by-name reference reachable without crossing another
    /// reference, a lazy cell or one of the `boundary` codecs.
    pub(crate) fn unbound_refs(&self, boundary: &[&Codec]) -> Vec<Codec> {
        let mut seen: HashSet<_> = boundary.iter().map(|codec| Arc::as_ptr(&codec.0)).collect();
        let mut found = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(codec) = stack.pop() {
            if !seen.insert(Arc::as_ptr(&codec.0)) {
                continue;
            }
            match &*codec.0 {
                Node::Ref(r) => {
                    if r.expr.is_some() && r.slot.get().is_none() {
                        found.push(codec.clone());
                    }
                }
                Node::Unit
                | Node::Bool
                | Node::Int(_)
                | Node::Compact
                | Node::Bytes
                | Node::Str => {}
                Node::Lazy(_) => {}
                Node::NonZero(inner)
                | Node::Option(inner)
                | Node::List(inner)
                | Node::Array(inner, _)
                | Node::Set(inner)
                | Node::Refine(inner, _) => stack.push(inner.clone()),
                Node::Map(key, val) => {
                    stack.push(key.clone());
                    stack.push(val.clone());
                }
                Node::Tuple(items) => stack.extend(items.iter().cloned()),
                Node::Record(fields) => stack.extend(fields.iter().map(|(_, codec)| codec.clone())),
                Node::Union(union) => {
                    stack.extend(union.variants.iter().filter_map(|v| v.payload.clone()));
                }
            }
        }
        found
    }
}

fn decode_set(inner: &Codec, cur: &mut Cursor<'_>) -> Result<Value> {
    let count = compact::decode_len(cur)?;
    let mut items = BTreeSet::new();
    let mut last = None;
    for _ in 0..count {
        let item = inner.decode(cur)?;
        inner.check_ascending(last.as_ref(), &item)?;
        items.insert(item.clone());
        last = Some(item);
    }
    Ok(Value::Set(items))
}

fn decode_map(key: &Codec, val: &Codec, cur: &mut Cursor<'_>) -> Result<Value> {
    let count = compact::decode_len(cur)?;
    let mut entries = BTreeMap::new();
    let mut last = None;
    for _ in 0..count {
        let k = key.decode(cur)?;
        key.check_ascending(last.as_ref(), &k)?;
        let v = val.decode(cur)?;
        entries.insert(k.clone(), v);
        last = Some(k);
    }
    Ok(Value::Map(entries))
}

fn decode_record(fields: &[(String, Codec)], cur: &mut Cursor<'_>) -> Result<Value> {
    let mut values = BTreeMap::new();
    for (name, codec) in fields {
        values.insert(name.clone(), codec.decode(cur)?);
    }
    Ok(Value::Record(values))
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Union(union) => write!(f, "Codec(union {})", union.name),
            Node::Ref(Ref { expr: Some(expr), .. }) => write!(f, "Codec(ref {})", expr),
            _ => write!(f, "Codec({})", self.describe()),
        }
    }
}
