//! # Error Definitions
//!
//! Every way a scalepack operation can fail, split into two families:
//!
//! - **Malformed input**: raised while decoding bytes that did not come from a
//!   conforming encoder. Always fatal to that decode call.
//! - **Contract violations**: raised while wiring codecs together (union tables,
//!   registry graphs, dynamic values that do not fit their codec). These are
//!   defects in setup code and are expected to surface before any traffic.

/// Failures produced by scalepack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // ---- malformed input ----

    /// Fewer bytes remain than the value being decoded requires.
    #[error("unexpected end of input: {needed} more byte(s) required")]
    UnexpectedEnd { needed: usize },
    /// A boolean byte that is neither 0x00 nor 0x01.
    #[error("invalid bool byte 0x{0:02x}")]
    InvalidBool(u8),
    /// An option discriminant that is neither 0x00 nor 0x01.
    #[error("invalid option discriminant 0x{0:02x}")]
    InvalidOption(u8),
    /// A union discriminant absent from the union's table.
    #[error("unknown discriminant {discriminant} for {ty}")]
    UnknownDiscriminant { ty: String, discriminant: u8 },
    /// A compact integer that was not encoded in its minimal form.
    #[error("non-canonical compact integer")]
    NonCanonicalCompact,
    /// A compact integer too large for the integer it is decoded into.
    #[error("compact integer out of range for {0}")]
    CompactOverflow(&'static str),
    /// A length prefix that does not fit in memory on this platform.
    #[error("length prefix {0} exceeds addressable memory")]
    LengthOverflow(u128),
    /// String bytes that are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    /// A zero where a non-zero integer is required.
    #[error("zero value for a non-zero integer")]
    ZeroNonZero,
    /// An ordered set or map containing the same key twice.
    #[error("duplicate entry in ordered collection")]
    DuplicateEntry,
    /// An ordered set or map whose entries are not in ascending order.
    #[error("ordered collection entries out of order")]
    UnorderedEntry,
    /// Input left over after a complete value was decoded.
    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),
    /// A well-formed encoding of a value the type refuses (e.g. an invalid name).
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Nesting exceeded the decoder's depth limit.
    #[error("recursion limit exceeded")]
    RecursionLimit,

    // ---- contract violations ----

    /// A dynamic value of the wrong shape for its codec.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    /// An integer value outside the range of its fixed-width codec.
    #[error("integer {value} out of range for {ty}")]
    OutOfRange { ty: &'static str, value: i128 },
    /// A fixed array or tuple supplied with the wrong number of elements.
    #[error("arity mismatch: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    /// A record value missing one of its declared fields.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A record value carrying a field its codec does not declare.
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// A union value naming a variant the union does not declare.
    #[error("unknown variant `{tag}` for {ty}")]
    UnknownVariant { ty: String, tag: String },
    /// A tag-only variant given a payload, or a payload variant given none.
    #[error("variant `{0}` payload shape does not match its declaration")]
    PayloadShape(String),
    /// Two union entries sharing a discriminant.
    #[error("duplicate discriminant {discriminant} in {ty}")]
    DuplicateDiscriminant { ty: String, discriminant: u8 },
    /// Two union entries sharing a tag.
    #[error("duplicate variant `{tag}` in {ty}")]
    DuplicateVariant { ty: String, tag: String },
    /// A type name with no codec or factory in the registry.
    #[error("unregistered type `{0}`")]
    Unregistered(String),
    /// A type name registered twice.
    #[error("type `{0}` registered twice")]
    DuplicateType(String),
    /// A factory instantiated with the wrong number of parameters.
    #[error("`{name}` takes {expected} parameter(s), got {found}")]
    ParamCount { name: String, expected: usize, found: usize },
    /// A type expression that does not parse.
    #[error("malformed type expression `{0}`")]
    BadTypeExpr(String),
    /// A reference into a cycle-breaking type that is not lazy.
    #[error("reference from `{from}` to `{to}` must be lazy")]
    EagerCycleBreaker { from: String, to: String },
    /// A reference cycle that does not pass through a cycle-breaking type.
    #[error("cycle: {0}")]
    Cycle(String),
    /// A registry reference used before the registry was built.
    #[error("reference to `{0}` used before resolution")]
    Unresolved(String),
    /// A reference bound to two different targets.
    #[error("reference to `{0}` bound twice")]
    Rebound(String),
}

/// A specialized Result type for scalepack operations.
pub type Result<T> = std::result::Result<T, Error>;
