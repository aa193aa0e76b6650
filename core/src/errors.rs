//! Error types.
//!
//! Three layers of failure are kept apart:
//!
//! - [`SchemaError`]: a broken schema or a programmer error. These are always
//!   returned as `Err` and never downgraded to data errors.
//! - [`OpticError`] and [`EvalError`]: a value did not have the shape its
//!   type promised while running an optic or a point-free function.
//! - Data errors on read/decode are carried by [`crate::DataResult`] and by
//!   the empty option of `Type::read`.

use thiserror::Error;

use crate::optics::Capability;
use crate::values::TagKey;

/// Errors caused by an invalid schema or misuse of the type system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two branches of a tagged choice declared the same key.
    #[error("duplicate key {key} in tagged choice `{choice}`")]
    DuplicateKey { choice: String, key: TagKey },

    /// A tagged choice was asked to handle a key it has no branch for.
    #[error("unsupported key {key} in tagged choice `{choice}`")]
    UnsupportedKey { choice: String, key: String },

    /// The key type of a tagged choice is not a bool, int, long or string,
    /// or one of its keys does not fit it.
    #[error("invalid key type {key_type} for tagged choice `{choice}`")]
    InvalidKeyType { choice: String, key_type: String },

    /// Branch optics of a tagged choice share no common capability. The
    /// capabilities form a chain, so merging currently always succeeds.
    #[error("cannot merge optics of tagged choice `{choice}`: incompatible capabilities {found}")]
    IncompatibleCapabilities { choice: String, found: String },

    /// A recursion point names a family that was never registered.
    #[error("unknown recursive type family #{0}")]
    UnknownFamily(usize),

    /// A family member index is out of range.
    #[error("family `{family}` has no member {index}")]
    MissingFamilyMember { family: String, index: usize },

    /// A template referenced a recursion point without a family to bind it.
    #[error("recursion point {index} used outside of a recursive family")]
    UnboundRecursionPoint { index: usize },

    /// Function types carry no data and cannot be read or written.
    #[error("type {0} cannot be read or written")]
    NotSerializable(String),

    /// The value handed to `write` does not have the shape of the type.
    #[error("value of kind {found} does not match type {ty}")]
    ValueMismatch { ty: String, found: &'static str },

    /// The format backend refused to merge a field into a map.
    #[error("merge failed: {0}")]
    Merge(String),

    #[error(transparent)]
    Optic(#[from] OpticError),
}

/// Errors raised while applying an optic to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpticError {
    /// An optic was used at a capability it does not support.
    #[error("optic of capability {found} cannot be used as {required}")]
    CapabilityMismatch {
        required: Capability,
        found: Capability,
    },

    /// The value does not have the shape the optic focuses on.
    #[error("expected {expected} value, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A merged tagged optic received a key none of its branches handle.
    #[error("no branch for tag {0}")]
    UnknownTag(String),
}

/// Errors raised while evaluating a point-free function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("expected a function value, found {0}")]
    NotAFunction(&'static str),

    #[error(transparent)]
    Optic(#[from] OpticError),

    /// A recursive call ran after its fold was dropped or before it was sealed.
    #[error("recursive call to member {0} outside of its fold")]
    UnboundRecursion(usize),

    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    pub fn custom(message: impl Into<String>) -> Self {
        EvalError::Custom(message.into())
    }
}

/// Returned when a type search does not reach the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field not found: {0}")]
pub struct FieldNotFound(pub String);

impl FieldNotFound {
    pub fn new(message: impl Into<String>) -> Self {
        FieldNotFound(message.into())
    }
}
