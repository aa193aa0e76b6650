use core::fmt;
use std::sync::Arc;

use crate::types::Primitive;
use crate::values::Value;

/// Discriminating key of a tagged choice branch.
///
/// Keys are ordered, which gives branches a stable iteration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKey {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl TagKey {
    pub fn str(key: &str) -> Self {
        TagKey::Str(Arc::from(key))
    }

    /// Extracts a key from a decoded key value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(TagKey::Bool(*b)),
            Value::Int(i) => Some(TagKey::Int(i64::from(*i))),
            Value::Long(l) => Some(TagKey::Int(*l)),
            Value::String(s) => Some(TagKey::Str(s.clone())),
            _ => None,
        }
    }

    /// Builds the value written for this key under a key type of kind `primitive`.
    pub fn to_value(&self, primitive: Primitive) -> Option<Value> {
        match (self, primitive) {
            (TagKey::Bool(b), Primitive::Bool) => Some(Value::Bool(*b)),
            (TagKey::Int(i), Primitive::Int) => i32::try_from(*i).ok().map(Value::Int),
            (TagKey::Int(i), Primitive::Long) => Some(Value::Long(*i)),
            (TagKey::Str(s), Primitive::String) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    pub fn fits(&self, primitive: Primitive) -> bool {
        self.to_value(primitive).is_some()
    }
}

impl From<&str> for TagKey {
    fn from(key: &str) -> Self {
        TagKey::str(key)
    }
}

impl From<i64> for TagKey {
    fn from(key: i64) -> Self {
        TagKey::Int(key)
    }
}

impl From<bool> for TagKey {
    fn from(key: bool) -> Self {
        TagKey::Bool(key)
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKey::Bool(b) => write!(f, "{}", b),
            TagKey::Int(i) => write!(f, "{}", i),
            TagKey::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}
