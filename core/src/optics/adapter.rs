use core::fmt;

use crate::errors::OpticError;
use crate::values::Value;

/// Isomorphism between a structure and its focus.
///
/// Decoded values of named, field, check and recursion-point types are the
/// values of their element, so the only adapter needed is the identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Adapter {
    #[default]
    Id,
}

impl Adapter {
    pub fn from(&self, s: Value) -> Result<Value, OpticError> {
        match self {
            Adapter::Id => Ok(s),
        }
    }

    pub fn to(&self, b: Value) -> Result<Value, OpticError> {
        match self {
            Adapter::Id => Ok(b),
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Adapter::Id)
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adapter::Id => write!(f, "id"),
        }
    }
}
