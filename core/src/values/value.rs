use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{EvalError, OpticError};
use crate::values::TagKey;

/// Runtime function produced by evaluating a point-free expression.
pub type ValueFn = Arc<dyn Fn(Value) -> Result<Value, EvalError> + Send + Sync>;

/// Decoded value of a [`crate::Type`].
///
/// Values are format independent: a type reads them out of some
/// [`crate::DynamicOps`] representation and writes them back. Named, field,
/// check and recursion-point types are transparent and have no wrapper here.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    /// Product value.
    Pair(Box<Value>, Box<Value>),
    /// Left alternative of a sum.
    Left(Box<Value>),
    /// Right alternative of a sum.
    Right(Box<Value>),
    List(Vec<Value>),
    /// Value of an optional field.
    Optional(Option<Box<Value>>),
    /// Value of a tagged choice: the selected key and the branch payload.
    Tagged(TagKey, Box<Value>),
    Function(ValueFn),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    pub fn pair(first: Value, second: Value) -> Self {
        Value::Pair(Box::new(first), Box::new(second))
    }

    pub fn left(value: Value) -> Self {
        Value::Left(Box::new(value))
    }

    pub fn right(value: Value) -> Self {
        Value::Right(Box::new(value))
    }

    pub fn present(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn absent() -> Self {
        Value::Optional(None)
    }

    pub fn tagged(key: impl Into<TagKey>, payload: Value) -> Self {
        Value::Tagged(key.into(), Box::new(payload))
    }

    pub fn function(f: impl Fn(Value) -> Result<Value, EvalError> + Send + Sync + 'static) -> Self {
        Value::Function(Arc::new(f))
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Pair(..) => "pair",
            Value::Left(_) | Value::Right(_) => "either",
            Value::List(_) => "list",
            Value::Optional(_) => "optional",
            Value::Tagged(..) => "tagged",
            Value::Function(_) => "function",
        }
    }

    pub fn as_function(&self) -> Option<&ValueFn> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn into_function(self) -> Result<ValueFn, EvalError> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(EvalError::NotAFunction(other.kind_name())),
        }
    }

    /// Calls a function value.
    pub fn call(&self, arg: Value) -> Result<Value, EvalError> {
        match self {
            Value::Function(f) => f(arg),
            other => Err(EvalError::NotAFunction(other.kind_name())),
        }
    }

    pub(crate) fn into_pair(self) -> Result<(Value, Value), OpticError> {
        match self {
            Value::Pair(first, second) => Ok((*first, *second)),
            other => Err(OpticError::ShapeMismatch {
                expected: "pair",
                found: other.kind_name(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Pair(a1, b1), Pair(a2, b2)) => a1 == a2 && b1 == b2,
            (Left(a), Left(b)) | (Right(a), Right(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Optional(a), Optional(b)) => a == b,
            (Tagged(k1, v1), Tagged(k2, v2)) => k1 == k2 && v1 == v2,
            (Function(a), Function(b)) => core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Long(l) => l.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Double(x) => x.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Pair(a, b) => {
                a.hash(state);
                b.hash(state);
            }
            Value::Left(v) | Value::Right(v) => v.hash(state),
            Value::List(items) => items.hash(state),
            Value::Optional(v) => v.hash(state),
            Value::Tagged(key, v) => {
                key.hash(state);
                v.hash(state);
            }
            Value::Function(f) => (Arc::as_ptr(f) as *const () as usize).hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}L", l),
            Value::Float(x) => write!(f, "{:?}f", x),
            Value::Double(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Pair(a, b) => write!(f, "({}, {})", a, b),
            Value::Left(v) => write!(f, "Left({})", v),
            Value::Right(v) => write!(f, "Right({})", v),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Optional(Some(v)) => write!(f, "Some({})", v),
            Value::Optional(None) => write!(f, "None"),
            Value::Tagged(key, v) => write!(f, "{}: {}", key, v),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}
