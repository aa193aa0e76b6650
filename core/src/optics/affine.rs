use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::OpticError;
use crate::optics::Lens;
use crate::optics::lens::shape;
use crate::values::{TagKey, Value};

/// Outcome of [`Affine::preview`].
#[derive(Clone, Debug, PartialEq)]
pub enum Preview {
    /// The focus is present.
    Focus(Value),
    /// The focus is absent; the structure is handed back unchanged.
    Miss(Value),
}

impl Preview {
    pub fn focus(self) -> Option<Value> {
        match self {
            Preview::Focus(a) => Some(a),
            Preview::Miss(_) => None,
        }
    }
}

/// Focus on at most one part of a structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Affine {
    Lens(Lens),
    /// Left alternative of a sum.
    Left,
    /// Right alternative of a sum.
    Right,
    /// Content of an optional field.
    Present,
    /// Payload of one tag of a tagged choice.
    Tag(TagKey),
    /// One affine per tag; tags without a branch are misses.
    Tagged(Arc<BTreeMap<TagKey, Affine>>),
    Compose(Arc<Affine>, Arc<Affine>),
}

impl Affine {
    pub fn tagged(branches: BTreeMap<TagKey, Affine>) -> Self {
        Affine::Tagged(Arc::new(branches))
    }

    pub fn compose(outer: Affine, inner: Affine) -> Self {
        match (outer, inner) {
            (Affine::Lens(a), Affine::Lens(b)) => Affine::Lens(Lens::compose(a, b)),
            (Affine::Lens(Lens::Adapter(a)), inner) if a.is_id() => inner,
            (outer, Affine::Lens(Lens::Adapter(a))) if a.is_id() => outer,
            (outer, inner) => Affine::Compose(Arc::new(outer), Arc::new(inner)),
        }
    }

    pub fn preview(&self, s: Value) -> Result<Preview, OpticError> {
        match self {
            Affine::Lens(lens) => Ok(Preview::Focus(lens.view(&s)?)),
            Affine::Left => match s {
                Value::Left(a) => Ok(Preview::Focus(*a)),
                Value::Right(_) => Ok(Preview::Miss(s)),
                other => Err(shape("either", &other)),
            },
            Affine::Right => match s {
                Value::Right(a) => Ok(Preview::Focus(*a)),
                Value::Left(_) => Ok(Preview::Miss(s)),
                other => Err(shape("either", &other)),
            },
            Affine::Present => match s {
                Value::Optional(Some(a)) => Ok(Preview::Focus(*a)),
                Value::Optional(None) => Ok(Preview::Miss(s)),
                other => Err(shape("optional", &other)),
            },
            Affine::Tag(key) => match s {
                Value::Tagged(k, a) if k == *key => Ok(Preview::Focus(*a)),
                Value::Tagged(..) => Ok(Preview::Miss(s)),
                other => Err(shape("tagged", &other)),
            },
            Affine::Tagged(branches) => match s {
                Value::Tagged(key, payload) => match branches.get(&key) {
                    Some(affine) => Ok(match affine.preview(*payload)? {
                        Preview::Focus(a) => Preview::Focus(a),
                        Preview::Miss(t) => Preview::Miss(Value::Tagged(key, Box::new(t))),
                    }),
                    None => Ok(Preview::Miss(Value::Tagged(key, payload))),
                },
                other => Err(shape("tagged", &other)),
            },
            Affine::Compose(outer, inner) => match outer.preview(s.clone())? {
                Preview::Miss(t) => Ok(Preview::Miss(t)),
                Preview::Focus(a) => match inner.preview(a)? {
                    Preview::Focus(x) => Ok(Preview::Focus(x)),
                    Preview::Miss(a) => Ok(Preview::Miss(outer.set(a, s)?)),
                },
            },
        }
    }

    pub fn set(&self, b: Value, s: Value) -> Result<Value, OpticError> {
        match self {
            Affine::Lens(lens) => lens.update(b, s),
            Affine::Left => match s {
                Value::Left(_) => Ok(Value::left(b)),
                Value::Right(_) => Ok(s),
                other => Err(shape("either", &other)),
            },
            Affine::Right => match s {
                Value::Right(_) => Ok(Value::right(b)),
                Value::Left(_) => Ok(s),
                other => Err(shape("either", &other)),
            },
            Affine::Present => match s {
                Value::Optional(Some(_)) => Ok(Value::present(b)),
                Value::Optional(None) => Ok(s),
                other => Err(shape("optional", &other)),
            },
            Affine::Tag(key) => match s {
                Value::Tagged(k, _) if k == *key => Ok(Value::Tagged(k, Box::new(b))),
                Value::Tagged(..) => Ok(s),
                other => Err(shape("tagged", &other)),
            },
            Affine::Tagged(branches) => match s {
                Value::Tagged(key, payload) => match branches.get(&key) {
                    Some(affine) => {
                        let payload = affine.set(b, *payload)?;
                        Ok(Value::Tagged(key, Box::new(payload)))
                    }
                    None => Ok(Value::Tagged(key, payload)),
                },
                other => Err(shape("tagged", &other)),
            },
            Affine::Compose(outer, inner) => match outer.preview(s.clone())? {
                Preview::Miss(t) => Ok(t),
                Preview::Focus(a) => outer.set(inner.set(b, a)?, s),
            },
        }
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Affine::Lens(lens) => write!(f, "{}", lens),
            Affine::Left => write!(f, "inl"),
            Affine::Right => write!(f, "inr"),
            Affine::Present => write!(f, "present"),
            Affine::Tag(key) => write!(f, "tag[{}]", key),
            Affine::Tagged(branches) => {
                write!(f, "tagged?{{")?;
                for (i, (key, affine)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", key, affine)?;
                }
                write!(f, "}}")
            }
            Affine::Compose(outer, inner) => write!(f, "{} . {}", outer, inner),
        }
    }
}
