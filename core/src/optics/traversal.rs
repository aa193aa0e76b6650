use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::OpticError;
use crate::optics::affine::{Affine, Preview};
use crate::optics::lens::shape;
use crate::values::{TagKey, Value};

/// Focus on any number of parts of a structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    Affine(Affine),
    /// Every element of a list.
    Elements,
    /// One traversal per tag; tags without a branch have no foci.
    Tagged(Arc<BTreeMap<TagKey, Traversal>>),
    Compose(Arc<Traversal>, Arc<Traversal>),
}

impl Traversal {
    pub fn tagged(branches: BTreeMap<TagKey, Traversal>) -> Self {
        Traversal::Tagged(Arc::new(branches))
    }

    pub fn compose(outer: Traversal, inner: Traversal) -> Self {
        match (outer, inner) {
            (Traversal::Affine(a), Traversal::Affine(b)) => Traversal::Affine(Affine::compose(a, b)),
            (outer, inner) => Traversal::Compose(Arc::new(outer), Arc::new(inner)),
        }
    }

    /// All foci, in order.
    pub fn to_list(&self, s: &Value) -> Result<Vec<Value>, OpticError> {
        match self {
            Traversal::Affine(affine) => Ok(affine.preview(s.clone())?.focus().into_iter().collect()),
            Traversal::Elements => match s {
                Value::List(items) => Ok(items.clone()),
                other => Err(shape("list", other)),
            },
            Traversal::Tagged(branches) => match s {
                Value::Tagged(key, payload) => match branches.get(key) {
                    Some(traversal) => traversal.to_list(payload),
                    None => Ok(Vec::new()),
                },
                other => Err(shape("tagged", other)),
            },
            Traversal::Compose(outer, inner) => {
                let mut foci = Vec::new();
                for a in outer.to_list(s)? {
                    foci.extend(inner.to_list(&a)?);
                }
                Ok(foci)
            }
        }
    }

    /// Replaces every focus `a` with `f(a)`.
    pub fn modify<E: From<OpticError>>(
        &self,
        s: Value,
        f: &mut dyn FnMut(Value) -> Result<Value, E>,
    ) -> Result<Value, E> {
        match self {
            Traversal::Affine(affine) => match affine.preview(s.clone())? {
                Preview::Miss(t) => Ok(t),
                Preview::Focus(a) => Ok(affine.set(f(a)?, s)?),
            },
            Traversal::Elements => match s {
                Value::List(items) => Ok(Value::List(
                    items.into_iter().map(&mut *f).collect::<Result<_, _>>()?,
                )),
                other => Err(shape("list", &other).into()),
            },
            Traversal::Tagged(branches) => match s {
                Value::Tagged(key, payload) => match branches.get(&key) {
                    Some(traversal) => {
                        let payload = traversal.modify(*payload, f)?;
                        Ok(Value::Tagged(key, Box::new(payload)))
                    }
                    None => Ok(Value::Tagged(key, payload)),
                },
                other => Err(shape("tagged", &other).into()),
            },
            Traversal::Compose(outer, inner) => {
                outer.modify(s, &mut |a| inner.modify(a, &mut *f))
            }
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Affine(affine) => write!(f, "{}", affine),
            Traversal::Elements => write!(f, "elements"),
            Traversal::Tagged(branches) => {
                write!(f, "tagged*{{")?;
                for (i, (key, traversal)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", key, traversal)?;
                }
                write!(f, "}}")
            }
            Traversal::Compose(outer, inner) => write!(f, "{} . {}", outer, inner),
        }
    }
}
