use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::OpticError;
use crate::optics::Adapter;
use crate::values::{TagKey, Value};

/// Total focus on one part of a structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lens {
    Adapter(Adapter),
    /// First component of a pair.
    First,
    /// Second component of a pair.
    Second,
    /// One lens per tag of a tagged choice; every tag has a branch.
    Tagged(Arc<BTreeMap<TagKey, Lens>>),
    /// Outer lens followed by inner lens.
    Compose(Arc<Lens>, Arc<Lens>),
}

impl Lens {
    pub fn tagged(branches: BTreeMap<TagKey, Lens>) -> Self {
        Lens::Tagged(Arc::new(branches))
    }

    pub fn compose(outer: Lens, inner: Lens) -> Self {
        match (outer, inner) {
            (Lens::Adapter(a), inner) if a.is_id() => inner,
            (outer, Lens::Adapter(a)) if a.is_id() => outer,
            (outer, inner) => Lens::Compose(Arc::new(outer), Arc::new(inner)),
        }
    }

    pub fn view(&self, s: &Value) -> Result<Value, OpticError> {
        match self {
            Lens::Adapter(adapter) => adapter.from(s.clone()),
            Lens::First | Lens::Second => match s {
                Value::Pair(first, second) => Ok(if matches!(self, Lens::First) {
                    (**first).clone()
                } else {
                    (**second).clone()
                }),
                other => Err(shape("pair", other)),
            },
            Lens::Tagged(branches) => match s {
                Value::Tagged(key, payload) => branches
                    .get(key)
                    .ok_or_else(|| OpticError::UnknownTag(key.to_string()))?
                    .view(payload),
                other => Err(shape("tagged", other)),
            },
            Lens::Compose(outer, inner) => inner.view(&outer.view(s)?),
        }
    }

    pub fn update(&self, b: Value, s: Value) -> Result<Value, OpticError> {
        match self {
            Lens::Adapter(adapter) => adapter.to(b),
            Lens::First => {
                let (_, second) = s.into_pair()?;
                Ok(Value::pair(b, second))
            }
            Lens::Second => {
                let (first, _) = s.into_pair()?;
                Ok(Value::pair(first, b))
            }
            Lens::Tagged(branches) => match s {
                Value::Tagged(key, payload) => {
                    let lens = branches
                        .get(&key)
                        .ok_or_else(|| OpticError::UnknownTag(key.to_string()))?;
                    let payload = lens.update(b, *payload)?;
                    Ok(Value::Tagged(key, Box::new(payload)))
                }
                other => Err(shape("tagged", &other)),
            },
            Lens::Compose(outer, inner) => {
                let a = outer.view(&s)?;
                outer.update(inner.update(b, a)?, s)
            }
        }
    }
}

pub(crate) fn shape(expected: &'static str, found: &Value) -> OpticError {
    OpticError::ShapeMismatch {
        expected,
        found: found.kind_name(),
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lens::Adapter(adapter) => write!(f, "{}", adapter),
            Lens::First => write!(f, "fst"),
            Lens::Second => write!(f, "snd"),
            Lens::Tagged(branches) => {
                write!(f, "tagged{{")?;
                for (i, (key, lens)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} -> {}", key, lens)?;
                }
                write!(f, "}}")
            }
            Lens::Compose(outer, inner) => write!(f, "{} . {}", outer, inner),
        }
    }
}
