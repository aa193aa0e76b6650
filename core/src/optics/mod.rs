//! Optics: composable, capability-typed accessors into decoded values.
//!
//! Capabilities form a chain, `Adapter ⊂ Lens ⊂ Affine ⊂ Traversal`: every
//! adapter is a lens, every lens an affine, every affine a traversal.
//! Composition takes the weaker of the two capabilities. Asking an optic for
//! a stronger capability than it has fails with
//! [`OpticError::CapabilityMismatch`].

mod adapter;
mod affine;
mod lens;
mod traversal;
mod typed;

#[cfg(test)]
mod tests;

use core::fmt;

use crate::errors::OpticError;
use crate::values::Value;

pub use adapter::Adapter;
pub use affine::{Affine, Preview};
pub use lens::Lens;
pub use traversal::Traversal;
pub use typed::TypedOptic;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Adapter,
    Lens,
    Affine,
    Traversal,
}

impl Capability {
    /// Weakest capability offered by both sides.
    pub fn join(self, other: Capability) -> Capability {
        self.max(other)
    }

    /// Whether an optic of this capability can be used as `required`.
    pub fn satisfies(self, required: Capability) -> bool {
        self <= required
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Adapter => "adapter",
            Capability::Lens => "lens",
            Capability::Affine => "affine",
            Capability::Traversal => "traversal",
        };
        write!(f, "{}", name)
    }
}

/// An optic at its most specific capability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Optic {
    Adapter(Adapter),
    Lens(Lens),
    Affine(Affine),
    Traversal(Traversal),
}

impl Optic {
    pub fn id() -> Self {
        Optic::Adapter(Adapter::Id)
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Optic::Adapter(Adapter::Id))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Optic::Adapter(_) => Capability::Adapter,
            Optic::Lens(_) => Capability::Lens,
            Optic::Affine(_) => Capability::Affine,
            Optic::Traversal(_) => Capability::Traversal,
        }
    }

    fn mismatch(&self, required: Capability) -> OpticError {
        OpticError::CapabilityMismatch {
            required,
            found: self.capability(),
        }
    }

    pub fn as_adapter(&self) -> Result<Adapter, OpticError> {
        match self {
            Optic::Adapter(adapter) => Ok(adapter.clone()),
            _ => Err(self.mismatch(Capability::Adapter)),
        }
    }

    pub fn as_lens(&self) -> Result<Lens, OpticError> {
        match self {
            Optic::Adapter(adapter) => Ok(Lens::Adapter(adapter.clone())),
            Optic::Lens(lens) => Ok(lens.clone()),
            _ => Err(self.mismatch(Capability::Lens)),
        }
    }

    pub fn as_affine(&self) -> Result<Affine, OpticError> {
        match self {
            Optic::Affine(affine) => Ok(affine.clone()),
            Optic::Traversal(_) => Err(self.mismatch(Capability::Affine)),
            _ => Ok(Affine::Lens(self.as_lens()?)),
        }
    }

    /// Every optic is a traversal.
    pub fn as_traversal(&self) -> Traversal {
        match self {
            Optic::Traversal(traversal) => traversal.clone(),
            Optic::Affine(affine) => Traversal::Affine(affine.clone()),
            Optic::Lens(lens) => Traversal::Affine(Affine::Lens(lens.clone())),
            Optic::Adapter(adapter) => {
                Traversal::Affine(Affine::Lens(Lens::Adapter(adapter.clone())))
            }
        }
    }

    /// Views this optic at `capability`, which must not be stronger than
    /// its own.
    pub fn upcast(&self, capability: Capability) -> Result<Optic, OpticError> {
        Ok(match capability {
            Capability::Adapter => Optic::Adapter(self.as_adapter()?),
            Capability::Lens => Optic::Lens(self.as_lens()?),
            Capability::Affine => Optic::Affine(self.as_affine()?),
            Capability::Traversal => Optic::Traversal(self.as_traversal()),
        })
    }

    /// `self` focuses on a part, `inner` focuses further into that part.
    ///
    /// The result has the weaker of the two capabilities.
    pub fn compose(&self, inner: &Optic) -> Optic {
        match (self, inner) {
            // The identity is the only adapter.
            (Optic::Adapter(_), other) | (other, Optic::Adapter(_)) => other.clone(),
            (Optic::Lens(outer), Optic::Lens(inner)) => {
                Optic::Lens(Lens::compose(outer.clone(), inner.clone()))
            }
            (Optic::Lens(outer), Optic::Affine(inner)) => {
                Optic::Affine(Affine::compose(Affine::Lens(outer.clone()), inner.clone()))
            }
            (Optic::Affine(outer), Optic::Lens(inner)) => {
                Optic::Affine(Affine::compose(outer.clone(), Affine::Lens(inner.clone())))
            }
            (Optic::Affine(outer), Optic::Affine(inner)) => {
                Optic::Affine(Affine::compose(outer.clone(), inner.clone()))
            }
            (Optic::Traversal(outer), other) => {
                Optic::Traversal(Traversal::compose(outer.clone(), other.as_traversal()))
            }
            (other, Optic::Traversal(inner)) => {
                Optic::Traversal(Traversal::compose(other.as_traversal(), inner.clone()))
            }
        }
    }

    pub fn view(&self, s: &Value) -> Result<Value, OpticError> {
        self.as_lens()?.view(s)
    }

    pub fn update(&self, b: Value, s: Value) -> Result<Value, OpticError> {
        self.as_lens()?.update(b, s)
    }

    pub fn preview(&self, s: Value) -> Result<Preview, OpticError> {
        self.as_affine()?.preview(s)
    }

    pub fn set(&self, b: Value, s: Value) -> Result<Value, OpticError> {
        self.as_affine()?.set(b, s)
    }

    pub fn to_list(&self, s: &Value) -> Result<Vec<Value>, OpticError> {
        self.as_traversal().to_list(s)
    }

    /// Applies `f` to every focus using the most specific operation the
    /// capability supports.
    pub fn modify<E: From<OpticError>>(
        &self,
        s: Value,
        f: &mut dyn FnMut(Value) -> Result<Value, E>,
    ) -> Result<Value, E> {
        match self {
            Optic::Adapter(adapter) => {
                let a = adapter.from(s)?;
                Ok(adapter.to(f(a)?)?)
            }
            Optic::Lens(lens) => {
                let a = lens.view(&s)?;
                Ok(lens.update(f(a)?, s)?)
            }
            Optic::Affine(affine) => match affine.preview(s.clone())? {
                Preview::Miss(t) => Ok(t),
                Preview::Focus(a) => Ok(affine.set(f(a)?, s)?),
            },
            Optic::Traversal(traversal) => traversal.modify(s, f),
        }
    }
}

impl fmt::Display for Optic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Optic::Adapter(adapter) => write!(f, "{}", adapter),
            Optic::Lens(lens) => write!(f, "{}", lens),
            Optic::Affine(affine) => write!(f, "{}", affine),
            Optic::Traversal(traversal) => write!(f, "{}", traversal),
        }
    }
}
