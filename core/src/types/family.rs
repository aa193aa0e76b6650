use core::fmt;
use std::sync::Arc;

use crate::errors::SchemaError;
use crate::types::template::Template;
use crate::types::ty::{FamilyId, Type};
use crate::types::TypeManager;

/// A set of mutually recursive types.
///
/// Member `i` is `templates[i]` applied to the family itself; its body refers
/// to other members through recursion points instead of owning them, so no
/// reference cycle exists between types.
#[derive(Debug)]
pub struct RecursiveTypeFamily {
    id: FamilyId,
    name: Arc<str>,
    templates: Arc<[Template]>,
}

impl RecursiveTypeFamily {
    pub(crate) fn new(id: FamilyId, name: Arc<str>, templates: Arc<[Template]>) -> Self {
        RecursiveTypeFamily {
            id,
            name,
            templates,
        }
    }

    pub fn id(&self) -> FamilyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.templates.len()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    fn missing(&self, index: usize) -> SchemaError {
        SchemaError::MissingFamilyMember {
            family: self.name.to_string(),
            index,
        }
    }

    /// The recursion point standing for member `index`.
    pub fn apply(&self, cx: &TypeManager, index: usize) -> Result<Type, SchemaError> {
        if index >= self.size() {
            return Err(self.missing(index));
        }
        Ok(cx.recursion_point(self.id, index))
    }

    /// The body of member `index`, with inner references as recursion points.
    pub fn unfold(&self, cx: &TypeManager, index: usize) -> Result<Type, SchemaError> {
        let template = self.templates.get(index).ok_or_else(|| self.missing(index))?;
        template.apply(cx, self, index)
    }
}

impl fmt::Display for RecursiveTypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Family[{}#{}", self.name, self.id.0)?;
        for template in self.templates.iter() {
            write!(f, ", {}", template)?;
        }
        write!(f, "]")
    }
}
