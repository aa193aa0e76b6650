use core::hash::{Hash, Hasher};
use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::errors::SchemaError;
use crate::types::family::RecursiveTypeFamily;
use crate::types::tagged_choice::TaggedChoiceType;
use crate::types::ty::{FamilyId, Type, TypeKind};
use crate::types::TypeManager;
use crate::values::TagKey;

/// A type with holes for the members of a recursive family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// A closed type.
    Const(Type),
    /// Member `index` of the family.
    Id(usize),
    Product(Template, Template),
    Sum(Template, Template),
    List(Template),
    Field {
        name: Arc<str>,
        element: Template,
        optional: bool,
    },
    Named {
        name: Arc<str>,
        element: Template,
    },
    TaggedChoice {
        name: Arc<str>,
        key_type: Type,
        branches: Arc<BTreeMap<TagKey, Template>>,
    },
    /// Instantiates to a check type recording the member index it is applied at.
    Check {
        name: Arc<str>,
        expected_index: usize,
        element: Template,
    },
}

impl TemplateKind {
    fn size(&self) -> usize {
        match self {
            TemplateKind::Const(_) => 0,
            TemplateKind::Id(index) => index + 1,
            TemplateKind::Product(a, b) | TemplateKind::Sum(a, b) => a.size().max(b.size()),
            TemplateKind::List(element)
            | TemplateKind::Field { element, .. }
            | TemplateKind::Named { element, .. }
            | TemplateKind::Check { element, .. } => element.size(),
            TemplateKind::TaggedChoice { branches, .. } => {
                branches.values().map(Template::size).max().unwrap_or(0)
            }
        }
    }
}

#[derive(Debug)]
pub struct TemplateData {
    pub kind: TemplateKind,
    size: usize,
    hash: u64,
}

/// Interned handle to a template.
#[derive(Clone)]
pub struct Template(Arc<TemplateData>);

impl Template {
    pub(crate) fn new(kind: TemplateKind) -> Self {
        let size = kind.size();
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        let hash = hasher.finish();
        Template(Arc::new(TemplateData { kind, size, hash }))
    }

    pub fn kind(&self) -> &TemplateKind {
        &self.0.kind
    }

    /// Number of family members the template needs: one more than the
    /// highest member index it references.
    pub fn size(&self) -> usize {
        self.0.size
    }

    /// Instantiates the template as member `index` of `family`. Results are
    /// memoized by the manager.
    pub fn apply(
        &self,
        cx: &TypeManager,
        family: &RecursiveTypeFamily,
        index: usize,
    ) -> Result<Type, SchemaError> {
        cx.instantiate(self, family, index)
    }

    /// Instantiates a template that references no family member.
    pub fn instantiate(&self, cx: &TypeManager) -> Result<Type, SchemaError> {
        self.build(cx, None, 0)
    }

    fn apply_in(
        &self,
        cx: &TypeManager,
        family: Option<&RecursiveTypeFamily>,
        index: usize,
    ) -> Result<Type, SchemaError> {
        match family {
            Some(family) => self.apply(cx, family, index),
            None => self.build(cx, None, index),
        }
    }

    pub(crate) fn build(
        &self,
        cx: &TypeManager,
        family: Option<&RecursiveTypeFamily>,
        index: usize,
    ) -> Result<Type, SchemaError> {
        let sub = |t: &Template| t.apply_in(cx, family, index);
        Ok(match self.kind() {
            TemplateKind::Const(ty) => ty.clone(),
            TemplateKind::Id(member) => match family {
                Some(family) => family.apply(cx, *member)?,
                None => return Err(SchemaError::UnboundRecursionPoint { index: *member }),
            },
            TemplateKind::Product(a, b) => cx.and(sub(a)?, sub(b)?),
            TemplateKind::Sum(a, b) => cx.or(sub(a)?, sub(b)?),
            TemplateKind::List(element) => cx.list(sub(element)?),
            TemplateKind::Field {
                name,
                element,
                optional,
            } => cx.intern(TypeKind::Field {
                name: name.clone(),
                element: sub(element)?,
                optional: *optional,
            }),
            TemplateKind::Named { name, element } => cx.intern(TypeKind::Named {
                name: name.clone(),
                element: sub(element)?,
            }),
            TemplateKind::TaggedChoice {
                name,
                key_type,
                branches,
            } => {
                let branches = branches
                    .iter()
                    .map(|(key, t)| Ok((key.clone(), sub(t)?)))
                    .collect::<Result<BTreeMap<_, _>, SchemaError>>()?;
                cx.tagged_choice_from(TaggedChoiceType::from_parts(
                    name.clone(),
                    key_type.clone(),
                    branches,
                ))
            }
            TemplateKind::Check {
                name,
                expected_index,
                element,
            } => cx.intern(TypeKind::Check {
                name: name.clone(),
                index,
                expected_index: *expected_index,
                element: sub(element)?,
            }),
        })
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }
}

impl Eq for Template {}

impl Hash for Template {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl Type {
    /// Abstracts this type back into a template: every recursion point
    /// becomes a placeholder for the same member index. Closed types become
    /// constant templates.
    pub fn template(&self, cx: &TypeManager) -> Template {
        self.abstract_over(cx, None)
    }

    /// Like [`Type::template`], but only recursion points of `family` become
    /// placeholders; those of other families stay constant.
    pub fn template_over(&self, cx: &TypeManager, family: FamilyId) -> Template {
        self.abstract_over(cx, Some(family))
    }

    fn abstract_over(&self, cx: &TypeManager, only: Option<FamilyId>) -> Template {
        if !self.has_recursion_points() {
            return cx.const_template(self.clone());
        }
        match self.kind() {
            TypeKind::RecursivePoint { family, index } if only.is_none_or(|f| f == *family) => {
                cx.id_template(*index)
            }
            TypeKind::RecursivePoint { .. } => cx.const_template(self.clone()),
            TypeKind::Product(a, b) => {
                cx.and_template(a.abstract_over(cx, only), b.abstract_over(cx, only))
            }
            TypeKind::Sum(a, b) => {
                cx.or_template(a.abstract_over(cx, only), b.abstract_over(cx, only))
            }
            TypeKind::List(element) => cx.list_template(element.abstract_over(cx, only)),
            TypeKind::Field {
                name,
                element,
                optional,
            } => cx.intern_template(TemplateKind::Field {
                name: name.clone(),
                element: element.abstract_over(cx, only),
                optional: *optional,
            }),
            TypeKind::Named { name, element } => cx.intern_template(TemplateKind::Named {
                name: name.clone(),
                element: element.abstract_over(cx, only),
            }),
            TypeKind::TaggedChoice(choice) => cx.intern_template(TemplateKind::TaggedChoice {
                name: choice.name_arc(),
                key_type: choice.key_type().clone(),
                branches: Arc::new(
                    choice
                        .branches()
                        .iter()
                        .map(|(key, ty)| (key.clone(), ty.abstract_over(cx, only)))
                        .collect(),
                ),
            }),
            TypeKind::Check {
                name,
                expected_index,
                element,
                ..
            } => cx.intern_template(TemplateKind::Check {
                name: name.clone(),
                expected_index: *expected_index,
                element: element.abstract_over(cx, only),
            }),
            // Function types and constants never carry recursion points.
            TypeKind::Func(..) | TypeKind::Const(_) => cx.const_template(self.clone()),
        }
    }

    /// Rebinds every recursion point to the member with the same index in
    /// `family`.
    pub fn update_mu(
        &self,
        cx: &TypeManager,
        family: &RecursiveTypeFamily,
    ) -> Result<Type, SchemaError> {
        if !self.has_recursion_points() {
            return Ok(self.clone());
        }
        let update = |t: &Type| t.update_mu(cx, family);
        Ok(match self.kind() {
            TypeKind::RecursivePoint { index, .. } => family.apply(cx, *index)?,
            TypeKind::Product(a, b) => cx.and(update(a)?, update(b)?),
            TypeKind::Sum(a, b) => cx.or(update(a)?, update(b)?),
            TypeKind::List(element) => cx.list(update(element)?),
            TypeKind::Field {
                name,
                element,
                optional,
            } => cx.intern(TypeKind::Field {
                name: name.clone(),
                element: update(element)?,
                optional: *optional,
            }),
            TypeKind::Named { name, element } => cx.intern(TypeKind::Named {
                name: name.clone(),
                element: update(element)?,
            }),
            TypeKind::TaggedChoice(choice) => {
                let branches = choice
                    .branches()
                    .iter()
                    .map(|(key, ty)| Ok((key.clone(), update(ty)?)))
                    .collect::<Result<BTreeMap<_, _>, SchemaError>>()?;
                cx.tagged_choice_from(TaggedChoiceType::from_parts(
                    choice.name_arc(),
                    choice.key_type().clone(),
                    branches,
                ))
            }
            TypeKind::Check {
                name,
                index,
                expected_index,
                element,
            } => cx.intern(TypeKind::Check {
                name: name.clone(),
                index: *index,
                expected_index: *expected_index,
                element: update(element)?,
            }),
            TypeKind::Func(..) | TypeKind::Const(_) => self.clone(),
        })
    }
}
