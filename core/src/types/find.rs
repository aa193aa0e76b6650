//! Locating a sub-type and deriving the optic that reaches it.

use std::sync::Arc;

use crate::errors::{FieldNotFound, SchemaError};
use crate::optics::{Affine, Optic, TypedOptic};
use crate::types::tagged_choice::TaggedChoiceType;
use crate::types::ty::{FamilyId, Type, TypeKind};
use crate::types::TypeManager;

/// Outcome of a type search: an optic from the searched type to the match,
/// or the reason nothing matched.
pub type FindResult = Result<TypedOptic, FieldNotFound>;

/// Family members whose bodies are being searched.
pub(crate) type Visiting = Vec<(FamilyId, usize)>;

/// What a search is looking for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeMatcher {
    /// Any occurrence of exactly this type.
    Type(Type),
    /// A field with this name, whose element must be this type.
    Field { name: Arc<str>, element: Type },
}

/// Result of testing one candidate against a matcher.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome {
    Found(TypedOptic),
    /// Not this node; keep searching its children.
    Continue,
    /// The search must stop here without a match.
    NotFound(FieldNotFound),
}

impl TypeMatcher {
    pub fn type_finder(ty: Type) -> Self {
        TypeMatcher::Type(ty)
    }

    pub fn field_finder(name: &str, element: Type) -> Self {
        TypeMatcher::Field {
            name: Arc::from(name),
            element,
        }
    }

    pub fn test(&self, cx: &TypeManager, candidate: &Type, result_type: &Type) -> MatchOutcome {
        match self {
            TypeMatcher::Type(target) => {
                if candidate == target {
                    MatchOutcome::Found(TypedOptic::identity(candidate.clone(), result_type.clone()))
                } else {
                    MatchOutcome::Continue
                }
            }
            TypeMatcher::Field { name, element } => match candidate.kind() {
                TypeKind::Field {
                    name: field_name,
                    element: field_element,
                    optional,
                } if field_name == name => {
                    if field_element != element {
                        return MatchOutcome::NotFound(FieldNotFound::new(format!(
                            "field `{}` has type {}, expected {}",
                            name, field_element, element
                        )));
                    }
                    if *optional {
                        MatchOutcome::Found(TypedOptic::new(
                            candidate.clone(),
                            cx.optional_field(name, result_type.clone()),
                            element.clone(),
                            result_type.clone(),
                            Optic::Affine(Affine::Present),
                        ))
                    } else {
                        MatchOutcome::Found(TypedOptic::field(cx, name, element, result_type))
                    }
                }
                _ => MatchOutcome::Continue,
            },
        }
    }
}

fn not_found(what: &str, ty: &Type) -> FindResult {
    Err(FieldNotFound::new(format!("{} not found in {}", what, ty)))
}

impl Type {
    /// Searches this type for the shape described by `matcher` and returns an
    /// optic focusing on it, whose result type has the match replaced by
    /// `result_type`.
    ///
    /// Products prefer their first component and sums their left alternative.
    /// With `recurse`, a recursion point is searched through its member body,
    /// and the optic's result type is that body with the match replaced.
    /// A member already being searched is not entered again. Without
    /// `recurse`, recursion points never match.
    pub fn find_type(
        &self,
        cx: &TypeManager,
        matcher: &TypeMatcher,
        result_type: &Type,
        recurse: bool,
    ) -> Result<FindResult, SchemaError> {
        self.find_type_visiting(cx, matcher, result_type, recurse, &mut Vec::new())
    }

    pub fn find_type_in_children(
        &self,
        cx: &TypeManager,
        matcher: &TypeMatcher,
        result_type: &Type,
        recurse: bool,
    ) -> Result<FindResult, SchemaError> {
        self.find_in_children_visiting(cx, matcher, result_type, recurse, &mut Vec::new())
    }

    pub(crate) fn find_type_visiting(
        &self,
        cx: &TypeManager,
        matcher: &TypeMatcher,
        result_type: &Type,
        recurse: bool,
        visiting: &mut Visiting,
    ) -> Result<FindResult, SchemaError> {
        match matcher.test(cx, self, result_type) {
            MatchOutcome::Found(optic) => Ok(Ok(optic)),
            MatchOutcome::NotFound(err) => Ok(Err(err)),
            MatchOutcome::Continue => {
                self.find_in_children_visiting(cx, matcher, result_type, recurse, visiting)
            }
        }
    }

    fn find_in_children_visiting(
        &self,
        cx: &TypeManager,
        matcher: &TypeMatcher,
        result_type: &Type,
        recurse: bool,
        visiting: &mut Visiting,
    ) -> Result<FindResult, SchemaError> {
        let find = |t: &Type, visiting: &mut Visiting| {
            t.find_type_visiting(cx, matcher, result_type, recurse, visiting)
        };
        Ok(match self.kind() {
            TypeKind::Product(first, second) => match find(first, visiting)? {
                Ok(optic) => Ok(TypedOptic::proj1(cx, first, second, optic.t()).compose(&optic)),
                Err(_) => match find(second, visiting)? {
                    Ok(optic) => {
                        Ok(TypedOptic::proj2(cx, first, second, optic.t()).compose(&optic))
                    }
                    Err(_) => not_found("type", self),
                },
            },
            TypeKind::Sum(left, right) => match find(left, visiting)? {
                Ok(optic) => Ok(TypedOptic::inj1(cx, left, right, optic.t()).compose(&optic)),
                Err(_) => match find(right, visiting)? {
                    Ok(optic) => Ok(TypedOptic::inj2(cx, left, right, optic.t()).compose(&optic)),
                    Err(_) => not_found("type", self),
                },
            },
            TypeKind::List(element) => find(element, visiting)?
                .map(|optic| TypedOptic::list_elements(cx, element, optic.t()).compose(&optic)),
            TypeKind::Field {
                name,
                element,
                optional,
            } => find(element, visiting)?.map(|optic| {
                let outer = if *optional {
                    TypedOptic::optional_field(cx, name, element, optic.t())
                } else {
                    TypedOptic::field(cx, name, element, optic.t())
                };
                outer.compose(&optic)
            }),
            TypeKind::Named { name, element } => find(element, visiting)?
                .map(|optic| TypedOptic::named(cx, name, element, optic.t()).compose(&optic)),
            TypeKind::Check {
                name,
                index,
                expected_index,
                element,
            } => {
                if index != expected_index {
                    not_found("type", self)
                } else {
                    find(element, visiting)?.map(|optic| {
                        TypedOptic::check(cx, name, *index, *expected_index, element, optic.t())
                            .compose(&optic)
                    })
                }
            }
            TypeKind::TaggedChoice(choice) => {
                return choice.find_in_children(cx, matcher, result_type, recurse, visiting);
            }
            TypeKind::RecursivePoint { family, index }
                if recurse && !visiting.contains(&(*family, *index)) =>
            {
                let body = cx.family_by_id(*family)?.unfold(cx, *index)?;
                visiting.push((*family, *index));
                let found = find(&body, visiting);
                visiting.pop();
                found?.map(|optic| TypedOptic::unfold(self, &body, optic.t()).compose(&optic))
            }
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } | TypeKind::Func(..) => {
                not_found("type", self)
            }
        })
    }

    /// Element type of the first field named `name`, searching depth first.
    pub fn find_field_type(&self, name: &str) -> Option<Type> {
        match self.kind() {
            TypeKind::Field {
                name: field_name,
                element,
                ..
            } if &**field_name == name => Some(element.clone()),
            TypeKind::Product(a, b) | TypeKind::Sum(a, b) => {
                a.find_field_type(name).or_else(|| b.find_field_type(name))
            }
            TypeKind::Field { element, .. }
            | TypeKind::Named { element, .. }
            | TypeKind::Check { element, .. }
            | TypeKind::List(element) => element.find_field_type(name),
            TypeKind::TaggedChoice(choice) => choice
                .branches()
                .values()
                .find_map(|branch| branch.find_field_type(name)),
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } | TypeKind::Func(..) => None,
        }
    }

    /// The first tagged choice named `name` in this type.
    pub fn find_choice_type(&self, name: &str) -> Option<TaggedChoiceType> {
        match self.kind() {
            TypeKind::TaggedChoice(choice) if choice.name() == name => Some(choice.clone()),
            TypeKind::TaggedChoice(choice) => choice
                .branches()
                .values()
                .find_map(|branch| branch.find_choice_type(name)),
            TypeKind::Product(a, b) | TypeKind::Sum(a, b) => {
                a.find_choice_type(name).or_else(|| b.find_choice_type(name))
            }
            TypeKind::Field { element, .. }
            | TypeKind::Named { element, .. }
            | TypeKind::Check { element, .. }
            | TypeKind::List(element) => element.find_choice_type(name),
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } | TypeKind::Func(..) => None,
        }
    }
}
