//! Structural traversal of types by rewrite rules.

use crate::errors::SchemaError;
use crate::functions::PointFreeRule;
use crate::optics::TypedOptic;
use crate::rewrite::{RewriteResult, TypeRewriteRule, rewrite_family};
use crate::types::ty::{Type, TypeKind};
use crate::types::TypeManager;

impl Type {
    /// Rewrites every immediate sub-type with `rule` and lifts the resulting
    /// conversions through the optic of each position.
    ///
    /// A sub-type the rule does not apply to is kept unchanged. Check types
    /// whose index differs from the expected one are left alone when
    /// `check_index` is set. With `recurse`, a recursion point is rewritten
    /// by applying `rule` throughout its family, which yields a new family
    /// and a folded conversion; otherwise recursion points are leaves.
    pub fn all(
        &self,
        cx: &TypeManager,
        rule: &TypeRewriteRule,
        recurse: bool,
        check_index: bool,
    ) -> Result<RewriteResult, SchemaError> {
        let rewrite = |t: &Type| rule.rewrite_or_nop(cx, t);
        Ok(match self.kind() {
            TypeKind::RecursivePoint { family, index } if recurse => {
                let family = cx.family_by_id(*family)?;
                rewrite_family(cx, &family, *index, rule, &PointFreeRule::Nop, check_index, None)?
            }
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } | TypeKind::Func(..) => {
                RewriteResult::nop(self.clone())
            }
            TypeKind::Product(a, b) => {
                let first = rewrite(a)?;
                let new_first = first.new_type().clone();
                let optic = TypedOptic::proj1(cx, a, b, &new_first);
                let v1 = RewriteResult::optic_view(cx, self, first, optic);
                let second = rewrite(b)?;
                let optic = TypedOptic::proj2(cx, &new_first, b, second.new_type());
                let v2 = RewriteResult::optic_view(cx, v1.new_type(), second, optic);
                v2.compose(&v1)
            }
            TypeKind::Sum(left, right) => {
                let first = rewrite(left)?;
                let new_left = first.new_type().clone();
                let optic = TypedOptic::inj1(cx, left, right, &new_left);
                let v1 = RewriteResult::optic_view(cx, self, first, optic);
                let second = rewrite(right)?;
                let optic = TypedOptic::inj2(cx, &new_left, right, second.new_type());
                let v2 = RewriteResult::optic_view(cx, v1.new_type(), second, optic);
                v2.compose(&v1)
            }
            TypeKind::List(element) => {
                let result = rewrite(element)?;
                let optic = TypedOptic::list_elements(cx, element, result.new_type());
                RewriteResult::optic_view(cx, self, result, optic)
            }
            TypeKind::Field {
                name,
                element,
                optional,
            } => {
                let result = rewrite(element)?;
                let optic = if *optional {
                    TypedOptic::optional_field(cx, name, element, result.new_type())
                } else {
                    TypedOptic::field(cx, name, element, result.new_type())
                };
                RewriteResult::optic_view(cx, self, result, optic)
            }
            TypeKind::Named { name, element } => {
                let result = rewrite(element)?;
                let optic = TypedOptic::named(cx, name, element, result.new_type());
                RewriteResult::optic_view(cx, self, result, optic)
            }
            TypeKind::Check {
                name,
                index,
                expected_index,
                element,
            } => {
                if check_index && index != expected_index {
                    return Ok(RewriteResult::nop(self.clone()));
                }
                let result = rewrite(element)?;
                let optic = TypedOptic::check(
                    cx,
                    name,
                    *index,
                    *expected_index,
                    element,
                    result.new_type(),
                );
                RewriteResult::optic_view(cx, self, result, optic)
            }
            TypeKind::TaggedChoice(choice) => choice.all(cx, self, rule)?,
        })
    }

    /// Rewrites the first immediate sub-type that `rule` changes. `None` when
    /// the rule changes no sub-type.
    pub fn one(
        &self,
        cx: &TypeManager,
        rule: &TypeRewriteRule,
    ) -> Result<Option<RewriteResult>, SchemaError> {
        let changed = |t: &Type| -> Result<Option<RewriteResult>, SchemaError> {
            Ok(rule.rewrite(cx, t)?.filter(|r| !r.is_nop()))
        };
        let lifted = |result: RewriteResult, optic: TypedOptic| {
            Ok(Some(RewriteResult::optic_view(cx, self, result, optic)))
        };
        match self.kind() {
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } | TypeKind::Func(..) => Ok(None),
            TypeKind::Product(a, b) => {
                if let Some(r) = changed(a)? {
                    let optic = TypedOptic::proj1(cx, a, b, r.new_type());
                    return lifted(r, optic);
                }
                if let Some(r) = changed(b)? {
                    let optic = TypedOptic::proj2(cx, a, b, r.new_type());
                    return lifted(r, optic);
                }
                Ok(None)
            }
            TypeKind::Sum(left, right) => {
                if let Some(r) = changed(left)? {
                    let optic = TypedOptic::inj1(cx, left, right, r.new_type());
                    return lifted(r, optic);
                }
                if let Some(r) = changed(right)? {
                    let optic = TypedOptic::inj2(cx, left, right, r.new_type());
                    return lifted(r, optic);
                }
                Ok(None)
            }
            TypeKind::List(element) => match changed(element)? {
                Some(r) => {
                    let optic = TypedOptic::list_elements(cx, element, r.new_type());
                    lifted(r, optic)
                }
                None => Ok(None),
            },
            TypeKind::Field {
                name,
                element,
                optional,
            } => match changed(element)? {
                Some(r) => {
                    let optic = if *optional {
                        TypedOptic::optional_field(cx, name, element, r.new_type())
                    } else {
                        TypedOptic::field(cx, name, element, r.new_type())
                    };
                    lifted(r, optic)
                }
                None => Ok(None),
            },
            TypeKind::Named { name, element } => match changed(element)? {
                Some(r) => {
                    let optic = TypedOptic::named(cx, name, element, r.new_type());
                    lifted(r, optic)
                }
                None => Ok(None),
            },
            TypeKind::Check {
                name,
                index,
                expected_index,
                element,
            } => match changed(element)? {
                Some(r) => {
                    let optic = TypedOptic::check(
                        cx,
                        name,
                        *index,
                        *expected_index,
                        element,
                        r.new_type(),
                    );
                    lifted(r, optic)
                }
                None => Ok(None),
            },
            TypeKind::TaggedChoice(choice) => choice.one(cx, self, rule),
        }
    }

    /// Applies `rule` bottom-up to every sub-type and then to this type. See
    /// [`TypeRewriteRule::everywhere`].
    pub fn everywhere(
        &self,
        cx: &TypeManager,
        rule: &TypeRewriteRule,
        optimization: &PointFreeRule,
        recurse: bool,
        check_index: bool,
    ) -> Result<RewriteResult, SchemaError> {
        TypeRewriteRule::everywhere(rule.clone(), optimization.clone(), recurse, check_index)
            .rewrite_or_nop(cx, self)
    }

    /// `result` when this type equals `target`, `None` otherwise.
    pub fn if_same(&self, target: &Type, result: &RewriteResult) -> Option<RewriteResult> {
        (self == target).then(|| result.clone())
    }
}
