//! Simplification rules over point-free expressions.

use super::{PointFree, PointFreeKind};
use crate::optics::TypedOptic;
use crate::types::{Type, TypeManager};

/// A partial rewrite of point-free expressions. [`PointFreeRule::rewrite`]
/// returns `None` where the rule does not apply.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointFreeRule {
    /// Always applies and changes nothing.
    Nop,
    /// `id ◦ f` and `f ◦ id` become `f`.
    CompIdentity,
    /// Lifting the identity through any optic is the identity.
    LiftIdentity,
    /// `lift(o)(f) ◦ lift(o)(g)` becomes `lift(o)(f ◦ g)`.
    LiftFusion,
    /// Every rule in order; fails when one of them fails.
    Seq(Vec<PointFreeRule>),
    OrElse(Box<PointFreeRule>, Box<PointFreeRule>),
    /// The rule on every direct sub-expression.
    All(Box<PointFreeRule>),
    /// The rule on the first direct sub-expression it applies to.
    One(Box<PointFreeRule>),
    /// The rule bottom-up on every node. Always applies.
    Everywhere(Box<PointFreeRule>),
    /// The rule until it stops changing the expression. Always applies.
    Many(Box<PointFreeRule>),
}

impl PointFreeRule {
    pub fn seq(rules: impl IntoIterator<Item = PointFreeRule>) -> Self {
        PointFreeRule::Seq(rules.into_iter().collect())
    }

    pub fn or_else(first: PointFreeRule, second: PointFreeRule) -> Self {
        PointFreeRule::OrElse(Box::new(first), Box::new(second))
    }

    pub fn all(rule: PointFreeRule) -> Self {
        PointFreeRule::All(Box::new(rule))
    }

    pub fn one(rule: PointFreeRule) -> Self {
        PointFreeRule::One(Box::new(rule))
    }

    pub fn everywhere(rule: PointFreeRule) -> Self {
        PointFreeRule::Everywhere(Box::new(rule))
    }

    pub fn many(rule: PointFreeRule) -> Self {
        PointFreeRule::Many(Box::new(rule))
    }

    /// Standard simplification applied to rewrite results.
    pub fn optimize() -> Self {
        PointFreeRule::many(PointFreeRule::everywhere(PointFreeRule::or_else(
            PointFreeRule::CompIdentity,
            PointFreeRule::or_else(PointFreeRule::LiftIdentity, PointFreeRule::LiftFusion),
        )))
    }

    /// Rewrites `expr`, whose function type is `ty`.
    pub fn rewrite(&self, cx: &TypeManager, ty: &Type, expr: &PointFree) -> Option<PointFree> {
        match self {
            PointFreeRule::Nop => Some(expr.clone()),
            PointFreeRule::CompIdentity => match expr.kind() {
                PointFreeKind::Comp { first, second, .. } if first.is_id() => Some(second.clone()),
                PointFreeKind::Comp { first, second, .. } if second.is_id() => Some(first.clone()),
                _ => None,
            },
            PointFreeRule::LiftIdentity => match expr.kind() {
                PointFreeKind::Apply { func, arg, .. }
                    if arg.is_id() && matches!(func.kind(), PointFreeKind::Lift(_)) =>
                {
                    Some(PointFree::id())
                }
                _ => None,
            },
            PointFreeRule::LiftFusion => fuse_lifts(cx, expr),
            PointFreeRule::Seq(rules) => {
                let mut current = expr.clone();
                for rule in rules {
                    current = rule.rewrite(cx, ty, &current)?;
                }
                Some(current)
            }
            PointFreeRule::OrElse(first, second) => first
                .rewrite(cx, ty, expr)
                .or_else(|| second.rewrite(cx, ty, expr)),
            PointFreeRule::All(rule) => Some(expr.all(cx, rule, ty)),
            PointFreeRule::One(rule) => expr.one(cx, rule, ty),
            PointFreeRule::Everywhere(rule) => {
                let children = expr.all(cx, self, ty);
                Some(rule.rewrite(cx, ty, &children).unwrap_or(children))
            }
            PointFreeRule::Many(rule) => {
                let mut current = expr.clone();
                while let Some(next) = rule.rewrite(cx, ty, &current) {
                    if next == current {
                        break;
                    }
                    current = next;
                }
                Some(current)
            }
        }
    }

    pub(crate) fn rewrite_or_keep(&self, cx: &TypeManager, ty: &Type, expr: &PointFree) -> PointFree {
        self.rewrite(cx, ty, expr).unwrap_or_else(|| expr.clone())
    }
}

fn lifted(expr: &PointFree) -> Option<(&TypedOptic, &PointFree)> {
    match expr.kind() {
        PointFreeKind::Apply { func, arg, .. } => match func.kind() {
            PointFreeKind::Lift(optic) => Some((optic, arg)),
            _ => None,
        },
        _ => None,
    }
}

fn fuse_lifts(cx: &TypeManager, expr: &PointFree) -> Option<PointFree> {
    let PointFreeKind::Comp { first, second, .. } = expr.kind() else {
        return None;
    };
    let (outer, f) = lifted(first)?;
    let (inner, g) = lifted(second)?;
    if outer.optic() != inner.optic() || inner.t() != outer.s() || inner.b() != outer.a() {
        return None;
    }
    let optic = TypedOptic::new(
        inner.s().clone(),
        outer.t().clone(),
        inner.a().clone(),
        outer.b().clone(),
        outer.optic().clone(),
    );
    let body = PointFree::comp(inner.b().clone(), f.clone(), g.clone());
    let arg_type = cx.func(inner.a().clone(), outer.b().clone());
    Some(PointFree::app(PointFree::lift(optic), body, arg_type))
}
