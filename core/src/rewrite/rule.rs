//! Composable rewrite rules over types.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use super::family::{self, FamilyScope};
use super::RewriteResult;
use crate::errors::SchemaError;
use crate::functions::PointFreeRule;
use crate::types::{Type, TypeKind, TypeManager};

type CustomFn =
    dyn Fn(&TypeManager, &Type) -> Result<Option<RewriteResult>, SchemaError> + Send + Sync;

#[derive(Clone)]
struct CustomRule {
    name: Arc<str>,
    f: Arc<CustomFn>,
}

impl PartialEq for CustomRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && core::ptr::addr_eq(Arc::as_ptr(&self.f), Arc::as_ptr(&other.f))
    }
}

impl Eq for CustomRule {}

impl Hash for CustomRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum RuleKind {
    Nop,
    Seq(Vec<TypeRewriteRule>),
    OrElse(TypeRewriteRule, TypeRewriteRule),
    All {
        rule: TypeRewriteRule,
        recurse: bool,
        check_index: bool,
    },
    One(TypeRewriteRule),
    Everywhere {
        rule: TypeRewriteRule,
        optimization: PointFreeRule,
        recurse: bool,
        check_index: bool,
        /// Families being rewritten around this traversal, innermost first.
        scope: Option<Arc<FamilyScope>>,
    },
    IfSame {
        target: Type,
        result: RewriteResult,
    },
    Custom(CustomRule),
}

/// A partial function from types to [`RewriteResult`]s.
///
/// [`TypeRewriteRule::rewrite`] returns `Ok(None)` where the rule does not
/// apply, and an error only for malformed schemas.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeRewriteRule(Arc<RuleKind>);

impl TypeRewriteRule {
    fn new(kind: RuleKind) -> Self {
        TypeRewriteRule(Arc::new(kind))
    }

    /// Applies everywhere and changes nothing.
    pub fn nop() -> Self {
        TypeRewriteRule::new(RuleKind::Nop)
    }

    pub fn is_nop(&self) -> bool {
        matches!(*self.0, RuleKind::Nop)
    }

    /// The rules in order, each on the type the previous one produced.
    /// Fails as soon as one of them fails.
    pub fn seq(rules: impl IntoIterator<Item = TypeRewriteRule>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().filter(|r| !r.is_nop()).collect();
        match rules.len() {
            0 => TypeRewriteRule::nop(),
            1 => rules.remove(0),
            _ => TypeRewriteRule::new(RuleKind::Seq(rules)),
        }
    }

    pub fn seq2(first: TypeRewriteRule, second: TypeRewriteRule) -> Self {
        TypeRewriteRule::seq([first, second])
    }

    /// `first`, or `second` where `first` does not apply.
    pub fn or_else(first: TypeRewriteRule, second: TypeRewriteRule) -> Self {
        TypeRewriteRule::new(RuleKind::OrElse(first, second))
    }

    /// `rule` on every immediate sub-type. Always applies.
    ///
    /// With `recurse`, a recursion point is rewritten through its whole
    /// family instead of being left alone.
    pub fn all(rule: TypeRewriteRule, recurse: bool, check_index: bool) -> Self {
        TypeRewriteRule::new(RuleKind::All {
            rule,
            recurse,
            check_index,
        })
    }

    /// `rule` on the first immediate sub-type it changes.
    pub fn one(rule: TypeRewriteRule) -> Self {
        TypeRewriteRule::new(RuleKind::One(rule))
    }

    /// `rule` bottom-up on every sub-type, then on the type itself. Always
    /// applies. Each step is simplified with `optimization`.
    ///
    /// With `recurse`, a recursion point is rewritten by rewriting its whole
    /// family, which yields a new family and a folded conversion function.
    pub fn everywhere(
        rule: TypeRewriteRule,
        optimization: PointFreeRule,
        recurse: bool,
        check_index: bool,
    ) -> Self {
        TypeRewriteRule::new(RuleKind::Everywhere {
            rule,
            optimization,
            recurse,
            check_index,
            scope: None,
        })
    }

    pub(super) fn scoped_everywhere(
        rule: TypeRewriteRule,
        optimization: PointFreeRule,
        check_index: bool,
        scope: Arc<FamilyScope>,
    ) -> Self {
        TypeRewriteRule::new(RuleKind::Everywhere {
            rule,
            optimization,
            recurse: true,
            check_index,
            scope: Some(scope),
        })
    }

    /// `result` on types equal to `target`.
    pub fn if_same(target: Type, result: RewriteResult) -> Self {
        TypeRewriteRule::new(RuleKind::IfSame { target, result })
    }

    pub fn custom(
        name: &str,
        f: impl Fn(&TypeManager, &Type) -> Result<Option<RewriteResult>, SchemaError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        TypeRewriteRule::new(RuleKind::Custom(CustomRule {
            name: Arc::from(name),
            f: Arc::new(f),
        }))
    }

    pub fn rewrite(
        &self,
        cx: &TypeManager,
        ty: &Type,
    ) -> Result<Option<RewriteResult>, SchemaError> {
        match &*self.0 {
            RuleKind::Nop => Ok(Some(RewriteResult::nop(ty.clone()))),
            RuleKind::Seq(rules) => {
                let mut result = RewriteResult::nop(ty.clone());
                for rule in rules {
                    match rule.rewrite(cx, result.new_type())? {
                        Some(next) => result = next.compose(&result),
                        None => return Ok(None),
                    }
                }
                Ok(Some(result))
            }
            RuleKind::OrElse(first, second) => match first.rewrite(cx, ty)? {
                Some(result) => Ok(Some(result)),
                None => second.rewrite(cx, ty),
            },
            RuleKind::All {
                rule,
                recurse,
                check_index,
            } => ty.all(cx, rule, *recurse, *check_index).map(Some),
            RuleKind::One(rule) => ty.one(cx, rule),
            RuleKind::Everywhere {
                rule,
                optimization,
                recurse,
                check_index,
                scope,
            } => self
                .everywhere_step(cx, ty, rule, optimization, *recurse, *check_index, scope.as_ref())
                .map(Some),
            RuleKind::IfSame { target, result } => Ok(ty.if_same(target, result)),
            RuleKind::Custom(custom) => (custom.f)(cx, ty),
        }
    }

    /// Like [`TypeRewriteRule::rewrite`], with a no-op where the rule does
    /// not apply.
    pub fn rewrite_or_nop(&self, cx: &TypeManager, ty: &Type) -> Result<RewriteResult, SchemaError> {
        Ok(self
            .rewrite(cx, ty)?
            .unwrap_or_else(|| RewriteResult::nop(ty.clone())))
    }

    #[allow(clippy::too_many_arguments)]
    fn everywhere_step(
        &self,
        cx: &TypeManager,
        ty: &Type,
        rule: &TypeRewriteRule,
        optimization: &PointFreeRule,
        recurse: bool,
        check_index: bool,
        scope: Option<&Arc<FamilyScope>>,
    ) -> Result<RewriteResult, SchemaError> {
        if let TypeKind::RecursivePoint { family, index } = ty.kind() {
            if let Some(enclosing) = scope.and_then(|s| s.find(*family)) {
                return Ok(enclosing.leaf(*index, ty));
            }
            if recurse {
                let family = cx.family_by_id(*family)?;
                let folded =
                    family::rewrite_family(cx, &family, *index, rule, optimization, check_index, scope)?;
                return Ok(match rule.rewrite(cx, folded.new_type())? {
                    Some(own) => own.compose(&folded),
                    None => folded,
                });
            }
        }
        let children = ty.all(cx, self, recurse, check_index)?;
        let result = match rule.rewrite(cx, children.new_type())? {
            Some(own) => own.compose(&children),
            None => children,
        };
        Ok(result.optimize(cx, optimization))
    }
}

impl fmt::Debug for TypeRewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            RuleKind::Nop => write!(f, "nop"),
            RuleKind::Seq(rules) => f.debug_list().entries(rules).finish(),
            RuleKind::OrElse(first, second) => write!(f, "({:?} | {:?})", first, second),
            RuleKind::All { rule, .. } => write!(f, "all({:?})", rule),
            RuleKind::One(rule) => write!(f, "one({:?})", rule),
            RuleKind::Everywhere { rule, .. } => write!(f, "everywhere({:?})", rule),
            RuleKind::IfSame { target, .. } => write!(f, "ifSame({})", target),
            RuleKind::Custom(custom) => write!(f, "{}", custom.name),
        }
    }
}
