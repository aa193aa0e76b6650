//! Rewriting every member of a recursive family at once.
//!
//! The rewrite runs in two passes over the member bodies. The first pass
//! treats recursion points as opaque and finds the members whose body the
//! rule changes directly. Members referring to a changed member must convert
//! it too, so that set is closed under references. The second pass rewrites
//! the changed members again, this time turning every recursion point to a
//! changed member into a recursive call. The resulting conversion functions
//! are sealed into shared slots and exposed through a fold.

use std::sync::Arc;

use super::rule::TypeRewriteRule;
use super::{RecData, RewriteResult, View};
use crate::errors::SchemaError;
use crate::functions::{FoldSlots, PointFree, PointFreeRule};
use crate::types::{FamilyId, RecursiveTypeFamily, Type, TypeKind, TypeManager};

enum ScopeMode {
    /// Recursion points are left untouched.
    Probe,
    /// Recursion points to `changed` members become recursive calls.
    Rewrite {
        changed: RecData,
        slots: Arc<FoldSlots>,
    },
}

/// A family whose members are being rewritten, as seen from inside one of
/// its bodies.
pub(crate) struct FamilyScope {
    family: FamilyId,
    mode: ScopeMode,
    parent: Option<Arc<FamilyScope>>,
}

impl FamilyScope {
    /// The innermost scope rewriting `family`, if any.
    pub(super) fn find(&self, family: FamilyId) -> Option<&FamilyScope> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if scope.family == family {
                return Some(scope);
            }
            current = scope.parent.as_deref();
        }
        None
    }

    /// Result for the recursion point `ty` to member `index` of this scope's
    /// family.
    pub(super) fn leaf(&self, index: usize, ty: &Type) -> RewriteResult {
        let rec_data = RecData::single(index);
        match &self.mode {
            ScopeMode::Rewrite { changed, slots } if changed.contains(index) => {
                let function = PointFree::rec_call(index, slots);
                RewriteResult::create(View::new(ty.clone(), ty.clone(), function), rec_data)
            }
            _ => RewriteResult::nop(ty.clone()).add_rec_data(&rec_data),
        }
    }
}

// Scopes are compared by identity; two rewrites of the same family are
// distinct traversals.
impl PartialEq for FamilyScope {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for FamilyScope {}

impl core::hash::Hash for FamilyScope {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self, state);
    }
}

/// Member indices of `family` that `ty` refers to.
fn references(ty: &Type, family: FamilyId, refs: &mut RecData) {
    if !ty.has_recursion_points() {
        return;
    }
    if let TypeKind::RecursivePoint { family: f, index } = ty.kind() {
        if *f == family {
            refs.insert(*index);
        }
        return;
    }
    for child in ty.children() {
        references(&child, family, refs);
    }
}

/// Rewrites `family` with `rule` applied everywhere and returns the
/// conversion of member `index` into the matching member of the new family.
///
/// The result is a no-op when member `index` is unaffected. Otherwise its
/// recursion data holds every member that changed.
pub(crate) fn rewrite_family(
    cx: &TypeManager,
    family: &RecursiveTypeFamily,
    index: usize,
    rule: &TypeRewriteRule,
    optimization: &PointFreeRule,
    check_index: bool,
    parent: Option<&Arc<FamilyScope>>,
) -> Result<RewriteResult, SchemaError> {
    let span = tracing::debug_span!("rewrite_family", family = %family.name(), index);
    let _enter = span.enter();

    let point = family.apply(cx, index)?;
    let bodies = (0..family.size())
        .map(|i| family.unfold(cx, i))
        .collect::<Result<Vec<_>, _>>()?;

    let probe = TypeRewriteRule::scoped_everywhere(
        rule.clone(),
        optimization.clone(),
        check_index,
        Arc::new(FamilyScope {
            family: family.id(),
            mode: ScopeMode::Probe,
            parent: parent.cloned(),
        }),
    );
    let mut changed = RecData::new();
    for (i, body) in bodies.iter().enumerate() {
        if !probe.rewrite_or_nop(cx, body)?.is_nop() {
            changed.insert(i);
        }
    }
    let refs: Vec<RecData> = bodies
        .iter()
        .map(|body| {
            let mut refs = RecData::new();
            references(body, family.id(), &mut refs);
            refs
        })
        .collect();
    loop {
        let mut grew = false;
        for (i, member_refs) in refs.iter().enumerate() {
            if !changed.contains(i) && member_refs.iter().any(|k| changed.contains(k)) {
                changed.insert(i);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }
    if !changed.contains(index) {
        tracing::trace!("member unaffected");
        return Ok(RewriteResult::nop(point));
    }

    let slots = FoldSlots::new();
    let rewriter = TypeRewriteRule::scoped_everywhere(
        rule.clone(),
        optimization.clone(),
        check_index,
        Arc::new(FamilyScope {
            family: family.id(),
            mode: ScopeMode::Rewrite {
                changed: changed.clone(),
                slots: slots.clone(),
            },
            parent: parent.cloned(),
        }),
    );
    let mut new_bodies = Vec::with_capacity(bodies.len());
    let mut functions = Vec::with_capacity(bodies.len());
    for (i, body) in bodies.into_iter().enumerate() {
        if changed.contains(i) {
            let result = rewriter
                .rewrite_or_nop(cx, &body)?
                .optimize(cx, optimization);
            new_bodies.push(result.new_type().clone());
            functions.push(result.function().clone());
        } else {
            new_bodies.push(body);
            functions.push(PointFree::id());
        }
    }

    let new_family = cx.family(
        family.name(),
        new_bodies.iter().map(|body| body.template_over(cx, family.id())),
    )?;
    let sealed = slots.seal(functions);
    debug_assert!(sealed, "fold slots sealed twice");
    tracing::debug!(
        changed = changed.len(),
        new_family = %new_family.id(),
        "rewrote recursive family"
    );

    let view = View::new(
        point,
        new_family.apply(cx, index)?,
        PointFree::fold(family.id(), index, slots),
    );
    Ok(RewriteResult::create(view, changed))
}
