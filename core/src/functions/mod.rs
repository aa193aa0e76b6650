//! Point-free conversion functions.
//!
//! A rewrite produces its conversion as a small expression tree rather than
//! an opaque closure, so the tree can be compared, printed and simplified by
//! [`PointFreeRule`]s before it is ever run. Each node lazily builds and
//! caches its runtime evaluator; see [`PointFree::eval`].

mod eval;
mod rule;


use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::{Lazy, OnceCell};

use crate::errors::EvalError;
use crate::ops::OpsRef;
use crate::optics::TypedOptic;
use crate::types::{FamilyId, Type, TypeKind, TypeManager};
use crate::values::{TagKey, Value, ValueFn};

pub use eval::Evaluator;
pub use rule::PointFreeRule;

type FunBodyFn = dyn Fn(&OpsRef) -> Result<Value, EvalError> + Send + Sync;

/// Named leaf function. Two leaves are equal when they share a name and a
/// body.
#[derive(Clone)]
pub struct FunBody {
    name: Arc<str>,
    body: Arc<FunBodyFn>,
}

impl FunBody {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FunBody {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && core::ptr::addr_eq(Arc::as_ptr(&self.body), Arc::as_ptr(&other.body))
    }
}

impl Eq for FunBody {}

impl Hash for FunBody {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Conversion functions of the members of a rewritten recursive family.
///
/// A [`PointFreeKind::Fold`] owns its slots; the recursive calls inside the
/// member functions only hold weak references back to them.
pub struct FoldSlots {
    id: u64,
    functions: OnceCell<Arc<[PointFree]>>,
}

static NEXT_SLOTS_ID: AtomicU64 = AtomicU64::new(0);

impl FoldSlots {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(FoldSlots {
            id: NEXT_SLOTS_ID.fetch_add(1, Ordering::Relaxed),
            functions: OnceCell::new(),
        })
    }

    /// Installs the member functions. Slots can be sealed only once.
    pub(crate) fn seal(&self, functions: Vec<PointFree>) -> bool {
        self.functions.set(functions.into()).is_ok()
    }

    pub fn get(&self, index: usize) -> Option<&PointFree> {
        self.functions.get().and_then(|functions| functions.get(index))
    }

    pub fn functions(&self) -> &[PointFree] {
        self.functions.get().map(|f| &f[..]).unwrap_or(&[])
    }
}

impl PartialEq for FoldSlots {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FoldSlots {}

impl Hash for FoldSlots {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Weak handle from a recursive call to the slots of its fold.
#[derive(Clone)]
pub struct SlotsRef {
    id: u64,
    slots: Weak<FoldSlots>,
}

impl PartialEq for SlotsRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SlotsRef {}

impl Hash for SlotsRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PointFreeKind {
    Id,
    /// `func` applied to `arg`; `arg_type` is the type of `arg`.
    Apply {
        func: PointFree,
        arg: PointFree,
        arg_type: Type,
    },
    /// `first` after `second`; `middle` is the type in between.
    Comp {
        middle: Type,
        first: PointFree,
        second: PointFree,
    },
    /// Turns a function on the focus of the optic into a function on the
    /// whole structure.
    Lift(TypedOptic),
    Fun(FunBody),
    /// Ignores its input and yields `value`, of type `ty`.
    Constant { value: Value, ty: Type },
    /// Applies the function registered for the key of a tagged value to its
    /// payload. Keys without a function pass through.
    TaggedDispatch {
        from: Type,
        to: Type,
        branches: Arc<BTreeMap<TagKey, PointFree>>,
    },
    /// Conversion of member `index` of a rewritten recursive family.
    Fold {
        family: FamilyId,
        index: usize,
        slots: Arc<FoldSlots>,
    },
    /// Recursive call to member `index` of the enclosing fold.
    RecCall { index: usize, slots: SlotsRef },
}

struct PointFreeNode {
    kind: PointFreeKind,
    evaluator: OnceCell<Evaluator>,
}

/// Handle to an immutable point-free expression.
#[derive(Clone)]
pub struct PointFree(Arc<PointFreeNode>);

static ID: Lazy<PointFree> = Lazy::new(|| PointFree::new(PointFreeKind::Id));

impl PointFree {
    fn new(kind: PointFreeKind) -> Self {
        PointFree(Arc::new(PointFreeNode {
            kind,
            evaluator: OnceCell::new(),
        }))
    }

    pub fn kind(&self) -> &PointFreeKind {
        &self.0.kind
    }

    pub fn id() -> Self {
        ID.clone()
    }

    pub fn is_id(&self) -> bool {
        matches!(self.kind(), PointFreeKind::Id)
    }

    pub fn app(func: PointFree, arg: PointFree, arg_type: Type) -> Self {
        PointFree::new(PointFreeKind::Apply {
            func,
            arg,
            arg_type,
        })
    }

    pub fn comp(middle: Type, first: PointFree, second: PointFree) -> Self {
        PointFree::new(PointFreeKind::Comp {
            middle,
            first,
            second,
        })
    }

    pub fn lift(optic: TypedOptic) -> Self {
        PointFree::new(PointFreeKind::Lift(optic))
    }

    /// Leaf converting one value into another.
    pub fn fun(
        name: &str,
        f: impl Fn(Value) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        let f: ValueFn = Arc::new(f);
        PointFree::fun_with_ops(name, move |_| Ok(Value::Function(f.clone())))
    }

    /// Leaf whose value is computed from the format the function runs for.
    pub fn fun_with_ops(
        name: &str,
        body: impl Fn(&OpsRef) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        PointFree::new(PointFreeKind::Fun(FunBody {
            name: Arc::from(name),
            body: Arc::new(body),
        }))
    }

    pub fn constant(value: Value, ty: Type) -> Self {
        PointFree::new(PointFreeKind::Constant { value, ty })
    }

    pub fn tagged_dispatch(
        from: Type,
        to: Type,
        branches: BTreeMap<TagKey, PointFree>,
    ) -> Self {
        PointFree::new(PointFreeKind::TaggedDispatch {
            from,
            to,
            branches: Arc::new(branches),
        })
    }

    pub(crate) fn fold(family: FamilyId, index: usize, slots: Arc<FoldSlots>) -> Self {
        PointFree::new(PointFreeKind::Fold {
            family,
            index,
            slots,
        })
    }

    pub(crate) fn rec_call(index: usize, slots: &Arc<FoldSlots>) -> Self {
        PointFree::new(PointFreeKind::RecCall {
            index,
            slots: SlotsRef {
                id: slots.id,
                slots: Arc::downgrade(slots),
            },
        })
    }

    /// Rewrites every direct sub-expression with `rule`, keeping those the
    /// rule does not apply to. `ty` is the function type of `self`.
    pub fn all(&self, cx: &TypeManager, rule: &PointFreeRule, ty: &Type) -> PointFree {
        let rewrite = |expr: &PointFree, ty: &Type| rule.rewrite_or_keep(cx, ty, expr);
        match self.kind() {
            PointFreeKind::Apply {
                func,
                arg,
                arg_type,
            } => {
                let new_func = rewrite(func, &cx.func(arg_type.clone(), ty.clone()));
                let new_arg = rewrite(arg, arg_type);
                if new_func == *func && new_arg == *arg {
                    return self.clone();
                }
                PointFree::app(new_func, new_arg, arg_type.clone())
            }
            PointFreeKind::Comp {
                middle,
                first,
                second,
            } => {
                let TypeKind::Func(input, output) = ty.kind() else {
                    return self.clone();
                };
                let new_first = rewrite(first, &cx.func(middle.clone(), output.clone()));
                let new_second = rewrite(second, &cx.func(input.clone(), middle.clone()));
                if new_first == *first && new_second == *second {
                    return self.clone();
                }
                PointFree::comp(middle.clone(), new_first, new_second)
            }
            PointFreeKind::TaggedDispatch { from, to, branches } => {
                let mut changed = false;
                let new_branches = branches
                    .iter()
                    .map(|(key, function)| {
                        let new = match dispatch_type(cx, from, to, key) {
                            Some(ty) => rewrite(function, &ty),
                            None => function.clone(),
                        };
                        changed |= new != *function;
                        (key.clone(), new)
                    })
                    .collect();
                if !changed {
                    return self.clone();
                }
                PointFree::tagged_dispatch(from.clone(), to.clone(), new_branches)
            }
            // Fold bodies are sealed; their recursive calls point at these slots.
            PointFreeKind::Id
            | PointFreeKind::Lift(_)
            | PointFreeKind::Fun(_)
            | PointFreeKind::Constant { .. }
            | PointFreeKind::Fold { .. }
            | PointFreeKind::RecCall { .. } => self.clone(),
        }
    }

    /// Rewrites the first direct sub-expression `rule` applies to.
    pub fn one(&self, cx: &TypeManager, rule: &PointFreeRule, ty: &Type) -> Option<PointFree> {
        match self.kind() {
            PointFreeKind::Apply {
                func,
                arg,
                arg_type,
            } => {
                if let Some(new_func) = rule.rewrite(cx, &cx.func(arg_type.clone(), ty.clone()), func) {
                    return Some(PointFree::app(new_func, arg.clone(), arg_type.clone()));
                }
                rule.rewrite(cx, arg_type, arg)
                    .map(|new_arg| PointFree::app(func.clone(), new_arg, arg_type.clone()))
            }
            PointFreeKind::Comp {
                middle,
                first,
                second,
            } => {
                let TypeKind::Func(input, output) = ty.kind() else {
                    return None;
                };
                if let Some(new_first) = rule.rewrite(cx, &cx.func(middle.clone(), output.clone()), first) {
                    return Some(PointFree::comp(middle.clone(), new_first, second.clone()));
                }
                rule.rewrite(cx, &cx.func(input.clone(), middle.clone()), second)
                    .map(|new_second| PointFree::comp(middle.clone(), first.clone(), new_second))
            }
            PointFreeKind::TaggedDispatch { from, to, branches } => {
                for (key, function) in branches.iter() {
                    let Some(ty) = dispatch_type(cx, from, to, key) else {
                        continue;
                    };
                    if let Some(new) = rule.rewrite(cx, &ty, function) {
                        let mut new_branches = (**branches).clone();
                        new_branches.insert(key.clone(), new);
                        return Some(PointFree::tagged_dispatch(from.clone(), to.clone(), new_branches));
                    }
                }
                None
            }
            PointFreeKind::Id
            | PointFreeKind::Lift(_)
            | PointFreeKind::Fun(_)
            | PointFreeKind::Constant { .. }
            | PointFreeKind::Fold { .. }
            | PointFreeKind::RecCall { .. } => None,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        let pad = "  ".repeat(level + 1);
        match self.kind() {
            PointFreeKind::Id => write!(f, "id"),
            PointFreeKind::Apply { func, arg, .. } => {
                write!(f, "(ap ")?;
                func.write_indented(f, level + 1)?;
                write!(f, "\n{}", pad)?;
                arg.write_indented(f, level + 1)?;
                write!(f, ")")
            }
            PointFreeKind::Comp { first, second, .. } => {
                write!(f, "(")?;
                first.write_indented(f, level + 1)?;
                write!(f, "\n{}◦ ", pad)?;
                second.write_indented(f, level + 1)?;
                write!(f, ")")
            }
            PointFreeKind::Lift(optic) => write!(f, "lift[{}]", optic.optic()),
            PointFreeKind::Fun(body) => write!(f, "{}", body.name),
            PointFreeKind::Constant { value, ty } => write!(f, "const[{}: {}]", value, ty),
            PointFreeKind::TaggedDispatch { branches, .. } => {
                write!(f, "dispatch{{")?;
                for (key, function) in branches.iter() {
                    write!(f, "\n{}{} -> ", pad, key)?;
                    function.write_indented(f, level + 1)?;
                }
                write!(f, "}}")
            }
            PointFreeKind::Fold { family, index, .. } => write!(f, "fold[{}.{}]", family, index),
            PointFreeKind::RecCall { index, .. } => write!(f, "rec[{}]", index),
        }
    }
}

/// Function type of the dispatch branch for `key`.
fn dispatch_type(cx: &TypeManager, from: &Type, to: &Type, key: &TagKey) -> Option<Type> {
    let a = from.as_tagged_choice()?.branch(key)?.clone();
    let b = to.as_tagged_choice()?.branch(key)?.clone();
    Some(cx.func(a, b))
}

impl PartialEq for PointFree {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.kind == other.0.kind
    }
}

impl Eq for PointFree {}

impl Hash for PointFree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
    }
}

impl fmt::Display for PointFree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl fmt::Debug for PointFree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
