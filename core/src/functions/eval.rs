//! Turning point-free expressions into runnable closures.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{PointFree, PointFreeKind};
use crate::errors::EvalError;
use crate::ops::OpsRef;
use crate::values::{TagKey, Value, ValueFn};

/// Compiled form of a point-free expression. Produces the function value the
/// expression denotes for a given format.
pub type Evaluator = Arc<dyn Fn(&OpsRef) -> Result<Value, EvalError> + Send + Sync>;

static IDENTITY: Lazy<ValueFn> = Lazy::new(|| {
    let identity: ValueFn = Arc::new(|value: Value| Ok::<_, EvalError>(value));
    identity
});

impl PointFree {
    /// The cached evaluator of this node, built on first use.
    pub fn evaluator(&self) -> &Evaluator {
        self.0.evaluator.get_or_init(|| self.build_evaluator())
    }

    pub fn eval(&self, ops: &OpsRef) -> Result<Value, EvalError> {
        (self.evaluator())(ops)
    }

    /// Evaluates to a function value.
    pub fn eval_fn(&self, ops: &OpsRef) -> Result<ValueFn, EvalError> {
        self.eval(ops)?.into_function()
    }

    fn build_evaluator(&self) -> Evaluator {
        match self.kind() {
            PointFreeKind::Id => Arc::new(|_: &OpsRef| Ok(Value::Function(IDENTITY.clone()))),
            PointFreeKind::Apply { func, arg, .. } => {
                let (func, arg) = (func.clone(), arg.clone());
                Arc::new(move |ops: &OpsRef| {
                    let f = func.eval_fn(ops)?;
                    f(arg.eval(ops)?)
                })
            }
            PointFreeKind::Comp { first, second, .. } => {
                let (first, second) = (first.clone(), second.clone());
                Arc::new(move |ops: &OpsRef| {
                    let f = first.eval_fn(ops)?;
                    let g = second.eval_fn(ops)?;
                    Ok(Value::function(move |x| f(g(x)?)))
                })
            }
            PointFreeKind::Lift(typed) => {
                let optic = typed.optic().clone();
                Arc::new(move |_: &OpsRef| {
                    let optic = optic.clone();
                    Ok(Value::function(move |f| {
                        let f = f.into_function()?;
                        let optic = optic.clone();
                        Ok(Value::function(move |s| optic.modify(s, &mut |a| f(a))))
                    }))
                })
            }
            PointFreeKind::Fun(body) => body.body.clone(),
            PointFreeKind::Constant { value, .. } => {
                let value = value.clone();
                Arc::new(move |_: &OpsRef| {
                    let value = value.clone();
                    Ok(Value::function(move |_| Ok(value.clone())))
                })
            }
            PointFreeKind::TaggedDispatch { branches, .. } => {
                let branches = branches.clone();
                Arc::new(move |ops: &OpsRef| {
                    let functions = branches
                        .iter()
                        .map(|(key, function)| Ok((key.clone(), function.eval_fn(ops)?)))
                        .collect::<Result<BTreeMap<TagKey, ValueFn>, EvalError>>()?;
                    Ok(Value::function(move |value| match value {
                        Value::Tagged(key, payload) => match functions.get(&key) {
                            Some(f) => Ok(Value::Tagged(key, Box::new(f(*payload)?))),
                            None => Ok(Value::Tagged(key, payload)),
                        },
                        other => Ok(other),
                    }))
                })
            }
            PointFreeKind::Fold { index, slots, .. } => {
                let (index, slots) = (*index, slots.clone());
                Arc::new(move |ops: &OpsRef| {
                    slots
                        .get(index)
                        .ok_or(EvalError::UnboundRecursion(index))?
                        .eval(ops)
                })
            }
            PointFreeKind::RecCall { index, slots } => {
                let (index, slots) = (*index, slots.slots.clone());
                Arc::new(move |ops: &OpsRef| {
                    let slots = slots.clone();
                    let ops = ops.clone();
                    // Resolved on every call; the member may not be sealed yet
                    // when this closure is built.
                    Ok(Value::function(move |value| {
                        let slots = slots.upgrade().ok_or(EvalError::UnboundRecursion(index))?;
                        let member = slots.get(index).ok_or(EvalError::UnboundRecursion(index))?;
                        member.eval_fn(&ops)?(value)
                    }))
                })
            }
        }
    }
}
