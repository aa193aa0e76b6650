#![allow(dead_code)]

use once_cell::sync::Lazy;
use remold::{
    EvalError, PointFree, PointFreeRule, RecData, RewriteResult, TypeManager, TypeRewriteRule,
    Value, View,
};

/// Shared manager; every test in a binary interns into the same pools.
pub static TYPES: Lazy<TypeManager> = Lazy::new(TypeManager::new);

pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// int -> long wherever the rule is tried on an int.
pub fn widen_ints(cx: &TypeManager) -> TypeRewriteRule {
    let function = PointFree::fun("widen", |value| match value {
        Value::Int(i) => Ok(Value::Long(i64::from(i))),
        other => Err(EvalError::custom(format!("not an int: {}", other))),
    });
    TypeRewriteRule::if_same(
        cx.int(),
        RewriteResult::create(View::new(cx.int(), cx.long(), function), RecData::new()),
    )
}

pub fn everywhere(rule: TypeRewriteRule) -> TypeRewriteRule {
    TypeRewriteRule::everywhere(rule, PointFreeRule::optimize(), true, true)
}
