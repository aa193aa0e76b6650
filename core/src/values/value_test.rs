use pretty_assertions::assert_eq;

use crate::errors::EvalError;
use crate::types::Primitive;
use crate::values::{TagKey, Value};

#[test]
fn test_display() {
    let value = Value::pair(
        Value::tagged("a", Value::Int(5)),
        Value::List(vec![Value::Long(1), Value::string("x"), Value::absent()]),
    );
    assert_eq!(value.to_string(), r#"("a": 5, [1L, "x", None])"#);
}

#[test]
fn test_float_equality_is_bitwise() {
    assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    assert_ne!(Value::Double(0.0), Value::Double(-0.0));
}

#[test]
fn test_function_equality_is_identity() {
    let f = Value::function(Ok);
    let g = Value::function(Ok);
    assert_eq!(f, f.clone());
    assert_ne!(f, g);
}

#[test]
fn test_call() {
    let double = Value::function(|v| match v {
        Value::Int(i) => Ok(Value::Int(i * 2)),
        other => Err(EvalError::custom(format!("bad {}", other))),
    });
    assert_eq!(double.call(Value::Int(21)), Ok(Value::Int(42)));
    assert_eq!(
        Value::Nil.call(Value::Int(1)),
        Err(EvalError::NotAFunction("nil"))
    );
}

#[test]
fn test_tag_key_conversions() {
    assert_eq!(TagKey::from_value(&Value::Int(3)), Some(TagKey::Int(3)));
    assert_eq!(TagKey::from_value(&Value::Long(3)), Some(TagKey::Int(3)));
    assert_eq!(TagKey::from_value(&Value::Double(3.0)), None);

    assert_eq!(TagKey::Int(3).to_value(Primitive::Int), Some(Value::Int(3)));
    assert_eq!(TagKey::Int(3).to_value(Primitive::Long), Some(Value::Long(3)));
    assert_eq!(TagKey::Int(i64::MAX).to_value(Primitive::Int), None);
    assert_eq!(TagKey::str("a").to_value(Primitive::Int), None);
    assert!(TagKey::from(true).fits(Primitive::Bool));
}

#[test]
fn test_tag_keys_are_ordered() {
    let mut keys = vec![TagKey::str("b"), TagKey::Int(2), TagKey::str("a"), TagKey::Bool(true)];
    keys.sort();
    assert_eq!(
        keys,
        vec![TagKey::Bool(true), TagKey::Int(2), TagKey::str("a"), TagKey::str("b")]
    );
}
