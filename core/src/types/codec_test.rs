use pretty_assertions::assert_eq;

use super::TypeManager;
use crate::errors::SchemaError;
use crate::ops::{Tree, TreeOps};
use crate::typed::{Serializable, Typed};
use crate::values::Value;

fn point(manager: &TypeManager) -> super::Type {
    manager.and(
        manager.field("x", manager.int()),
        manager.field("y", manager.double()),
    )
}

#[test]
fn test_read_record() {
    let manager = TypeManager::new();
    let input = Tree::map([("x", Tree::Int(3)), ("y", Tree::Float(1.5))]);

    let (rest, value) = point(&manager).read(&manager, &TreeOps, input).unwrap();
    assert_eq!(value, Some(Value::pair(Value::Int(3), Value::Double(1.5))));
    assert_eq!(rest, Tree::Map(vec![]));
}

#[test]
fn test_read_keeps_unknown_fields() {
    let manager = TypeManager::new();
    let input = Tree::map([
        ("x", Tree::Int(3)),
        ("extra", Tree::string("kept")),
        ("y", Tree::Float(1.5)),
    ]);

    let (rest, value) = point(&manager).read(&manager, &TreeOps, input).unwrap();
    assert!(value.is_some());
    assert_eq!(rest, Tree::map([("extra", Tree::string("kept"))]));

    // Writing back into the remainder restores the unknown field.
    let written = point(&manager)
        .write(&manager, &TreeOps, rest, &value.unwrap())
        .unwrap();
    assert_eq!(written.field("extra"), Some(&Tree::string("kept")));
    assert_eq!(written.field("x"), Some(&Tree::Int(3)));
}

#[test]
fn test_read_mismatch_returns_input() {
    let manager = TypeManager::new();
    let input = Tree::map([("x", Tree::string("three")), ("y", Tree::Float(1.5))]);

    let (rest, value) = point(&manager)
        .read(&manager, &TreeOps, input.clone())
        .unwrap();
    assert_eq!(value, None);
    assert_eq!(rest, input);
}

#[test]
fn test_int_range() {
    let manager = TypeManager::new();
    let (_, value) = manager
        .int()
        .read(&manager, &TreeOps, Tree::Int(i64::from(i32::MAX) + 1))
        .unwrap();
    assert_eq!(value, None);

    let (_, value) = manager
        .long()
        .read(&manager, &TreeOps, Tree::Int(i64::from(i32::MAX) + 1))
        .unwrap();
    assert_eq!(value, Some(Value::Long(i64::from(i32::MAX) + 1)));
}

#[test]
fn test_optional_field() {
    let manager = TypeManager::new();
    let ty = manager.optional_field("nick", manager.string());

    let (_, value) = ty
        .read(&manager, &TreeOps, Tree::map([("nick", Tree::string("bo"))]))
        .unwrap();
    assert_eq!(value, Some(Value::present(Value::string("bo"))));

    let (_, value) = ty.read(&manager, &TreeOps, Tree::Map(vec![])).unwrap();
    assert_eq!(value, Some(Value::absent()));

    // An absent optional writes nothing.
    let written = ty
        .write(&manager, &TreeOps, Tree::Empty, &Value::absent())
        .unwrap();
    assert_eq!(written, Tree::Empty);
}

#[test]
fn test_list_round_trip() {
    let manager = TypeManager::new();
    let ty = manager.list(manager.field("id", manager.long()));
    let input = Tree::List(vec![
        Tree::map([("id", Tree::Int(1))]),
        Tree::map([("id", Tree::Int(2))]),
    ]);

    let (_, value) = ty.read(&manager, &TreeOps, input.clone()).unwrap();
    let value = value.unwrap();
    assert_eq!(
        value,
        Value::List(vec![Value::Long(1), Value::Long(2)])
    );
    assert_eq!(ty.write(&manager, &TreeOps, Tree::Empty, &value).unwrap(), input);
}

#[test]
fn test_sum_prefers_left() {
    let manager = TypeManager::new();
    let ty = manager.or(
        manager.field("a", manager.int()),
        manager.field("b", manager.string()),
    );

    let (_, value) = ty
        .read(&manager, &TreeOps, Tree::map([("b", Tree::string("x"))]))
        .unwrap();
    assert_eq!(value, Some(Value::right(Value::string("x"))));

    let (_, value) = ty
        .read(
            &manager,
            &TreeOps,
            Tree::map([("a", Tree::Int(1)), ("b", Tree::string("x"))]),
        )
        .unwrap();
    assert_eq!(value, Some(Value::left(Value::Int(1))));
}

#[test]
fn test_recursive_read_and_write() {
    let manager = TypeManager::new();
    let body = manager.and_template(
        manager.const_template(manager.field("head", manager.int())),
        manager.optional_field_template("tail", manager.id_template(0)),
    );
    let family = manager.family("node", [body]).unwrap();
    let node = family.apply(&manager, 0).unwrap();
    let input = Tree::map([
        ("head", Tree::Int(1)),
        ("tail", Tree::map([("head", Tree::Int(2))])),
    ]);

    let (_, value) = node.read(&manager, &TreeOps, input.clone()).unwrap();
    let value = value.unwrap();
    assert_eq!(
        value,
        Value::pair(
            Value::Int(1),
            Value::present(Value::pair(Value::Int(2), Value::absent())),
        )
    );
    assert_eq!(node.write(&manager, &TreeOps, Tree::Empty, &value).unwrap(), input);
}

#[test]
fn test_write_mismatch() {
    let manager = TypeManager::new();
    let err = manager
        .int()
        .write(&manager, &TreeOps, Tree::Empty, &Value::string("x"))
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::ValueMismatch {
            ty: "Int".to_string(),
            found: "string",
        }
    );
}

#[test]
fn test_function_types_are_not_serializable() {
    let manager = TypeManager::new();
    let func = manager.func(manager.int(), manager.int());
    assert!(matches!(
        func.read(&manager, &TreeOps, Tree::Int(1)),
        Err(SchemaError::NotSerializable(_))
    ));
}

#[test]
fn test_decode_and_serialize() {
    let manager = TypeManager::new();
    let ty = point(&manager);
    let input = Tree::map([("x", Tree::Int(3)), ("y", Tree::Float(1.5))]);

    let (typed, rest) = ty.decode(&manager, &TreeOps, input.clone()).into_result().unwrap();
    assert_eq!(typed.ty(), &ty);
    assert_eq!(typed.serialize(&manager, &TreeOps, rest).into_result().unwrap(), input);
    assert_eq!(typed.serialize_start(&manager, &TreeOps).into_result().unwrap(), input);

    let failed = ty.decode(&manager, &TreeOps, Tree::Int(0));
    assert!(!failed.is_success());
    assert_eq!(
        failed.error_message(),
        Some("unable to read input as (x: Int, y: Double)")
    );
}

#[test]
fn test_serialize_reports_mismatch() {
    let manager = TypeManager::new();
    let typed = Typed::new(manager.bool(), Value::Int(1));
    let result = typed.serialize_start(&manager, &TreeOps);
    assert!(!result.is_success());
}
