mod common;

use common::{TYPES, everywhere, widen_ints};
use pretty_assertions::assert_eq;
use remold::{Serializable, Tree, TreeOps, Type, TypeMatcher, Typed, Value};

#[test]
fn decode_convert_serialize() {
    let cx = &*TYPES;
    let user = cx.and(cx.field("id", cx.int()), cx.field("name", cx.string()));
    let input = Tree::map([("id", Tree::Int(9)), ("name", Tree::string("ada"))]);

    let (typed, rest) = user.decode(cx, &TreeOps, input.clone()).into_result().unwrap();
    assert_eq!(typed.to_string(), "(9, \"ada\"): (id: Int, name: String)");

    let rewrite = everywhere(widen_ints(cx)).rewrite_or_nop(cx, &user).unwrap();
    let converted = typed.convert(&rewrite, &TreeOps).into_result().unwrap();
    assert_eq!(converted.ty(), rewrite.new_type());
    assert_eq!(
        converted.value(),
        &Value::pair(Value::Long(9), Value::string("ada"))
    );
    assert_eq!(
        converted.serialize(cx, &TreeOps, rest).into_result().unwrap(),
        input
    );
}

#[test]
fn convert_rejects_other_types() {
    let cx = &*TYPES;
    let rewrite = everywhere(widen_ints(cx)).rewrite_or_nop(cx, &cx.int()).unwrap();
    let typed = Typed::new(cx.string(), Value::string("x"));

    let result = typed.convert(&rewrite, &TreeOps);
    assert!(!result.is_success());
    assert_eq!(
        result.error_message(),
        Some("conversion expects Int, value has type String")
    );
}

#[test]
fn interning_is_structural() {
    let cx = &*TYPES;
    let built_here = cx.list(cx.and(cx.field("a", cx.bool()), cx.optional_field("b", cx.double())));
    let built_there = {
        let b = cx.optional_field("b", cx.double());
        let a = cx.field("a", cx.bool());
        cx.list(cx.and(a, b))
    };
    assert!(Type::ptr_eq(&built_here, &built_there));
    assert!(!Type::ptr_eq(&built_here, &cx.list(cx.field("a", cx.bool()))));

    let template = cx.list_template(cx.id_template(0));
    assert_eq!(template, cx.list_template(cx.id_template(0)));
}

#[test]
fn find_and_update_through_an_optic() {
    let cx = &*TYPES;
    let ty = cx.and(
        cx.field("meta", cx.field("version", cx.int())),
        cx.field("body", cx.string()),
    );
    let matcher = TypeMatcher::field_finder("version", cx.int());

    let optic = ty.find_type(cx, &matcher, &cx.int(), true).unwrap().unwrap();
    assert_eq!(optic.a(), &cx.int());

    let value = Value::pair(Value::Int(1), Value::string("text"));
    assert_eq!(optic.optic().view(&value), Ok(Value::Int(1)));
    assert_eq!(
        optic.optic().update(Value::Int(2), value),
        Ok(Value::pair(Value::Int(2), Value::string("text")))
    );
}
