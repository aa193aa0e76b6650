mod common;

use common::{TYPES, everywhere, widen_ints};
use pretty_assertions::assert_eq;
use remold::{TagKey, Tree, TreeOps, Type, TypeManager, Value};

fn kind_choice(cx: &TypeManager) -> Type {
    cx.tagged_choice(
        "kind",
        cx.string(),
        [
            (TagKey::str("a"), cx.field("value", cx.int())),
            (TagKey::str("b"), cx.field("value", cx.string())),
        ],
    )
    .unwrap()
}

#[test]
fn widening_one_branch_leaves_the_other_untouched() {
    let cx = &*TYPES;
    let choice = kind_choice(cx);

    let result = everywhere(widen_ints(cx)).rewrite_or_nop(cx, &choice).unwrap();
    let old = choice.as_tagged_choice().unwrap();
    let new = result.new_type().as_tagged_choice().unwrap();

    assert_eq!(new.branch(&TagKey::str("a")), Some(&cx.field("value", cx.long())));
    assert!(Type::ptr_eq(
        new.branch(&TagKey::str("b")).unwrap(),
        old.branch(&TagKey::str("b")).unwrap(),
    ));

    let b = Tree::map([("kind", Tree::string("b")), ("value", Tree::string("x"))]);
    let written = result.migrate(cx, &TreeOps, b.clone()).into_result().unwrap();
    assert_eq!(written, b);
    assert_eq!(written.to_string(), b.to_string());
}

#[test]
fn widened_branch_reads_as_long() {
    let cx = &*TYPES;
    let result = everywhere(widen_ints(cx))
        .rewrite_or_nop(cx, &kind_choice(cx))
        .unwrap();

    let a = Tree::map([("kind", Tree::string("a")), ("value", Tree::Int(41))]);
    let migrated = result.migrate(cx, &TreeOps, a).into_result().unwrap();
    let (typed, _) = result
        .new_type()
        .decode(cx, &TreeOps, migrated)
        .into_result()
        .unwrap();
    assert_eq!(typed.value(), &Value::tagged("a", Value::Long(41)));
}

#[test]
fn unknown_fields_survive_migration() {
    let cx = &*TYPES;
    let result = everywhere(widen_ints(cx))
        .rewrite_or_nop(cx, &kind_choice(cx))
        .unwrap();

    let input = Tree::map([
        ("kind", Tree::string("a")),
        ("value", Tree::Int(1)),
        ("comment", Tree::string("keep me")),
    ]);
    let output = result.migrate(cx, &TreeOps, input).into_result().unwrap();
    assert_eq!(output.field("comment"), Some(&Tree::string("keep me")));
    assert_eq!(output.field("kind"), Some(&Tree::string("a")));
    assert_eq!(output.field("value"), Some(&Tree::Int(1)));
}

#[test]
fn choices_nested_in_lists() {
    let cx = &*TYPES;
    let events = cx.field("events", cx.list(kind_choice(cx)));

    let result = everywhere(widen_ints(cx)).rewrite_or_nop(cx, &events).unwrap();
    let input = Tree::map([(
        "events",
        Tree::List(vec![
            Tree::map([("kind", Tree::string("a")), ("value", Tree::Int(1))]),
            Tree::map([("kind", Tree::string("b")), ("value", Tree::string("x"))]),
        ]),
    )]);
    let output = result.migrate(cx, &TreeOps, input.clone()).into_result().unwrap();
    assert_eq!(output, input);

    let (_, value) = result.new_type().read(cx, &TreeOps, output).unwrap();
    assert_eq!(
        value,
        Some(Value::List(vec![
            Value::tagged("a", Value::Long(1)),
            Value::tagged("b", Value::string("x")),
        ]))
    );
}
