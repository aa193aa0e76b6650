use pretty_assertions::assert_eq;

use super::{Type, TypeManager, TypeMatcher};
use crate::config::ErrorPolicy;
use crate::errors::{EvalError, SchemaError};
use crate::functions::{PointFree, PointFreeKind, PointFreeRule};
use crate::ops::{Tree, TreeOps};
use crate::optics::{Capability, Preview};
use crate::rewrite::{RecData, RewriteResult, TypeRewriteRule, View};
use crate::test_utils::with_error_policy;
use crate::values::{TagKey, Value};

/// `kind`: `a` carries an int `value`, `b` a string `value`.
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

fn widen(cx: &TypeManager) -> RewriteResult {
    let function = PointFree::fun("widen", |value| match value {
        Value::Int(i) => Ok(Value::Long(i64::from(i))),
        other => Err(EvalError::custom(format!("not an int: {}", other))),
    });
    RewriteResult::create(View::new(cx.int(), cx.long(), function), RecData::new())
}

fn widen_ints(cx: &TypeManager) -> TypeRewriteRule {
    TypeRewriteRule::if_same(cx.int(), widen(cx))
}

#[test]
fn test_read_selects_branch_by_key() {
    let cx = TypeManager::new();
    let input = Tree::map([("kind", Tree::string("a")), ("value", Tree::Int(5))]);

    let (rest, value) = kind_choice(&cx).read(&cx, &TreeOps, input).unwrap();
    assert_eq!(value, Some(Value::tagged("a", Value::Int(5))));
    assert_eq!(rest, Tree::Map(vec![]));
}

#[test]
fn test_read_without_tag_field() {
    let cx = TypeManager::new();
    let input = Tree::map([("value", Tree::Int(5))]);

    let (rest, value) = kind_choice(&cx).read(&cx, &TreeOps, input.clone()).unwrap();
    assert_eq!(value, None);
    assert_eq!(rest, input);
}

#[test]
fn test_read_branch_mismatch_returns_input() {
    let cx = TypeManager::new();
    let input = Tree::map([("kind", Tree::string("a")), ("value", Tree::string("five"))]);

    let (rest, value) = kind_choice(&cx).read(&cx, &TreeOps, input.clone()).unwrap();
    assert_eq!(value, None);
    assert_eq!(rest, input);
}

#[test]
fn test_unknown_key_lenient() {
    let cx = TypeManager::new();
    let input = Tree::map([("kind", Tree::string("c")), ("value", Tree::Int(5))]);

    let (rest, value) = with_error_policy(ErrorPolicy::Lenient, || {
        kind_choice(&cx).read(&cx, &TreeOps, input.clone())
    })
    .unwrap();
    assert_eq!(value, None);
    assert_eq!(rest, input);
}

#[test]
fn test_unknown_key_strict() {
    let cx = TypeManager::new();
    let input = Tree::map([("kind", Tree::string("c")), ("value", Tree::Int(5))]);

    let err = with_error_policy(ErrorPolicy::Strict, || {
        kind_choice(&cx).read(&cx, &TreeOps, input)
    })
    .unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnsupportedKey {
            choice: "kind".to_string(),
            key: "\"c\"".to_string(),
        }
    );
}

#[test]
fn test_duplicate_key() {
    let cx = TypeManager::new();
    let err = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [(TagKey::str("a"), cx.int()), (TagKey::str("a"), cx.long())],
        )
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::DuplicateKey {
            choice: "kind".to_string(),
            key: TagKey::str("a"),
        }
    );
}

#[test]
fn test_invalid_key_type() {
    let cx = TypeManager::new();
    let err = cx
        .tagged_choice("kind", cx.double(), [(TagKey::str("a"), cx.int())])
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::InvalidKeyType {
            choice: "kind".to_string(),
            key_type: "Double".to_string(),
        }
    );

    // The key type is fine, but the key does not fit it.
    assert!(matches!(
        cx.tagged_choice("kind", cx.string(), [(TagKey::Int(1), cx.int())]),
        Err(SchemaError::InvalidKeyType { .. })
    ));
}

#[test]
fn test_int_keys() {
    let cx = TypeManager::new();
    let choice = cx
        .tagged_choice(
            "version",
            cx.int(),
            [
                (TagKey::Int(1), cx.field("name", cx.string())),
                (TagKey::Int(2), cx.field("title", cx.string())),
            ],
        )
        .unwrap();
    let input = Tree::map([("version", Tree::Int(2)), ("title", Tree::string("x"))]);

    let (_, value) = choice.read(&cx, &TreeOps, input.clone()).unwrap();
    let value = value.unwrap();
    assert_eq!(value, Value::tagged(TagKey::Int(2), Value::string("x")));
    assert_eq!(choice.write(&cx, &TreeOps, Tree::Empty, &value).unwrap(), input);
}

#[test]
fn test_write_keeps_key_first() {
    let cx = TypeManager::new();
    let written = kind_choice(&cx)
        .write(&cx, &TreeOps, Tree::Empty, &Value::tagged("b", Value::string("x")))
        .unwrap();
    assert_eq!(
        written,
        Tree::map([("kind", Tree::string("b")), ("value", Tree::string("x"))])
    );
}

#[test]
fn test_write_unknown_key() {
    let cx = TypeManager::new();
    let err = kind_choice(&cx)
        .write(&cx, &TreeOps, Tree::Empty, &Value::tagged("c", Value::Int(1)))
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnsupportedKey {
            choice: "kind".to_string(),
            key: "\"c\"".to_string(),
        }
    );
}

#[test]
fn test_all_without_changes_is_nop() {
    let cx = TypeManager::new();
    let choice = kind_choice(&cx);
    let rule = TypeRewriteRule::if_same(cx.bool(), RewriteResult::nop(cx.bool()));

    let result = choice.all(&cx, &rule, false, true).unwrap();
    assert!(result.is_nop());
    assert!(Type::ptr_eq(result.new_type(), &choice));
}

#[test]
fn test_single_changed_branch() {
    let cx = TypeManager::new();
    let choice = kind_choice(&cx);

    let result = choice
        .everywhere(&cx, &widen_ints(&cx), &PointFreeRule::optimize(), false, true)
        .unwrap();
    let new_choice = result.new_type().as_tagged_choice().unwrap();
    assert_eq!(
        new_choice.branch(&TagKey::str("a")),
        Some(&cx.field("value", cx.long()))
    );
    // The untouched branch keeps its interned type.
    assert!(Type::ptr_eq(
        new_choice.branch(&TagKey::str("b")).unwrap(),
        choice.as_tagged_choice().unwrap().branch(&TagKey::str("b")).unwrap(),
    ));
    assert!(matches!(result.function().kind(), PointFreeKind::Apply { .. }));

    let b = Tree::map([("kind", Tree::string("b")), ("value", Tree::string("x"))]);
    assert_eq!(result.migrate(&cx, &TreeOps, b.clone()).into_result().unwrap(), b);

    let a = Tree::map([("kind", Tree::string("a")), ("value", Tree::Int(5))]);
    let migrated = result.migrate(&cx, &TreeOps, a.clone()).into_result().unwrap();
    assert_eq!(migrated, a);
    let (_, value) = result.new_type().read(&cx, &TreeOps, migrated).unwrap();
    assert_eq!(value, Some(Value::tagged("a", Value::Long(5))));
}

#[test]
fn test_several_changed_branches_dispatch() {
    let cx = TypeManager::new();
    let choice = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [
                (TagKey::str("a"), cx.field("value", cx.int())),
                (TagKey::str("b"), cx.field("count", cx.int())),
                (TagKey::str("c"), cx.field("name", cx.string())),
            ],
        )
        .unwrap();

    let result = choice
        .everywhere(&cx, &widen_ints(&cx), &PointFreeRule::optimize(), false, true)
        .unwrap();
    let PointFreeKind::TaggedDispatch { branches, .. } = result.function().kind() else {
        panic!("expected a dispatch, got {}", result.function());
    };
    assert_eq!(
        branches.keys().cloned().collect::<Vec<_>>(),
        vec![TagKey::str("a"), TagKey::str("b")]
    );

    assert_eq!(
        result
            .apply(&TreeOps, Value::tagged("b", Value::Int(3)))
            .unwrap(),
        Value::tagged("b", Value::Long(3))
    );
    assert_eq!(
        result
            .apply(&TreeOps, Value::tagged("c", Value::string("x")))
            .unwrap(),
        Value::tagged("c", Value::string("x"))
    );
}

#[test]
fn test_one_rewrites_first_branch() {
    let cx = TypeManager::new();
    let choice = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [(TagKey::str("a"), cx.int()), (TagKey::str("b"), cx.int())],
        )
        .unwrap();
    let rule = TypeRewriteRule::if_same(cx.int(), widen(&cx));

    let result = choice.one(&cx, &rule).unwrap().unwrap();
    let new_choice = result.new_type().as_tagged_choice().unwrap();
    assert_eq!(new_choice.branch(&TagKey::str("a")), Some(&cx.long()));
    assert_eq!(new_choice.branch(&TagKey::str("b")), Some(&cx.int()));
}

#[test]
fn test_find_merges_lenses_when_every_branch_matches() {
    let cx = TypeManager::new();
    let choice = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [
                (TagKey::str("a"), cx.field("value", cx.int())),
                (
                    TagKey::str("b"),
                    cx.and(cx.field("value", cx.int()), cx.field("other", cx.string())),
                ),
            ],
        )
        .unwrap();
    let matcher = TypeMatcher::field_finder("value", cx.int());

    let optic = choice.find_type(&cx, &matcher, &cx.long(), false).unwrap().unwrap();
    assert_eq!(optic.capability(), Capability::Lens);
    assert_eq!(optic.s(), &choice);
    assert_eq!(optic.a(), &cx.int());
    assert_eq!(optic.b(), &cx.long());
    assert_eq!(
        optic.optic().view(&Value::tagged(
            "b",
            Value::pair(Value::Int(4), Value::string("x"))
        )),
        Ok(Value::Int(4))
    );
}

#[test]
fn test_find_merges_to_affine() {
    let cx = TypeManager::new();
    let matcher = TypeMatcher::field_finder("value", cx.int());

    // One branch only reaches the field optionally.
    let optional = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [
                (TagKey::str("a"), cx.field("value", cx.int())),
                (TagKey::str("b"), cx.optional_field("value", cx.int())),
            ],
        )
        .unwrap();
    let optic = optional.find_type(&cx, &matcher, &cx.int(), false).unwrap().unwrap();
    assert_eq!(optic.capability(), Capability::Affine);

    // Not every branch has the field.
    let partial = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [
                (TagKey::str("a"), cx.field("value", cx.int())),
                (TagKey::str("b"), cx.field("name", cx.string())),
                (TagKey::str("c"), cx.field("value", cx.int())),
            ],
        )
        .unwrap();
    let optic = partial.find_type(&cx, &matcher, &cx.int(), false).unwrap().unwrap();
    assert_eq!(optic.capability(), Capability::Affine);
    let optic = optic.optic();

    // Branches with a lens always have a focus.
    let a = Value::tagged("a", Value::Int(3));
    assert_eq!(optic.preview(a.clone()), Ok(Preview::Focus(Value::Int(3))));
    assert_eq!(optic.set(Value::Int(4), a), Ok(Value::tagged("a", Value::Int(4))));

    // Tags without a match are handed back untouched.
    let b = Value::tagged("b", Value::string("x"));
    assert_eq!(optic.preview(b.clone()), Ok(Preview::Miss(b.clone())));
    assert_eq!(optic.set(Value::Int(4), b.clone()), Ok(b));
}

#[test]
fn test_find_merges_to_traversal() {
    let cx = TypeManager::new();
    let choice = cx
        .tagged_choice(
            "kind",
            cx.string(),
            [
                (TagKey::str("a"), cx.field("value", cx.int())),
                (TagKey::str("b"), cx.list(cx.field("value", cx.int()))),
                (TagKey::str("c"), cx.field("name", cx.string())),
            ],
        )
        .unwrap();
    let matcher = TypeMatcher::field_finder("value", cx.int());

    let found = choice.find_type(&cx, &matcher, &cx.int(), false).unwrap().unwrap();
    assert_eq!(found.capability(), Capability::Traversal);
    let optic = found.optic();

    let b = Value::tagged("b", Value::List(vec![Value::Int(1), Value::Int(2)]));
    assert_eq!(optic.to_list(&b), Ok(vec![Value::Int(1), Value::Int(2)]));
    assert_eq!(
        optic.to_list(&Value::tagged("a", Value::Int(7))),
        Ok(vec![Value::Int(7)])
    );

    let c = Value::tagged("c", Value::string("x"));
    assert_eq!(optic.to_list(&c), Ok(vec![]));
    let mut double = |v: Value| match v {
        Value::Int(i) => Ok(Value::Int(i * 2)),
        other => Err(EvalError::custom(format!("not an int: {}", other))),
    };
    assert_eq!(optic.modify(c.clone(), &mut double), Ok(c));
    assert_eq!(
        optic.modify(b, &mut double),
        Ok(Value::tagged("b", Value::List(vec![Value::Int(2), Value::Int(4)])))
    );
}

#[test]
fn test_find_single_branch() {
    let cx = TypeManager::new();
    let matcher = TypeMatcher::field_finder("value", cx.string());

    let optic = kind_choice(&cx)
        .find_type(&cx, &matcher, &cx.string(), false)
        .unwrap()
        .unwrap();
    assert_eq!(optic.capability(), Capability::Affine);
    assert_eq!(optic.a(), &cx.string());

    let missing = TypeMatcher::field_finder("missing", cx.int());
    assert!(kind_choice(&cx)
        .find_type(&cx, &missing, &cx.int(), false)
        .unwrap()
        .is_err());
}
