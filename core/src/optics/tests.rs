use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalError;
use crate::types::TypeManager;
use crate::values::TagKey;

fn int(i: i32) -> Value {
    Value::Int(i)
}

fn inc(v: Value) -> Result<Value, EvalError> {
    match v {
        Value::Int(i) => Ok(Value::Int(i + 1)),
        other => Err(EvalError::custom(format!("not an int: {}", other))),
    }
}

#[test]
fn test_capability_lattice() {
    assert!(Capability::Adapter.satisfies(Capability::Lens));
    assert!(Capability::Lens.satisfies(Capability::Traversal));
    assert!(!Capability::Traversal.satisfies(Capability::Affine));
    assert_eq!(Capability::Lens.join(Capability::Affine), Capability::Affine);
    assert_eq!(Capability::Adapter.join(Capability::Adapter), Capability::Adapter);
}

#[test]
fn test_lens_view_and_update() {
    let pair = Value::pair(int(1), int(2));
    let first = Optic::Lens(Lens::First);
    let second = Optic::Lens(Lens::Second);

    assert_eq!(first.view(&pair).unwrap(), int(1));
    assert_eq!(second.view(&pair).unwrap(), int(2));
    assert_eq!(
        second.update(int(9), pair).unwrap(),
        Value::pair(int(1), int(9))
    );
}

#[test]
fn test_lens_shape_mismatch() {
    let err = Optic::Lens(Lens::First).view(&int(1)).unwrap_err();
    assert_eq!(
        err,
        OpticError::ShapeMismatch {
            expected: "pair",
            found: "int",
        }
    );
}

#[test]
fn test_affine_preview_and_set() {
    let left = Optic::Affine(Affine::Left);

    assert_eq!(left.preview(Value::left(int(3))).unwrap(), Preview::Focus(int(3)));
    assert_eq!(
        left.preview(Value::right(int(3))).unwrap(),
        Preview::Miss(Value::right(int(3)))
    );
    // Setting a missing focus leaves the structure alone.
    assert_eq!(
        left.set(int(7), Value::right(int(3))).unwrap(),
        Value::right(int(3))
    );
    assert_eq!(left.set(int(7), Value::left(int(3))).unwrap(), Value::left(int(7)));
}

#[test]
fn test_present_affine_on_optional() {
    let present = Optic::Affine(Affine::Present);
    assert_eq!(
        present.modify(Value::present(int(1)), &mut inc).unwrap(),
        Value::present(int(2))
    );
    assert_eq!(present.modify(Value::absent(), &mut inc).unwrap(), Value::absent());
}

#[test]
fn test_capability_mismatch() {
    let left = Optic::Affine(Affine::Left);
    assert_eq!(
        left.view(&Value::left(int(1))).unwrap_err(),
        OpticError::CapabilityMismatch {
            required: Capability::Lens,
            found: Capability::Affine,
        }
    );
    assert!(Optic::Traversal(Traversal::Elements).as_affine().is_err());
    assert_eq!(
        Optic::Lens(Lens::First).as_traversal(),
        Traversal::Affine(Affine::Lens(Lens::First))
    );
}

#[test]
fn test_compose_takes_weaker_capability() {
    let lens = Optic::Lens(Lens::Second);
    let affine = Optic::Affine(Affine::Left);
    let composed = lens.compose(&affine);
    assert_eq!(composed.capability(), Capability::Affine);

    let s = Value::pair(int(0), Value::left(int(5)));
    assert_eq!(composed.preview(s.clone()).unwrap(), Preview::Focus(int(5)));
    assert_eq!(
        composed.set(int(6), s).unwrap(),
        Value::pair(int(0), Value::left(int(6)))
    );
}

#[test]
fn test_compose_capability_is_join() {
    let optics = [
        Optic::Lens(Lens::First),
        Optic::Affine(Affine::Present),
        Optic::Traversal(Traversal::Elements),
    ];
    for outer in &optics {
        for inner in &optics {
            assert_eq!(
                outer.compose(inner).capability(),
                outer.capability().join(inner.capability()),
                "{} / {}",
                outer,
                inner
            );
        }
    }

    let s = Value::List(vec![Value::present(int(1)), Value::absent(), Value::present(int(2))]);
    let composed = Optic::Traversal(Traversal::Elements).compose(&Optic::Affine(Affine::Present));
    assert_eq!(composed.to_list(&s).unwrap(), vec![int(1), int(2)]);
}

#[test]
fn test_compose_with_identity() {
    let lens = Optic::Lens(Lens::First);
    assert_eq!(lens.compose(&Optic::id()), lens);
    assert_eq!(Optic::id().compose(&lens), lens);
}

#[test]
fn test_traversal_over_list() {
    let elements = Optic::Traversal(Traversal::Elements);
    let list = Value::List(vec![int(1), int(2), int(3)]);

    assert_eq!(elements.to_list(&list).unwrap(), vec![int(1), int(2), int(3)]);
    assert_eq!(
        elements.modify(list, &mut inc).unwrap(),
        Value::List(vec![int(2), int(3), int(4)])
    );
}

#[test]
fn test_nested_traversal() {
    let optic = Optic::Traversal(Traversal::Elements).compose(&Optic::Lens(Lens::First));
    assert_eq!(optic.capability(), Capability::Traversal);

    let list = Value::List(vec![Value::pair(int(1), int(10)), Value::pair(int(2), int(20))]);
    assert_eq!(
        optic.modify(list, &mut inc).unwrap(),
        Value::List(vec![Value::pair(int(2), int(10)), Value::pair(int(3), int(20))])
    );
}

#[test]
fn test_tag_affine() {
    let tag = Optic::Affine(Affine::Tag(TagKey::str("a")));
    assert_eq!(
        tag.modify(Value::tagged("a", int(1)), &mut inc).unwrap(),
        Value::tagged("a", int(2))
    );
    assert_eq!(
        tag.modify(Value::tagged("b", int(1)), &mut inc).unwrap(),
        Value::tagged("b", int(1))
    );
}

#[test]
fn test_tagged_lens_dispatches_by_key() {
    let mut branches = BTreeMap::new();
    branches.insert(TagKey::str("a"), Lens::First);
    branches.insert(TagKey::str("b"), Lens::Second);
    let lens = Optic::Lens(Lens::tagged(branches));

    let a = Value::tagged("a", Value::pair(int(1), int(2)));
    let b = Value::tagged("b", Value::pair(int(1), int(2)));
    assert_eq!(lens.view(&a).unwrap(), int(1));
    assert_eq!(lens.view(&b).unwrap(), int(2));
    assert_eq!(
        lens.view(&Value::tagged("c", int(0))).unwrap_err(),
        OpticError::UnknownTag("\"c\"".to_string())
    );
}

#[test]
fn test_typed_optic_types() {
    let cx = TypeManager::new();
    let optic = TypedOptic::proj1(&cx, &cx.int(), &cx.string(), &cx.long());

    assert_eq!(optic.s(), &cx.and(cx.int(), cx.string()));
    assert_eq!(optic.t(), &cx.and(cx.long(), cx.string()));
    assert_eq!(optic.a(), &cx.int());
    assert_eq!(optic.b(), &cx.long());
    assert_eq!(optic.capability(), Capability::Lens);
}

#[test]
fn test_typed_optic_compose() {
    let cx = TypeManager::new();
    let inner = TypedOptic::inj1(&cx, &cx.int(), &cx.bool(), &cx.long());
    let outer = TypedOptic::list_elements(&cx, inner.s(), inner.t());
    let composed = outer.compose(&inner);

    assert_eq!(composed.s(), &cx.list(cx.or(cx.int(), cx.bool())));
    assert_eq!(composed.t(), &cx.list(cx.or(cx.long(), cx.bool())));
    assert_eq!(composed.a(), &cx.int());
    assert_eq!(composed.capability(), Capability::Traversal);
}
