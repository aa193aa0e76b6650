use core::fmt;

use crate::optics::{Affine, Capability, Lens, Optic, Traversal};
use crate::types::{TaggedChoiceType, Type, TypeManager};
use crate::values::TagKey;

/// An optic together with the four types it relates.
///
/// The optic turns an `s` into a `t` by replacing its `a` focus with a `b`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedOptic {
    s: Type,
    t: Type,
    a: Type,
    b: Type,
    optic: Optic,
}

impl TypedOptic {
    pub fn new(s: Type, t: Type, a: Type, b: Type, optic: Optic) -> Self {
        TypedOptic { s, t, a, b, optic }
    }

    /// Identity on a whole type.
    pub fn identity(a: Type, b: Type) -> Self {
        TypedOptic::new(a.clone(), b.clone(), a, b, Optic::id())
    }

    /// From a recursion point to its member `body`. Values of a recursion
    /// point are the values of the body, so the optic is the identity.
    pub fn unfold(point: &Type, body: &Type, new_body: &Type) -> Self {
        TypedOptic::new(
            point.clone(),
            new_body.clone(),
            body.clone(),
            new_body.clone(),
            Optic::id(),
        )
    }

    pub fn proj1(cx: &TypeManager, first: &Type, second: &Type, new_first: &Type) -> Self {
        TypedOptic::new(
            cx.and(first.clone(), second.clone()),
            cx.and(new_first.clone(), second.clone()),
            first.clone(),
            new_first.clone(),
            Optic::Lens(Lens::First),
        )
    }

    pub fn proj2(cx: &TypeManager, first: &Type, second: &Type, new_second: &Type) -> Self {
        TypedOptic::new(
            cx.and(first.clone(), second.clone()),
            cx.and(first.clone(), new_second.clone()),
            second.clone(),
            new_second.clone(),
            Optic::Lens(Lens::Second),
        )
    }

    pub fn inj1(cx: &TypeManager, left: &Type, right: &Type, new_left: &Type) -> Self {
        TypedOptic::new(
            cx.or(left.clone(), right.clone()),
            cx.or(new_left.clone(), right.clone()),
            left.clone(),
            new_left.clone(),
            Optic::Affine(Affine::Left),
        )
    }

    pub fn inj2(cx: &TypeManager, left: &Type, right: &Type, new_right: &Type) -> Self {
        TypedOptic::new(
            cx.or(left.clone(), right.clone()),
            cx.or(left.clone(), new_right.clone()),
            right.clone(),
            new_right.clone(),
            Optic::Affine(Affine::Right),
        )
    }

    pub fn list_elements(cx: &TypeManager, element: &Type, new_element: &Type) -> Self {
        TypedOptic::new(
            cx.list(element.clone()),
            cx.list(new_element.clone()),
            element.clone(),
            new_element.clone(),
            Optic::Traversal(Traversal::Elements),
        )
    }

    pub fn field(cx: &TypeManager, name: &str, element: &Type, new_element: &Type) -> Self {
        TypedOptic::new(
            cx.field(name, element.clone()),
            cx.field(name, new_element.clone()),
            element.clone(),
            new_element.clone(),
            Optic::id(),
        )
    }

    pub fn optional_field(
        cx: &TypeManager,
        name: &str,
        element: &Type,
        new_element: &Type,
    ) -> Self {
        TypedOptic::new(
            cx.optional_field(name, element.clone()),
            cx.optional_field(name, new_element.clone()),
            element.clone(),
            new_element.clone(),
            Optic::Affine(Affine::Present),
        )
    }

    pub fn named(cx: &TypeManager, name: &str, element: &Type, new_element: &Type) -> Self {
        TypedOptic::new(
            cx.named(name, element.clone()),
            cx.named(name, new_element.clone()),
            element.clone(),
            new_element.clone(),
            Optic::id(),
        )
    }

    pub fn check(
        cx: &TypeManager,
        name: &str,
        index: usize,
        expected_index: usize,
        element: &Type,
        new_element: &Type,
    ) -> Self {
        TypedOptic::new(
            cx.check(name, index, expected_index, element.clone()),
            cx.check(name, index, expected_index, new_element.clone()),
            element.clone(),
            new_element.clone(),
            Optic::id(),
        )
    }

    /// Focuses on the payload of one branch of a tagged choice. The result
    /// type replaces that branch with `b`.
    pub fn tagged(
        cx: &TypeManager,
        choice: &TaggedChoiceType,
        key: &TagKey,
        a: &Type,
        b: &Type,
    ) -> Self {
        TypedOptic::new(
            cx.tagged_choice_from(choice.clone()),
            cx.tagged_choice_from(choice.with_branch(key, b.clone())),
            a.clone(),
            b.clone(),
            Optic::Affine(Affine::Tag(key.clone())),
        )
    }

    /// `self` reaches `inner.s`; the result reaches `inner.a`.
    pub fn compose(&self, inner: &TypedOptic) -> TypedOptic {
        debug_assert!(
            self.a == inner.s && self.b == inner.t,
            "composing optics with mismatched types: {} / {}",
            self,
            inner
        );
        TypedOptic {
            s: self.s.clone(),
            t: self.t.clone(),
            a: inner.a.clone(),
            b: inner.b.clone(),
            optic: self.optic.compose(&inner.optic),
        }
    }

    pub fn s(&self) -> &Type {
        &self.s
    }

    pub fn t(&self) -> &Type {
        &self.t
    }

    pub fn a(&self) -> &Type {
        &self.a
    }

    pub fn b(&self) -> &Type {
        &self.b
    }

    pub fn optic(&self) -> &Optic {
        &self.optic
    }

    pub fn capability(&self) -> Capability {
        self.optic.capability()
    }
}

impl fmt::Display for TypedOptic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : ({} -> {}) => ({} -> {})",
            self.optic, self.a, self.b, self.s, self.t
        )
    }
}
