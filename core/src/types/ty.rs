use core::hash::{Hash, Hasher};
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHasher;

use crate::types::tagged_choice::TaggedChoiceType;

bitflags! {
    /// Flags indicating various properties of a type.
    ///
    /// These flags are computed once when a type is interned and cached
    /// for efficient queries. This avoids repeated recursive traversals.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeFlags: u8 {
        /// The type mentions a recursion point somewhere inside.
        const HAS_RECURSION_POINT = 1;
        /// The type contains a function type.
        const HAS_FUNCTION = 1 << 1;
        /// The type contains a tagged choice.
        const HAS_CHOICE = 1 << 2;
    }
}

/// Leaf data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Nil,
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
}

/// Identifies a registered [`crate::RecursiveTypeFamily`] inside its
/// [`crate::TypeManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId(pub(crate) usize);

impl FamilyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Logical structure of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Const(Primitive),

    /// Product of two types. Wider products nest to the right.
    Product(Type, Type),

    /// Sum of two types; reading tries the left alternative first.
    Sum(Type, Type),

    List(Type),

    /// A map field holding `element`. An optional field may be absent.
    Field {
        name: Arc<str>,
        element: Type,
        optional: bool,
    },

    /// Transparent name attached to a type.
    Named { name: Arc<str>, element: Type },

    TaggedChoice(TaggedChoiceType),

    /// Reference to member `index` of a recursive family.
    RecursivePoint { family: FamilyId, index: usize },

    /// Guard that only admits data when the enclosing family member is the
    /// expected one.
    Check {
        name: Arc<str>,
        index: usize,
        expected_index: usize,
        element: Type,
    },

    /// Type of a conversion function. Carries no data.
    Func(Type, Type),
}

impl TypeKind {
    /// Compute type flags for this type kind.
    ///
    /// This is called by the manager during interning. Children are already
    /// interned, so their flags are read, never recomputed.
    pub fn compute_flags(&self) -> TypeFlags {
        match self {
            TypeKind::Const(_) => TypeFlags::empty(),
            TypeKind::Product(a, b) | TypeKind::Sum(a, b) => a.flags() | b.flags(),
            TypeKind::List(element)
            | TypeKind::Field { element, .. }
            | TypeKind::Named { element, .. }
            | TypeKind::Check { element, .. } => element.flags(),
            TypeKind::TaggedChoice(choice) => {
                let mut flags = TypeFlags::HAS_CHOICE | choice.key_type().flags();
                for branch in choice.branches().values() {
                    flags |= branch.flags();
                }
                flags
            }
            TypeKind::RecursivePoint { .. } => TypeFlags::HAS_RECURSION_POINT,
            TypeKind::Func(arg, ret) => TypeFlags::HAS_FUNCTION | arg.flags() | ret.flags(),
        }
    }
}

/// Data for a type: kind, cached flags and cached structural hash.
#[derive(Debug)]
pub struct TyData {
    pub kind: TypeKind,
    pub flags: TypeFlags,
    hash: u64,
}

/// Handle to an immutable type.
///
/// Types built through a [`crate::TypeManager`] are interned: structurally
/// equal constructions share one allocation, so equality is usually a
/// pointer comparison. Types that survive a pool reset still compare
/// structurally.
#[derive(Clone)]
pub struct Type(Arc<TyData>);

impl Type {
    pub(crate) fn new(kind: TypeKind) -> Self {
        let flags = kind.compute_flags();
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        let hash = hasher.finish();
        Type(Arc::new(TyData { kind, flags, hash }))
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    #[inline]
    pub fn data(&self) -> &TyData {
        &self.0
    }

    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.0.flags
    }

    /// Whether both handles point at the same interned instance.
    #[inline]
    pub fn ptr_eq(a: &Type, b: &Type) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn has_recursion_points(&self) -> bool {
        self.flags().contains(TypeFlags::HAS_RECURSION_POINT)
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind() {
            TypeKind::Const(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_tagged_choice(&self) -> Option<&TaggedChoiceType> {
        match self.kind() {
            TypeKind::TaggedChoice(choice) => Some(choice),
            _ => None,
        }
    }

    /// Immediate sub-types, in declaration order.
    pub fn children(&self) -> Vec<Type> {
        match self.kind() {
            TypeKind::Const(_) | TypeKind::RecursivePoint { .. } => Vec::new(),
            TypeKind::Product(a, b) | TypeKind::Sum(a, b) | TypeKind::Func(a, b) => {
                vec![a.clone(), b.clone()]
            }
            TypeKind::List(element)
            | TypeKind::Field { element, .. }
            | TypeKind::Named { element, .. }
            | TypeKind::Check { element, .. } => vec![element.clone()],
            TypeKind::TaggedChoice(choice) => choice.branches().values().cloned().collect(),
        }
    }

    /// Structural equality with control over recursion points.
    ///
    /// With `ignore_recursion_points`, recursion points of different families
    /// compare equal. Without `check_index`, member indices of recursion
    /// points and check types are not compared.
    pub fn equals_with(
        &self,
        other: &Type,
        ignore_recursion_points: bool,
        check_index: bool,
    ) -> bool {
        if Type::ptr_eq(self, other) {
            return true;
        }
        let eq = |a: &Type, b: &Type| a.equals_with(b, ignore_recursion_points, check_index);
        match (self.kind(), other.kind()) {
            (TypeKind::Const(a), TypeKind::Const(b)) => a == b,
            (TypeKind::Product(a1, b1), TypeKind::Product(a2, b2))
            | (TypeKind::Sum(a1, b1), TypeKind::Sum(a2, b2))
            | (TypeKind::Func(a1, b1), TypeKind::Func(a2, b2)) => eq(a1, a2) && eq(b1, b2),
            (TypeKind::List(a), TypeKind::List(b)) => eq(a, b),
            (
                TypeKind::Field {
                    name: n1,
                    element: e1,
                    optional: o1,
                },
                TypeKind::Field {
                    name: n2,
                    element: e2,
                    optional: o2,
                },
            ) => n1 == n2 && o1 == o2 && eq(e1, e2),
            (
                TypeKind::Named {
                    name: n1,
                    element: e1,
                },
                TypeKind::Named {
                    name: n2,
                    element: e2,
                },
            ) => n1 == n2 && eq(e1, e2),
            (TypeKind::TaggedChoice(c1), TypeKind::TaggedChoice(c2)) => {
                c1.name() == c2.name()
                    && eq(c1.key_type(), c2.key_type())
                    && c1.branches().len() == c2.branches().len()
                    && c1
                        .branches()
                        .iter()
                        .zip(c2.branches().iter())
                        .all(|((k1, t1), (k2, t2))| k1 == k2 && eq(t1, t2))
            }
            (
                TypeKind::RecursivePoint {
                    family: f1,
                    index: i1,
                },
                TypeKind::RecursivePoint {
                    family: f2,
                    index: i2,
                },
            ) => (ignore_recursion_points || f1 == f2) && (!check_index || i1 == i2),
            (
                TypeKind::Check {
                    name: n1,
                    index: i1,
                    expected_index: x1,
                    element: e1,
                },
                TypeKind::Check {
                    name: n2,
                    index: i2,
                    expected_index: x2,
                    element: e2,
                },
            ) => n1 == n2 && x1 == x2 && (!check_index || i1 == i2) && eq(e1, e2),
            _ => false,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Type::ptr_eq(self, other) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}
