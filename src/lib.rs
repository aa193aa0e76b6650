//! Remold - typed schema rewriting for serialized data
//!
//! # Overview
//!
//! Remold describes the shape of serialized data with [`Type`]s and evolves
//! that data by rewriting its type. A rewrite produces both the new type and a
//! conversion function, so old documents can be read, converted and written
//! back in the new shape without losing fields the schema does not mention.
//!
//! Common uses:
//!
//! - Widening or renaming fields across data versions
//! - Migrating recursive structures such as trees and linked lists
//! - Rewriting one branch of a tagged union while leaving the others alone
//!
//! # Quick Start
//!
//! ```ignore
//! use remold::{
//!     PointFree, PointFreeRule, RecData, RewriteResult, Tree, TreeOps, TypeManager,
//!     TypeRewriteRule, Value, View,
//! };
//!
//! let cx = TypeManager::new();
//! let record = cx.and(cx.field("id", cx.int()), cx.field("name", cx.string()));
//!
//! // int -> long, applied wherever an int occurs
//! let widen = PointFree::fun("widen", |v| match v {
//!     Value::Int(i) => Ok(Value::Long(i64::from(i))),
//!     other => Ok(other),
//! });
//! let rule = TypeRewriteRule::if_same(
//!     cx.int(),
//!     RewriteResult::create(View::new(cx.int(), cx.long(), widen), RecData::new()),
//! );
//! let result = record
//!     .everywhere(&cx, &rule, &PointFreeRule::optimize(), true, true)
//!     .unwrap();
//!
//! let input = Tree::map([("id", Tree::Int(1)), ("name", Tree::string("a"))]);
//! let output = result.migrate(&cx, &TreeOps, input).into_result().unwrap();
//! ```
//!
//! # Formats
//!
//! Types never touch a concrete format. Reading and writing go through a
//! [`DynamicOps`] implementation; [`TreeOps`] is the in-memory reference
//! backend.

// Re-export public API from remold_core
pub use remold_core::{
    DataResult, ErrorPolicy, Lifecycle, RecData, RewriteResult, Serializable, TypeRewriteRule,
    Typed, View,
};

// Re-export types, optics and point-free functions
pub use remold_core::functions::{self, PointFree, PointFreeRule};
pub use remold_core::optics::{self, Capability, Optic, TypedOptic};
pub use remold_core::types::{
    self, FamilyId, FindResult, Primitive, RecursiveTypeFamily, Template, Type, TypeKind,
    TypeManager, TypeMatcher,
};

// Re-export formats and values
pub use remold_core::ops::{self, DynamicOps, Tree, TreeOps};
pub use remold_core::values::{self, TagKey, Value, ValueFn};

// Re-export errors
pub use remold_core::errors::{EvalError, FieldNotFound, OpticError, SchemaError};

pub use remold_core::config;
