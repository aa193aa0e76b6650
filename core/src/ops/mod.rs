//! Format backends.
//!
//! Types never touch a serialization format directly. They read and write
//! through a [`DynamicOps`] implementation, which exposes a small set of
//! primitive constructors and accessors over some tree-shaped data model.

pub mod tree;

use core::fmt;
use std::sync::Arc;

use crate::DataResult;

pub use tree::{Tree, TreeOps};

/// Numeric value as reported by a format backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(x) if x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 => {
                Some(x as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        self.as_i64().and_then(|i| i32::try_from(i).ok())
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }

    pub fn as_f32(self) -> f32 {
        self.as_f64() as f32
    }
}

/// Primitive operations of a serialization format.
///
/// Accessors return `None` when the input does not have the requested shape.
/// Map keys are format values; the provided [`DynamicOps::get`] and
/// [`DynamicOps::remove`] helpers address fields by string key.
pub trait DynamicOps: Send + Sync {
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync;

    fn name(&self) -> &str;

    /// Whether maps with non-string keys are written compactly.
    fn compress_maps(&self) -> bool {
        false
    }

    fn empty(&self) -> Self::Value;

    fn create_bool(&self, value: bool) -> Self::Value;
    fn create_int(&self, value: i32) -> Self::Value;
    fn create_long(&self, value: i64) -> Self::Value;
    fn create_float(&self, value: f32) -> Self::Value;
    fn create_double(&self, value: f64) -> Self::Value;
    fn create_string(&self, value: &str) -> Self::Value;
    fn create_list(&self, items: Vec<Self::Value>) -> Self::Value;
    fn create_map(&self, entries: Vec<(Self::Value, Self::Value)>) -> Self::Value;

    fn get_bool_value(&self, input: &Self::Value) -> Option<bool>;
    fn get_number_value(&self, input: &Self::Value) -> Option<Number>;
    fn get_string_value(&self, input: &Self::Value) -> Option<String>;
    fn get_list(&self, input: &Self::Value) -> Option<Vec<Self::Value>>;
    fn get_map_values(&self, input: &Self::Value) -> Option<Vec<(Self::Value, Self::Value)>>;

    /// Adds or replaces `key` in `map`. An empty value is treated as an empty map.
    fn merge_into(
        &self,
        map: Self::Value,
        key: Self::Value,
        value: Self::Value,
    ) -> DataResult<Self::Value>;

    /// Removes the field `key`. Inputs that are not maps are returned unchanged.
    fn remove(&self, input: Self::Value, key: &str) -> Self::Value;

    /// Looks up the field `key` of a map.
    fn get(&self, input: &Self::Value, key: &str) -> Option<Self::Value> {
        self.get_map_values(input)?
            .into_iter()
            .find(|(k, _)| self.get_string_value(k).as_deref() == Some(key))
            .map(|(_, v)| v)
    }
}

/// Format-independent view of a backend, handed to point-free evaluation.
///
/// Evaluated functions only work on decoded [`crate::Value`]s, so they need
/// the identity of the format but none of its typed operations.
pub trait OpsAdapter: Send + Sync {
    fn format_name(&self) -> &str;
    fn compress_maps(&self) -> bool;
}

impl<O: DynamicOps> OpsAdapter for O {
    fn format_name(&self) -> &str {
        self.name()
    }

    fn compress_maps(&self) -> bool {
        DynamicOps::compress_maps(self)
    }
}

pub type OpsRef = Arc<dyn OpsAdapter>;

pub fn adapter<O: DynamicOps + Clone + 'static>(ops: &O) -> OpsRef {
    Arc::new(ops.clone())
}
