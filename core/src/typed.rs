//! Decoded values tagged with their type.

use core::fmt;

use crate::data_result::DataResult;
use crate::ops::DynamicOps;
use crate::rewrite::RewriteResult;
use crate::types::{Type, TypeManager};
use crate::values::Value;

/// Something that can write itself into a format.
pub trait Serializable {
    /// Writes `self` into `prefix`, keeping whatever `prefix` already holds.
    fn serialize<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        prefix: O::Value,
    ) -> DataResult<O::Value>;

    fn serialize_start<O: DynamicOps>(&self, cx: &TypeManager, ops: &O) -> DataResult<O::Value> {
        self.serialize(cx, ops, ops.empty())
    }
}

/// A decoded value together with the type it was read as.
#[derive(Clone, Debug, PartialEq)]
pub struct Typed {
    ty: Type,
    value: Value,
}

impl Typed {
    pub fn new(ty: Type, value: Value) -> Self {
        Typed { ty, value }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Converts the value with `rewrite`, whose input type must be the type
    /// of this value.
    pub fn convert<O: DynamicOps + Clone + 'static>(
        self,
        rewrite: &RewriteResult,
        ops: &O,
    ) -> DataResult<Typed> {
        if rewrite.ty() != &self.ty {
            return DataResult::error(format!(
                "conversion expects {}, value has type {}",
                rewrite.ty(),
                self.ty
            ));
        }
        match rewrite.apply(ops, self.value) {
            Ok(value) => DataResult::success(Typed::new(rewrite.new_type().clone(), value)),
            Err(err) => DataResult::error(err.to_string()),
        }
    }
}

impl Serializable for Typed {
    fn serialize<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match self.ty.write(cx, ops, prefix, &self.value) {
            Ok(output) => DataResult::success(output),
            Err(err) => DataResult::error(err.to_string()),
        }
    }
}

impl fmt::Display for Typed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.value, self.ty)
    }
}
