//! Reading and writing values of a type through a format backend.
//!
//! `read` returns the unconsumed remainder of the input together with the
//! decoded value, or the untouched input and `None` when the input does not
//! have the shape of the type. `write` merges a value into a remainder, so
//! fields a read did not consume survive a read/write round trip.

use crate::data_result::DataResult;
use crate::errors::SchemaError;
use crate::ops::DynamicOps;
use crate::typed::Typed;
use crate::types::ty::{Primitive, Type, TypeKind};
use crate::types::TypeManager;
use crate::values::Value;

impl Type {
    pub fn read<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        input: O::Value,
    ) -> Result<(O::Value, Option<Value>), SchemaError> {
        match self.kind() {
            TypeKind::Const(primitive) => Ok(read_primitive(*primitive, ops, input)),
            TypeKind::Product(first, second) => {
                let (rest, a) = first.read(cx, ops, input.clone())?;
                let Some(a) = a else {
                    return Ok((input, None));
                };
                let (rest, b) = second.read(cx, ops, rest)?;
                Ok(match b {
                    Some(b) => (rest, Some(Value::pair(a, b))),
                    None => (input, None),
                })
            }
            TypeKind::Sum(left, right) => {
                if let (rest, Some(a)) = left.read(cx, ops, input.clone())? {
                    return Ok((rest, Some(Value::left(a))));
                }
                if let (rest, Some(b)) = right.read(cx, ops, input.clone())? {
                    return Ok((rest, Some(Value::right(b))));
                }
                Ok((input, None))
            }
            TypeKind::List(element) => {
                let Some(items) = ops.get_list(&input) else {
                    return Ok((input, None));
                };
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match element.read(cx, ops, item)? {
                        (_, Some(value)) => values.push(value),
                        (_, None) => return Ok((input, None)),
                    }
                }
                Ok((ops.empty(), Some(Value::List(values))))
            }
            TypeKind::Field {
                name,
                element,
                optional,
            } => {
                let field = ops.get(&input, name);
                let value = match field {
                    Some(field) => element.read(cx, ops, field)?.1,
                    None if *optional => return Ok((input, Some(Value::absent()))),
                    None => return Ok((input, None)),
                };
                Ok(match value {
                    Some(value) => {
                        let value = if *optional {
                            Value::present(value)
                        } else {
                            value
                        };
                        (ops.remove(input, name), Some(value))
                    }
                    None => (input, None),
                })
            }
            TypeKind::Named { element, .. } => element.read(cx, ops, input),
            TypeKind::TaggedChoice(choice) => choice.read(cx, ops, input),
            TypeKind::RecursivePoint { family, index } => {
                let body = cx.family_by_id(*family)?.unfold(cx, *index)?;
                body.read(cx, ops, input)
            }
            TypeKind::Check {
                index,
                expected_index,
                element,
                ..
            } => {
                if index != expected_index {
                    return Ok((input, None));
                }
                element.read(cx, ops, input)
            }
            TypeKind::Func(..) => Err(SchemaError::NotSerializable(self.to_string())),
        }
    }

    pub fn write<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        rest: O::Value,
        value: &Value,
    ) -> Result<O::Value, SchemaError> {
        let mismatch = || SchemaError::ValueMismatch {
            ty: self.to_string(),
            found: value.kind_name(),
        };
        match (self.kind(), value) {
            (TypeKind::Const(primitive), value) => {
                write_primitive(*primitive, ops, rest, value).ok_or_else(mismatch)
            }
            (TypeKind::Product(first, second), Value::Pair(a, b)) => {
                let rest = first.write(cx, ops, rest, a)?;
                second.write(cx, ops, rest, b)
            }
            (TypeKind::Sum(left, _), Value::Left(a)) => left.write(cx, ops, rest, a),
            (TypeKind::Sum(_, right), Value::Right(b)) => right.write(cx, ops, rest, b),
            (TypeKind::List(element), Value::List(items)) => {
                let written = items
                    .iter()
                    .map(|item| element.write(cx, ops, ops.empty(), item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ops.create_list(written))
            }
            (
                TypeKind::Field {
                    optional: true,
                    ..
                },
                Value::Optional(None),
            ) => Ok(rest),
            (
                TypeKind::Field {
                    name,
                    element,
                    optional,
                },
                value,
            ) => {
                let value = match (optional, value) {
                    (true, Value::Optional(Some(inner))) => &**inner,
                    (true, _) => return Err(mismatch()),
                    (false, value) => value,
                };
                let written = element.write(cx, ops, ops.empty(), value)?;
                ops.merge_into(rest, ops.create_string(name), written)
                    .into_result()
                    .map_err(SchemaError::Merge)
            }
            (TypeKind::Named { element, .. }, value) => element.write(cx, ops, rest, value),
            (TypeKind::TaggedChoice(choice), Value::Tagged(key, payload)) => {
                choice.write(cx, ops, rest, key, payload)
            }
            (TypeKind::RecursivePoint { family, index }, value) => {
                let body = cx.family_by_id(*family)?.unfold(cx, *index)?;
                body.write(cx, ops, rest, value)
            }
            (
                TypeKind::Check {
                    index,
                    expected_index,
                    element,
                    ..
                },
                value,
            ) if index == expected_index => element.write(cx, ops, rest, value),
            (TypeKind::Func(..), _) => Err(SchemaError::NotSerializable(self.to_string())),
            _ => Err(mismatch()),
        }
    }

    /// Reads a typed value, reporting unreadable input as a data error.
    pub fn decode<O: DynamicOps>(
        &self,
        cx: &TypeManager,
        ops: &O,
        input: O::Value,
    ) -> DataResult<(Typed, O::Value)> {
        match self.read(cx, ops, input) {
            Ok((rest, Some(value))) => DataResult::success((Typed::new(self.clone(), value), rest)),
            Ok((_, None)) => DataResult::error(format!("unable to read input as {}", self)),
            Err(err) => DataResult::error(err.to_string()),
        }
    }
}

fn read_primitive<O: DynamicOps>(
    primitive: Primitive,
    ops: &O,
    input: O::Value,
) -> (O::Value, Option<Value>) {
    let value = match primitive {
        // Nil consumes nothing and always succeeds.
        Primitive::Nil => return (input, Some(Value::Nil)),
        Primitive::Bool => ops.get_bool_value(&input).map(Value::Bool),
        Primitive::Int => ops
            .get_number_value(&input)
            .and_then(|n| n.as_i32())
            .map(Value::Int),
        Primitive::Long => ops
            .get_number_value(&input)
            .and_then(|n| n.as_i64())
            .map(Value::Long),
        Primitive::Float => ops
            .get_number_value(&input)
            .map(|n| Value::Float(n.as_f32())),
        Primitive::Double => ops
            .get_number_value(&input)
            .map(|n| Value::Double(n.as_f64())),
        Primitive::String => ops
            .get_string_value(&input)
            .map(|s| Value::String(s.into())),
    };
    match value {
        Some(value) => (ops.empty(), Some(value)),
        None => (input, None),
    }
}

fn write_primitive<O: DynamicOps>(
    primitive: Primitive,
    ops: &O,
    rest: O::Value,
    value: &Value,
) -> Option<O::Value> {
    Some(match (primitive, value) {
        (Primitive::Nil, Value::Nil) => rest,
        (Primitive::Bool, Value::Bool(b)) => ops.create_bool(*b),
        (Primitive::Int, Value::Int(i)) => ops.create_int(*i),
        (Primitive::Long, Value::Long(l)) => ops.create_long(*l),
        (Primitive::Float, Value::Float(x)) => ops.create_float(*x),
        (Primitive::Double, Value::Double(x)) => ops.create_double(*x),
        (Primitive::String, Value::String(s)) => ops.create_string(s),
        _ => return None,
    })
}
