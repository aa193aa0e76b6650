//! In-memory reference backend.
//!
//! [`Tree`] is a JSON-like document with string-keyed maps that keep their
//! insertion order, so written output is deterministic and easy to compare.

use core::fmt;

use crate::DataResult;
use crate::ops::{DynamicOps, Number};

#[derive(Clone, Debug, PartialEq)]
pub enum Tree {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Tree>),
    Map(Vec<(String, Tree)>),
}

impl Tree {
    pub fn string(s: &str) -> Self {
        Tree::String(s.to_string())
    }

    pub fn map<'a>(entries: impl IntoIterator<Item = (&'a str, Tree)>) -> Self {
        Tree::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn field(&self, key: &str) -> Option<&Tree> {
        match self {
            Tree::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Empty => write!(f, "<empty>"),
            Tree::Bool(b) => write!(f, "{}", b),
            Tree::Int(i) => write!(f, "{}", i),
            Tree::Float(x) => write!(f, "{:?}", x),
            Tree::String(s) => write!(f, "{:?}", s),
            Tree::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Tree::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TreeOps;

impl DynamicOps for TreeOps {
    type Value = Tree;

    fn name(&self) -> &str {
        "tree"
    }

    fn empty(&self) -> Tree {
        Tree::Empty
    }

    fn create_bool(&self, value: bool) -> Tree {
        Tree::Bool(value)
    }

    fn create_int(&self, value: i32) -> Tree {
        Tree::Int(i64::from(value))
    }

    fn create_long(&self, value: i64) -> Tree {
        Tree::Int(value)
    }

    fn create_float(&self, value: f32) -> Tree {
        Tree::Float(f64::from(value))
    }

    fn create_double(&self, value: f64) -> Tree {
        Tree::Float(value)
    }

    fn create_string(&self, value: &str) -> Tree {
        Tree::string(value)
    }

    fn create_list(&self, items: Vec<Tree>) -> Tree {
        Tree::List(items)
    }

    fn create_map(&self, entries: Vec<(Tree, Tree)>) -> Tree {
        Tree::Map(
            entries
                .into_iter()
                .filter_map(|(k, v)| match k {
                    Tree::String(k) => Some((k, v)),
                    _ => None,
                })
                .collect(),
        )
    }

    fn get_bool_value(&self, input: &Tree) -> Option<bool> {
        match input {
            Tree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn get_number_value(&self, input: &Tree) -> Option<Number> {
        match input {
            Tree::Int(i) => Some(Number::Int(*i)),
            Tree::Float(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }

    fn get_string_value(&self, input: &Tree) -> Option<String> {
        match input {
            Tree::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn get_list(&self, input: &Tree) -> Option<Vec<Tree>> {
        match input {
            Tree::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn get_map_values(&self, input: &Tree) -> Option<Vec<(Tree, Tree)>> {
        match input {
            Tree::Map(entries) => Some(
                entries
                    .iter()
                    .map(|(k, v)| (Tree::String(k.clone()), v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn merge_into(&self, map: Tree, key: Tree, value: Tree) -> DataResult<Tree> {
        let Tree::String(key) = key else {
            return DataResult::error_with_partial(format!("key is not a string: {}", key), map);
        };
        let mut entries = match map {
            Tree::Empty => Vec::new(),
            Tree::Map(entries) => entries,
            other => {
                return DataResult::error_with_partial(
                    format!("cannot merge into a non-map value: {}", other),
                    other,
                );
            }
        };
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
        DataResult::success(Tree::Map(entries))
    }

    fn remove(&self, input: Tree, key: &str) -> Tree {
        match input {
            Tree::Map(entries) => Tree::Map(entries.into_iter().filter(|(k, _)| k != key).collect()),
            other => other,
        }
    }

    fn get(&self, input: &Tree, key: &str) -> Option<Tree> {
        input.field(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_into_keeps_order_and_replaces() {
        let ops = TreeOps;
        let map = ops
            .merge_into(ops.empty(), ops.create_string("a"), Tree::Int(1))
            .result()
            .unwrap();
        let map = ops
            .merge_into(map, ops.create_string("b"), Tree::Int(2))
            .result()
            .unwrap();
        let map = ops
            .merge_into(map, ops.create_string("a"), Tree::Int(3))
            .result()
            .unwrap();
        assert_eq!(map, Tree::map([("a", Tree::Int(3)), ("b", Tree::Int(2))]));
    }

    #[test]
    fn test_merge_into_rejects_non_maps() {
        let ops = TreeOps;
        let result = ops.merge_into(Tree::Int(1), ops.create_string("a"), Tree::Int(2));
        assert!(!result.is_success());
        assert_eq!(result.result_or_partial(), Some(Tree::Int(1)));
    }

    #[test]
    fn test_get_and_remove() {
        let ops = TreeOps;
        let map = Tree::map([("kind", Tree::string("a")), ("value", Tree::Int(5))]);
        assert_eq!(ops.get(&map, "value"), Some(Tree::Int(5)));
        assert_eq!(ops.get(&map, "missing"), None);
        assert_eq!(
            ops.remove(map, "kind"),
            Tree::map([("value", Tree::Int(5))])
        );
    }

    #[test]
    fn test_numbers() {
        let ops = TreeOps;
        assert_eq!(ops.get_number_value(&Tree::Float(2.0)).and_then(Number::as_i32), Some(2));
        assert_eq!(ops.get_number_value(&Tree::Float(2.5)).and_then(Number::as_i32), None);
        assert_eq!(
            ops.get_number_value(&Tree::Int(i64::MAX)).and_then(Number::as_i32),
            None
        );
        assert_eq!(ops.get_number_value(&Tree::string("2")), None);
    }

    #[test]
    fn test_display() {
        let tree = Tree::map([
            ("a", Tree::List(vec![Tree::Int(1), Tree::Float(1.5)])),
            ("b", Tree::Bool(true)),
        ]);
        assert_eq!(tree.to_string(), r#"{"a": [1, 1.5], "b": true}"#);
    }
}
