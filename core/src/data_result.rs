//! Results of data-level operations.
//!
//! A [`DataResult`] either succeeds or fails with a message, and a failure
//! may still carry a best-effort partial value. Malformed input never turns
//! into a panic or a [`crate::SchemaError`]; it ends up here.

use crate::Lifecycle;

#[derive(Clone, Debug, PartialEq)]
pub enum DataResult<R> {
    Success {
        value: R,
        lifecycle: Lifecycle,
    },
    Error {
        message: String,
        partial: Option<R>,
        lifecycle: Lifecycle,
    },
}

impl<R> DataResult<R> {
    pub fn success(value: R) -> Self {
        DataResult::Success {
            value,
            lifecycle: Lifecycle::Stable,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        DataResult::Error {
            message: message.into(),
            partial: None,
            lifecycle: Lifecycle::Stable,
        }
    }

    pub fn error_with_partial(message: impl Into<String>, partial: R) -> Self {
        DataResult::Error {
            message: message.into(),
            partial: Some(partial),
            lifecycle: Lifecycle::Stable,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DataResult::Success { .. })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            DataResult::Success { lifecycle, .. } | DataResult::Error { lifecycle, .. } => {
                *lifecycle
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            DataResult::Success { .. } => None,
            DataResult::Error { message, .. } => Some(message),
        }
    }

    /// The value of a success, `None` for any error.
    pub fn result(self) -> Option<R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { .. } => None,
        }
    }

    /// The value of a success or the partial value of an error.
    pub fn result_or_partial(self) -> Option<R> {
        match self {
            DataResult::Success { value, .. } => Some(value),
            DataResult::Error { partial, .. } => partial,
        }
    }

    pub fn into_result(self) -> Result<R, String> {
        match self {
            DataResult::Success { value, .. } => Ok(value),
            DataResult::Error { message, .. } => Err(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> DataResult<U> {
        match self {
            DataResult::Success { value, lifecycle } => DataResult::Success {
                value: f(value),
                lifecycle,
            },
            DataResult::Error {
                message,
                partial,
                lifecycle,
            } => DataResult::Error {
                message,
                partial: partial.map(f),
                lifecycle,
            },
        }
    }

    /// Chains a dependent computation. A partial value is fed forward so the
    /// chain keeps producing best-effort output; messages accumulate.
    pub fn flat_map<U>(self, f: impl FnOnce(R) -> DataResult<U>) -> DataResult<U> {
        match self {
            DataResult::Success { value, lifecycle } => f(value).add_lifecycle(lifecycle),
            DataResult::Error {
                message,
                partial: None,
                lifecycle,
            } => DataResult::Error {
                message,
                partial: None,
                lifecycle,
            },
            DataResult::Error {
                message,
                partial: Some(partial),
                lifecycle,
            } => match f(partial) {
                DataResult::Success {
                    value,
                    lifecycle: next,
                } => DataResult::Error {
                    message,
                    partial: Some(value),
                    lifecycle: lifecycle.add(next),
                },
                DataResult::Error {
                    message: next_message,
                    partial,
                    lifecycle: next,
                } => DataResult::Error {
                    message: format!("{}; {}", message, next_message),
                    partial,
                    lifecycle: lifecycle.add(next),
                },
            },
        }
    }

    pub fn map_error(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            DataResult::Error {
                message,
                partial,
                lifecycle,
            } => DataResult::Error {
                message: f(message),
                partial,
                lifecycle,
            },
            success => success,
        }
    }

    pub fn set_lifecycle(self, lifecycle: Lifecycle) -> Self {
        match self {
            DataResult::Success { value, .. } => DataResult::Success { value, lifecycle },
            DataResult::Error {
                message, partial, ..
            } => DataResult::Error {
                message,
                partial,
                lifecycle,
            },
        }
    }

    pub fn add_lifecycle(self, lifecycle: Lifecycle) -> Self {
        let combined = self.lifecycle().add(lifecycle);
        self.set_lifecycle(combined)
    }

    /// Turns an error with a partial value into a success, reporting the
    /// message to `on_error`.
    pub fn promote_partial(self, on_error: impl FnOnce(&str)) -> Self {
        match self {
            DataResult::Error {
                message,
                partial: Some(value),
                lifecycle,
            } => {
                on_error(&message);
                DataResult::Success { value, lifecycle }
            }
            other => other,
        }
    }

    /// Combines two results. Both must succeed for a success; partial values
    /// are combined when both sides have one.
    pub fn apply2<U, V>(self, other: DataResult<U>, f: impl FnOnce(R, U) -> V) -> DataResult<V> {
        let lifecycle = self.lifecycle().add(other.lifecycle());
        match (self, other) {
            (DataResult::Success { value: a, .. }, DataResult::Success { value: b, .. }) => {
                DataResult::Success {
                    value: f(a, b),
                    lifecycle,
                }
            }
            (left, right) => {
                let message = match (left.error_message(), right.error_message()) {
                    (Some(a), Some(b)) => format!("{}; {}", a, b),
                    (Some(a), None) | (None, Some(a)) => a.to_string(),
                    (None, None) => String::new(),
                };
                let partial = match (left.result_or_partial(), right.result_or_partial()) {
                    (Some(a), Some(b)) => Some(f(a, b)),
                    _ => None,
                };
                DataResult::Error {
                    message,
                    partial,
                    lifecycle,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_map_keeps_partial() {
        let result = DataResult::error_with_partial("bad", 2).map(|x| x * 10);
        assert_eq!(result.error_message(), Some("bad"));
        assert_eq!(result.result_or_partial(), Some(20));
    }

    #[test]
    fn test_flat_map_accumulates_messages() {
        let result: DataResult<i32> = DataResult::error_with_partial("first", 1)
            .flat_map(|x| DataResult::error_with_partial("second", x + 1));
        assert_eq!(result.error_message(), Some("first; second"));
        assert_eq!(result.result_or_partial(), Some(2));

        let stopped: DataResult<i32> =
            DataResult::<i32>::error("no partial").flat_map(|x| DataResult::success(x + 1));
        assert_eq!(stopped.result_or_partial(), None);
    }

    #[test]
    fn test_lifecycle_propagates() {
        let result = DataResult::success(1)
            .set_lifecycle(Lifecycle::Deprecated(4))
            .flat_map(|x| DataResult::success(x).set_lifecycle(Lifecycle::Experimental));
        assert_eq!(result.lifecycle(), Lifecycle::Experimental);
    }

    #[test]
    fn test_apply2() {
        let both = DataResult::success(2).apply2(DataResult::success(3), |a, b| a * b);
        assert_eq!(both.result(), Some(6));

        let one_bad =
            DataResult::success(2).apply2(DataResult::error_with_partial("oops", 5), |a, b| a + b);
        assert_eq!(one_bad.error_message(), Some("oops"));
        assert_eq!(one_bad.result_or_partial(), Some(7));
    }

    #[test]
    fn test_promote_partial() {
        let mut seen = String::new();
        let promoted = DataResult::error_with_partial("warned", 9)
            .promote_partial(|message| seen.push_str(message));
        assert_eq!(promoted, DataResult::success(9));
        assert_eq!(seen, "warned");
    }
}
