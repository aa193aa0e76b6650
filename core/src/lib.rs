//! Typed schema rewriting for serialized data.
//!
//! A [`Type`] describes the shape of some serialized data. Rewriting a type
//! with a [`TypeRewriteRule`] yields a [`RewriteResult`]: the new type plus a
//! point-free function that converts values of the old type into values of
//! the new one. Values are read and written through [`DynamicOps`], so the
//! engine never depends on a concrete format.

pub mod config;
pub mod data_result;
pub mod errors;
pub mod functions;
pub mod lifecycle;
pub mod ops;
pub mod optics;
pub mod pool;
pub mod rewrite;
pub mod typed;
pub mod types;
pub mod values;

pub use config::ErrorPolicy;
pub use data_result::DataResult;
pub use errors::{EvalError, FieldNotFound, OpticError, SchemaError};
pub use functions::{PointFree, PointFreeRule};
pub use lifecycle::Lifecycle;
pub use ops::{DynamicOps, Tree, TreeOps};
pub use optics::{Capability, Optic, TypedOptic};
pub use rewrite::{RecData, RewriteResult, TypeRewriteRule, View};
pub use typed::{Serializable, Typed};
pub use types::{
    FamilyId, FindResult, Primitive, RecursiveTypeFamily, Template, Type, TypeKind, TypeManager,
    TypeMatcher,
};
pub use values::{TagKey, Value, ValueFn};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    use parking_lot::Mutex;

    use crate::config::{self, ErrorPolicy};

    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_family_rewrite() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    static POLICY_LOCK: Mutex<()> = Mutex::new(());

    /// Runs `f` with the process-wide error policy set to `policy`.
    ///
    /// Tests touching the policy are serialized, and the previous policy is
    /// restored afterwards.
    pub fn with_error_policy<R>(policy: ErrorPolicy, f: impl FnOnce() -> R) -> R {
        let _guard = POLICY_LOCK.lock();
        let previous = config::set_error_policy(policy);
        let result = f();
        config::set_error_policy(previous);
        result
    }
}
