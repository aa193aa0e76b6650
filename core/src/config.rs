//! Process-wide settings.
//!
//! The only global knob is the error policy, which decides whether a tagged
//! choice that meets an unknown key while reading fails hard or logs a
//! warning and reports the input as unreadable.

use core::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;

/// Environment variable read once, on first use of the policy.
///
/// `1`, `true` and `yes` (any case) select [`ErrorPolicy::Strict`].
pub const ERRORS_ARE_FATAL_ENV: &str = "REMOLD_ERRORS_ARE_FATAL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Unknown keys are logged and the value is reported as unreadable.
    #[default]
    Lenient,
    /// Unknown keys abort the read with a [`crate::SchemaError`].
    Strict,
}

static ERRORS_ARE_FATAL: Lazy<AtomicBool> = Lazy::new(|| {
    let strict = std::env::var(ERRORS_ARE_FATAL_ENV)
        .map(|value| parse_flag(&value))
        .unwrap_or(false);
    AtomicBool::new(strict)
});

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

pub fn error_policy() -> ErrorPolicy {
    if errors_are_fatal() {
        ErrorPolicy::Strict
    } else {
        ErrorPolicy::Lenient
    }
}

/// Replaces the current policy and returns the previous one.
pub fn set_error_policy(policy: ErrorPolicy) -> ErrorPolicy {
    let strict = policy == ErrorPolicy::Strict;
    if ERRORS_ARE_FATAL.swap(strict, Ordering::SeqCst) {
        ErrorPolicy::Strict
    } else {
        ErrorPolicy::Lenient
    }
}

#[inline]
pub fn errors_are_fatal() -> bool {
    ERRORS_ARE_FATAL.load(Ordering::SeqCst)
}
