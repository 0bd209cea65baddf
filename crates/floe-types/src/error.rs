//! Unified error interface for Floe.
//!
//! All Floe error types implement [`ErrorCode`] to provide machine-readable
//! codes and recoverability information, so callers can tell "wrong shape"
//! from "wrong value" without string-matching display output.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE
//! - Prefixed with the owning domain (`CONFIG_`, `COMPONENT_`, `INVOKE_`,
//!   `CONVERT_`)
//! - Stable once defined (API contract)
//!
//! # Example
//!
//! ```
//! use floe_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     NotFound(String),
//!     Busy,
//! }
//!
//! impl ErrorCode for MyError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::NotFound(_) => "MY_NOT_FOUND",
//!             Self::Busy => "MY_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! let err = MyError::Busy;
//! assert_eq!(err.code(), "MY_BUSY");
//! assert!(err.is_recoverable());
//! ```

/// Unified error code interface.
///
/// An error is recoverable when retrying the operation (or fixing the
/// caller-supplied input at runtime) may succeed; it is not recoverable
/// when the failure reflects a wiring or declaration mistake that will not
/// change on retry.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    ///
    /// UPPER_SNAKE_CASE, domain-prefixed, stable across versions.
    fn code(&self) -> &'static str;

    /// Returns whether the error is recoverable.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows Floe conventions.
///
/// # Checks
///
/// 1. Code is not empty
/// 2. Code starts with the expected prefix
/// 3. Code is UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if validation fails.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");

    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );

    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Validates multiple error codes at once.
///
/// Use this to verify all variants of an error enum in a single test.
///
/// # Panics
///
/// Panics if any code fails [`assert_error_code`].
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
