//! Type coercion between loosely-typed values.
//!
//! Reflective invocation and property injection accept loosely-typed input
//! (as from configuration text). This module converts a
//! [`serde_json::Value`] to the shape a declared [`ParamType`] requires:
//! numbers narrow and widen, strings parse, booleans follow the character
//! table below, and anything coerces to text via its display form.
//!
//! # Boolean parsing
//!
//! | Input | Result |
//! |-------|--------|
//! | boolean | itself |
//! | number | `false` iff zero |
//! | 1-char string `n`, `N`, `f`, `F`, `0` | `false` |
//! | any other 1-char string | `true` |
//! | longer string | `true` iff case-insensitive `"true"` |
//!
//! # Errors
//!
//! Unparsable numeric text is [`ConvertError::NumberFormat`], distinct
//! from the general [`ConvertError::Unsupported`], so callers can tell
//! "wrong value" from "wrong shape". Element-wise coercion with a length
//! mismatch is always [`ConvertError::Arity`].
//!
//! # Example
//!
//! ```
//! use floe_component::convert;
//! use serde_json::json;
//!
//! assert_eq!(convert::to_i64(&json!("27")).unwrap(), 27);
//! assert_eq!(convert::to_i64(&json!(27.9)).unwrap(), 27);
//! assert!(!convert::to_bool(&json!("N")).unwrap());
//! assert!(convert::to_i64(&json!("three")).is_err());
//! ```

use crate::interface::ParamType;
use floe_types::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Coercion failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ConvertError {
    /// Text that should denote a number does not parse.
    ///
    /// Recoverable: the value can be corrected at runtime.
    #[error("'{value}' is not a valid {target}")]
    NumberFormat {
        /// Offending input, rendered as text.
        value: String,
        /// Target type name.
        target: &'static str,
    },

    /// No conversion exists between the source shape and the target type.
    ///
    /// Not recoverable: the declaration or call site is wrong.
    #[error("can not convert '{value}' ({from}) to {target}")]
    Unsupported {
        /// Offending input, rendered as text.
        value: String,
        /// Source shape name.
        from: &'static str,
        /// Target type name.
        target: &'static str,
    },

    /// Argument list length does not match the parameter list length.
    ///
    /// Not recoverable: the call site is wrong.
    #[error("expected {expected} arguments, got {actual}")]
    Arity {
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
}

impl ErrorCode for ConvertError {
    fn code(&self) -> &'static str {
        match self {
            Self::NumberFormat { .. } => "CONVERT_NUMBER_FORMAT",
            Self::Unsupported { .. } => "CONVERT_UNSUPPORTED",
            Self::Arity { .. } => "CONVERT_ARITY_MISMATCH",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::NumberFormat { .. })
    }
}

/// Returns the shape name of a value, for error messages.
#[must_use]
pub fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_format(value: &Value, target: &'static str) -> ConvertError {
    ConvertError::NumberFormat {
        value: to_text(value),
        target,
    }
}

fn unsupported(value: &Value, target: &'static str) -> ConvertError {
    ConvertError::Unsupported {
        value: to_text(value),
        from: value_shape(value),
        target,
    }
}

/// Converts a value to an integer.
///
/// Fractional numbers truncate toward zero; strings parse; booleans and
/// other shapes parse via their text form and fail as
/// [`ConvertError::NumberFormat`].
pub fn to_i64(value: &Value) -> Result<i64, ConvertError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f as i64)
            } else {
                Err(number_format(value, "int"))
            }
        }
        Value::String(s) => s.trim().parse().map_err(|_| number_format(value, "int")),
        Value::Bool(_) => Err(number_format(value, "int")),
        _ => Err(unsupported(value, "int")),
    }
}

/// Converts a value to a float.
///
/// Strings parse with the standard float grammar (including `inf` and
/// `NaN` spellings).
pub fn to_f64(value: &Value) -> Result<f64, ConvertError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| number_format(value, "float")),
        Value::String(s) => s.trim().parse().map_err(|_| number_format(value, "float")),
        Value::Bool(_) => Err(number_format(value, "float")),
        _ => Err(unsupported(value, "float")),
    }
}

/// Converts a value to a boolean.
///
/// See the module-level parsing table.
pub fn to_bool(value: &Value) -> Result<bool, ConvertError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(!matches!(c, 'n' | 'N' | 'f' | 'F' | '0')),
                _ => Ok(s.eq_ignore_ascii_case("true")),
            }
        }
        _ => Err(unsupported(value, "bool")),
    }
}

/// Converts a value to a character.
///
/// Integers are interpreted as Unicode code points; everything else goes
/// through its text form, taking the first character (`'\0'` for empty
/// text).
pub fn to_char(value: &Value) -> Result<char, ConvertError> {
    match value {
        Value::Number(_) => {
            let code = to_i64(value)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| number_format(value, "char"))
        }
        Value::Array(_) | Value::Object(_) => Err(unsupported(value, "char")),
        _ => Ok(to_text(value).chars().next().unwrap_or('\0')),
    }
}

/// Renders a value as text.
///
/// Strings render verbatim; other shapes use their JSON display form.
#[must_use]
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces one value to the given target type.
///
/// Values already of the target shape are returned unchanged, as is
/// `Null` (the absent-value passthrough rule).
pub fn coerce(value: &Value, target: ParamType) -> Result<Value, ConvertError> {
    if value.is_null() || target.matches(value) {
        return Ok(value.clone());
    }
    match target {
        ParamType::Any => Ok(value.clone()),
        ParamType::Bool => to_bool(value).map(Value::from),
        ParamType::Int => to_i64(value).map(Value::from),
        ParamType::Float => to_f64(value).map(Value::from),
        ParamType::Char => to_char(value).map(|c| Value::from(c.to_string())),
        ParamType::Text => Ok(Value::from(to_text(value))),
    }
}

/// Coerces an argument list element-wise to a parameter list.
///
/// Elements already of the declared shape pass through; a length mismatch
/// is always [`ConvertError::Arity`].
pub fn coerce_all(args: &[Value], params: &[ParamType]) -> Result<Vec<Value>, ConvertError> {
    if args.len() != params.len() {
        return Err(ConvertError::Arity {
            expected: params.len(),
            actual: args.len(),
        });
    }
    args.iter()
        .zip(params)
        .map(|(arg, param)| coerce(arg, *param))
        .collect()
}
