//! Invocation interception.
//!
//! An [`Interceptor`] wraps every proxy call routed through an interface:
//! it sees the resolved signature and coerced arguments, decides whether
//! and how to continue via [`Proceed`], and may rewrite the result. One
//! interceptor may be installed per declared interface; calls through an
//! interface with no interceptor of its own fall back to the interceptor
//! of the interface that declares the invoked method.
//!
//! # Example
//!
//! ```
//! use floe_component::{Interceptor, InvokeError, MethodSig, Proceed};
//! use serde_json::Value;
//!
//! /// Appends a fixed suffix to every textual result.
//! struct AppendSuffix(String);
//!
//! impl Interceptor for AppendSuffix {
//!     fn intercept(
//!         &self,
//!         method: &MethodSig,
//!         args: &[Value],
//!         proceed: Proceed<'_>,
//!     ) -> Result<Value, InvokeError> {
//!         let result = proceed.call(args)?;
//!         match result.as_str() {
//!             Some(s) => Ok(Value::from(format!("{s}{}", self.0))),
//!             None => Ok(result),
//!         }
//!     }
//! }
//! ```

use crate::interface::MethodSig;
use crate::invocation::{InvokeError, MethodHandler};
use serde_json::Value;

/// Continuation handed to an interceptor.
///
/// Calling [`Proceed::call`] runs the underlying bound handler. The
/// interceptor may call it zero, one or several times, and with arguments
/// of its choosing.
pub struct Proceed<'a> {
    sig: &'a MethodSig,
    handler: &'a MethodHandler,
}

impl<'a> Proceed<'a> {
    pub(crate) fn new(sig: &'a MethodSig, handler: &'a MethodHandler) -> Self {
        Self { sig, handler }
    }

    /// Runs the underlying handler with the given arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, InvokeError> {
        (self.handler)(args).map_err(|source| InvokeError::Target {
            method: self.sig.to_string(),
            source,
        })
    }
}

/// Hook around proxy invocations routed through one interface.
pub trait Interceptor {
    /// Handles one invocation.
    ///
    /// `method` is the resolved signature and `args` the already-coerced
    /// arguments. Call `proceed` to run the real handler.
    fn intercept(
        &self,
        method: &MethodSig,
        args: &[Value],
        proceed: Proceed<'_>,
    ) -> Result<Value, InvokeError>;
}
