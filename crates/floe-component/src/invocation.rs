//! Method dispatch by name over declared signatures.
//!
//! A component binds each declared [`MethodSig`] to a handler closure at
//! construction. Invocation by name resolves among the bound entries in
//! two passes:
//!
//! 1. exact pass: first entry (declaration order) whose name matches and
//!    whose every parameter matches the argument shape without coercion
//! 2. coercion pass: entries with the right name and arity are tried in
//!    declaration order; the first whose arguments all coerce wins
//!
//! If only coercion failures were seen, the last one is reported as
//! [`InvokeError::Argument`]; with no name/arity candidate at all the
//! result is [`InvokeError::NoSuchMethod`]. Handler failures surface as
//! [`InvokeError::Target`] with the implementation error preserved as the
//! source.

use crate::convert::{self, ConvertError};
use crate::interface::MethodSig;
use floe_types::{ErrorCode, InterfaceId};
use serde_json::Value;
use std::rc::Rc;
use thiserror::Error;

/// Boxed implementation-side error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handler bound to one declared method signature.
pub type MethodHandler = Rc<dyn Fn(&[Value]) -> Result<Value, BoxError>>;

/// One bound method: the declaring interface, its signature, its handler.
#[derive(Clone)]
pub(crate) struct MethodEntry {
    pub interface: InterfaceId,
    pub sig: MethodSig,
    pub handler: MethodHandler,
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry")
            .field("interface", &self.interface)
            .field("sig", &self.sig)
            .finish_non_exhaustive()
    }
}

/// Invocation failure.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No declared method has the given name and arity.
    #[error("no method '{method}' taking {arity} arguments")]
    NoSuchMethod {
        /// Requested method name.
        method: String,
        /// Supplied argument count.
        arity: usize,
    },

    /// Arity-matched overloads exist but no argument list coerces.
    #[error("arguments do not fit any '{method}' overload")]
    Argument {
        /// Requested method name.
        method: String,
        /// Last coercion failure seen while scanning overloads.
        #[source]
        source: ConvertError,
    },

    /// The handler ran and returned an error.
    #[error("method '{method}' failed")]
    Target {
        /// Invoked method signature.
        method: String,
        /// Implementation error, preserved for `source()` chains.
        #[source]
        source: BoxError,
    },

    /// The proxy's target component has been dropped.
    #[error("target of '{interface}' proxy no longer exists")]
    Detached {
        /// Interface the proxy was created for.
        interface: InterfaceId,
    },
}

impl ErrorCode for InvokeError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoSuchMethod { .. } => "INVOKE_NO_SUCH_METHOD",
            Self::Argument { .. } => "INVOKE_ARGUMENT_MISMATCH",
            Self::Target { .. } => "INVOKE_TARGET_FAILED",
            Self::Detached { .. } => "INVOKE_DETACHED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Target failures depend on the implementation; argument problems
        // can be fixed by the caller at runtime.
        matches!(self, Self::Argument { .. } | Self::Target { .. })
    }
}

/// Resolves a by-name invocation among candidate entries.
///
/// Returns the chosen entry and the (possibly coerced) argument list.
/// Candidates must be in declaration order.
pub(crate) fn resolve<'a>(
    candidates: &'a [MethodEntry],
    method: &str,
    args: &[Value],
) -> Result<(&'a MethodEntry, Vec<Value>), InvokeError> {
    // Exact pass.
    for entry in candidates {
        if entry.sig.name() == method
            && entry.sig.arity() == args.len()
            && entry
                .sig
                .params()
                .iter()
                .zip(args)
                .all(|(p, a)| p.matches(a))
        {
            return Ok((entry, args.to_vec()));
        }
    }

    // Coercion pass, remembering the last failure.
    let mut last_convert: Option<ConvertError> = None;
    for entry in candidates {
        if entry.sig.name() != method || entry.sig.arity() != args.len() {
            continue;
        }
        match convert::coerce_all(args, entry.sig.params()) {
            Ok(coerced) => return Ok((entry, coerced)),
            Err(err) => last_convert = Some(err),
        }
    }

    match last_convert {
        Some(source) => Err(InvokeError::Argument {
            method: method.to_string(),
            source,
        }),
        None => Err(InvokeError::NoSuchMethod {
            method: method.to_string(),
            arity: args.len(),
        }),
    }
}
