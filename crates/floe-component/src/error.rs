//! Error types for component wiring and topology configuration.

use crate::convert::ConvertError;
use crate::invocation::BoxError;
use floe_types::{ComponentId, ErrorCode, InterfaceId};
use thiserror::Error;

/// Failure inside one component wrapper.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The component does not declare the requested interface.
    #[error("component {component} does not declare interface '{interface}'")]
    InvalidInterface {
        /// Target component.
        component: ComponentId,
        /// Requested interface.
        interface: InterfaceId,
    },

    /// More than one property setter is registered for a key, so a bag
    /// injection cannot pick one.
    #[error("{count} setters registered for property '{key}'")]
    AmbiguousProperty {
        /// Ambiguous property key.
        key: String,
        /// Number of registered setters.
        count: usize,
    },

    /// A property value does not coerce to the declared type.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A setter or listener hook on the implementation returned an error.
    #[error("component callback failed during {context}")]
    Callback {
        /// What was being injected or registered.
        context: String,
        /// Implementation error.
        #[source]
        source: BoxError,
    },
}

impl ErrorCode for ComponentError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInterface { .. } => "COMPONENT_INVALID_INTERFACE",
            Self::AmbiguousProperty { .. } => "COMPONENT_AMBIGUOUS_PROPERTY",
            Self::Convert(_) => "COMPONENT_CONVERT_FAILED",
            Self::Callback { .. } => "COMPONENT_CALLBACK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Conversion and callback failures depend on runtime values; the
        // rest are declaration mistakes.
        matches!(self, Self::Convert(_) | Self::Callback { .. })
    }
}

/// Failure while configuring a cluster topology.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An internal component is already bound under the requested id.
    #[error("id '{id}' is already in use")]
    IdInUse {
        /// Requested internal id.
        id: String,
    },

    /// The component is already connected externally to this cluster.
    #[error("component {component} is already connected")]
    AlreadyConnected {
        /// Offending component.
        component: ComponentId,
    },

    /// The component cannot join internally while connected externally.
    #[error("component {component} is connected externally")]
    ConnectedExternally {
        /// Offending component.
        component: ComponentId,
    },

    /// No internal component is bound under the id.
    #[error("no component connected as '{id}'")]
    NotConnected {
        /// Requested internal id.
        id: String,
    },

    /// The id names no exposed component.
    #[error("no component exposed as '{id}'")]
    NotExposed {
        /// Requested exposed id.
        id: String,
    },

    /// The component is exposed, but not through the requested interface.
    #[error("interface '{interface}' is not exposed for '{id}'")]
    InterfaceNotExposed {
        /// Exposed id.
        id: String,
        /// Requested interface.
        interface: InterfaceId,
    },

    /// An exposure names an interface the component does not declare.
    #[error("component {component} does not declare exposed interface '{interface}'")]
    UndeclaredInterface {
        /// Component being exposed.
        component: ComponentId,
        /// Undeclared interface.
        interface: InterfaceId,
    },

    /// A wiring step on a component failed.
    #[error(transparent)]
    Wiring(#[from] ComponentError),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::IdInUse { .. } => "CONFIG_ID_IN_USE",
            Self::AlreadyConnected { .. } => "CONFIG_ALREADY_CONNECTED",
            Self::ConnectedExternally { .. } => "CONFIG_CONNECTED_EXTERNALLY",
            Self::NotConnected { .. } => "CONFIG_NOT_CONNECTED",
            Self::NotExposed { .. } => "CONFIG_NOT_EXPOSED",
            Self::InterfaceNotExposed { .. } => "CONFIG_INTERFACE_NOT_EXPOSED",
            Self::UndeclaredInterface { .. } => "CONFIG_UNDECLARED_INTERFACE",
            Self::Wiring(_) => "CONFIG_WIRING_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Wiring(inner) => inner.is_recoverable(),
            // Topology can change at runtime, so lookups may succeed later.
            Self::NotConnected { .. } | Self::NotExposed { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_types::assert_error_codes;

    #[test]
    fn component_error_codes_valid() {
        let id = ComponentId::new();
        assert_error_codes(
            &[
                ComponentError::InvalidInterface {
                    component: id,
                    interface: "Apple".into(),
                },
                ComponentError::AmbiguousProperty {
                    key: "taste".into(),
                    count: 2,
                },
                ComponentError::Convert(ConvertError::Arity {
                    expected: 1,
                    actual: 0,
                }),
                ComponentError::Callback {
                    context: "reference 'banana'".into(),
                    source: "boom".into(),
                },
            ],
            "COMPONENT_",
        );
    }

    #[test]
    fn config_error_codes_valid() {
        let id = ComponentId::new();
        assert_error_codes(
            &[
                ConfigError::IdInUse { id: "apple".into() },
                ConfigError::AlreadyConnected { component: id },
                ConfigError::ConnectedExternally { component: id },
                ConfigError::NotConnected { id: "apple".into() },
                ConfigError::NotExposed { id: "apple".into() },
                ConfigError::InterfaceNotExposed {
                    id: "apple".into(),
                    interface: "Apple".into(),
                },
                ConfigError::UndeclaredInterface {
                    component: id,
                    interface: "Apple".into(),
                },
                ConfigError::Wiring(ComponentError::AmbiguousProperty {
                    key: "taste".into(),
                    count: 2,
                }),
            ],
            "CONFIG_",
        );
    }

    #[test]
    fn wiring_recoverability_follows_inner() {
        let recoverable = ConfigError::Wiring(ComponentError::Callback {
            context: "x".into(),
            source: "boom".into(),
        });
        assert!(recoverable.is_recoverable());
        assert!(!ConfigError::IdInUse { id: "a".into() }.is_recoverable());
    }
}
