//! Identifier types for Floe.
//!
//! Component identity is UUID-based; interface identity is name-based.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of one component wrapper.
///
/// Minted once when an implementation object is wrapped, and used for all
/// listener and topology bookkeeping in place of reference equality. Two
/// handles to the same wrapper carry the same `ComponentId`; wrapping the
/// same implementation twice produces two distinct identities.
///
/// # Example
///
/// ```
/// use floe_types::ComponentId;
///
/// let id = ComponentId::new();
/// assert!(format!("{id}").starts_with("cmp:"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// Creates a new unique component identity (UUID v4).
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmp:{}", self.0)
    }
}

/// Name of an interface a component may declare, expose or have injected.
///
/// Interfaces are nominal: two [`InterfaceId`]s are the same interface iff
/// their names are equal. The interface's method signatures and parents
/// live in `floe_component::InterfaceDef`; this type is only the key.
///
/// # Example
///
/// ```
/// use floe_types::InterfaceId;
///
/// let a = InterfaceId::new("Banana");
/// let b: InterfaceId = "Banana".into();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterfaceId(String);

impl InterfaceId {
    /// Creates an interface id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the interface name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InterfaceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for InterfaceId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
