//! Interface descriptors.
//!
//! Floe replaces runtime reflection with explicit descriptors: an
//! [`InterfaceDef`] names an interface, the interfaces it extends, and the
//! typed method signatures it declares. Components declare a fixed list of
//! definitions at construction; proxies, injection and by-name invocation
//! all resolve against these descriptors.
//!
//! # Parameter Types
//!
//! Arguments travel as [`serde_json::Value`]. A [`ParamType`] describes the
//! declared shape of one parameter:
//!
//! | Variant | Runtime shape | Notes |
//! |---------|--------------|-------|
//! | `Bool`  | boolean | |
//! | `Int`   | integer number | i64 range |
//! | `Float` | fractional number | |
//! | `Char`  | single-character string | distinct coercion target |
//! | `Text`  | string | |
//! | `Any`   | anything | passed through untouched |
//!
//! `Null` arguments match every parameter type and pass through coercion
//! unchanged.
//!
//! # Example
//!
//! ```
//! use floe_component::{InterfaceDef, ParamType};
//!
//! let banana = InterfaceDef::new("Banana").method("return_an_int", []);
//! let peach = InterfaceDef::new("Peach")
//!     .method("set_taste", [ParamType::Int])
//!     .method("set_taste", [ParamType::Text])
//!     .method("set_taste", [ParamType::Text, ParamType::Int]);
//!
//! assert!(peach.declares("set_taste"));
//! assert_eq!(banana.methods().len(), 1);
//! ```

use floe_types::InterfaceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Declared shape of one method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    /// Boolean.
    Bool,
    /// Integer number (i64 range).
    Int,
    /// Fractional number (f64).
    Float,
    /// Single character, represented at runtime as a one-character string.
    Char,
    /// String.
    Text,
    /// Any value; passed through without coercion.
    Any,
}

impl ParamType {
    /// Returns whether `value`'s runtime shape matches this type exactly,
    /// without coercion.
    ///
    /// `Null` matches every type (the absent-value passthrough rule).
    /// Note that a one-character string matches both [`Char`](Self::Char)
    /// and [`Text`](Self::Text); overload declaration order breaks ties.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Self::Bool => value.is_boolean(),
            Self::Int => matches!(value, Value::Number(n) if n.is_i64() || n.is_u64()),
            Self::Float => matches!(value, Value::Number(n) if n.is_f64()),
            Self::Char => matches!(value.as_str(), Some(s) if s.chars().count() == 1),
            Self::Text => value.is_string(),
            Self::Any => true,
        }
    }

    /// Returns the lowercase type name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Char => "char",
            Self::Text => "text",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed signature of one declared method.
///
/// Several signatures may share a name (overloads); the invocation
/// dispatcher picks among them by exact match first, then coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    name: String,
    params: Vec<ParamType>,
}

impl MethodSig {
    /// Creates a signature from a method name and parameter types.
    #[must_use]
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ParamType>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameter types.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

/// Definition of one interface: identity, parents, declared methods.
///
/// The `extends` list carries the interface hierarchy. A proxy for an
/// interface can call methods declared on that interface or on any of its
/// transitive parents (that the target component also declares), and the
/// interceptor fallback resolves against the interface that actually
/// declares the invoked method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDef {
    id: InterfaceId,
    extends: Vec<InterfaceId>,
    methods: Vec<MethodSig>,
}

impl InterfaceDef {
    /// Creates an empty definition for the given interface id.
    #[must_use]
    pub fn new(id: impl Into<InterfaceId>) -> Self {
        Self {
            id: id.into(),
            extends: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declares a parent interface.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<InterfaceId>) -> Self {
        self.extends.push(parent.into());
        self
    }

    /// Declares a method signature.
    #[must_use]
    pub fn method(mut self, name: &str, params: impl IntoIterator<Item = ParamType>) -> Self {
        self.methods.push(MethodSig::new(name, params));
        self
    }

    /// Returns the interface id.
    #[must_use]
    pub fn id(&self) -> &InterfaceId {
        &self.id
    }

    /// Returns the directly declared parent interfaces.
    #[must_use]
    pub fn parents(&self) -> &[InterfaceId] {
        &self.extends
    }

    /// Returns the declared method signatures in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    /// Returns whether this interface declares a method with the name.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name() == name)
    }
}

/// Returns the interface ids reachable from `iface`: the interface itself
/// plus its transitive parents, resolved among `universe`.
///
/// Parents whose definitions are absent from `universe` are included as
/// leaves (their own parents cannot be followed).
#[must_use]
pub fn reachable(iface: &InterfaceId, universe: &[InterfaceDef]) -> Vec<InterfaceId> {
    let mut seen: HashSet<InterfaceId> = HashSet::new();
    let mut queue = vec![iface.clone()];
    let mut result = Vec::new();
    while let Some(next) = queue.pop() {
        if !seen.insert(next.clone()) {
            continue;
        }
        if let Some(def) = universe.iter().find(|d| d.id() == &next) {
            queue.extend(def.parents().iter().cloned());
        }
        result.push(next);
    }
    result
}

/// Returns whether a value of interface `provided` is assignable to a slot
/// accepting interface `accepted`.
///
/// Assignability is nominal: equal ids, or `accepted` is a transitive
/// parent of `provided` (resolved among `universe`, normally the providing
/// component's declared definitions).
#[must_use]
pub fn assignable(provided: &InterfaceId, accepted: &InterfaceId, universe: &[InterfaceDef]) -> bool {
    reachable(provided, universe).contains(accepted)
}
