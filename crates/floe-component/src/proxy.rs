//! Typed call handles to components.

use crate::component::ComponentInner;
use crate::interceptor::Proceed;
use crate::interface::reachable;
use crate::invocation::{self, InvokeError, MethodEntry};
use floe_types::{ComponentId, InterfaceId};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Weak;

/// Call handle to one component, scoped to one interface.
///
/// A proxy routes by-name invocations to the methods visible through its
/// interface: the interface's own declarations plus those of its
/// transitive parents that the component also declares. The component is
/// held weakly, so a proxy never keeps its target alive; calling a proxy
/// whose target is gone fails with [`InvokeError::Detached`].
///
/// Equality is by target identity and interface, not by handle: two
/// proxies for the same component and interface are equal regardless of
/// how they were obtained.
#[derive(Clone)]
pub struct Proxy {
    target: Weak<RefCell<ComponentInner>>,
    component: ComponentId,
    interface: InterfaceId,
}

impl Proxy {
    pub(crate) fn new(
        target: Weak<RefCell<ComponentInner>>,
        component: ComponentId,
        interface: InterfaceId,
    ) -> Self {
        Self {
            target,
            component,
            interface,
        }
    }

    /// Returns the identity of the target component.
    #[must_use]
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Returns the interface this proxy routes through.
    #[must_use]
    pub fn interface(&self) -> &InterfaceId {
        &self.interface
    }

    /// Returns whether the target component still exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Invokes a method by name through this proxy.
    ///
    /// Resolution follows the declared overloads visible through the
    /// proxy's interface: exact signature match first, coercion in
    /// declaration order second. If the target declares an interceptor
    /// for the proxy's interface (or, failing that, for the interface
    /// declaring the resolved method), the call runs through it.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let Some(rc) = self.target.upgrade() else {
            return Err(InvokeError::Detached {
                interface: self.interface.clone(),
            });
        };

        let (sig, handler, coerced, interceptor) = {
            let inner = rc.borrow();
            let visible = reachable(&self.interface, &inner.interfaces);
            let candidates: Vec<MethodEntry> = inner
                .methods
                .iter()
                .filter(|e| visible.contains(&e.interface))
                .cloned()
                .collect();
            let (entry, coerced) = invocation::resolve(&candidates, method, args)?;
            let interceptor = inner
                .interceptors
                .get(&self.interface)
                .or_else(|| inner.interceptors.get(&entry.interface))
                .cloned();
            (entry.sig.clone(), entry.handler.clone(), coerced, interceptor)
        };

        // The borrow is gone, so the handler may re-enter this component.
        match interceptor {
            Some(interceptor) => interceptor.intercept(&sig, &coerced, Proceed::new(&sig, &handler)),
            None => handler(&coerced).map_err(|source| InvokeError::Target {
                method: sig.to_string(),
                source,
            }),
        }
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component && self.interface == other.interface
    }
}

impl Eq for Proxy {}

impl Hash for Proxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component.hash(state);
        self.interface.hash(state);
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("component", &self.component)
            .field("interface", &self.interface)
            .field("attached", &self.is_attached())
            .finish()
    }
}
