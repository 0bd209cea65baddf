//! Component topology management.

use crate::layer::Layer;
use floe_component::{Component, ConfigError, Facade, Proxy};
use floe_types::{ComponentId, InterfaceId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info};

pub(crate) struct ClusterState {
    /// Internal id -> component. One component may hold several bindings.
    pub internal: BTreeMap<String, Component>,
    /// Externally connected components, in connection order.
    pub external: Vec<Component>,
    /// Internal id -> interfaces published through the layer.
    pub exposed: BTreeMap<String, Vec<InterfaceId>>,
}

/// A group of components wired together.
///
/// Components join a cluster in one of two roles. Internal components are
/// bound under an id and fully wired to each other: each receives proxies
/// to the others through its reference setters and registers the others
/// against its listener hooks. External components join anonymously
/// through the [`Facade`] and see only what [`expose`](Cluster::expose)
/// has published.
///
/// The cluster itself implements [`Facade`] as the unrestricted internal
/// view; [`layer`](Cluster::layer) returns the exposure-gated view handed
/// to externals.
///
/// Handles are cheap clones sharing one topology.
#[derive(Clone)]
pub struct Cluster {
    pub(crate) state: Rc<RefCell<ClusterState>>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ClusterState {
                internal: BTreeMap::new(),
                external: Vec::new(),
                exposed: BTreeMap::new(),
            })),
        }
    }

    /// Returns the exposure-gated view of this cluster.
    #[must_use]
    pub fn layer(&self) -> Layer {
        Layer::new(self.clone())
    }

    /// Connects a component internally under an id.
    ///
    /// The newcomer and every previously connected internal component
    /// exchange reference injections and listener registrations, and the
    /// newcomer registers the already-connected externals against its
    /// listener hooks. A component may be bound under several ids, but an
    /// externally connected component cannot join internally.
    pub fn connect(&self, id: &str, component: &Component) -> Result<(), ConfigError> {
        let (others, externals) = {
            let mut state = self.state.borrow_mut();
            if state.external.iter().any(|e| e == component) {
                return Err(ConfigError::ConnectedExternally {
                    component: component.id(),
                });
            }
            if state.internal.contains_key(id) {
                return Err(ConfigError::IdInUse { id: id.to_string() });
            }
            state.internal.insert(id.to_string(), component.clone());
            let others: Vec<(String, Component)> = state
                .internal
                .iter()
                .filter(|(other_id, _)| other_id.as_str() != id)
                .map(|(other_id, other)| (other_id.clone(), other.clone()))
                .collect();
            (others, state.external.clone())
        };

        info!(id, component = %component.id(), "connecting internal component");
        for (other_id, other) in &others {
            other.set_reference(self, id, &component.interfaces())?;
            component.set_reference(self, other_id, &other.interfaces())?;
            if other.id() != component.id() {
                other.register(component)?;
                component.register(other)?;
            }
        }
        for external in &externals {
            component.register(external)?;
        }
        Ok(())
    }

    /// Connects a component internally and immediately exposes interfaces
    /// under the same id.
    pub fn connect_exposed(
        &self,
        id: &str,
        component: &Component,
        interfaces: &[InterfaceId],
    ) -> Result<(), ConfigError> {
        self.connect(id, component)?;
        self.expose(id, interfaces)
    }

    /// Publishes interfaces of an internal component through the layer.
    ///
    /// Replaces any previous exposure under the id and re-synchronizes
    /// every external component: newly exposed interfaces are injected,
    /// withdrawn ones retracted. An empty list withdraws the exposure
    /// entirely.
    pub fn expose(&self, id: &str, interfaces: &[InterfaceId]) -> Result<(), ConfigError> {
        let (component, externals) = {
            let state = self.state.borrow();
            let component = state
                .internal
                .get(id)
                .cloned()
                .ok_or_else(|| ConfigError::NotConnected { id: id.to_string() })?;
            (component, state.external.clone())
        };

        for interface in interfaces {
            if !component.declares(interface) {
                return Err(ConfigError::UndeclaredInterface {
                    component: component.id(),
                    interface: interface.clone(),
                });
            }
        }

        {
            let mut state = self.state.borrow_mut();
            if interfaces.is_empty() {
                state.exposed.remove(id);
            } else {
                state.exposed.insert(id.to_string(), interfaces.to_vec());
            }
        }

        debug!(id, exposed = interfaces.len(), "exposure changed");
        let layer = self.layer();
        let universe = component.interfaces();
        for external in &externals {
            if interfaces.is_empty() {
                external.remove_dependency(id, &universe)?;
            } else {
                external.set_reference(&layer, id, &universe)?;
            }
        }
        Ok(())
    }

    /// Connects an external component through the facade.
    ///
    /// The newcomer receives proxies for every exposed service its
    /// reference setters accept, and is registered against the listener
    /// hooks of every internal component.
    pub fn connect_external(&self, component: &Component) -> Result<(), ConfigError> {
        let (exposed, internals) = {
            let mut state = self.state.borrow_mut();
            if state.external.iter().any(|e| e == component)
                || state.internal.values().any(|i| i == component)
            {
                return Err(ConfigError::AlreadyConnected {
                    component: component.id(),
                });
            }
            state.external.push(component.clone());
            let exposed: Vec<(String, Component)> = state
                .exposed
                .keys()
                .filter_map(|id| state.internal.get(id).map(|c| (id.clone(), c.clone())))
                .collect();
            (exposed, Self::distinct(state.internal.values()))
        };

        info!(component = %component.id(), "connecting external component");
        let layer = self.layer();
        for (id, source) in &exposed {
            component.set_reference(&layer, id, &source.interfaces())?;
        }
        for internal in &internals {
            internal.register(component)?;
        }
        Ok(())
    }

    /// Disconnects a component, whatever its role.
    ///
    /// An internal component is torn down for every id it was bound under:
    /// exposures are withdrawn from the externals, listener registrations
    /// undone in both directions, and reference injections into the other
    /// internals retracted. An external component has its injections and
    /// registrations undone. Disconnecting an unknown component is a
    /// no-op.
    pub fn disconnect(&self, component: &Component) -> Result<(), ConfigError> {
        let bound_ids = self.bound_ids(component);
        if !bound_ids.is_empty() {
            return self.disconnect_internal(component, &bound_ids);
        }

        let was_external = {
            let mut state = self.state.borrow_mut();
            let before = state.external.len();
            state.external.retain(|e| e != component);
            state.external.len() != before
        };
        if !was_external {
            debug!(component = %component.id(), "disconnect of unconnected component ignored");
            return Ok(());
        }

        info!(component = %component.id(), "disconnecting external component");
        let (exposed_ids, internals) = {
            let state = self.state.borrow();
            (
                state.exposed.keys().cloned().collect::<Vec<_>>(),
                Self::distinct(state.internal.values()),
            )
        };
        for id in &exposed_ids {
            let universe = {
                let state = self.state.borrow();
                state.internal.get(id).map(|c| c.interfaces())
            };
            if let Some(universe) = universe {
                component.remove_dependency(id, &universe)?;
            }
        }
        for internal in &internals {
            internal.unregister(component)?;
        }
        Ok(())
    }

    fn disconnect_internal(
        &self,
        component: &Component,
        bound_ids: &[String],
    ) -> Result<(), ConfigError> {
        info!(component = %component.id(), ids = ?bound_ids, "disconnecting internal component");
        let universe = component.interfaces();

        // Withdraw exposures and bindings first, so facade lookups made by
        // callbacks during teardown no longer see the component.
        let (others, externals, exposed_ids) = {
            let mut state = self.state.borrow_mut();
            let exposed_ids: Vec<String> = bound_ids
                .iter()
                .filter(|id| state.exposed.contains_key(*id))
                .cloned()
                .collect();
            for id in bound_ids {
                state.exposed.remove(id);
                state.internal.remove(id);
            }
            let others: Vec<(String, Component)> = state
                .internal
                .iter()
                .filter(|(_, other)| *other != component)
                .map(|(other_id, other)| (other_id.clone(), other.clone()))
                .collect();
            (others, state.external.clone(), exposed_ids)
        };

        for id in &exposed_ids {
            for external in &externals {
                external.remove_dependency(id, &universe)?;
            }
        }
        for external in &externals {
            component.unregister(external)?;
        }
        for (other_id, other) in &others {
            for id in bound_ids {
                other.remove_dependency(id, &universe)?;
            }
            component.remove_dependency(other_id, &other.interfaces())?;
            other.unregister(component)?;
            component.unregister(other)?;
        }
        Ok(())
    }

    /// Returns the ids an internal component is bound under.
    #[must_use]
    pub fn bound_ids(&self, component: &Component) -> Vec<String> {
        self.state
            .borrow()
            .internal
            .iter()
            .filter(|(_, c)| *c == component)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Returns the internal component bound under an id.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<Component> {
        self.state.borrow().internal.get(id).cloned()
    }

    /// Returns all internal ids.
    #[must_use]
    pub fn internal_ids(&self) -> Vec<String> {
        self.state.borrow().internal.keys().cloned().collect()
    }

    /// Returns the internal components, each once, in first-binding order.
    #[must_use]
    pub fn internal_components(&self) -> Vec<Component> {
        Self::distinct(self.state.borrow().internal.values())
    }

    /// Returns the external components in connection order.
    #[must_use]
    pub fn external_components(&self) -> Vec<Component> {
        self.state.borrow().external.clone()
    }

    /// Returns whether an id currently has a non-empty exposure.
    #[must_use]
    pub fn is_exposed(&self, id: &str) -> bool {
        self.state.borrow().exposed.contains_key(id)
    }

    /// Returns whether the component is connected in any role.
    #[must_use]
    pub fn is_connected(&self, component: &Component) -> bool {
        self.is_connected_internally(component) || self.is_connected_externally(component)
    }

    /// Returns whether the component holds at least one internal binding.
    #[must_use]
    pub fn is_connected_internally(&self, component: &Component) -> bool {
        self.state
            .borrow()
            .internal
            .values()
            .any(|c| c == component)
    }

    /// Returns whether the component is connected through the facade.
    #[must_use]
    pub fn is_connected_externally(&self, component: &Component) -> bool {
        self.state.borrow().external.iter().any(|c| c == component)
    }

    /// Returns the number of internal bindings.
    #[must_use]
    pub fn internal_len(&self) -> usize {
        self.state.borrow().internal.len()
    }

    /// Returns the number of external components.
    #[must_use]
    pub fn external_len(&self) -> usize {
        self.state.borrow().external.len()
    }

    fn distinct<'a>(components: impl Iterator<Item = &'a Component>) -> Vec<Component> {
        let mut seen: Vec<ComponentId> = Vec::new();
        let mut result = Vec::new();
        for component in components {
            if !seen.contains(&component.id()) {
                seen.push(component.id());
                result.push(component.clone());
            }
        }
        result
    }
}

/// Unrestricted internal view: every internal component is reachable under
/// its binding id with all of its declared interfaces.
impl Facade for Cluster {
    fn connect(&self, component: &Component) -> Result<(), ConfigError> {
        self.connect_external(component)
    }

    fn disconnect(&self, component: &Component) -> Result<(), ConfigError> {
        Cluster::disconnect(self, component)
    }

    fn exposed_component_ids(&self) -> Vec<String> {
        self.internal_ids()
    }

    fn exposed_interfaces(&self, id: &str) -> Result<Vec<InterfaceId>, ConfigError> {
        self.component(id)
            .map(|c| c.interface_ids())
            .ok_or_else(|| ConfigError::NotConnected { id: id.to_string() })
    }

    fn proxy(&self, id: &str, interface: &InterfaceId) -> Result<Proxy, ConfigError> {
        let component = self
            .component(id)
            .ok_or_else(|| ConfigError::NotConnected { id: id.to_string() })?;
        component
            .proxy(interface)
            .map_err(ConfigError::Wiring)
    }
}
