//! Outward face of a component topology.

use crate::component::Component;
use crate::error::ConfigError;
use crate::proxy::Proxy;
use floe_types::InterfaceId;

/// Restricted view of a topology, offered to external components.
///
/// A facade lets an outside component join and leave the topology and
/// reach the services the topology chose to expose. It deliberately hides
/// internal wiring: no internal ids, no unexposed interfaces.
///
/// Components receive a facade during [`connect`](Facade::connect) wiring
/// and may hold on to it for the duration of their membership.
pub trait Facade {
    /// Connects an external component.
    ///
    /// The component receives proxies for every currently exposed service
    /// it can accept, and is registered as a listener with the topology's
    /// members.
    fn connect(&self, component: &Component) -> Result<(), ConfigError>;

    /// Disconnects a previously connected external component.
    ///
    /// Injected proxies are retracted and listener registrations undone.
    /// Disconnecting a component that is not connected is a no-op.
    fn disconnect(&self, component: &Component) -> Result<(), ConfigError>;

    /// Returns the ids under which services are currently exposed.
    fn exposed_component_ids(&self) -> Vec<String>;

    /// Returns the interfaces exposed under an id.
    fn exposed_interfaces(&self, id: &str) -> Result<Vec<InterfaceId>, ConfigError>;

    /// Returns a proxy for an exposed service.
    fn proxy(&self, id: &str, interface: &InterfaceId) -> Result<Proxy, ConfigError>;
}
