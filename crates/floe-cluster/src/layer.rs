//! Exposure-gated view of a cluster.

use crate::cluster::Cluster;
use floe_component::{Component, ConfigError, Facade, Proxy};
use floe_types::InterfaceId;

/// The restricted face a cluster shows to external components.
///
/// A layer only reaches what the cluster has exposed: services are visible
/// under their exposed id and only through the interfaces in their
/// exposure list. Connecting and disconnecting through a layer is the same
/// as through the cluster.
///
/// ```
/// use floe_cluster::Cluster;
/// use floe_component::Facade;
/// use floe_component::testing;
///
/// let cluster = Cluster::new();
/// let (banana, _) = testing::banana();
/// cluster.connect("banana", &banana).unwrap();
///
/// let layer = cluster.layer();
/// assert!(layer.proxy("banana", &"Banana".into()).is_err());
///
/// cluster.expose("banana", &["Banana".into()]).unwrap();
/// let proxy = layer.proxy("banana", &"Banana".into()).unwrap();
/// assert_eq!(proxy.call("return_an_int", &[]).unwrap(), 27);
/// ```
#[derive(Clone)]
pub struct Layer {
    cluster: Cluster,
}

impl Layer {
    pub(crate) fn new(cluster: Cluster) -> Self {
        Self { cluster }
    }
}

impl Facade for Layer {
    fn connect(&self, component: &Component) -> Result<(), ConfigError> {
        self.cluster.connect_external(component)
    }

    fn disconnect(&self, component: &Component) -> Result<(), ConfigError> {
        self.cluster.disconnect(component)
    }

    fn exposed_component_ids(&self) -> Vec<String> {
        self.cluster.state.borrow().exposed.keys().cloned().collect()
    }

    fn exposed_interfaces(&self, id: &str) -> Result<Vec<InterfaceId>, ConfigError> {
        self.cluster
            .state
            .borrow()
            .exposed
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigError::NotExposed { id: id.to_string() })
    }

    fn proxy(&self, id: &str, interface: &InterfaceId) -> Result<Proxy, ConfigError> {
        let (component, exposure) = {
            let state = self.cluster.state.borrow();
            let exposure = state
                .exposed
                .get(id)
                .cloned()
                .ok_or_else(|| ConfigError::NotExposed { id: id.to_string() })?;
            let component = state
                .internal
                .get(id)
                .cloned()
                .ok_or_else(|| ConfigError::NotConnected { id: id.to_string() })?;
            (component, exposure)
        };
        if !exposure.contains(interface) {
            return Err(ConfigError::InterfaceNotExposed {
                id: id.to_string(),
                interface: interface.clone(),
            });
        }
        component.proxy(interface).map_err(ConfigError::Wiring)
    }
}
