//! The component wrapper.
//!
//! A [`Component`] wraps one implementation object behind explicit
//! registration tables: declared interfaces, bound methods, property and
//! reference setters, listener hooks. The wrapper owns the implementation
//! through `Rc<RefCell<_>>`, so the whole model is single-threaded; handles
//! are cheap clones sharing the same identity.
//!
//! Wiring operations follow a snapshot-then-act discipline: the plan is
//! collected under a short borrow, the borrow is dropped, and only then do
//! implementation callbacks run. Callbacks may therefore call back into
//! this component (through a proxy) without deadlocking the `RefCell`.

use crate::error::ComponentError;
use crate::facade::Facade;
use crate::interface::{assignable, InterfaceDef, ParamType};
use crate::invocation::{self, BoxError, InvokeError, MethodEntry};
use crate::interceptor::Interceptor;
use crate::properties::{Properties, PROPERTIES_KEY};
use crate::proxy::Proxy;
use floe_types::{ComponentId, InterfaceId};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub(crate) type PropertyFn = Rc<dyn Fn(&Value) -> Result<(), BoxError>>;
pub(crate) type ReferenceFn = Rc<dyn Fn(Option<Proxy>) -> Result<(), BoxError>>;
pub(crate) type ListenerFn = Rc<dyn Fn(Proxy) -> Result<(), BoxError>>;
pub(crate) type SinkFn = Rc<dyn Fn(&Properties) -> Result<(), BoxError>>;

/// One registered property setter.
#[derive(Clone)]
pub(crate) struct PropertySetter {
    pub param: ParamType,
    pub set: PropertyFn,
}

/// One registered reference setter.
#[derive(Clone)]
pub(crate) struct ReferenceSetter {
    pub key: String,
    pub accepts: InterfaceId,
    pub set: ReferenceFn,
}

/// Register/unregister hook pair for one listener interface.
#[derive(Clone)]
pub(crate) struct ListenerHooks {
    pub register: ListenerFn,
    pub unregister: ListenerFn,
}

/// Shared state behind a [`Component`] handle.
pub(crate) struct ComponentInner {
    pub id: ComponentId,
    pub interfaces: Vec<InterfaceDef>,
    pub methods: Vec<MethodEntry>,
    pub property_setters: HashMap<String, Vec<PropertySetter>>,
    pub properties_sink: Option<SinkFn>,
    pub reference_setters: Vec<ReferenceSetter>,
    pub listener_hooks: BTreeMap<InterfaceId, ListenerHooks>,
    pub interceptors: HashMap<InterfaceId, Rc<dyn Interceptor>>,
    /// Exposed id -> interfaces currently injected from that service.
    pub injected: HashMap<String, BTreeSet<InterfaceId>>,
    /// Listener source component -> proxies handed to our hooks.
    pub listeners: HashMap<ComponentId, BTreeMap<InterfaceId, Proxy>>,
    /// Raw values delivered through property setters, for inspection.
    pub setter_injected: Properties,
}

/// Handle to one wrapped component.
///
/// Clones share identity: two handles compare equal iff they wrap the same
/// underlying component. Wrapping the same implementation twice produces
/// two independent components.
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Rc<RefCell<ComponentInner>>,
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Component")
            .field("id", &inner.id)
            .field(
                "interfaces",
                &inner.interfaces.iter().map(InterfaceDef::id).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Component {
    pub(crate) fn from_inner(inner: ComponentInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Returns the component's stable identity.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.inner.borrow().id
    }

    /// Returns the declared interface definitions.
    #[must_use]
    pub fn interfaces(&self) -> Vec<InterfaceDef> {
        self.inner.borrow().interfaces.clone()
    }

    /// Returns the declared interface ids.
    #[must_use]
    pub fn interface_ids(&self) -> Vec<InterfaceId> {
        self.inner
            .borrow()
            .interfaces
            .iter()
            .map(|d| d.id().clone())
            .collect()
    }

    /// Returns whether the component directly declares an interface.
    #[must_use]
    pub fn declares(&self, interface: &InterfaceId) -> bool {
        self.inner
            .borrow()
            .interfaces
            .iter()
            .any(|d| d.id() == interface)
    }

    /// Creates a proxy for one declared interface.
    ///
    /// The proxy holds the component weakly; calls after the component is
    /// dropped fail with [`InvokeError::Detached`].
    pub fn proxy(&self, interface: &InterfaceId) -> Result<Proxy, ComponentError> {
        if !self.declares(interface) {
            return Err(ComponentError::InvalidInterface {
                component: self.id(),
                interface: interface.clone(),
            });
        }
        Ok(Proxy::new(
            Rc::downgrade(&self.inner),
            self.id(),
            interface.clone(),
        ))
    }

    /// Invokes a declared method by name, without proxy routing.
    ///
    /// All declared interfaces are searched in declaration order, exact
    /// signature matches first, then coercion.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let (sig, handler, coerced) = {
            let inner = self.inner.borrow();
            let (entry, coerced) = invocation::resolve(&inner.methods, method, args)?;
            (entry.sig.clone(), entry.handler.clone(), coerced)
        };
        handler(&coerced).map_err(|source| InvokeError::Target {
            method: sig.to_string(),
            source,
        })
    }

    /// Installs an interceptor on one declared interface, replacing any
    /// previous one.
    ///
    /// Proxy calls routed through that interface run through the
    /// interceptor; direct [`invoke`](Self::invoke) does not.
    pub fn set_invocation_interceptor(
        &self,
        interface: &InterfaceId,
        interceptor: Rc<dyn Interceptor>,
    ) -> Result<(), ComponentError> {
        if !self.declares(interface) {
            return Err(ComponentError::InvalidInterface {
                component: self.id(),
                interface: interface.clone(),
            });
        }
        self.inner
            .borrow_mut()
            .interceptors
            .insert(interface.clone(), interceptor);
        Ok(())
    }

    /// Injects configuration properties.
    ///
    /// For each key with exactly one registered setter, the value is
    /// coerced to the declared type and delivered; keys with no setter are
    /// skipped, keys with several setters fail with
    /// [`ComponentError::AmbiguousProperty`]. A registered whole-bag sink
    /// runs after the per-key pass. Delivered raw values are recorded and
    /// visible through [`injected_properties`](Self::injected_properties);
    /// a sink delivery is recorded under [`PROPERTIES_KEY`].
    pub fn set_properties(&self, props: &Properties) -> Result<(), ComponentError> {
        let (setters, sink) = {
            let inner = self.inner.borrow();
            (inner.property_setters.clone(), inner.properties_sink.clone())
        };

        let mut recorded: Vec<(String, Value)> = Vec::new();
        let result = (|| {
            for (key, value) in props.iter() {
                let Some(candidates) = setters.get(key) else {
                    continue;
                };
                match candidates.as_slice() {
                    [] => {}
                    [setter] => {
                        let coerced = crate::convert::coerce(value, setter.param)?;
                        (setter.set)(&coerced).map_err(|source| ComponentError::Callback {
                            context: format!("property '{key}'"),
                            source,
                        })?;
                        recorded.push((key.to_string(), value.clone()));
                    }
                    many => {
                        return Err(ComponentError::AmbiguousProperty {
                            key: key.to_string(),
                            count: many.len(),
                        });
                    }
                }
            }
            if let Some(sink) = sink {
                sink(props).map_err(|source| ComponentError::Callback {
                    context: format!("property sink '{PROPERTIES_KEY}'"),
                    source,
                })?;
                recorded.push((
                    PROPERTIES_KEY.to_string(),
                    serde_json::to_value(props).unwrap_or(Value::Null),
                ));
            }
            Ok(())
        })();

        if !recorded.is_empty() {
            let mut inner = self.inner.borrow_mut();
            for (key, value) in recorded {
                inner.setter_injected.insert(key, value);
            }
        }
        result
    }

    /// Returns the raw property values delivered so far.
    #[must_use]
    pub fn injected_properties(&self) -> Properties {
        self.inner.borrow().setter_injected.clone()
    }

    /// Re-synchronizes reference injections from one exposed service.
    ///
    /// The facade's current exposure under `id` is diffed against what was
    /// injected before. Only reference setters registered for the
    /// dependency id `id` take part: those accepting a newly exposed
    /// interface receive a proxy, those accepting a withdrawn interface
    /// receive `None`. Exposed interfaces no setter consumed are not
    /// recorded as injected. `universe` supplies the interface hierarchy
    /// of the exposing component, for assignability.
    pub fn set_reference(
        &self,
        facade: &dyn Facade,
        id: &str,
        universe: &[InterfaceDef],
    ) -> Result<(), ComponentError> {
        let now: BTreeSet<InterfaceId> = facade
            .exposed_interfaces(id)
            .unwrap_or_default()
            .into_iter()
            .collect();
        self.apply_reference(id, now, Some(facade), universe)
    }

    /// Withdraws every injection previously made from one exposed service.
    ///
    /// Matched setters receive `None`. A no-op if nothing was injected.
    pub fn remove_dependency(
        &self,
        id: &str,
        universe: &[InterfaceDef],
    ) -> Result<(), ComponentError> {
        self.apply_reference(id, BTreeSet::new(), None, universe)
    }

    /// Returns the interfaces currently injected from one exposed service.
    #[must_use]
    pub fn injected_interfaces(&self, id: &str) -> Vec<InterfaceId> {
        self.inner
            .borrow()
            .injected
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn apply_reference(
        &self,
        id: &str,
        now: BTreeSet<InterfaceId>,
        facade: Option<&dyn Facade>,
        universe: &[InterfaceDef],
    ) -> Result<(), ComponentError> {
        // Only the setters registered for this dependency id take part.
        let (before, setters) = {
            let inner = self.inner.borrow();
            let setters: Vec<ReferenceSetter> = inner
                .reference_setters
                .iter()
                .filter(|s| s.key == id)
                .cloned()
                .collect();
            (inner.injected.get(id).cloned().unwrap_or_default(), setters)
        };

        // A setter matched by both a withdrawn and a remaining interface
        // still sees the withdrawal; it is not re-injected.
        for iface in before.difference(&now) {
            for setter in setters
                .iter()
                .filter(|s| assignable(iface, &s.accepts, universe))
            {
                debug!(component = %self.id(), reference = %setter.key, interface = %iface, "withdrawing reference");
                (setter.set)(None).map_err(|source| ComponentError::Callback {
                    context: format!("reference '{}'", setter.key),
                    source,
                })?;
            }
        }

        // Record an interface only when some setter actually consumed it.
        let mut injected: BTreeSet<InterfaceId> = before.intersection(&now).cloned().collect();
        for iface in now.difference(&before) {
            let matching: Vec<&ReferenceSetter> = setters
                .iter()
                .filter(|s| assignable(iface, &s.accepts, universe))
                .collect();
            if matching.is_empty() {
                continue;
            }
            let Some(proxy) = facade.and_then(|f| f.proxy(id, iface).ok()) else {
                continue;
            };
            for setter in matching {
                debug!(component = %self.id(), reference = %setter.key, interface = %iface, "injecting reference");
                (setter.set)(Some(proxy.clone())).map_err(|source| {
                    ComponentError::Callback {
                        context: format!("reference '{}'", setter.key),
                        source,
                    }
                })?;
            }
            injected.insert(iface.clone());
        }

        let mut inner = self.inner.borrow_mut();
        if injected.is_empty() {
            inner.injected.remove(id);
        } else {
            inner.injected.insert(id.to_string(), injected);
        }
        Ok(())
    }

    /// Registers another component as a listener.
    ///
    /// For each of this component's listener interfaces that `other`
    /// directly declares, a proxy to `other` is handed to the register
    /// hook. Interfaces already registered for `other` are skipped, so
    /// repeated registration is a no-op.
    pub fn register(&self, other: &Component) -> Result<(), ComponentError> {
        let (existing, hooks) = {
            let inner = self.inner.borrow();
            (
                inner
                    .listeners
                    .get(&other.id())
                    .cloned()
                    .unwrap_or_default(),
                inner
                    .listener_hooks
                    .iter()
                    .map(|(i, h)| (i.clone(), h.register.clone()))
                    .collect::<Vec<_>>(),
            )
        };

        let mut recorded = Vec::new();
        for (iface, hook) in hooks {
            if existing.contains_key(&iface) || !other.declares(&iface) {
                continue;
            }
            let proxy = other.proxy(&iface)?;
            debug!(component = %self.id(), listener = %other.id(), interface = %iface, "registering listener");
            hook(proxy.clone()).map_err(|source| ComponentError::Callback {
                context: format!("listener register '{iface}'"),
                source,
            })?;
            recorded.push((iface, proxy));
        }

        if !recorded.is_empty() {
            let mut inner = self.inner.borrow_mut();
            let entry = inner.listeners.entry(other.id()).or_default();
            for (iface, proxy) in recorded {
                entry.insert(iface, proxy);
            }
        }
        Ok(())
    }

    /// Unregisters a previously registered listener.
    ///
    /// The same proxies handed to the register hooks are replayed to the
    /// unregister hooks. A no-op if `other` was never registered.
    pub fn unregister(&self, other: &Component) -> Result<(), ComponentError> {
        let plan: Vec<(InterfaceId, ListenerFn, Proxy)> = {
            let inner = self.inner.borrow();
            let Some(registered) = inner.listeners.get(&other.id()) else {
                return Ok(());
            };
            registered
                .iter()
                .filter_map(|(iface, proxy)| {
                    inner
                        .listener_hooks
                        .get(iface)
                        .map(|h| (iface.clone(), h.unregister.clone(), proxy.clone()))
                })
                .collect()
        };

        for (iface, hook, proxy) in plan {
            debug!(component = %self.id(), listener = %other.id(), interface = %iface, "unregistering listener");
            hook(proxy).map_err(|source| ComponentError::Callback {
                context: format!("listener unregister '{iface}'"),
                source,
            })?;
        }

        self.inner.borrow_mut().listeners.remove(&other.id());
        Ok(())
    }

    /// Returns the ids of components currently registered as listeners.
    #[must_use]
    pub fn listener_sources(&self) -> Vec<ComponentId> {
        self.inner.borrow().listeners.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ComponentBuilder;
    use crate::error::ConfigError;
    use crate::interface::ParamType;
    use serde_json::json;

    #[derive(Default)]
    struct Sample {
        taste: Option<Value>,
        bag: Option<Properties>,
    }

    fn sample_component(cell: Rc<RefCell<Sample>>) -> Component {
        ComponentBuilder::new(cell)
            .interface(
                InterfaceDef::new("Sample")
                    .method("get_taste", [])
                    .method("echo", [ParamType::Any]),
            )
            .method("get_taste", [], |sample: &mut Sample, _args| {
                Ok(sample.taste.clone().unwrap_or(Value::Null))
            })
            .method("echo", [ParamType::Any], |_sample, args| {
                Ok(args.first().cloned().unwrap_or(Value::Null))
            })
            .property("taste", ParamType::Int, |sample, value| {
                sample.taste = Some(value.clone());
                Ok(())
            })
            .properties_sink(|sample, props| {
                sample.bag = Some(props.clone());
                Ok(())
            })
            .build()
    }

    #[test]
    fn handles_share_identity() {
        let component = sample_component(Rc::default());
        let other = component.clone();
        assert_eq!(component, other);
        assert_eq!(component.id(), other.id());
    }

    #[test]
    fn independent_wrappers_differ() {
        let cell: Rc<RefCell<Sample>> = Rc::default();
        let a = sample_component(cell.clone());
        let b = sample_component(cell);
        assert_ne!(a, b);
    }

    #[test]
    fn invoke_dispatches_and_preserves_target_error() {
        let component = sample_component(Rc::default());
        assert_eq!(component.invoke("echo", &[json!(5)]).unwrap(), json!(5));
        let err = component.invoke("missing", &[]).unwrap_err();
        assert!(matches!(err, InvokeError::NoSuchMethod { .. }));
    }

    #[test]
    fn properties_coerce_and_are_recorded_raw() {
        let cell: Rc<RefCell<Sample>> = Rc::default();
        let component = sample_component(cell.clone());

        let props: Properties = [("taste", json!("27")), ("unknown", json!(1))]
            .into_iter()
            .collect();
        component.set_properties(&props).unwrap();

        // The setter saw the coerced int; the audit keeps the raw text.
        assert_eq!(cell.borrow().taste, Some(json!(27)));
        let injected = component.injected_properties();
        assert_eq!(injected.get("taste"), Some(&json!("27")));
        assert!(injected.get("unknown").is_none());

        // The sink got the full bag and is recorded under the bag key.
        assert_eq!(cell.borrow().bag.as_ref(), Some(&props));
        assert!(injected.contains_key(PROPERTIES_KEY));
    }

    #[test]
    fn duplicate_property_setters_are_ambiguous() {
        let component = ComponentBuilder::new(Rc::new(RefCell::new(())))
            .interface(InterfaceDef::new("Dup"))
            .property("taste", ParamType::Int, |_: &mut (), _| Ok(()))
            .property("taste", ParamType::Text, |_: &mut (), _| Ok(()))
            .build();
        let props: Properties = [("taste", json!("sweet"))].into_iter().collect();
        let err = component.set_properties(&props).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::AmbiguousProperty { count: 2, .. }
        ));
    }

    #[test]
    fn proxy_requires_declared_interface() {
        let component = sample_component(Rc::default());
        assert!(component.proxy(&"Sample".into()).is_ok());
        let err = component.proxy(&"Banana".into()).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidInterface { .. }));
    }

    #[test]
    fn interceptor_requires_declared_interface() {
        struct Nop;
        impl Interceptor for Nop {
            fn intercept(
                &self,
                _m: &crate::interface::MethodSig,
                args: &[Value],
                proceed: crate::interceptor::Proceed<'_>,
            ) -> Result<Value, InvokeError> {
                proceed.call(args)
            }
        }
        let component = sample_component(Rc::default());
        assert!(component
            .set_invocation_interceptor(&"Sample".into(), Rc::new(Nop))
            .is_ok());
        assert!(component
            .set_invocation_interceptor(&"Banana".into(), Rc::new(Nop))
            .is_err());
    }

    /// Single-service facade exposing one component under one id.
    struct Shelf {
        id: String,
        component: Component,
        exposed: Vec<InterfaceId>,
    }

    impl Facade for Shelf {
        fn connect(&self, _component: &Component) -> Result<(), ConfigError> {
            Ok(())
        }

        fn disconnect(&self, _component: &Component) -> Result<(), ConfigError> {
            Ok(())
        }

        fn exposed_component_ids(&self) -> Vec<String> {
            vec![self.id.clone()]
        }

        fn exposed_interfaces(&self, id: &str) -> Result<Vec<InterfaceId>, ConfigError> {
            if id == self.id {
                Ok(self.exposed.clone())
            } else {
                Err(ConfigError::NotExposed { id: id.to_string() })
            }
        }

        fn proxy(&self, id: &str, interface: &InterfaceId) -> Result<Proxy, ConfigError> {
            self.exposed_interfaces(id)?;
            if !self.exposed.contains(interface) {
                return Err(ConfigError::InterfaceNotExposed {
                    id: id.to_string(),
                    interface: interface.clone(),
                });
            }
            self.component.proxy(interface).map_err(ConfigError::Wiring)
        }
    }

    fn fruit_shelf(id: &str, exposed: &[&str]) -> Shelf {
        let provider = ComponentBuilder::new(Rc::new(RefCell::new(())))
            .interface(InterfaceDef::new("Fruit").method("describe", []))
            .method("describe", [], |_: &mut (), _| Ok(json!("a fruit")))
            .interface(InterfaceDef::new("Snack"))
            .build();
        Shelf {
            id: id.to_string(),
            component: provider,
            exposed: exposed.iter().map(|s| (*s).into()).collect(),
        }
    }

    #[derive(Default)]
    struct Bowl {
        fruit: Option<Proxy>,
    }

    fn bowl_component(cell: Rc<RefCell<Bowl>>) -> Component {
        ComponentBuilder::new(cell)
            .interface(InterfaceDef::new("Bowl"))
            .reference("fruit", "Fruit", |bowl: &mut Bowl, proxy| {
                bowl.fruit = proxy;
                Ok(())
            })
            .build()
    }

    #[test]
    fn reference_setters_fire_only_for_their_key() {
        let cell: Rc<RefCell<Bowl>> = Rc::default();
        let consumer = bowl_component(cell.clone());
        let shelf = fruit_shelf("vegetable", &["Fruit"]);
        let universe = shelf.component.interfaces();

        // An assignable provider under the wrong id leaves the slot alone.
        consumer
            .set_reference(&shelf, "vegetable", &universe)
            .unwrap();
        assert!(cell.borrow().fruit.is_none());
        assert!(consumer.injected_interfaces("vegetable").is_empty());
    }

    #[test]
    fn matching_key_injects_and_withdraws() {
        let cell: Rc<RefCell<Bowl>> = Rc::default();
        let consumer = bowl_component(cell.clone());
        let shelf = fruit_shelf("fruit", &["Fruit"]);
        let universe = shelf.component.interfaces();

        consumer.set_reference(&shelf, "fruit", &universe).unwrap();
        assert!(cell.borrow().fruit.is_some());
        assert_eq!(consumer.injected_interfaces("fruit"), vec!["Fruit".into()]);

        consumer.remove_dependency("fruit", &universe).unwrap();
        assert!(cell.borrow().fruit.is_none());
        assert!(consumer.injected_interfaces("fruit").is_empty());
    }

    #[test]
    fn only_consumed_interfaces_are_recorded() {
        let cell: Rc<RefCell<Bowl>> = Rc::default();
        let consumer = bowl_component(cell.clone());
        let shelf = fruit_shelf("fruit", &["Fruit", "Snack"]);
        let universe = shelf.component.interfaces();

        // Snack is exposed but no setter accepts it; it is not recorded.
        consumer.set_reference(&shelf, "fruit", &universe).unwrap();
        assert_eq!(consumer.injected_interfaces("fruit"), vec!["Fruit".into()]);
    }
}
