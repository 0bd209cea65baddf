//! Fluent construction of component wrappers.
//!
//! Where a reflective container would scan an object for methods and
//! setters, Floe asks the author to register them explicitly. The builder
//! owns the implementation behind `Rc<RefCell<_>>` and hands each
//! registered closure mutable access to it at call time.
//!
//! # Example
//!
//! ```
//! use floe_component::{ComponentBuilder, InterfaceDef, ParamType};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Banana {
//!     value: i64,
//! }
//!
//! let banana = Rc::new(RefCell::new(Banana { value: 27 }));
//! let component = ComponentBuilder::new(banana)
//!     .interface(InterfaceDef::new("Banana").method("return_an_int", []))
//!     .method("return_an_int", [], |banana: &mut Banana, _args| {
//!         Ok(json!(banana.value))
//!     })
//!     .build();
//!
//! assert_eq!(component.invoke("return_an_int", &[]).unwrap(), json!(27));
//! ```

use crate::component::{
    Component, ComponentInner, ListenerHooks, PropertySetter, ReferenceSetter,
};
use crate::interface::{InterfaceDef, MethodSig, ParamType};
use crate::invocation::{BoxError, MethodEntry};
use crate::properties::Properties;
use crate::proxy::Proxy;
use floe_types::{ComponentId, InterfaceId};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Builder for a [`Component`].
///
/// Methods bind to the most recently declared interface, so a typical
/// build interleaves `interface` and `method` calls. Property setters,
/// reference setters, listener hooks and the properties sink are
/// component-wide and may be registered at any point.
pub struct ComponentBuilder<T: 'static> {
    target: Rc<RefCell<T>>,
    interfaces: Vec<InterfaceDef>,
    methods: Vec<MethodEntry>,
    property_setters: HashMap<String, Vec<PropertySetter>>,
    properties_sink: Option<crate::component::SinkFn>,
    reference_setters: Vec<ReferenceSetter>,
    listener_hooks: BTreeMap<InterfaceId, ListenerHooks>,
}

impl<T: 'static> ComponentBuilder<T> {
    /// Starts a builder around an implementation object.
    #[must_use]
    pub fn new(target: Rc<RefCell<T>>) -> Self {
        Self {
            target,
            interfaces: Vec::new(),
            methods: Vec::new(),
            property_setters: HashMap::new(),
            properties_sink: None,
            reference_setters: Vec::new(),
            listener_hooks: BTreeMap::new(),
        }
    }

    /// Declares an interface and makes it the scope for following
    /// [`method`](Self::method) calls.
    ///
    /// Re-declaring an id keeps the first definition but still switches
    /// the method scope to it.
    #[must_use]
    pub fn interface(mut self, def: InterfaceDef) -> Self {
        if !self.interfaces.iter().any(|d| d.id() == def.id()) {
            self.interfaces.push(def);
        } else if let Some(pos) = self.interfaces.iter().position(|d| d.id() == def.id()) {
            // Move it last so it becomes the current scope.
            let existing = self.interfaces.remove(pos);
            self.interfaces.push(existing);
        }
        self
    }

    /// Binds a handler to a method of the current interface.
    ///
    /// Overloads are legal: bind the same name several times with
    /// different parameter lists. Declaration order is dispatch order.
    ///
    /// # Panics
    ///
    /// Panics if no interface has been declared yet.
    #[must_use]
    pub fn method(
        mut self,
        name: &str,
        params: impl IntoIterator<Item = ParamType>,
        handler: impl Fn(&mut T, &[Value]) -> Result<Value, BoxError> + 'static,
    ) -> Self {
        let interface = self
            .interfaces
            .last()
            .unwrap_or_else(|| panic!("method '{name}' bound before any interface"))
            .id()
            .clone();
        let target = self.target.clone();
        self.methods.push(MethodEntry {
            interface,
            sig: MethodSig::new(name, params),
            handler: Rc::new(move |args| handler(&mut target.borrow_mut(), args)),
        });
        self
    }

    /// Registers a property setter for a key.
    ///
    /// Incoming values are coerced to `param` before delivery. Several
    /// setters for one key make bag injection of that key ambiguous.
    #[must_use]
    pub fn property(
        mut self,
        key: impl Into<String>,
        param: ParamType,
        setter: impl Fn(&mut T, &Value) -> Result<(), BoxError> + 'static,
    ) -> Self {
        let target = self.target.clone();
        self.property_setters
            .entry(key.into())
            .or_default()
            .push(PropertySetter {
                param,
                set: Rc::new(move |value| setter(&mut target.borrow_mut(), value)),
            });
        self
    }

    /// Registers a whole-bag sink, replacing any previous one.
    ///
    /// The sink runs after the per-key setters on every bag injection.
    #[must_use]
    pub fn properties_sink(
        mut self,
        sink: impl Fn(&mut T, &Properties) -> Result<(), BoxError> + 'static,
    ) -> Self {
        let target = self.target.clone();
        self.properties_sink = Some(Rc::new(move |props| sink(&mut target.borrow_mut(), props)));
        self
    }

    /// Registers a reference setter.
    ///
    /// `key` is the dependency id this setter listens for: the setter
    /// fires only when the service bound under that id offers (or
    /// withdraws) an interface assignable to `accepts`. Several setters
    /// may share a key to accept different interfaces of one dependency.
    #[must_use]
    pub fn reference(
        mut self,
        key: impl Into<String>,
        accepts: impl Into<InterfaceId>,
        setter: impl Fn(&mut T, Option<Proxy>) -> Result<(), BoxError> + 'static,
    ) -> Self {
        let target = self.target.clone();
        self.reference_setters.push(ReferenceSetter {
            key: key.into(),
            accepts: accepts.into(),
            set: Rc::new(move |proxy| setter(&mut target.borrow_mut(), proxy)),
        });
        self
    }

    /// Registers listener hooks for an interface, replacing any previous
    /// pair for the same interface.
    ///
    /// When another component declaring exactly that interface joins the
    /// topology, `register` receives a proxy to it; `unregister` receives
    /// the same proxy when it leaves.
    #[must_use]
    pub fn listener(
        mut self,
        interface: impl Into<InterfaceId>,
        register: impl Fn(&mut T, Proxy) -> Result<(), BoxError> + 'static,
        unregister: impl Fn(&mut T, Proxy) -> Result<(), BoxError> + 'static,
    ) -> Self {
        let reg_target = self.target.clone();
        let unreg_target = self.target.clone();
        self.listener_hooks.insert(
            interface.into(),
            ListenerHooks {
                register: Rc::new(move |proxy| register(&mut reg_target.borrow_mut(), proxy)),
                unregister: Rc::new(move |proxy| unregister(&mut unreg_target.borrow_mut(), proxy)),
            },
        );
        self
    }

    /// Finalizes the component, minting its identity.
    #[must_use]
    pub fn build(self) -> Component {
        Component::from_inner(ComponentInner {
            id: ComponentId::new(),
            interfaces: self.interfaces,
            methods: self.methods,
            property_setters: self.property_setters,
            properties_sink: self.properties_sink,
            reference_setters: self.reference_setters,
            listener_hooks: self.listener_hooks,
            interceptors: HashMap::new(),
            injected: HashMap::new(),
            listeners: HashMap::new(),
            setter_injected: Properties::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    #[should_panic(expected = "before any interface")]
    fn method_without_interface_panics() {
        let _ = ComponentBuilder::new(Rc::new(RefCell::new(())))
            .method("orphan", [], |_: &mut (), _| Ok(Value::Null));
    }

    #[test]
    fn redeclared_interface_keeps_first_definition() {
        let component = ComponentBuilder::new(Rc::new(RefCell::new(())))
            .interface(InterfaceDef::new("Apple").method("get_message", []))
            .method("get_message", [], |_: &mut (), _| Ok(json!("first")))
            .interface(InterfaceDef::new("Apple").method("other", []))
            .method("extra", [], |_: &mut (), _| Ok(json!("extra")))
            .build();

        let defs = component.interfaces();
        assert_eq!(defs.len(), 1);
        assert!(defs[0].declares("get_message"));
        assert!(!defs[0].declares("other"));
        // The second scope still bound its method to the Apple interface.
        assert_eq!(component.invoke("extra", &[]).unwrap(), json!("extra"));
    }

    #[test]
    fn bound_methods_mutate_the_implementation() {
        struct Counter {
            n: i64,
        }
        let cell = Rc::new(RefCell::new(Counter { n: 0 }));
        let component = ComponentBuilder::new(cell.clone())
            .interface(
                InterfaceDef::new("Counter")
                    .method("add", [ParamType::Int])
                    .method("get", []),
            )
            .method("add", [ParamType::Int], |c: &mut Counter, args| {
                c.n += args[0].as_i64().unwrap_or(0);
                Ok(Value::Null)
            })
            .method("get", [], |c: &mut Counter, _| Ok(json!(c.n)))
            .build();

        component.invoke("add", &[json!(5)]).unwrap();
        component.invoke("add", &[json!("3")]).unwrap();
        assert_eq!(component.invoke("get", &[]).unwrap(), json!(8));
        assert_eq!(cell.borrow().n, 8);
    }
}
