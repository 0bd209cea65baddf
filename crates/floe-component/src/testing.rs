//! Shared test fixtures.
//!
//! A small orchard of components exercising every wiring feature:
//!
//! - [`Apple`]: declares `Apple` and the `Snack` marker, consumes a
//!   `Banana` reference
//! - [`Banana`]: provides `Banana` (and `Snack`), returns a well-known int
//! - [`Elstar`]: declares `Elstar`, which extends `Apple`
//! - [`Peach`]: property injection, including a whole-bag sink with a
//!   default color
//! - [`Notifier`] / [`Listener`]: listener registration keyed by the
//!   listener's self-reported id
//!
//! The constructors return the component together with the shared
//! implementation cell, so tests can assert on injected state directly.

use crate::builder::ComponentBuilder;
use crate::component::Component;
use crate::interceptor::{Interceptor, Proceed};
use crate::interface::{InterfaceDef, MethodSig, ParamType};
use crate::invocation::InvokeError;
use crate::properties::Properties;
use crate::proxy::Proxy;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The well-known int [`Banana`] returns.
pub const BANANA_INT: i64 = 27;

/// `Apple` interface: a message, an echo, an int.
#[must_use]
pub fn apple_def() -> InterfaceDef {
    InterfaceDef::new("Apple")
        .method("get_message", [])
        .method("return_input", [ParamType::Any])
        .method("get_some_int", [])
}

/// `Snack` marker interface, declared by both fruit.
#[must_use]
pub fn snack_def() -> InterfaceDef {
    InterfaceDef::new("Snack")
}

/// `Banana` interface.
#[must_use]
pub fn banana_def() -> InterfaceDef {
    InterfaceDef::new("Banana").method("return_an_int", [])
}

/// `Elstar` interface, a specialization of `Apple`.
#[must_use]
pub fn elstar_def() -> InterfaceDef {
    InterfaceDef::new("Elstar")
        .extends("Apple")
        .method("get_variety", [])
}

/// `Peach` interface: overloaded taste setters and a color.
#[must_use]
pub fn peach_def() -> InterfaceDef {
    InterfaceDef::new("Peach")
        .method("set_taste", [ParamType::Int])
        .method("set_taste", [ParamType::Text])
        .method("set_taste", [ParamType::Text, ParamType::Int])
        .method("get_color", [])
}

/// `Notifier` interface.
#[must_use]
pub fn notifier_def() -> InterfaceDef {
    InterfaceDef::new("Notifier")
        .method("listener_count", [])
        .method("notify_all", [ParamType::Text])
}

/// `Listener` interface.
#[must_use]
pub fn listener_def() -> InterfaceDef {
    InterfaceDef::new("Listener")
        .method("get_id", [])
        .method("notify", [ParamType::Text])
}

/// Consumer fixture: its `banana` dependency has two setters, one
/// accepting `Banana` and one accepting the `Snack` marker.
#[derive(Default)]
pub struct Apple {
    pub message: String,
    pub some_int: i64,
    pub banana: Option<Proxy>,
    pub snack_seen: bool,
}

impl Apple {
    /// Calls through the injected banana proxy, if any.
    #[must_use]
    pub fn int_from_banana(&self) -> Option<i64> {
        self.banana
            .as_ref()
            .and_then(|p| p.call("return_an_int", &[]).ok())
            .and_then(|v| v.as_i64())
    }
}

/// Builds an [`Apple`] component with the given message.
#[must_use]
pub fn apple(message: &str) -> (Component, Rc<RefCell<Apple>>) {
    let cell = Rc::new(RefCell::new(Apple {
        message: message.to_string(),
        some_int: 42,
        ..Apple::default()
    }));
    let component = ComponentBuilder::new(cell.clone())
        .interface(apple_def())
        .method("get_message", [], |a: &mut Apple, _| {
            Ok(json!(a.message.clone()))
        })
        .method("return_input", [ParamType::Any], |_, args| {
            Ok(args.first().cloned().unwrap_or(Value::Null))
        })
        .method("get_some_int", [], |a, _| Ok(json!(a.some_int)))
        .interface(snack_def())
        .reference("banana", "Banana", |a, proxy| {
            a.banana = proxy;
            Ok(())
        })
        .reference("banana", "Snack", |a, proxy| {
            a.snack_seen = proxy.is_some();
            Ok(())
        })
        .build();
    (component, cell)
}

/// Provider fixture.
pub struct Banana {
    pub value: i64,
}

/// Builds a [`Banana`] component returning [`BANANA_INT`].
#[must_use]
pub fn banana() -> (Component, Rc<RefCell<Banana>>) {
    let cell = Rc::new(RefCell::new(Banana { value: BANANA_INT }));
    let component = ComponentBuilder::new(cell.clone())
        .interface(banana_def())
        .method("return_an_int", [], |b: &mut Banana, _| Ok(json!(b.value)))
        .interface(snack_def())
        .build();
    (component, cell)
}

/// Specialized apple fixture.
pub struct Elstar {
    pub variety: String,
}

/// Builds an [`Elstar`] component declaring the `Elstar` interface.
#[must_use]
pub fn elstar() -> (Component, Rc<RefCell<Elstar>>) {
    let cell = Rc::new(RefCell::new(Elstar {
        variety: "elstar".to_string(),
    }));
    let component = ComponentBuilder::new(cell.clone())
        .interface(elstar_def())
        .method("get_message", [], |_, _| Ok(json!("an elstar apple")))
        .method("get_variety", [], |e: &mut Elstar, _| {
            Ok(json!(e.variety.clone()))
        })
        .build();
    (component, cell)
}

/// Property-injection fixture.
pub struct Peach {
    pub color: String,
    pub taste: Value,
}

/// Builds a [`Peach`] component.
///
/// The whole-bag sink defaults `color` to `"green"` when the bag carries
/// no color; the `taste` property setter takes an int.
#[must_use]
pub fn peach() -> (Component, Rc<RefCell<Peach>>) {
    let cell = Rc::new(RefCell::new(Peach {
        color: String::new(),
        taste: Value::Null,
    }));
    let component = ComponentBuilder::new(cell.clone())
        .interface(peach_def())
        .method("set_taste", [ParamType::Int], |p: &mut Peach, args| {
            p.taste = json!({"int": args.first().cloned().unwrap_or(Value::Null)});
            Ok(p.taste.clone())
        })
        .method("set_taste", [ParamType::Text], |p: &mut Peach, args| {
            p.taste = json!({"text": args.first().cloned().unwrap_or(Value::Null)});
            Ok(p.taste.clone())
        })
        .method(
            "set_taste",
            [ParamType::Text, ParamType::Int],
            |p: &mut Peach, args| {
                p.taste = json!({"text_int": args});
                Ok(p.taste.clone())
            },
        )
        .method("get_color", [], |p, _| Ok(json!(p.color.clone())))
        .property("taste", ParamType::Int, |p, value| {
            p.taste = json!({"int": value});
            Ok(())
        })
        .properties_sink(|p, props| {
            p.color = props
                .get_text("color")
                .unwrap_or_else(|| "green".to_string());
            Ok(())
        })
        .build();
    (component, cell)
}

/// Listener-host fixture, keyed by each listener's self-reported id.
#[derive(Default)]
pub struct Notifier {
    pub listeners: BTreeMap<String, Proxy>,
}

/// Builds a [`Notifier`] component.
#[must_use]
pub fn notifier() -> (Component, Rc<RefCell<Notifier>>) {
    let cell = Rc::new(RefCell::new(Notifier::default()));
    let component = ComponentBuilder::new(cell.clone())
        .interface(notifier_def())
        .method("listener_count", [], |n: &mut Notifier, _| {
            Ok(json!(n.listeners.len()))
        })
        .method("notify_all", [ParamType::Text], |n, args| {
            let message = args.first().cloned().unwrap_or(Value::Null);
            let mut notified = 0;
            for proxy in n.listeners.values() {
                proxy.call("notify", &[message.clone()])?;
                notified += 1;
            }
            Ok(json!(notified))
        })
        .listener(
            "Listener",
            |n, proxy| {
                let id = proxy.call("get_id", &[])?;
                n.listeners
                    .insert(id.as_str().unwrap_or_default().to_string(), proxy);
                Ok(())
            },
            |n, proxy| {
                let id = proxy.call("get_id", &[])?;
                n.listeners.remove(id.as_str().unwrap_or_default());
                Ok(())
            },
        )
        .build();
    (component, cell)
}

/// Listener fixture recording every notification.
pub struct Listener {
    pub id: String,
    pub received: Vec<String>,
}

/// Builds a [`Listener`] component with the given id.
#[must_use]
pub fn listener(id: &str) -> (Component, Rc<RefCell<Listener>>) {
    let cell = Rc::new(RefCell::new(Listener {
        id: id.to_string(),
        received: Vec::new(),
    }));
    let component = ComponentBuilder::new(cell.clone())
        .interface(listener_def())
        .method("get_id", [], |l: &mut Listener, _| Ok(json!(l.id.clone())))
        .method("notify", [ParamType::Text], |l, args| {
            if let Some(msg) = args.first().and_then(Value::as_str) {
                l.received.push(msg.to_string());
            }
            Ok(Value::Null)
        })
        .build();
    (component, cell)
}

/// Interceptor appending a fixed suffix to textual results.
pub struct AppendSuffix(pub String);

impl Interceptor for AppendSuffix {
    fn intercept(
        &self,
        _method: &MethodSig,
        args: &[Value],
        proceed: Proceed<'_>,
    ) -> Result<Value, InvokeError> {
        let result = proceed.call(args)?;
        match result.as_str() {
            Some(s) => Ok(json!(format!("{s}{}", self.0))),
            None => Ok(result),
        }
    }
}

/// Builds a property bag from string pairs.
#[must_use]
pub fn props(pairs: &[(&str, Value)]) -> Properties {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}
