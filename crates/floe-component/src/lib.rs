//! Component wrappers, proxies and invocation for Floe.
//!
//! Floe composes applications out of components at runtime. This crate is
//! the per-component half of the model: wrapping an implementation object
//! behind declared interfaces, reaching it through typed [`Proxy`] handles,
//! injecting configuration and references, and dispatching by-name calls
//! with type coercion. Topology (who is wired to whom) lives in
//! `floe-cluster`, which consumes this crate through the [`Facade`] trait.
//!
//! # Registration instead of reflection
//!
//! A component's callable surface is declared explicitly with
//! [`InterfaceDef`] descriptors and bound with [`ComponentBuilder`]:
//!
//! ```
//! use floe_component::{ComponentBuilder, InterfaceDef, ParamType};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let greeter = Rc::new(RefCell::new(Greeter {
//!     greeting: "hello".into(),
//! }));
//! let component = ComponentBuilder::new(greeter)
//!     .interface(InterfaceDef::new("Greeter").method("greet", [ParamType::Text]))
//!     .method("greet", [ParamType::Text], |g: &mut Greeter, args| {
//!         let name = args[0].as_str().unwrap_or("world");
//!         Ok(json!(format!("{} {name}", g.greeting)))
//!     })
//!     .build();
//!
//! let proxy = component.proxy(&"Greeter".into()).unwrap();
//! assert_eq!(proxy.call("greet", &[json!("floe")]).unwrap(), json!("hello floe"));
//! ```
//!
//! # Threading model
//!
//! Components are single-threaded by construction (`Rc<RefCell<_>>`);
//! handles, proxies and closures are all `!Send`. Wiring operations snapshot
//! their plan before running implementation callbacks, so callbacks may call
//! back into the container.

pub mod convert;
pub mod testing;

mod builder;
mod component;
mod error;
mod facade;
mod interceptor;
mod interface;
mod invocation;
mod properties;
mod proxy;

pub use builder::ComponentBuilder;
pub use component::Component;
pub use error::{ComponentError, ConfigError};
pub use facade::Facade;
pub use interceptor::{Interceptor, Proceed};
pub use interface::{assignable, reachable, InterfaceDef, MethodSig, ParamType};
pub use invocation::{BoxError, InvokeError, MethodHandler};
pub use properties::{Properties, PROPERTIES_KEY};
pub use proxy::Proxy;

pub use convert::ConvertError;
