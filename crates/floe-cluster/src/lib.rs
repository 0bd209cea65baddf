//! Runtime composition of components into clusters.
//!
//! A [`Cluster`] wires components together at runtime: internal members
//! are bound under ids and fully cross-injected, external members join
//! anonymously through a [`Facade`](floe_component::Facade) and see only
//! the exposed surface. The [`Layer`] is that restricted surface.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 Cluster                       │
//! │  "apple" ──► Component   "banana" ──► Component
//! │      ▲  full cross wiring  ▲                  │
//! ├──────┴─────────── Layer ───┴──────────────────┤
//! │        exposure map: "banana" -> [Banana]     │
//! └───────▲───────────────────────▲───────────────┘
//!         │ proxies for exposed   │
//!     external component      external component
//! ```
//!
//! # Example
//!
//! ```
//! use floe_cluster::Cluster;
//! use floe_component::testing;
//!
//! let cluster = Cluster::new();
//! let (banana, _) = testing::banana();
//! let (apple, apple_cell) = testing::apple("hi");
//!
//! // Internal members are wired to each other on connect.
//! cluster.connect("banana", &banana).unwrap();
//! cluster.connect("apple", &apple).unwrap();
//!
//! assert_eq!(apple_cell.borrow().int_from_banana(), Some(27));
//! ```

mod cluster;
mod layer;

pub use cluster::Cluster;
pub use layer::Layer;
