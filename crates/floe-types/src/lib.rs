//! Core types for Floe.
//!
//! This crate provides the foundational identifier types and error
//! conventions for the Floe component-composition container.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Component SDK Layer                      │
//! │  (External, SemVer stable, safe to depend on)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  floe-types     : ComponentId, InterfaceId, ErrorCode ◄ HERE│
//! │  floe-component : Component, Proxy, Interceptor, convert    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Topology Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  floe-cluster   : Cluster, Layer (restricted view)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identifier Design
//!
//! Component identity is UUID-based so that listener and topology
//! bookkeeping never depends on reference equality: a [`ComponentId`] is
//! minted once per component wrapper and stays stable for its lifetime.
//! Interfaces are identified by name ([`InterfaceId`]); two interface
//! definitions with the same id are the same interface.
//!
//! # Example
//!
//! ```
//! use floe_types::{ComponentId, InterfaceId};
//!
//! let id = ComponentId::new();
//! assert!(format!("{id}").starts_with("cmp:"));
//!
//! let banana = InterfaceId::new("Banana");
//! assert_eq!(banana.as_str(), "Banana");
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ComponentId, InterfaceId};
