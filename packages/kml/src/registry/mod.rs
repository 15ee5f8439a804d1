//! Element registry and parsing engine.
//!
//! Element types are registered by tag name. The engine walks the children
//! of a node and asks the registry for a factory per tag, so new element
//! types can be added without touching the engine.

mod config;
mod core;
mod element;
pub mod elements;
mod engine;
mod retrieve;
mod types;

pub use config::{create_kml_registry, default_registry};
pub use core::ElementRegistry;
pub use element::{ElementBase, ElementFactory, KmlElement};
pub use engine::ParseEngine;
pub use retrieve::{to_bool, to_f64, Query, Retrieve};
pub use types::ParseContext;
