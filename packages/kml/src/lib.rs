//! KML Scene - Compile KML/KMZ documents into renderable elements.
//!
//! This crate loads KML documents (inline, over HTTP, or packed as KMZ),
//! builds a tree of typed elements through an extensible tag registry,
//! resolves their styles (including `StyleMap` normal/highlight pairs), and
//! pushes drawable shapes into a host-provided render layer.
//!
//! # Example
//!
//! ```
//! use kml_scene::{default_registry, KmlFile, MemoryLayer};
//!
//! use kml_scene::render::Color;
//!
//! let mut file = KmlFile::from_markup(
//!     r##"<kml><Document>
//!         <Style id="red"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
//!         <Placemark id="p1"><styleUrl>#red</styleUrl>
//!             <Point><coordinates>4.3,52.1</coordinates></Point></Placemark>
//!     </Document></kml>"##,
//!     default_registry(),
//! )
//! .unwrap();
//! assert_eq!(file.shapes().len(), 1);
//!
//! let mut layer = MemoryLayer::new();
//! file.update(Some(&mut layer)).unwrap();
//! assert_eq!(layer.len(), 1);
//!
//! let drawn = layer.renderables().next().unwrap();
//! assert_eq!(drawn.common().attributes.interior_color, Color::rgba(255, 0, 0, 255));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, loader configuration and URL helpers
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Owned XML tree and navigation helpers
//! - [`registry`]: Tag registry, parse engine, retrieval helpers and element types
//! - [`style`]: Style values and asynchronous style resolution
//! - [`http`]: Fetcher trait and HTTP implementation
//! - [`loader`]: KML/KMZ document loading
//! - [`file`]: Document aggregate with cached shapes and per-frame update
//! - [`render`]: Render layer interface and renderable values

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod loader;
pub mod registry;
pub mod render;
pub mod style;
pub mod xml;

pub use file::KmlFile;

// Re-export commonly used items
pub use config::LoaderConfig;
pub use error::{KmlError, Result};
pub use http::{Fetcher, HttpFetcher};
pub use loader::{DocumentLoader, LoadState, Source};
pub use registry::{
    create_kml_registry, default_registry, ElementRegistry, KmlElement, ParseContext, Query,
    Retrieve,
};
pub use render::{MemoryLayer, RenderLayer, Renderable, RenderableId};
pub use style::{StylePair, StyleResolver};
