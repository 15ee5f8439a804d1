//! Context passed to element factories.

use std::fmt;
use std::sync::Arc;

use super::core::ElementRegistry;
use super::engine::ParseEngine;
use crate::style::{PendingStyle, StyleResolver};

/// Context passed down the tree while elements are constructed.
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct ParseContext {
    engine: ParseEngine,
    resolver: Arc<StyleResolver>,
    /// Style inherited from the closest styled ancestor.
    style: PendingStyle,
}

impl ParseContext {
    /// Create a context with no inherited style.
    #[must_use]
    pub fn new(registry: Arc<ElementRegistry>, resolver: Arc<StyleResolver>) -> Self {
        Self {
            engine: ParseEngine::new(registry),
            resolver,
            style: PendingStyle::default(),
        }
    }

    /// Context for descendants of an element with its own style.
    #[must_use]
    pub fn with_style(&self, style: PendingStyle) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    pub fn engine(&self) -> &ParseEngine {
        &self.engine
    }

    pub fn registry(&self) -> &ElementRegistry {
        self.engine.registry()
    }

    pub fn resolver(&self) -> &Arc<StyleResolver> {
        &self.resolver
    }

    /// Inherited style.
    pub fn style(&self) -> &PendingStyle {
        &self.style
    }
}

impl fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("registered_tags", &self.registry().registered_tags().len())
            .field("resolver", &self.resolver)
            .field("style", &self.style)
            .finish()
    }
}
