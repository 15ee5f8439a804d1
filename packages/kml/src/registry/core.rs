//! Element registry mapping tag names to factories.

use std::collections::{HashMap, HashSet};

use super::element::ElementFactory;

/// Registry mapping tag names to element factories.
///
/// Tags can also be marked as skipped: they are recognised KML but have no
/// element of their own (their data is read by the parent).
pub struct ElementRegistry {
    factories: HashMap<String, Box<dyn ElementFactory>>,
    skip_tags: HashSet<String>,
}

impl ElementRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            skip_tags: HashSet::new(),
        }
    }

    /// Register a factory for a tag name, replacing any earlier one.
    pub fn register(&mut self, tag_name: impl Into<String>, factory: impl ElementFactory + 'static) {
        self.factories.insert(tag_name.into(), Box::new(factory));
    }

    /// Mark tags as skipped.
    pub fn skip(&mut self, tag_names: impl IntoIterator<Item = impl Into<String>>) {
        for tag in tag_names {
            self.skip_tags.insert(tag.into());
        }
    }

    /// Factory for a tag; `None` for skipped and unknown tags.
    pub fn lookup(&self, tag_name: &str) -> Option<&dyn ElementFactory> {
        if self.skip_tags.contains(tag_name) {
            return None;
        }
        self.factories.get(tag_name).map(|f| f.as_ref())
    }

    #[must_use]
    pub fn should_skip(&self, tag_name: &str) -> bool {
        self.skip_tags.contains(tag_name)
    }

    #[must_use]
    pub fn has_factory(&self, tag_name: &str) -> bool {
        self.factories.contains_key(tag_name)
    }

    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    #[must_use]
    pub fn skipped_tags(&self) -> HashSet<&str> {
        self.skip_tags.iter().map(|s| s.as_str()).collect()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}
