//! A loaded KML document and its top-level elements.

use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future;

use crate::error::{KmlError, Result};
use crate::http::Fetcher;
use crate::loader::{DocumentLoader, Source};
use crate::registry::{ElementRegistry, KmlElement, ParseContext};
use crate::render::RenderLayer;
use crate::style::{PendingStyle, StyleIndex, StyleResolver};
use crate::xml::{parse_document, XmlNode};

/// One KML document.
///
/// The top-level elements are parsed on first access and kept for the
/// lifetime of the file. A `KmlFile` never re-reads its tree; build a new
/// one to pick up a changed document.
pub struct KmlFile {
    root: Arc<XmlNode>,
    context: ParseContext,
    shapes: OnceLock<Vec<Box<dyn KmlElement>>>,
}

impl KmlFile {
    /// Wrap a `<kml>` root; style references resolve within this document only.
    pub fn new(root: Arc<XmlNode>, registry: Arc<ElementRegistry>) -> Self {
        let resolver = StyleResolver::for_document(&root);
        Self::with_resolver(root, registry, resolver)
    }

    pub fn with_resolver(
        root: Arc<XmlNode>,
        registry: Arc<ElementRegistry>,
        resolver: StyleResolver,
    ) -> Self {
        Self {
            context: ParseContext::new(registry, Arc::new(resolver)),
            root,
            shapes: OnceLock::new(),
        }
    }

    /// Parse in-memory markup.
    ///
    /// # Errors
    /// XML errors, or `MissingElement` without a `<kml>` element.
    pub fn from_markup(markup: &str, registry: Arc<ElementRegistry>) -> Result<Self> {
        Ok(Self::new(parse_document(markup)?, registry))
    }

    /// Load a document, build its elements and wait for their styles.
    ///
    /// External style documents are fetched through `fetcher` and resolved
    /// relative to the source URL.
    ///
    /// # Errors
    /// Any load error of the document itself. Failing style references are
    /// logged and leave the element unstyled.
    pub async fn open(
        source: Source,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<ElementRegistry>,
    ) -> Result<Self> {
        let base_url = source.base_url().map(str::to_string);
        let mut loader = DocumentLoader::new(source).with_fetcher(Arc::clone(&fetcher));
        let root = loader.load().await?;

        let mut resolver = StyleResolver::for_document(&root).with_fetcher(fetcher);
        if let Some(url) = base_url {
            resolver = resolver.with_base_url(url);
        }

        let file = Self::with_resolver(root, registry, resolver);
        file.resolve_styles().await;
        Ok(file)
    }

    /// The `<kml>` root element.
    pub fn node(&self) -> &Arc<XmlNode> {
        &self.root
    }

    /// Identified styles of this document.
    pub fn styles(&self) -> &StyleIndex {
        self.context.resolver().index()
    }

    /// Top-level elements in document order.
    pub fn shapes(&self) -> &[Box<dyn KmlElement>] {
        self.shapes.get_or_init(|| {
            let shapes = self.context.engine().parse(&self.root, &self.context);
            tracing::debug!(shapes = shapes.len(), "Parsed document");
            shapes
        })
    }

    /// Wait until every element style in the tree is resolved.
    ///
    /// Styles within the document also resolve during `update`. References
    /// into other documents need this to run inside a Tokio runtime.
    pub async fn resolve_styles(&self) {
        let mut pending = Vec::new();
        collect_styles(self.shapes(), &mut pending);
        tracing::debug!(styles = pending.len(), "Resolving element styles");
        future::join_all(pending.iter().map(PendingStyle::wait)).await;
    }

    /// Create or refresh the renderables of every element in `layer`.
    ///
    /// # Errors
    /// Returns `MissingLayer` without touching any element if `layer` is `None`.
    pub fn update(&mut self, layer: Option<&mut dyn RenderLayer>) -> Result<()> {
        let layer = layer.ok_or(KmlError::MissingLayer)?;

        self.shapes();
        let Some(shapes) = self.shapes.get_mut() else {
            return Ok(());
        };
        for shape in shapes.iter_mut() {
            if let Err(err) = shape.update(layer) {
                tracing::warn!(
                    error = %err,
                    tag = %shape.tag_name(),
                    "Failed to update element, skipping"
                );
            }
        }
        Ok(())
    }
}

fn collect_styles(elements: &[Box<dyn KmlElement>], pending: &mut Vec<PendingStyle>) {
    for element in elements {
        if let Some(style) = element.style() {
            pending.push(style.clone());
        }
        collect_styles(element.children(), pending);
    }
}

impl fmt::Debug for KmlFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmlFile")
            .field("root", &crate::xml::describe(&self.root))
            .field("context", &self.context)
            .field("parsed", &self.shapes.get().is_some())
            .finish()
    }
}
