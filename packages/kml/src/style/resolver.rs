//! Asynchronous style resolution.
//!
//! A style reference resolves to a [`StylePair`]. Plain styles resolve
//! immediately. A `StyleMap` fans out into one resolution per `Pair`, waits
//! for all of them and merges the results by key. Dangling references,
//! failed external loads and reference chains deeper than
//! [`MAX_STYLE_DEPTH`] resolve to `None` for that reference, so a join
//! always completes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::task::Poll;

use futures::future::{self, BoxFuture, FutureExt, Shared};

use super::types::{Pair, StylePair, StyleReference, StyleSelector};
use crate::config::{join_url, split_style_url, MAX_STYLE_DEPTH};
use crate::http::Fetcher;
use crate::loader::{DocumentLoader, Source};
use crate::xml::{describe, XmlNode};

/// Style of an element that may still be resolving.
///
/// Clones share one underlying resolution.
#[derive(Clone)]
pub struct PendingStyle(Shared<BoxFuture<'static, StylePair>>);

impl PendingStyle {
    /// An already resolved style.
    pub fn ready(pair: StylePair) -> Self {
        Self::from_future(future::ready(pair).boxed())
    }

    pub fn from_future(resolution: BoxFuture<'static, StylePair>) -> Self {
        Self(resolution.shared())
    }

    /// The resolved pair, if resolution has completed.
    pub fn peek(&self) -> Option<&StylePair> {
        self.0.peek()
    }

    /// The resolved pair, or an empty pair while still resolving.
    ///
    /// Polls the resolution once, so references that need no fetch resolve
    /// on the first call even when nothing awaits them.
    pub fn current(&self) -> StylePair {
        self.0.clone().now_or_never().unwrap_or_default()
    }

    /// Wait for the resolution to complete.
    pub async fn wait(&self) -> StylePair {
        self.0.clone().await
    }
}

impl Default for PendingStyle {
    fn default() -> Self {
        Self::ready(StylePair::empty())
    }
}

impl fmt::Debug for PendingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(pair) => f.debug_tuple("PendingStyle").field(pair).finish(),
            None => f.write_str("PendingStyle(<resolving>)"),
        }
    }
}

/// Index of `Style`/`StyleMap` nodes by `id` within one document.
#[derive(Debug, Clone, Default)]
pub struct StyleIndex {
    styles: HashMap<String, Arc<XmlNode>>,
}

impl StyleIndex {
    /// Index every identified style selector in the tree.
    ///
    /// When several selectors share an id, the last one in document order wins.
    pub fn build(root: &Arc<XmlNode>) -> Self {
        let styles = root
            .descendants()
            .filter(|n| matches!(n.tag_name(), "Style" | "StyleMap"))
            .filter_map(|n| n.attribute("id").map(|id| (id.to_string(), Arc::clone(&n))))
            .collect();
        Self { styles }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<XmlNode>> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

/// Document a reference is resolved against.
#[derive(Debug, Clone)]
struct Scope {
    index: Arc<StyleIndex>,
    base_url: Option<String>,
}

type RemoteIndex = Shared<BoxFuture<'static, Option<Arc<StyleIndex>>>>;

/// Resolves style references of one document.
pub struct StyleResolver {
    scope: Scope,
    fetcher: Option<Arc<dyn Fetcher>>,
    remote: Mutex<HashMap<String, RemoteIndex>>,
}

impl StyleResolver {
    pub fn new(index: StyleIndex) -> Self {
        Self {
            scope: Scope {
                index: Arc::new(index),
                base_url: None,
            },
            fetcher: None,
            remote: Mutex::new(HashMap::new()),
        }
    }

    /// Resolver over the styles defined in `root`.
    pub fn for_document(root: &Arc<XmlNode>) -> Self {
        Self::new(StyleIndex::build(root))
    }

    /// Set the URL relative external references are resolved against.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.scope.base_url = Some(url.into());
        self
    }

    /// Allow loading styles from other documents through `fetcher`.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn index(&self) -> &StyleIndex {
        &self.scope.index
    }

    /// Resolve a `styleUrl` value.
    pub fn resolve_url(self: &Arc<Self>, url: &str) -> BoxFuture<'static, StylePair> {
        let reference = StyleReference::Url(url.to_string());
        Arc::clone(self).resolve_reference(reference, self.scope.clone(), 0)
    }

    /// Resolve a `Style` or `StyleMap` node.
    pub fn resolve_node(self: &Arc<Self>, node: Arc<XmlNode>) -> BoxFuture<'static, StylePair> {
        Arc::clone(self).resolve_reference(StyleReference::Inline(node), self.scope.clone(), 0)
    }

    /// Resolve a reference and keep the result shareable.
    pub fn pending(self: &Arc<Self>, reference: StyleReference) -> PendingStyle {
        PendingStyle::from_future(Arc::clone(self).resolve_reference(
            reference,
            self.scope.clone(),
            0,
        ))
    }

    fn resolve_reference(
        self: Arc<Self>,
        reference: StyleReference,
        scope: Scope,
        depth: usize,
    ) -> BoxFuture<'static, StylePair> {
        async move {
            if depth > MAX_STYLE_DEPTH {
                tracing::warn!(depth, "Style reference chain too deep, using no style");
                return StylePair::empty();
            }

            let (node, scope) = match reference {
                StyleReference::Inline(node) => (Some(node), scope),
                StyleReference::Url(url) => self.lookup(&url, scope).await,
            };

            match node {
                Some(node) => self.resolve_selector(node, scope, depth).await,
                None => StylePair::empty(),
            }
        }
        .boxed()
    }

    /// Find the node a `styleUrl` points at, loading external documents when needed.
    async fn lookup(&self, url: &str, scope: Scope) -> (Option<Arc<XmlNode>>, Scope) {
        let style_url = split_style_url(url);
        let scope = match style_url.document {
            None => scope,
            Some(document) => {
                let document_url = join_url(scope.base_url.as_deref(), document);
                match self.remote_index(&document_url).await {
                    Some(index) => Scope {
                        index,
                        base_url: Some(document_url),
                    },
                    None => return (None, scope),
                }
            }
        };

        let node = scope.index.get(style_url.id).cloned();
        if node.is_none() {
            tracing::warn!(style_url = %url, "Dangling style reference, using no style");
        }
        (node, scope)
    }

    async fn resolve_selector(
        self: Arc<Self>,
        node: Arc<XmlNode>,
        scope: Scope,
        depth: usize,
    ) -> StylePair {
        match StyleSelector::from_node(&node) {
            Some(StyleSelector::Style(style)) => StylePair::direct(style),
            Some(StyleSelector::Map(pairs)) => self.resolve_map(pairs, scope, depth).await,
            None => {
                tracing::warn!(node = %describe(&node), "Style reference does not point at a style");
                StylePair::empty()
            }
        }
    }

    /// Resolve every pair concurrently, then merge by key in declaration order.
    async fn resolve_map(self: Arc<Self>, pairs: Vec<Pair>, scope: Scope, depth: usize) -> StylePair {
        let resolutions = pairs.into_iter().map(|pair| {
            let resolver = Arc::clone(&self);
            let scope = scope.clone();
            async move {
                let normal = match pair.reference {
                    Some(reference) => {
                        resolver
                            .resolve_reference(reference, scope, depth + 1)
                            .await
                            .normal
                    }
                    None => None,
                };
                (pair.key, normal)
            }
        });

        StylePair::from_keyed(future::join_all(resolutions).await)
    }

    /// Style index of an external document, loaded once per URL.
    ///
    /// Concurrent lookups of the same URL share one load. Failed loads are
    /// remembered too, so each URL is fetched at most once per resolver.
    async fn remote_index(&self, url: &str) -> Option<Arc<StyleIndex>> {
        let Some(fetcher) = &self.fetcher else {
            tracing::warn!(url = %url, "External style reference without fetcher, using no style");
            return None;
        };
        inside_runtime().await;

        let load = {
            let mut remote = self.remote.lock().ok()?;
            remote
                .entry(url.to_string())
                .or_insert_with(|| load_index(url.to_string(), Arc::clone(fetcher)).boxed().shared())
                .clone()
        };
        load.await
    }
}

/// Ready once polled from within a Tokio runtime.
///
/// Fetching needs the runtime's reactor. A synchronous poll from outside one
/// leaves the resolution pending until it is awaited inside a runtime.
async fn inside_runtime() {
    future::poll_fn(|_| {
        if tokio::runtime::Handle::try_current().is_ok() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    })
    .await;
}

async fn load_index(url: String, fetcher: Arc<dyn Fetcher>) -> Option<Arc<StyleIndex>> {
    let mut loader = DocumentLoader::new(Source::Url(url.clone())).with_fetcher(fetcher);
    match loader.load().await {
        Ok(root) => Some(Arc::new(StyleIndex::build(&root))),
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "Failed to load external styles, using no style");
            None
        }
    }
}

impl fmt::Debug for StyleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleResolver")
            .field("styles", &self.scope.index.len())
            .field("base_url", &self.scope.base_url)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;
    use crate::xml::parse_document;
    use pretty_assertions::assert_eq;

    const STYLES: &str = r#"<kml><Document>
        <Style id="s1"><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
        <Style id="s2"><PolyStyle><color>ff00ff00</color></PolyStyle></Style>
        <StyleMap id="map">
            <Pair><key>normal</key><styleUrl>#s1</styleUrl></Pair>
            <Pair><key>highlight</key><styleUrl>#s2</styleUrl></Pair>
        </StyleMap>
        <StyleMap id="only-highlight">
            <Pair><key>highlight</key><styleUrl>#s1</styleUrl></Pair>
        </StyleMap>
        <StyleMap id="dangling">
            <Pair><key>normal</key><styleUrl>#missing</styleUrl></Pair>
            <Pair><key>highlight</key><styleUrl>#s2</styleUrl></Pair>
        </StyleMap>
        <StyleMap id="nested">
            <Pair><key>normal</key><styleUrl>#map</styleUrl></Pair>
        </StyleMap>
        <StyleMap id="loop">
            <Pair><key>normal</key><styleUrl>#loop</styleUrl></Pair>
        </StyleMap>
    </Document></kml>"#;

    fn resolver() -> Arc<StyleResolver> {
        let root = parse_document(STYLES).unwrap();
        Arc::new(StyleResolver::for_document(&root))
    }

    fn style_id(style: &Option<Arc<Style>>) -> Option<&str> {
        style.as_ref().and_then(|s| s.id.as_deref())
    }

    #[test]
    fn test_index_build() {
        let resolver = resolver();
        assert_eq!(resolver.index().len(), 7);
        assert!(resolver.index().get("map").is_some());
    }

    #[tokio::test]
    async fn test_resolve_direct_style() {
        let pair = resolver().resolve_url("#s1").await;
        assert_eq!(style_id(&pair.normal), Some("s1"));
        assert_eq!(pair.highlight, None);
    }

    #[tokio::test]
    async fn test_resolve_style_map() {
        let pair = resolver().resolve_url("#map").await;
        assert_eq!(style_id(&pair.normal), Some("s1"));
        assert_eq!(style_id(&pair.highlight), Some("s2"));
    }

    #[tokio::test]
    async fn test_resolve_style_map_missing_normal() {
        let pair = resolver().resolve_url("#only-highlight").await;
        assert_eq!(pair.normal, None);
        assert_eq!(style_id(&pair.highlight), Some("s1"));
    }

    #[tokio::test]
    async fn test_dangling_pair_does_not_fail_join() {
        let pair = resolver().resolve_url("#dangling").await;
        assert_eq!(pair.normal, None);
        assert_eq!(style_id(&pair.highlight), Some("s2"));
    }

    #[tokio::test]
    async fn test_nested_style_map_takes_normal() {
        let pair = resolver().resolve_url("#nested").await;
        assert_eq!(style_id(&pair.normal), Some("s1"));
        assert_eq!(pair.highlight, None);
    }

    #[tokio::test]
    async fn test_cyclic_reference_resolves_to_none() {
        let pair = resolver().resolve_url("#loop").await;
        assert_eq!(pair, StylePair::empty());
    }

    #[tokio::test]
    async fn test_external_reference_without_fetcher() {
        let pair = resolver().resolve_url("other.kml#s1").await;
        assert_eq!(pair, StylePair::empty());
    }

    #[tokio::test]
    async fn test_pending_style_shared() {
        let resolver = resolver();
        let pending = resolver.pending(StyleReference::Url("#s2".to_string()));
        let copy = pending.clone();
        assert!(copy.peek().is_none());

        let pair = pending.wait().await;
        assert_eq!(style_id(&pair.normal), Some("s2"));
        assert_eq!(copy.peek(), Some(&pair));
        assert_eq!(copy.current(), pair);
    }

    #[test]
    fn test_current_resolves_local_reference_without_runtime() {
        let pending = resolver().pending(StyleReference::Url("#map".to_string()));
        assert!(pending.peek().is_none());

        let pair = pending.current();
        assert_eq!(style_id(&pair.normal), Some("s1"));
        assert_eq!(style_id(&pair.highlight), Some("s2"));
        assert_eq!(pending.peek(), Some(&pair));
    }

    #[test]
    fn test_current_defers_external_reference_to_runtime() {
        struct StaticFetcher;

        #[async_trait::async_trait]
        impl Fetcher for StaticFetcher {
            async fn fetch(&self, _url: &str) -> crate::error::Result<Vec<u8>> {
                Ok(STYLES.as_bytes().to_vec())
            }
        }

        let root = parse_document("<kml/>").unwrap();
        let resolver = Arc::new(
            StyleResolver::for_document(&root)
                .with_base_url("https://maps.example/doc.kml")
                .with_fetcher(Arc::new(StaticFetcher)),
        );
        let pending = resolver.pending(StyleReference::Url("shared.kml#s1".to_string()));

        assert_eq!(pending.current(), StylePair::empty());
        assert!(pending.peek().is_none());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let pair = runtime.block_on(pending.wait());
        assert_eq!(style_id(&pair.normal), Some("s1"));
        assert_eq!(pending.current(), pair);
    }

    #[test]
    fn test_pending_style_default_is_ready() {
        let pending = PendingStyle::default();
        assert_eq!(pending.peek(), Some(&StylePair::empty()));
    }
}
