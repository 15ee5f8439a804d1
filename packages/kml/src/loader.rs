//! Loading KML and KMZ documents.
//!
//! A [`DocumentLoader`] turns a [`Source`] into the `<kml>` root node.
//! Remote bodies are fetched through a [`Fetcher`]; KMZ archives are
//! unpacked on a blocking task and their first `.kml` entry is parsed.

use std::io::{Cursor, Read};
use std::sync::Arc;

use zip::ZipArchive;

use crate::config::{is_archive_url, is_kml_entry, ZIP_SIGNATURE};
use crate::error::{KmlError, Result};
use crate::http::{bytes_to_string, Fetcher};
use crate::xml::{parse_document, XmlNode};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Markup held in memory.
    Inline(String),
    /// A KML or KMZ document behind a URL.
    Url(String),
}

impl Source {
    /// URL relative style references resolve against.
    pub fn base_url(&self) -> Option<&str> {
        match self {
            Self::Inline(_) => None,
            Self::Url(url) => Some(url.as_str()),
        }
    }
}

/// Progress of a [`DocumentLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unstarted,
    Loading,
    Ready,
    Failed,
}

/// Loads one document and keeps its root once loaded.
pub struct DocumentLoader {
    source: Source,
    fetcher: Option<Arc<dyn Fetcher>>,
    state: LoadState,
    root: Option<Arc<XmlNode>>,
}

impl DocumentLoader {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fetcher: None,
            state: LoadState::Unstarted,
            root: None,
        }
    }

    /// Fetcher used for [`Source::Url`].
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Load the document and return its `<kml>` root.
    ///
    /// A loaded document is returned from cache. After a failure the next
    /// call loads again.
    ///
    /// # Errors
    /// Fetch, archive and XML errors. A URL source without a fetcher is
    /// `UnsupportedSource`.
    pub async fn load(&mut self) -> Result<Arc<XmlNode>> {
        if let (LoadState::Ready, Some(root)) = (self.state, &self.root) {
            return Ok(Arc::clone(root));
        }

        self.state = LoadState::Loading;
        match self.load_source().await {
            Ok(root) => {
                self.state = LoadState::Ready;
                self.root = Some(Arc::clone(&root));
                Ok(root)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load document");
                self.state = LoadState::Failed;
                Err(err)
            }
        }
    }

    async fn load_source(&self) -> Result<Arc<XmlNode>> {
        match &self.source {
            Source::Inline(markup) => {
                let root = parse_document(markup)?;
                tokio::task::yield_now().await;
                Ok(root)
            }
            Source::Url(url) => {
                let Some(fetcher) = &self.fetcher else {
                    return Err(KmlError::UnsupportedSource(format!(
                        "{url} (no fetcher configured)"
                    )));
                };
                let bytes = fetcher.fetch(url).await?;
                let markup = if is_archive_url(url) || bytes.starts_with(ZIP_SIGNATURE) {
                    let archive_url = url.clone();
                    tokio::task::spawn_blocking(move || extract_kml(&bytes, &archive_url)).await??
                } else {
                    bytes_to_string(&bytes, url)
                };
                parse_document(&markup)
            }
        }
    }
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("source", &self.source)
            .field("state", &self.state)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

/// Extract the first `.kml` entry (in archive order) from KMZ bytes.
///
/// # Errors
/// Returns `Archive` for unreadable archives and `NoDocumentInArchive` when
/// no entry ends in `.kml`.
pub fn extract_kml(bytes: &[u8], url: &str) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() || !is_kml_entry(entry.name()) {
            continue;
        }
        tracing::debug!(url = %url, entry = %entry.name(), "Extracting KML from archive");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        return Ok(bytes_to_string(&contents, url));
    }
    Err(KmlError::NoDocumentInArchive {
        url: url.to_string(),
    })
}
