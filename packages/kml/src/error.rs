//! Error types for the KML scene compiler.
//!
//! A single `KmlError` covers construction, loading and usage errors. Absence
//! of optional nodes or attributes is never an error; see [`crate::registry::Retrieve`].

use thiserror::Error;

/// Main error type for the KML library.
#[derive(Debug, Error)]
pub enum KmlError {
    /// An element or document was constructed without a node.
    #[error("Missing node for {0}")]
    MissingNode(String),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Element with no registered factory.
    #[error("No factory for element <{tag_name}>{}", .context.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    UnknownElement {
        tag_name: String,
        context: Option<String>,
    },

    /// Malformed retrieval call (empty name list or attribute name).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to fetch a document.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body exceeded the configured limit.
    #[error("Response from {url} is {size} bytes, limit is {limit} bytes")]
    ResponseTooLarge { url: String, size: u64, limit: u64 },

    /// The source URL cannot be handled by the fetcher.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// KMZ archive could not be read.
    #[error("KMZ archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// KMZ archive has no `.kml` entry.
    #[error("No KML document found in archive {url}")]
    NoDocumentInArchive { url: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Background task failed to complete.
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// `update` was called without a render layer.
    #[error("A render layer must be provided to update the document")]
    MissingLayer,
}

/// Result type alias for KML operations.
pub type Result<T> = std::result::Result<T, KmlError>;
