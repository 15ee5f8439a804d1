//! Configuration constants, loader settings and URL helpers.

use std::time::Duration;

use url::Url;

/// Tag name of the document root element.
pub const ROOT_TAG: &str = "kml";

/// File extension of plain KML documents.
pub const KML_EXTENSION: &str = ".kml";

/// File extension of zipped KML documents.
pub const KMZ_EXTENSION: &str = ".kmz";

/// Signature at the start of every ZIP local file header.
pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (100 MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of style references followed for a single lookup.
///
/// Protects against `StyleMap` pairs that (indirectly) point at themselves.
pub const MAX_STYLE_DEPTH: usize = 8;

/// User agent string sent with every fetch.
pub const USER_AGENT: &str = concat!("kml-scene/", env!("CARGO_PKG_VERSION"));

/// Settings for loading documents over the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub timeout: Duration,
    pub max_response_size: u64,
    pub user_agent: String,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_size(mut self, max_response_size: u64) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a URL points at a KMZ archive.
///
/// Only the path is inspected; query strings and fragments are ignored.
///
/// # Examples
/// ```
/// use kml_scene::config::is_archive_url;
///
/// assert!(is_archive_url("https://example.com/data/parks.kmz"));
/// assert!(is_archive_url("https://example.com/parks.KMZ?token=abc"));
/// assert!(!is_archive_url("https://example.com/parks.kml"));
/// assert!(is_archive_url("local/parks.kmz"));
/// ```
pub fn is_archive_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query_and_fragment(url).to_string(),
    };
    path.to_ascii_lowercase().ends_with(KMZ_EXTENSION)
}

/// Check whether an archive entry name is a plain KML document.
pub fn is_kml_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(KML_EXTENSION)
}

fn strip_query_and_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// A parsed `styleUrl` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleUrl<'a> {
    /// Document part before `#`, `None` for references into the same document.
    pub document: Option<&'a str>,
    /// Style id after `#`.
    pub id: &'a str,
}

/// Split a `styleUrl` into its document and id parts.
///
/// A value without `#` is treated as a bare id in the current document.
///
/// # Examples
/// ```
/// use kml_scene::config::split_style_url;
///
/// let local = split_style_url("#sunny");
/// assert_eq!(local.document, None);
/// assert_eq!(local.id, "sunny");
///
/// let remote = split_style_url("styles.kml#sunny");
/// assert_eq!(remote.document, Some("styles.kml"));
/// assert_eq!(remote.id, "sunny");
/// ```
pub fn split_style_url(value: &str) -> StyleUrl<'_> {
    let value = value.trim();
    match value.rsplit_once('#') {
        Some((document, id)) => StyleUrl {
            document: Some(document).filter(|d| !d.is_empty()),
            id,
        },
        None => StyleUrl {
            document: None,
            id: value,
        },
    }
}

/// Resolve a (possibly relative) document reference against a base URL.
///
/// Without a base, or when the base cannot be parsed, the reference is
/// returned unchanged.
///
/// # Examples
/// ```
/// use kml_scene::config::join_url;
///
/// assert_eq!(
///     join_url(Some("https://example.com/kml/main.kml"), "styles.kml"),
///     "https://example.com/kml/styles.kml"
/// );
/// assert_eq!(join_url(None, "styles.kml"), "styles.kml");
/// ```
pub fn join_url(base: Option<&str>, reference: &str) -> String {
    base.and_then(|b| Url::parse(b).ok())
        .and_then(|b| b.join(reference).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| reference.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(HTTP_TIMEOUT_SECS));
        assert_eq!(config.max_response_size, DEFAULT_MAX_RESPONSE_SIZE);
        assert!(config.user_agent.starts_with("kml-scene/"));
    }

    #[test]
    fn test_loader_config_builders() {
        let config = LoaderConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_max_response_size(1024)
            .with_user_agent("globe/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_response_size, 1024);
        assert_eq!(config.user_agent, "globe/1.0");
    }

    #[test]
    fn test_is_archive_url() {
        assert!(is_archive_url("https://example.com/a.kmz"));
        assert!(is_archive_url("https://example.com/a.kmz#frag"));
        assert!(is_archive_url("relative/dir/a.kmz?x=1"));
        assert!(!is_archive_url("https://example.com/a.kml"));
        assert!(!is_archive_url("https://example.com/a.kmz.kml"));
        assert!(!is_archive_url("https://example.com/?file=a.kmz"));
    }

    #[test]
    fn test_is_kml_entry() {
        assert!(is_kml_entry("doc.kml"));
        assert!(is_kml_entry("files/DOC.KML"));
        assert!(!is_kml_entry("files/icon.png"));
    }

    #[test]
    fn test_split_style_url_bare_id() {
        let url = split_style_url("  plain ");
        assert_eq!(url.document, None);
        assert_eq!(url.id, "plain");
    }

    #[test]
    fn test_split_style_url_absolute() {
        let url = split_style_url("https://example.com/styles.kml#red");
        assert_eq!(url.document, Some("https://example.com/styles.kml"));
        assert_eq!(url.id, "red");
    }

    #[test]
    fn test_join_url_absolute_reference() {
        assert_eq!(
            join_url(Some("https://example.com/a/b.kml"), "https://other.org/c.kml"),
            "https://other.org/c.kml"
        );
    }
}
