//! Fetching remote documents.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::LoaderConfig;
use crate::error::{KmlError, Result};

/// Source of raw document bytes, enabling mocking in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body behind `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] over HTTP(S).
///
/// Non-success statuses and bodies above the configured size are errors.
/// Failed requests are not retried.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_response_size: u64,
}

impl HttpFetcher {
    /// # Errors
    /// Returns `Http` if the client cannot be built.
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            max_response_size: config.max_response_size,
        })
    }

    fn check_size(&self, url: &str, size: u64) -> Result<()> {
        if size > self.max_response_size {
            return Err(KmlError::ResponseTooLarge {
                url: url.to_string(),
                size,
                limit: self.max_response_size,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(KmlError::UnsupportedSource(url.to_string()));
        }

        tracing::debug!(url = %url, "Fetching document");
        let fetch_error = |source| KmlError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        if let Some(length) = response.content_length() {
            self.check_size(url, length)?;
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        self.check_size(url, body.len() as u64)?;

        tracing::debug!(url = %url, bytes = body.len(), "Fetched document");
        Ok(body.to_vec())
    }
}

/// Decode a document body as UTF-8, dropping a byte order mark.
///
/// Invalid sequences are replaced and logged.
pub fn bytes_to_string(bytes: &[u8], url: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "Document is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_create_fetcher() {
        assert!(HttpFetcher::new(&LoaderConfig::default()).is_ok());
    }

    #[test]
    fn test_bytes_to_string() {
        assert_eq!(bytes_to_string(b"\xEF\xBB\xBF<kml/>", "u"), "<kml/>");
        assert_eq!(bytes_to_string(b"<kml>\xFF</kml>", "u"), "<kml>\u{FFFD}</kml>");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc.kml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<kml/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&LoaderConfig::default()).unwrap();
        let body = fetcher
            .fetch(&format!("{}/doc.kml", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<kml/>");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&LoaderConfig::default()).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing.kml", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, KmlError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_large_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = LoaderConfig::default().with_max_response_size(16);
        let fetcher = HttpFetcher::new(&config).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(
            err,
            KmlError::ResponseTooLarge { size: 64, limit: 16, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_schemes() {
        let fetcher = HttpFetcher::new(&LoaderConfig::default()).unwrap();
        let err = fetcher.fetch("file:///etc/doc.kml").await.unwrap_err();
        assert!(matches!(err, KmlError::UnsupportedSource(_)));
    }
}
