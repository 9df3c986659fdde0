use crate::app::ports::{FetchResponse, Fetcher};
use crate::config::FetchConfig;
use crate::error::{IntegrationError, SourceError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Fetcher backed by a shared `reqwest::Client`. Endpoints that name a local
/// file (`file://` URL or an existing path) are read from disk instead.
pub struct ReqwestFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, IntegrationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IntegrationError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    async fn fetch_local(&self, path: &Path) -> Result<FetchResponse, SourceError> {
        info!("Reading local file: {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::Network(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(FetchResponse {
            status: 200,
            body: decode_body(&bytes),
            content_type: None,
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<FetchResponse, SourceError> {
        info!("HTTP GET request to: {}", url);
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Network(format!("request timed out after {:?}", self.timeout))
            } else {
                SourceError::Network(e.to_string())
            }
        })?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("failed to read body: {e}")))?;
        debug!(
            "HTTP response: status={}, size={} bytes, content_type={:?}",
            status,
            bytes.len(),
            content_type
        );
        let response = FetchResponse {
            status,
            body: decode_body(&bytes),
            content_type,
        };
        if !response.ok() {
            warn!("Non-success status {} from {}", status, url);
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, SourceError> {
        match local_path(url) {
            Some(path) => self.fetch_local(&path).await,
            None => self.fetch_remote(url).await,
        }
    }
}

/// Resolve an endpoint to a local file, if it names one.
fn local_path(endpoint: &str) -> Option<PathBuf> {
    if let Some(rest) = endpoint.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if endpoint.contains("://") {
        return None;
    }
    let path = Path::new(endpoint);
    path.is_file().then(|| path.to_path_buf())
}

/// Decode a payload as UTF-8 (BOM stripped), falling back to Latin-1 for
/// legacy exports that are not valid UTF-8.
pub fn decode_body(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_body("año;mes".as_bytes()), "año;mes");
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"fecha;valor");
        assert_eq!(decode_body(&bytes), "fecha;valor");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "año" in ISO-8859-1
        let bytes = [b'a', 0xF1, b'o'];
        assert_eq!(decode_body(&bytes), "año");
    }

    #[test]
    fn test_local_path_detection() {
        assert!(local_path("https://example.com/data.csv").is_none());
        assert_eq!(
            local_path("file:///tmp/data.csv"),
            Some(PathBuf::from("/tmp/data.csv"))
        );
        assert!(local_path("/definitely/not/a/file.csv").is_none());

        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert_eq!(local_path(&path), Some(file.path().to_path_buf()));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"a;b\n1;2\n").unwrap();
        let fetcher = ReqwestFetcher::new(&FetchConfig::default()).unwrap();
        let resp = fetcher.fetch(file.path().to_str().unwrap()).await.unwrap();
        assert!(resp.ok());
        assert_eq!(resp.body, "a;b\n1;2\n");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_url_is_network_error() {
        let fetcher = ReqwestFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch("file:///definitely/not/here.csv").await;
        assert!(matches!(result, Err(SourceError::Network(_))));
    }
}
