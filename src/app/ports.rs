use async_trait::async_trait;

use crate::error::SourceError;

/// Retrieval side of the pipeline. Implementations bound each call with their
/// own timeout and never retry.
///
/// A non-2xx status is returned as `Ok` with `ok() == false`; only transport
/// failures (connect, timeout, read) are `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, SourceError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body when the status is 2xx, otherwise the status as an error.
    pub fn into_body(self) -> Result<String, SourceError> {
        if self.ok() {
            Ok(self.body)
        } else {
            Err(SourceError::HttpStatus {
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_range() {
        assert!(FetchResponse::new(200, "").ok());
        assert!(FetchResponse::new(204, "").ok());
        assert!(!FetchResponse::new(199, "").ok());
        assert!(!FetchResponse::new(301, "").ok());
        assert!(!FetchResponse::new(500, "").ok());
    }

    #[test]
    fn test_into_body_gates_on_status() {
        assert_eq!(FetchResponse::new(200, "a;b").into_body().unwrap(), "a;b");
        assert_eq!(
            FetchResponse::new(404, "missing").into_body(),
            Err(SourceError::HttpStatus { status: 404 })
        );
    }
}
