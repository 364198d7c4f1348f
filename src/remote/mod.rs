//! Remote milestone hierarchy source.
//!
//! The grid can start from a snapshot served over HTTP. The payload is the
//! nested client/project/milestone document described in
//! [`crate::model::hierarchy`].

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::RemoteClient;

/// Anything that can produce the remote hierarchy.
///
/// Implemented over HTTP for real use; tests substitute canned sources.
pub trait HierarchySource: Send + Sync {
    /// Fetch the full hierarchy.
    fn fetch(&self) -> impl std::future::Future<Output = Result<Vec<RemoteClient>>> + Send;
}

/// Fetches the hierarchy with an HTTP GET.
pub struct HttpHierarchySource {
    client: reqwest::Client,
    url: String,
}

impl HttpHierarchySource {
    /// Create a source for `url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HierarchySource for HttpHierarchySource {
    async fn fetch(&self) -> Result<Vec<RemoteClient>> {
        debug!(url = %self.url, "Fetching milestone hierarchy");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        response
            .json::<Vec<RemoteClient>>()
            .await
            .map_err(|e| Error::Remote(format!("invalid hierarchy payload: {e}")))
    }
}
