//! HTTP client for the upstream fantasy API.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};

use crate::config::SyncConfig;
use crate::error::SyncError;

/// Source of upstream JSON documents addressed by relative path.
///
/// Implemented by [`UpstreamClient`]. The paginator and the gameweek
/// resolver only depend on this trait.
pub trait FetchJson: Send + Sync {
    /// Fetches and decodes the JSON document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an upstream [`SyncError`] variant on transport failure,
    /// non-success status, or an undecodable body.
    fn fetch_json(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<serde_json::Value, SyncError>> + Send;
}

/// Read-only client for the upstream API.
///
/// Cheap to clone: the inner `reqwest::Client` shares its connection pool.
/// Every request carries the identifying header set and is bounded by the
/// configured timeout. Failures are returned immediately, never retried.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Builds a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if `user_agent` is not a valid header
    /// value or the TLS backend cannot be initialized.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://fantasy.premierleague.com/"),
        );

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("cannot build upstream client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the upstream section of [`SyncConfig`].
    ///
    /// # Errors
    ///
    /// See [`UpstreamClient::new`].
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::new(
            &config.upstream_base_url,
            &config.upstream_user_agent,
            config.upstream_timeout(),
        )
    }

    /// Absolute URL for a relative resource path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issues a `GET` for `path` and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// - [`SyncError::UpstreamTransport`] if no response arrives in time.
    /// - [`SyncError::UpstreamHttp`] on a non-2xx status.
    /// - [`SyncError::UpstreamParse`] if the body is not JSON.
    pub async fn fetch_resource(&self, path: &str) -> Result<serde_json::Value, SyncError> {
        let url = self.url_for(path);
        tracing::debug!(%url, "upstream request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UpstreamHttp {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(path, &e))?;

        serde_json::from_slice(&body).map_err(|e| SyncError::UpstreamParse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl FetchJson for UpstreamClient {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, SyncError> {
        self.fetch_resource(path).await
    }
}

fn transport_error(path: &str, err: &reqwest::Error) -> SyncError {
    let message = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };
    SyncError::UpstreamTransport {
        path: path.to_string(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        let Ok(client) = UpstreamClient::new(base, "test-agent", Duration::from_secs(1)) else {
            panic!("client should build");
        };
        client
    }

    #[test]
    fn joins_base_and_path_with_one_slash() {
        let c = client("https://example.test/api/");
        assert_eq!(
            c.url_for("/bootstrap-static/"),
            "https://example.test/api/bootstrap-static/"
        );
        assert_eq!(
            c.url_for("leagues-classic/1/standings/?page_standings=2"),
            "https://example.test/api/leagues-classic/1/standings/?page_standings=2"
        );
    }

    #[test]
    fn rejects_invalid_user_agent() {
        let result = UpstreamClient::new("https://example.test", "bad\nagent", Duration::from_secs(1));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 on loopback is the discard service; nothing listens in CI.
        let c = client("http://127.0.0.1:9");
        let result = c.fetch_resource("bootstrap-static/").await;
        let Err(SyncError::UpstreamTransport { path, .. }) = result else {
            panic!("expected transport error, got {result:?}");
        };
        assert_eq!(path, "bootstrap-static/");
    }
}
