//! REST client for the dashboard endpoints.
//!
//! # Endpoints
//!
//! All paths are relative to the configured base URL:
//!
//! - `/api/products/...` - catalogue management (see [`products`])
//! - `/api/orders/...` - order management (see [`orders`])
//!
//! Requests carry `Authorization: Bearer <key>` when an API key is
//! configured. Error bodies follow the FastAPI convention `{"detail": "..."}`.

pub mod orders;
pub mod products;

use std::sync::Arc;

use cartlink_core::ImageResolver;
use cartlink_core::error_body::{error_message, truncate};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::AdminConfig;

/// Maximum number of body characters written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when calling the dashboard endpoints.
#[derive(Debug, Error)]
pub enum AdminError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was rejected as invalid (HTTP 400 or 422), or failed a
    /// client-side check before being sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build a URL or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failed to build a multipart upload.
    #[error("Multipart error: {0}")]
    Multipart(String),
}

/// Client for the dashboard endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    images: ImageResolver,
}

impl AdminClient {
    /// Create a new dashboard client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(auth_value) = config.authorization() {
            let mut value = HeaderValue::from_str(&auth_value)
                .map_err(|e| AdminError::Parse(format!("Invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: config.api_base_url.clone(),
                images: config.image_resolver(),
            }),
        })
    }

    /// Resolve a product image path to a fetchable URL or the placeholder.
    #[must_use]
    pub fn image_url(&self, path: Option<&str>) -> String {
        self.inner.images.url_for(path)
    }

    /// Build `{base}/api/{segments...}`.
    ///
    /// `.` and `..` are refused since URL paths would collapse them.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdminError> {
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(AdminError::Validation(format!(
                "invalid path segment {segment:?}"
            )));
        }

        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AdminError::Parse("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET request.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, AdminError> {
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// Execute a POST request, with a JSON body if one is given.
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, AdminError> {
        let mut request = self.inner.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        handle_response(request.send().await?).await
    }

    /// Execute a PUT request with a JSON body.
    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, AdminError> {
        let response = self.inner.client.put(url).json(body).send().await?;
        handle_response(response).await
    }

    /// Execute a PATCH request, with a JSON body if one is given.
    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, AdminError> {
        let mut request = self.inner.client.patch(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        handle_response(request.send().await?).await
    }

    /// Execute a DELETE request.
    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, AdminError> {
        let response = self.inner.client.delete(url).send().await?;
        handle_response(response).await
    }

    /// Execute a multipart POST request.
    async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, AdminError> {
        let response = self.inner.client.post(url).multipart(form).send().await?;
        handle_response(response).await
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Body-less requests.
const NO_BODY: Option<&()> = None;

// =============================================================================
// Response Handling
// =============================================================================

/// Map a response to `T` or an [`AdminError`].
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AdminError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(AdminError::RateLimited(retry_after));
    }

    // Read as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Dashboard API returned server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Dashboard API rejected request"
            );
        }

        let message = error_message(&body);
        return Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AdminError::Validation(message)
            }
            StatusCode::NOT_FOUND => AdminError::NotFound(message),
            other => AdminError::Api {
                status: other.as_u16(),
                message,
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body, LOG_BODY_LIMIT),
            "Failed to parse dashboard API response"
        );
        AdminError::Parse(e.to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdminClient {
        AdminClient::new(&AdminConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.endpoint(&["orders"]).unwrap().as_str(),
            "http://localhost:8000/api/orders"
        );
        assert_eq!(
            client.endpoint(&["products", ""]).unwrap().as_str(),
            "http://localhost:8000/api/products/"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = client("https://shop.example/backend/");
        assert_eq!(
            client.endpoint(&["products", "a/b", "image"]).unwrap().as_str(),
            "https://shop.example/backend/api/products/a%2Fb/image"
        );
    }

    #[test]
    fn test_endpoint_rejects_dot_segments() {
        let client = client("http://localhost:8000");
        assert!(matches!(
            client.endpoint(&["products", "..", "toggle-active"]),
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            client.endpoint(&["orders", "."]),
            Err(AdminError::Validation(_))
        ));
        assert!(client.endpoint(&["products", "..."]).is_ok());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let mut config = AdminConfig::new(Url::parse("http://localhost:8000").unwrap());
        config.api_key = Some(secrecy::SecretString::from("k9Qz2mLr7vTx".to_string()));
        let client = AdminClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("k9Qz2mLr7vTx"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AdminError::Validation("Estado inválido".to_string()).to_string(),
            "Validation error: Estado inválido"
        );
        assert_eq!(
            AdminError::Api {
                status: 503,
                message: "down".to_string()
            }
            .to_string(),
            "API error: 503 - down"
        );
    }
}
