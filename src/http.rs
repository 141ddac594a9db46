//! HTTP client abstraction for the language-model API.
//!
//! The backend talks to the API through the [`HttpClient`] trait so tests can
//! inject canned responses without touching the network.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::BackendError;

/// A raw API response: HTTP status plus body text.
///
/// Status classification is left to the caller so the backend can decide
/// which codes are fatal.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Returns the body on a 2xx status, otherwise the mapped backend error.
    pub fn into_body(self) -> Result<String, BackendError> {
        if (200..300).contains(&self.status) {
            Ok(self.body)
        } else {
            Err(BackendError::from_status(self.status, &self.body))
        }
    }
}

/// Trait for POSTing JSON to the API.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body.
    ///
    /// Transport failures (connect, timeout) are classified into
    /// [`BackendError`]; non-2xx statuses are returned as data, not errors.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<ApiResponse, BackendError>;
}

/// Production implementation backed by reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<ApiResponse, BackendError> {
        let mut request = self.client.post(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_its_body() {
        let response = ApiResponse {
            status: 200,
            body: "hello".to_string(),
        };
        assert_eq!(response.into_body().unwrap(), "hello");
    }

    #[test]
    fn auth_failure_maps_to_authentication() {
        let response = ApiResponse {
            status: 401,
            body: "invalid x-api-key".to_string(),
        };
        assert!(matches!(
            response.into_body(),
            Err(BackendError::Authentication)
        ));
    }

    #[test]
    fn rate_limited_response_maps_to_rate_limit() {
        let response = ApiResponse {
            status: 429,
            body: String::new(),
        };
        assert!(matches!(response.into_body(), Err(BackendError::RateLimit)));
    }
}
