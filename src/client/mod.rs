//! HTTP client plumbing for the workflow backend.
//!
//! [`ApiClient`] owns one configured reqwest client. Request helpers decode
//! success bodies as JSON and turn failure responses into
//! [`FlowcanvasError::Api`], preferring the backend's `{"detail": ...}`
//! message when one is present.

mod save;
mod workflows;

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{
    Method, RequestBuilder, Response,
    header::{HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{FlowcanvasError, Result, config::{ApiAuth, ApiConfig}};

pub use save::{SaveOutcome, save, save_validated};
pub use workflows::{Issue, ValidationReport, WorkflowApi};

/// Error body shape the backend uses for every failure.
#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Configured HTTP client for the workflow backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(value) = Self::auth_header(&config.auth)? {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the Authorization header value for the configured scheme.
    fn auth_header(auth: &ApiAuth) -> Result<Option<HeaderValue>> {
        let value = match auth {
            ApiAuth::None => return Ok(None),
            ApiAuth::Bearer {
                token,
            } => format!("Bearer {}", token),
            ApiAuth::Basic {
                credentials,
            } => {
                let encoded = if credentials.contains(':') {
                    STANDARD.encode(credentials.as_bytes())
                } else {
                    credentials.clone()
                };
                format!("Basic {}", encoded)
            }
        };
        let value = value.parse().map_err(|err: InvalidHeaderValue| FlowcanvasError::Config(err.to_string()))?;
        Ok(Some(value))
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
    ) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Map a failure response to an error carrying the server detail when
    /// the body has one, the HTTP status when it is JSON without a detail,
    /// and a generic message when it is not JSON at all.
    async fn error_from_response(response: Response) -> FlowcanvasError {
        let status = response.status();
        let detail = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.detail.unwrap_or_default(),
            Err(_) => "Request failed".to_string(),
        };
        if detail.is_empty() {
            FlowcanvasError::Api(format!("HTTP {}", status.as_u16()))
        } else {
            FlowcanvasError::Api(detail)
        }
    }
}
