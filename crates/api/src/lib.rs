pub mod error;
pub mod models;
pub mod pagerduty;
pub mod pagination;
pub mod retry;

pub use error::{ApiError, Result};
pub use models::{OnCall, OnCallQuery, Override, ScheduleReference, User, UserReference};
pub use pagerduty::ScheduleApi;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use retry::{retry_with_backoff, RetryConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.pagerduty.com";
const PAGERDUTY_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    /// REST API key, sent as `Authorization: Token token=<key>`.
    token: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(ApiError::InvalidUrl)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(PAGERDUTY_ACCEPT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(format!("myshift/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(ApiError::RequestFailed)?;

        Ok(Self {
            client,
            base_url: url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            retry_config: RetryConfig::default(),
        })
    }

    /// Client for the public PagerDuty API authenticated with a REST API key.
    pub fn pagerduty(token: impl Into<String>) -> Result<Self> {
        Ok(Self::new(DEFAULT_BASE_URL)?.with_api_token(token))
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, &[], Option::<&()>::None)
            .await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        self.request(Method::GET, path, query, Option::<&()>::None)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.base_url.clone();
        let joined = url
            .join(path.strip_prefix('/').unwrap_or(path))
            .map_err(ApiError::InvalidUrl)?;

        debug!(method = %method, url = %joined, params = query.len(), "Sending request");

        // A write that fails after PagerDuty stored it must not be replayed.
        let retry_config = if method == Method::GET {
            self.retry_config.clone()
        } else {
            RetryConfig::no_retry()
        };

        let result = retry_with_backoff(&retry_config, || async {
            let mut req = self
                .client
                .request(method.clone(), joined.clone())
                .timeout(self.timeout);
            req = self.apply_auth(req);

            if !query.is_empty() {
                req = req.query(query);
            }

            if let Some(body) = body {
                req = req.json(body);
            }

            let response = req.send().await.map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout { attempts: 1 }
                } else {
                    ApiError::RequestFailed(e)
                }
            })?;

            let status = response.status();

            match status {
                StatusCode::UNAUTHORIZED => Err(ApiError::AuthenticationFailed {
                    message: "Invalid or expired PagerDuty token".to_string(),
                }),
                StatusCode::NOT_FOUND => {
                    let resource = joined.path().to_string();
                    Err(ApiError::NotFound { resource })
                }
                StatusCode::BAD_REQUEST => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Bad request".to_string());
                    Err(ApiError::BadRequest { message })
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(60);
                    Err(ApiError::RateLimitExceeded { retry_after })
                }
                status if status.is_server_error() => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Server error".to_string());
                    Err(ApiError::ServerError {
                        status: status.as_u16(),
                        message,
                    })
                }
                status if status.is_success() => {
                    let text = response.text().await.map_err(ApiError::RequestFailed)?;
                    // Some write endpoints answer 204 with no body.
                    let text = if text.trim().is_empty() { "null" } else { &text };
                    serde_json::from_str::<T>(text).map_err(|e| {
                        error!("Failed to parse JSON response: {}", e);
                        ApiError::InvalidResponse(e.to_string())
                    })
                }
                _ => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| format!("Unexpected status: {}", status));
                    Err(ApiError::ServerError {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        })
        .await?;

        Ok(result)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token token={token}")),
            None => request,
        }
    }
}
