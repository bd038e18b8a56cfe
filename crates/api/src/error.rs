use thiserror::Error;

/// Failures talking to PagerDuty.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("PagerDuty rate limit hit, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("PagerDuty rejected the request: {message}")]
    BadRequest { message: String },

    /// 5xx, or any other status PagerDuty is not expected to send.
    #[error("PagerDuty returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[source] url::ParseError),

    #[error("PagerDuty did not respond after {attempts} attempt(s)")]
    Timeout { attempts: usize },

    #[error("Unexpected response from PagerDuty: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Throttling, gateway failures and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::ServerError { status, .. } => *status >= 500,
            ApiError::RateLimitExceeded { .. } | ApiError::Timeout { .. } => true,
            _ => false,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationFailed { .. } => {
                Some("Check pagerduty_token with: myshift config --validate")
            }
            ApiError::RateLimitExceeded { .. } => {
                Some("PagerDuty is throttling requests; wait a minute and try again")
            }
            ApiError::NotFound { .. } => {
                Some("Check the schedule ID and user email address are correct")
            }
            ApiError::BadRequest { .. } => Some("Review the command arguments"),
            ApiError::Timeout { .. } => Some("Check your network connection or try again later"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
