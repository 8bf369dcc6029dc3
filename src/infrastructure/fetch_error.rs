//! Error types for page retrieval

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid fetch request: {reason}")]
    InvalidRequest { reason: String },

    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Redirect {status} from {url} has no usable Location header")]
    InvalidRedirect { url: String, status: u16 },

    #[error("Redirect chain not resolved after {attempts} attempts, last target: {url}")]
    RedirectExhausted { url: String, attempts: u32 },

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Map a transport-level reqwest failure for `url`
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Whether trying the same page again later could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::InvalidRequest { .. }
            | Self::InvalidRedirect { .. }
            | Self::RedirectExhausted { .. }
            | Self::Client(_) => false,
        }
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::InvalidRedirect { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let server_error = FetchError::Status {
            status: 503,
            url: "https://www.amazon.in/".to_string(),
        };
        let not_found = FetchError::Status {
            status: 404,
            url: "https://www.amazon.in/".to_string(),
        };
        let exhausted = FetchError::RedirectExhausted {
            url: "https://www.amazon.in/".to_string(),
            attempts: 2,
        };

        assert!(server_error.is_recoverable());
        assert!(!not_found.is_recoverable());
        assert!(!exhausted.is_recoverable());
        assert_eq!(not_found.status(), Some(404));
        assert_eq!(exhausted.status(), None);
    }
}
