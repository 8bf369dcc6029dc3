//! Parsing error types for HTML extraction
//!
//! Extraction gaps (an element the rules point at is not on the page) are not
//! errors; they surface as missing fields. These variants cover selector and
//! URL problems that callers may want to log or report.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn url_resolution_failed(url: &str, reason: &str, base_url: Option<&str>) -> Self {
        Self::UrlResolutionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            base_url: base_url.map(str::to_string),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
