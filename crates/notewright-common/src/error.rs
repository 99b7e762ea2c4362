//! Error types shared by the app, the cli and the renderer

use miette::Diagnostic;
use smol_str::SmolStr;

/// Main error type for notewright operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum NotewrightError {
    /// The request never produced a response (connection refused, dns, cors...)
    #[error("request to {endpoint} failed: {message}")]
    #[diagnostic(code(notewright::network))]
    Network { endpoint: SmolStr, message: String },

    /// The service answered with a non-2xx status
    #[error("{detail}")]
    #[diagnostic(code(notewright::http))]
    Http {
        endpoint: SmolStr,
        status: u16,
        detail: String,
    },

    /// HTTP 429 from the generation endpoint
    #[error("Daily quota exceeded")]
    #[diagnostic(
        code(notewright::quota),
        help("the generation quota refills daily; try again tomorrow")
    )]
    QuotaExceeded,

    /// Rejected before anything was sent
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    /// Response body did not match the expected shape
    #[error(transparent)]
    #[diagnostic(code(notewright::serde))]
    Serde(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(notewright::config))]
    Config(String),

    /// Local key-value storage refused a write
    #[error("storage error: {0}")]
    #[diagnostic(code(notewright::storage))]
    Storage(String),
}

impl NotewrightError {
    pub fn network(endpoint: impl Into<SmolStr>, err: impl std::fmt::Display) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    /// True for failures the user can only fix by trying again later.
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }
}

impl From<url::ParseError> for NotewrightError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Problems with user input, reported inline next to the form that caused them
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("File \"{name}\" is not a valid image or PDF")]
    #[diagnostic(code(notewright::validation::file_type))]
    UnsupportedFileType { name: String },

    #[error("Adding \"{name}\" would exceed the {limit} page limit. Currently at {current} pages.")]
    #[diagnostic(code(notewright::validation::page_limit))]
    PageLimitExceeded {
        name: String,
        limit: u32,
        current: u32,
    },

    #[error("Could not read PDF \"{name}\"")]
    #[diagnostic(code(notewright::validation::pdf))]
    UnreadablePdf { name: String },

    #[error("prompt is empty")]
    #[diagnostic(code(notewright::validation::prompt))]
    EmptyPrompt,

    #[error("prompt is longer than {max} characters")]
    #[diagnostic(code(notewright::validation::prompt))]
    PromptTooLong { max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_matches_product_copy() {
        assert_eq!(NotewrightError::QuotaExceeded.to_string(), "Daily quota exceeded");
        assert!(NotewrightError::QuotaExceeded.is_quota());
    }

    #[test]
    fn page_limit_message() {
        let err = ValidationError::PageLimitExceeded {
            name: "notes.pdf".into(),
            limit: 10,
            current: 8,
        };
        assert_eq!(
            err.to_string(),
            "Adding \"notes.pdf\" would exceed the 10 page limit. Currently at 8 pages."
        );
    }

    #[test]
    fn http_error_displays_detail_only() {
        let err = NotewrightError::Http {
            endpoint: "articles/9".into(),
            status: 404,
            detail: "Article not found".into(),
        };
        assert_eq!(err.to_string(), "Article not found");
    }
}
