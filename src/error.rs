//! Error taxonomy for the rewriting core.

use thiserror::Error;

/// Errors surfaced by registry mutations, directive parsing and rewriting.
///
/// Every error is returned to the immediate caller. Nothing in the core
/// retries or falls back to sending a request unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// A string could not be used as an absolute http(s) URL.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request carried hints the pipeline cannot act on,
    /// e.g. more than one domain-name header.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request path is shorter than the base it is supposed to replace.
    #[error(
        "final path is {final_path} ({segments} path segments), \
         but the base url {basis} declares a path size of {path_size}"
    )]
    PathSizeMismatch {
        final_path: String,
        segments: usize,
        path_size: usize,
        basis: String,
    },

    /// A path-size directive whose value is not a non-negative integer.
    #[error("invalid path size directive `{0}`")]
    InvalidDirective(String),
}

impl RewriteError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        RewriteError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RewriteError::InvalidUrl { .. } => "invalid_url",
            RewriteError::Configuration(_) => "configuration",
            RewriteError::PathSizeMismatch { .. } => "path_size_mismatch",
            RewriteError::InvalidDirective(_) => "invalid_directive",
        }
    }
}

/// Result type for rewriting operations.
pub type RewriteResult<T> = Result<T, RewriteError>;
