use thiserror::Error;

/// Failures that must stay distinguishable from an empty "not found" result.
#[derive(Debug, Error)]
pub enum IneError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream request to {path} timed out")]
    Timeout { path: String },
    #[error("upstream returned HTTP {status} for {path}")]
    Status { status: u16, path: String },
    #[error("failed to decode upstream response for {path}: {message}")]
    Decode { path: String, message: String },
    #[error("invalid {name}: {message}")]
    InvalidParams { name: &'static str, message: String },
}

impl IneError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            name,
            message: message.into(),
        }
    }

    pub(crate) fn decode(path: &str, message: impl ToString) -> Self {
        Self::Decode {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns `true` when the caller supplied a bad argument.
    #[must_use]
    pub const fn is_invalid_params(&self) -> bool {
        matches!(self, Self::InvalidParams { .. })
    }
}

pub type IneResult<T> = Result<T, IneError>;
