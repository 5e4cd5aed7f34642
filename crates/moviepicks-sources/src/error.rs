use std::fmt::Display;
use thiserror::Error;

/// Failure of an external collaborator.
///
/// None of these are fatal to a run: callers skip the affected page, item
/// or field and fall back to a documented sentinel.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-2xx status, network error or timeout
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: &'static str, reason: String },

    /// The collaborator answered, but not in the expected shape
    #[error("malformed response from {source_name}: {reason}")]
    MalformedResponse { source_name: &'static str, reason: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl SourceError {
    pub fn unavailable(source_name: &'static str, reason: impl Display) -> Self {
        Self::Unavailable {
            source_name,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(source_name: &'static str, reason: impl Display) -> Self {
        Self::MalformedResponse {
            source_name,
            reason: reason.to_string(),
        }
    }

    /// Body decoding problems are shape problems; everything else reqwest
    /// reports (connect, timeout, status) means the source is unavailable.
    pub fn from_reqwest(source_name: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(source_name, err)
        } else {
            Self::unavailable(source_name, err)
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SourceError::MalformedResponse { .. })
    }
}
