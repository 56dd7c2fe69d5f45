use thiserror::Error;

use crate::domain::Kind;

/// Failures of a history pipeline run.
///
/// Every layer (parser, normalizer, fetcher, service) reports through this
/// one type so errors reach the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("fetch of {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("malformed tabular data at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("invalid filter: {0}")]
    Validation(String),

    #[error("{kind} series for region '{region}' has no usable values")]
    EmptySeries { kind: Kind, region: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HistoryError {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn network(url: &str, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Process exit code used by the binary for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            HistoryError::Validation(_) | HistoryError::InvalidConfig(_) => 2,
            HistoryError::Parse { .. } | HistoryError::EmptySeries { .. } => 3,
            HistoryError::Network { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
