//! Error types for query generation

use thiserror::Error;

/// Errors that can occur while compiling a statement
///
/// All errors are raised before any SQL text is returned; a builder never
/// emits a partial statement.
#[derive(Debug, Error)]
pub enum QueryGeneratorError {
    /// The input is structurally incomplete or uses an unsupported operator
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested option or capability cannot be rendered for SQL Server
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryGeneratorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFeature(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QueryGeneratorError>;
