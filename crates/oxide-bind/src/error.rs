//! Error types for parameter binding.

use thiserror::Error;

/// Errors raised while expanding a template, before anything is executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The SQL references a parameter that was not supplied.
    #[error("missing parameter ':{name}'")]
    MissingParameter {
        /// Name of the parameter, without the leading colon.
        name: String,
    },
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
