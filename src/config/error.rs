use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("file is not readable: {0}")]
    PermissionDenied(PathBuf),

    #[error("failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid JSON schema in '{path}': {message}")]
    InvalidSchema { path: PathBuf, message: String },

    #[error("configuration does not match schema: {message}")]
    SchemaViolation { message: String },

    #[error("semantic check failed: {message}")]
    SemanticCheckFailed { message: String },

    #[error("{type_name} must implement additional_checks()")]
    NotImplemented { type_name: &'static str },

    #[error("missing configuration key: '{path}'")]
    MissingKey { path: String },

    #[error("failed to deserialize '{path}': {source}")]
    Deserialize {
        path: String,
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Reports a business rule violated by an otherwise schema-valid document.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::SemanticCheckFailed {
            message: message.into(),
        }
    }

    /// For configuration types that have not written their checks yet.
    pub fn not_implemented<T: ?Sized>() -> Self {
        Self::NotImplemented {
            type_name: std::any::type_name::<T>(),
        }
    }
}
