use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the configkit library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("first instantiation of {type_name} requires a document path and a schema path")]
    MissingRequiredArguments { type_name: &'static str },
}
