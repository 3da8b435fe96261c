//! Configuration loading, validation, and access.
//!
//! A configuration is built from two files: a JSON document and the
//! JSON-Schema it must satisfy. Loading runs these stages in order, stopping
//! at the first failure:
//!
//! 1. both files exist and are readable
//! 2. both files parse as JSON
//! 3. the document validates against the schema (Draft 2020-12)
//! 4. [`Configuration::additional_checks`] accepts the document

mod error;
mod file;
mod handle;
mod kind;
mod path;
pub mod schema;
mod snapshot;

pub use error::ConfigError;
pub use handle::Config;
pub use kind::Configuration;
pub use snapshot::Snapshot;
