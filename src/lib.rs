//! Singleton JSON configuration loading with JSON-Schema validation.
//!
//! Define a [`Configuration`] type carrying your business rules, load it
//! once with [`Config::load`], then read values anywhere through
//! [`Config::instance`] using dot-delimited paths.

pub mod config;
mod error;
pub mod registry;

pub use config::{Config, ConfigError, Configuration, Snapshot};
pub use error::Error;
