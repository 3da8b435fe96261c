use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::file::{check_readable, load_json};
use super::path::lookup;
use super::{schema, ConfigError, Configuration};

/// A validated document together with the schema it was checked against.
///
/// Snapshots are immutable. A reload produces a new snapshot rather than
/// editing the current one, so a held `Snapshot` always reads consistently.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    data: Value,
    schema: Value,
}

impl Snapshot {
    /// Runs the full load pipeline for configuration type `T`.
    pub(crate) fn load<T: Configuration>(
        document_path: &Path,
        schema_path: &Path,
    ) -> Result<Self, ConfigError> {
        let kind = T::type_name();

        for path in [document_path, schema_path] {
            check_readable(path)?;
        }
        debug!(kind, ?document_path, ?schema_path, "configuration files accessible");

        let data = load_json(document_path)?;
        let schema = load_json(schema_path)?;
        debug!(kind, "configuration files parsed");

        schema::validate(&data, &schema, schema_path)?;
        debug!(kind, "document matches schema");

        T::additional_checks(&data)?;
        debug!(kind, "additional checks passed");

        Ok(Self { data, schema })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Resolves a dot-delimited path, or `None` if it does not exist.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup(&self.data, path)
    }

    /// Resolves a dot-delimited path, failing with
    /// [`ConfigError::MissingKey`] if it does not exist.
    pub fn get(&self, path: &str) -> Result<&Value, ConfigError> {
        self.lookup(path).ok_or_else(|| ConfigError::MissingKey {
            path: path.to_string(),
        })
    }

    /// Resolves a dot-delimited path, falling back to `default` when it does
    /// not exist. Every default is honored, including `0`, `""`, `false`
    /// and `null`.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        match self.lookup(path) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// Resolves a dot-delimited path and deserializes the value into `D`.
    pub fn get_as<D: DeserializeOwned>(&self, path: &str) -> Result<D, ConfigError> {
        let value = self.get(path)?.clone();
        serde_json::from_value(value).map_err(|e| ConfigError::Deserialize {
            path: path.to_string(),
            source: e,
        })
    }

    /// Deserializes the whole document into `D`.
    pub fn deserialize<D: DeserializeOwned>(&self) -> Result<D, ConfigError> {
        serde_json::from_value(self.data.clone()).map_err(|e| ConfigError::Deserialize {
            path: String::new(),
            source: e,
        })
    }
}
