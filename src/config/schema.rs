//! JSON-Schema validation of configuration documents.
//!
//! Schemas are compiled with Draft 2020-12 semantics regardless of any
//! `$schema` keyword they carry.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use super::ConfigError;

/// A single schema violation reported by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates `document` against `schema`, returning every violation in
/// evaluation order. An empty list means the document conforms.
///
/// `schema_path` is only used to label an uncompilable schema.
pub fn violations(
    document: &Value,
    schema: &Value,
    schema_path: &Path,
) -> Result<Vec<Violation>, ConfigError> {
    let validator =
        jsonschema::draft202012::new(schema).map_err(|e| ConfigError::InvalidSchema {
            path: schema_path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(validator
        .iter_errors(document)
        .map(|e| Violation {
            message: e.to_string(),
        })
        .collect())
}

/// Fails with the first violation, if any.
pub fn validate(document: &Value, schema: &Value, schema_path: &Path) -> Result<(), ConfigError> {
    match violations(document, schema, schema_path)?.into_iter().next() {
        Some(first) => Err(ConfigError::SchemaViolation {
            message: first.message,
        }),
        None => Ok(()),
    }
}
