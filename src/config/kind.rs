use serde_json::Value;

use super::ConfigError;

/// A concrete configuration type.
///
/// Each implementor gets its own singleton slot in the
/// [`registry`](crate::registry), keyed by its type identity. The type is
/// usually an empty marker struct; its job is to carry the business rules
/// that sit on top of the JSON schema.
///
/// ## Example
///
/// ```
/// use configkit::{ConfigError, Configuration};
/// use serde_json::Value;
///
/// struct AppConfig;
///
/// impl Configuration for AppConfig {
///     fn additional_checks(data: &Value) -> Result<(), ConfigError> {
///         if data.get("database").is_none() {
///             return Err(ConfigError::semantic("'database' section is required"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Configuration: Send + Sync + 'static {
    /// Checks rules the schema cannot express. Runs after schema
    /// validation on every load and reload.
    fn additional_checks(data: &Value) -> Result<(), ConfigError>;

    /// Name used in errors and log events.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
