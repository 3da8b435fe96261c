use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::{ConfigError, Configuration, Snapshot};
use crate::{registry, Error};

/// The loaded configuration for type `T`.
///
/// There is at most one `Config<T>` per type in the process; obtain it with
/// [`Config::load`] the first time and [`Config::instance`] afterwards.
///
/// ## Example
///
/// ```no_run
/// use configkit::{Config, ConfigError, Configuration};
/// use serde_json::Value;
///
/// struct AppConfig;
///
/// impl Configuration for AppConfig {
///     fn additional_checks(_data: &Value) -> Result<(), ConfigError> {
///         Ok(())
///     }
/// }
///
/// Config::<AppConfig>::load("config.json", "schema.json")?;
///
/// // Anywhere else in the program:
/// let config = Config::<AppConfig>::instance()?;
/// let host = config.get("database.host")?;
/// let port = config.get_or("database.port", 5432);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Config<T> {
    document_path: PathBuf,
    schema_path: PathBuf,
    current: ArcSwap<Snapshot>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Configuration> Config<T> {
    /// Returns the instance for `T`, loading it from the given files if this
    /// is the first request. Once loaded, the paths are ignored.
    pub fn load(
        document_path: impl AsRef<Path>,
        schema_path: impl AsRef<Path>,
    ) -> Result<Arc<Self>, Error> {
        registry::get_instance::<T>(Some(document_path.as_ref()), Some(schema_path.as_ref()))
    }

    /// Returns the already loaded instance for `T`.
    ///
    /// Fails with [`Error::MissingRequiredArguments`] if [`Config::load`]
    /// has not succeeded yet.
    pub fn instance() -> Result<Arc<Self>, Error> {
        registry::get_instance::<T>(None, None)
    }

    pub(crate) fn open(document_path: &Path, schema_path: &Path) -> Result<Self, ConfigError> {
        let snapshot = Snapshot::load::<T>(document_path, schema_path)?;
        Ok(Self {
            document_path: document_path.to_path_buf(),
            schema_path: schema_path.to_path_buf(),
            current: ArcSwap::from_pointee(snapshot),
            _kind: PhantomData,
        })
    }

    /// Re-reads and re-validates both files.
    ///
    /// The new snapshot is published only if every stage succeeds; on
    /// failure the previous configuration stays in place and the error is
    /// returned.
    pub fn reload(&self) -> Result<(), ConfigError> {
        match Snapshot::load::<T>(&self.document_path, &self.schema_path) {
            Ok(snapshot) => {
                self.current.store(Arc::new(snapshot));
                info!(kind = T::type_name(), path = ?self.document_path, "configuration reloaded");
                Ok(())
            }
            Err(e) => {
                warn!(
                    kind = T::type_name(),
                    error = %e,
                    "configuration reload failed, keeping current configuration"
                );
                Err(e)
            }
        }
    }
}

impl<T> Config<T> {
    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// The current snapshot. Use this to make several reads that must not
    /// straddle a reload.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn data(&self) -> Value {
        self.current.load().data().clone()
    }

    pub fn schema(&self) -> Value {
        self.current.load().schema().clone()
    }

    /// Looks up a dot-delimited path such as `database.host`.
    ///
    /// The value is returned as stored, without type coercion.
    pub fn get(&self, path: &str) -> Result<Value, ConfigError> {
        self.current.load().get(path).cloned()
    }

    /// Like [`get`](Self::get), but returns `default` when the path does not
    /// resolve.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.current.load().get_or(path, default)
    }

    /// Looks up a dot-delimited path and deserializes it into `D`.
    pub fn get_as<D: DeserializeOwned>(&self, path: &str) -> Result<D, ConfigError> {
        self.current.load().get_as(path)
    }

    /// Deserializes the whole document into `D`.
    pub fn deserialize<D: DeserializeOwned>(&self) -> Result<D, ConfigError> {
        self.current.load().deserialize()
    }
}

impl<T> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("kind", &std::any::type_name::<T>())
            .field("document_path", &self.document_path)
            .field("schema_path", &self.schema_path)
            .field("current", &self.current.load_full())
            .finish()
    }
}
