//! Process-wide registry holding one [`Config`] per configuration type.
//!
//! Entries live for the lifetime of the process. The first request for a
//! type must supply both file paths; later requests return the stored
//! instance and ignore whatever paths they pass.
//!
//! Lookups of existing entries go through a concurrent map without taking
//! the creation lock. Creation is serialized by a single mutex and the map
//! is re-checked after acquiring it, so concurrent first requests for the
//! same type construct exactly one instance and all callers observe it.

use std::any::{Any, TypeId};
use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::{Config, Configuration};
use crate::Error;

type Slot = Arc<dyn Any + Send + Sync>;

static INSTANCES: LazyLock<DashMap<TypeId, Slot>> = LazyLock::new(DashMap::new);
static CREATION: Mutex<()> = Mutex::new(());

/// Returns the instance for `T`, constructing it on the first request.
///
/// Empty paths count as absent. Construction failures leave nothing
/// registered, so a later call may retry with corrected files.
pub fn get_instance<T: Configuration>(
    document_path: Option<&Path>,
    schema_path: Option<&Path>,
) -> Result<Arc<Config<T>>, Error> {
    if let Some(existing) = find::<T>() {
        if document_path.is_some() || schema_path.is_some() {
            debug!(kind = T::type_name(), "configuration already loaded, ignoring supplied paths");
        }
        return Ok(existing);
    }

    let _guard = CREATION.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = find::<T>() {
        return Ok(existing);
    }

    let (Some(document_path), Some(schema_path)) =
        (non_empty(document_path), non_empty(schema_path))
    else {
        return Err(Error::MissingRequiredArguments {
            type_name: T::type_name(),
        });
    };

    let config = Arc::new(Config::<T>::open(document_path, schema_path)?);
    INSTANCES.insert(TypeId::of::<T>(), Arc::clone(&config) as Slot);
    info!(kind = T::type_name(), path = ?document_path, "configuration loaded");

    Ok(config)
}

/// Whether an instance for `T` has been constructed.
pub fn is_registered<T: Configuration>() -> bool {
    INSTANCES.contains_key(&TypeId::of::<T>())
}

/// Drops every registered instance.
///
/// For test harnesses only. Handles already obtained stay usable, but the
/// next request for any type must supply file paths again.
#[doc(hidden)]
pub fn reset() {
    let _guard = CREATION.lock().unwrap_or_else(PoisonError::into_inner);
    INSTANCES.clear();
    debug!("configuration registry reset");
}

fn find<T: Configuration>() -> Option<Arc<Config<T>>> {
    let slot = Arc::clone(INSTANCES.get(&TypeId::of::<T>())?.value());
    Some(
        slot.downcast::<Config<T>>()
            .expect("registry slot holds the type it is keyed by"),
    )
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use tempfile::TempDir;

    // The registry is global and tests run in parallel, so every test uses
    // its own configuration type.

    fn require_section(data: &Value, section: &str) -> Result<(), ConfigError> {
        if data.get(section).is_none() {
            return Err(ConfigError::semantic(format!("'{section}' section is required")));
        }
        Ok(())
    }

    macro_rules! database_config {
        ($($name:ident),* $(,)?) => {$(
            struct $name;

            impl Configuration for $name {
                fn additional_checks(data: &Value) -> Result<(), ConfigError> {
                    require_section(data, "database")
                }
            }
        )*};
    }

    database_config!(
        Singleton,
        NeedsPaths,
        EmptyPaths,
        BadSchema,
        FailsChecks,
        Unreadable,
        Scenario,
        Independent,
    );

    fn files(document: &Value) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), document.to_string()).unwrap();
        std::fs::write(
            dir.path().join("schema.json"),
            json!({
                "type": "object",
                "properties": {
                    "database": {
                        "type": "object",
                        "properties": { "host": { "type": "string" } },
                        "required": ["host"]
                    }
                },
                "required": ["database"]
            })
            .to_string(),
        )
        .unwrap();
        dir
    }

    fn paths(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        (dir.path().join("config.json"), dir.path().join("schema.json"))
    }

    #[test]
    fn test_same_instance_on_every_call() {
        let dir = files(&json!({ "database": { "host": "a" } }));
        let (doc, schema) = paths(&dir);

        let first = get_instance::<Singleton>(Some(&doc), Some(&schema)).unwrap();
        let second = get_instance::<Singleton>(None, None).unwrap();
        let third =
            get_instance::<Singleton>(Some(Path::new("/elsewhere.json")), Some(Path::new("/x")))
                .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(third.document_path(), doc);
    }

    #[test]
    fn test_first_call_requires_both_paths() {
        let dir = files(&json!({ "database": { "host": "a" } }));
        let (doc, schema) = paths(&dir);

        assert!(matches!(
            get_instance::<NeedsPaths>(Some(&doc), None),
            Err(Error::MissingRequiredArguments { .. })
        ));
        assert!(matches!(
            get_instance::<NeedsPaths>(None, Some(&schema)),
            Err(Error::MissingRequiredArguments { .. })
        ));
        assert!(!is_registered::<NeedsPaths>());

        get_instance::<NeedsPaths>(Some(&doc), Some(&schema)).unwrap();
        assert!(is_registered::<NeedsPaths>());
    }

    #[test]
    fn test_empty_paths_count_as_missing() {
        let result = get_instance::<EmptyPaths>(Some(Path::new("")), Some(Path::new("")));

        match result {
            Err(Error::MissingRequiredArguments { type_name }) => {
                assert!(type_name.ends_with("EmptyPaths"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_schema_violation_registers_nothing() {
        let dir = files(&json!({ "database": {} }));
        let (doc, schema) = paths(&dir);

        let result = get_instance::<BadSchema>(Some(&doc), Some(&schema));

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::SchemaViolation { .. }))
        ));
        assert!(!is_registered::<BadSchema>());
    }

    #[test]
    fn test_semantic_failure_registers_nothing() {
        let dir = files(&json!({ "database": { "host": "a" } }));
        let (_, schema) = paths(&dir);
        let doc = dir.path().join("other.json");
        std::fs::write(&doc, r#"{"cache": {}}"#).unwrap();
        let permissive = dir.path().join("permissive.json");
        std::fs::write(&permissive, r#"{"type": "object"}"#).unwrap();

        let result = get_instance::<FailsChecks>(Some(&doc), Some(&permissive));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::SemanticCheckFailed { .. }))
        ));
        assert!(!is_registered::<FailsChecks>());

        let result = get_instance::<FailsChecks>(Some(&doc), Some(&schema));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::SchemaViolation { .. }))
        ));
        assert!(!is_registered::<FailsChecks>());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_document_then_corrected_retry() {
        use std::os::unix::fs::PermissionsExt;

        let dir = files(&json!({ "database": { "host": "a" } }));
        let (doc, schema) = paths(&dir);
        let locked = dir.path().join("locked.json");
        std::fs::copy(&doc, &locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users bypass mode bits.
        if std::fs::File::open(&locked).is_err() {
            let result = get_instance::<Unreadable>(Some(&locked), Some(&schema));
            assert!(matches!(
                result,
                Err(Error::Config(ConfigError::PermissionDenied(_)))
            ));
            assert!(!is_registered::<Unreadable>());
        }

        let config = get_instance::<Unreadable>(Some(&doc), Some(&schema)).unwrap();
        assert_eq!(config.get("database.host").unwrap(), json!("a"));
    }

    #[test]
    fn test_database_scenario() {
        let dir = files(&json!({ "database": { "host": "db.local" } }));
        let (doc, schema) = paths(&dir);

        let config = Config::<Scenario>::load(&doc, &schema).unwrap();

        assert_eq!(config.get("database.host").unwrap(), json!("db.local"));
        assert_eq!(config.get_or("database.port", 5432), json!(5432));
        assert!(matches!(
            config.get("database.missing"),
            Err(ConfigError::MissingKey { path }) if path == "database.missing"
        ));
        assert!(Arc::ptr_eq(&config, &Config::<Scenario>::instance().unwrap()));
    }

    #[test]
    fn test_types_have_independent_slots() {
        let dir = files(&json!({ "database": { "host": "a" } }));
        let (doc, schema) = paths(&dir);

        get_instance::<Independent>(Some(&doc), Some(&schema)).unwrap();

        assert!(is_registered::<Independent>());
        assert!(!is_registered::<EmptyPaths>());
    }

    static CONCURRENT_BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Concurrent;

    impl Configuration for Concurrent {
        fn additional_checks(data: &Value) -> Result<(), ConfigError> {
            CONCURRENT_BUILDS.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            require_section(data, "database")
        }
    }

    #[test]
    fn test_concurrent_first_requests_construct_once() {
        let dir = files(&json!({ "database": { "host": "a" } }));
        let (doc, schema) = paths(&dir);
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (doc, schema, barrier) = (doc.clone(), schema.clone(), Arc::clone(&barrier));
                thread::spawn(move || {
                    barrier.wait();
                    get_instance::<Concurrent>(Some(&doc), Some(&schema)).unwrap()
                })
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CONCURRENT_BUILDS.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
