//! Dot-delimited key paths into a JSON document.
//!
//! `database.host` descends through the `database` mapping to its `host`
//! key. Only objects are descended; arrays are never indexed, so
//! `servers.0` looks up a key literally named `"0"`.

use serde_json::Value;

/// Resolves `path` against `root`, or `None` if any segment is missing or
/// the value at that point is not an object.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |current, key| current.as_object()?.get(key))
}
