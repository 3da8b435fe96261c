//! File access and JSON parsing for configuration inputs.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde_json::Value;

use super::ConfigError;

/// Ensures `path` names an existing regular file the process can open.
pub fn check_readable(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(ConfigError::FileNotFound(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(ConfigError::PermissionDenied(path.to_path_buf()));
        }
        Err(_) => return Err(ConfigError::FileNotFound(path.to_path_buf())),
    }

    File::open(path).map(drop).map_err(|e| open_error(path, e))
}

/// Reads and parses a JSON file.
pub fn load_json(path: &Path) -> Result<Value, ConfigError> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| open_error(path, e))?;

    serde_json::from_slice(&bytes).map_err(|e| ConfigError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })
}

fn open_error(path: &Path, e: std::io::Error) -> ConfigError {
    match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ConfigError::PermissionDenied(path.to_path_buf()),
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    }
}
