//! Utilities for loading RON files.
//!
//! Settings can live either in a single `.ron` file or in a directory of
//! them; both paths end up here.

use crate::error::{AtlasError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::warn;

/// Read and deserialize one `.ron` file.
///
/// # Errors
/// Returns `Io` if the file cannot be read and `Parse` if it is not valid RON
/// for `T`.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    ron::from_str::<T>(&content).map_err(|source| AtlasError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// # Arguments
/// * `path` - Directory path to scan for `.ron` files.
///
/// # Return
/// A `Vec<T>` with every file that parsed, sorted by file name so the result
/// does not depend on directory iteration order. Files that fail to parse
/// are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let mut paths: Vec<_> = match std::fs::read_dir(path) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
            .collect(),
        Err(e) => {
            warn!("cannot read {}: {e}", path.display());
            return Vec::new();
        }
    };
    paths.sort();

    let mut items = Vec::new();
    for p in paths {
        match load_ron_file::<T>(&p) {
            Ok(item) => items.push(item),
            Err(e) => warn!("skipping {e}"),
        }
    }
    items
}
