//! Settings loading.
//!
//! A settings path may point at a single `.ron` file or at a directory. For
//! a directory the first successfully parsed file (by name) wins; with no
//! parseable file the defaults are used.
use crate::error::Result;
use crate::ron_loader::{load_ron_file, load_ron_files};
use crate::settings::AtlasSettings;
use std::path::Path;
use tracing::debug;

/// Load settings from `path` (directory). If multiple `.ron` files are present
/// the first parsed `AtlasSettings` will be used. If none exist the `Default` is used.
///
/// # Arguments
/// * `path` - The directory where settings RON files are located.
#[must_use]
pub fn load_settings_from_dir(path: &Path) -> AtlasSettings {
    let items: Vec<AtlasSettings> = load_ron_files(path);
    if let Some(first) = items.into_iter().next() {
        first
    } else {
        debug!("no settings in {}, using defaults", path.display());
        AtlasSettings::default()
    }
}

/// Load settings from a file or directory.
///
/// # Errors
/// A file path that cannot be read or parsed is an error; directories never
/// fail (see [`load_settings_from_dir`]).
pub fn load_settings(path: &Path) -> Result<AtlasSettings> {
    if path.is_dir() {
        Ok(load_settings_from_dir(path))
    } else {
        load_ron_file(path)
    }
}
