//! Settings, types and defaults.
//!
//! Settings are stored as a RON file (or a directory of them) and cover the
//! three pipeline parameters plus output choices. Every field has a serde
//! default, so a settings file only needs the values it changes.
use crate::atlas::PowerOfTwoRounding;
use crate::error::{AtlasError, Result};
use crate::metadata::MetadataFormat;
use serde::{Deserialize, Serialize};

pub mod loader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSettings {
    #[serde(default = "AtlasSettings::default_tile_width")]
    pub tile_width: u32, // Width of one source tile in pixels.
    #[serde(default = "AtlasSettings::default_tile_height")]
    pub tile_height: u32, // Height of one source tile in pixels.
    #[serde(default = "AtlasSettings::default_border_size")]
    pub border_size: i32, // Edge-clamp padding added to each side of every tile.
    #[serde(default)]
    pub rounding: PowerOfTwoRounding, // How packed sizes round to a power of two (ceil/strict).
    #[serde(default)]
    pub metadata_format: MetadataFormat, // Encoding of the metadata document (xml/ron/json).
    #[serde(default = "AtlasSettings::default_parallel")]
    pub parallel: bool, // Expand tiles on the rayon pool.
}

impl AtlasSettings {
    fn default_tile_width() -> u32 { 32 }
    fn default_tile_height() -> u32 { 32 }
    fn default_border_size() -> i32 { 3 }
    fn default_parallel() -> bool { true }

    /// Reject settings the pipeline would fail on, before any pixels move.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for zero tile dimensions or a negative border.
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(AtlasError::invalid(format!(
                "tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if self.border_size < 0 {
            return Err(AtlasError::invalid(format!(
                "border size must be >= 0, got {}",
                self.border_size
            )));
        }
        Ok(())
    }
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            tile_width: Self::default_tile_width(),
            tile_height: Self::default_tile_height(),
            border_size: Self::default_border_size(),
            rounding: PowerOfTwoRounding::default(),
            metadata_format: MetadataFormat::default(),
            parallel: Self::default_parallel(),
        }
    }
}
