//! Atlas: types describing a packed atlas and where each sprite landed.
//!
//! The packer produces a [`PackedAtlas`]; the builder wires the whole
//! split → expand → pack pipeline together. Records here always describe the
//! *unpadded* sprite, so sampling inside a record never touches the
//! replicated border.

use crate::error::{AtlasError, Result};
use image::RgbaImage;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod builder;

pub use builder::AtlasBuilder;

/// Pixel rectangle of one unpadded sprite inside the atlas.
///
/// Origin is the atlas' top-left corner, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRecord {
    pub x: u32, // Left edge in atlas pixels
    pub y: u32, // Top edge in atlas pixels
    pub width: u32, // Sprite width without padding
    pub height: u32, // Sprite height without padding
}

impl TileRecord {
    /// Normalized UV bounds of this sprite in an atlas of the given size.
    ///
    /// # Arguments
    /// * `atlas_width` - Atlas image width in pixels.
    /// * `atlas_height` - Atlas image height in pixels.
    ///
    /// # Return
    /// Returns `UVBounds` with `min_*` at the sprite's top-left and `max_*`
    /// at its bottom-right edge.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // atlas sides are powers of two well below 2^24
    pub fn uv_bounds(&self, atlas_width: u32, atlas_height: u32) -> UVBounds {
        debug_assert!(atlas_width <= 1 << 24 && atlas_height <= 1 << 24,
            "atlas dimensions exceed exact f32 integer range; UV precision may be lost");
        let w = atlas_width as f32;
        let h = atlas_height as f32;
        UVBounds {
            min_u: self.x as f32 / w,
            max_u: (self.x + self.width) as f32 / w,
            min_v: self.y as f32 / h,
            max_v: (self.y + self.height) as f32 / h,
        }
    }

    /// Copy this record's rectangle out of `atlas`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the rectangle is empty or reaches past
    /// the atlas edges.
    pub fn crop(&self, atlas: &RgbaImage) -> Result<RgbaImage> {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        let fits = matches!((right, bottom), (Some(r), Some(b)) if r <= atlas.width() && b <= atlas.height());
        if self.width == 0 || self.height == 0 || !fits {
            return Err(AtlasError::invalid(format!(
                "record {self} does not fit in a {}x{} atlas",
                atlas.width(),
                atlas.height()
            )));
        }
        Ok(imageops::crop_imm(atlas, self.x, self.y, self.width, self.height).to_image())
    }
}

impl fmt::Display for TileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Axis-aligned UV bounds (min/max U and V) for a single sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UVBounds {
    pub min_u: f32, // Minimum U coordinate.
    pub max_u: f32, // Maximum U coordinate.
    pub min_v: f32, // Minimum V coordinate.
    pub max_v: f32, // Maximum V coordinate.
}

/// How a packed dimension is rounded up to a power of two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerOfTwoRounding {
    /// Smallest power of two >= n; exact powers of two are kept.
    #[default]
    Ceil,
    /// Smallest power of two > n; exact powers of two are doubled.
    Strict,
}

impl PowerOfTwoRounding {
    /// Round `n` up to a power of two under this policy.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when `n` is zero or the result would not fit
    /// in `u32`.
    pub fn round(self, n: u32) -> Result<u32> {
        if n == 0 {
            return Err(AtlasError::invalid("cannot size an atlas for a zero dimension"));
        }
        let rounded = match self {
            PowerOfTwoRounding::Ceil => n.checked_next_power_of_two(),
            PowerOfTwoRounding::Strict => n.checked_add(1).and_then(u32::checked_next_power_of_two),
        };
        rounded.ok_or_else(|| AtlasError::invalid(format!("{n}px has no power of two that fits in u32")))
    }
}

impl FromStr for PowerOfTwoRounding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ceil" => Ok(PowerOfTwoRounding::Ceil),
            "strict" => Ok(PowerOfTwoRounding::Strict),
            other => Err(format!("unknown rounding '{other}', expected ceil or strict")),
        }
    }
}

/// A composited atlas together with the sprite records that describe it.
///
/// `records[i]` belongs to grid cell `(i / cols, i % cols)`.
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub image: RgbaImage, // Power-of-two canvas, transparent where no tile landed
    pub records: Vec<TileRecord>, // Unpadded sprite rectangles, row-major
    pub rows: usize, // Grid rows
    pub cols: usize, // Grid columns
    pub cell_width: u32, // Padded cell width
    pub cell_height: u32, // Padded cell height
    pub border_size: u32, // Padding on each side of every sprite
}

impl PackedAtlas {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Record for grid cell `(row, col)`, if it exists.
    #[must_use]
    pub fn record(&self, row: usize, col: usize) -> Option<&TileRecord> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.records.get(row * self.cols + col)
    }
}
