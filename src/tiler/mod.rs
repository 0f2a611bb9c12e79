//! Tiler: slice a sprite sheet into a grid of equally-sized tiles.

use crate::error::{AtlasError, Result};
use crate::grid::TileGrid;
use image::RgbaImage;
use image::imageops;
use tracing::{debug, warn};

/// Split `image` into a row-major grid of `tile_width` x `tile_height` tiles.
///
/// Partial tiles along the right and bottom edges are dropped. Each tile is
/// an owned copy, so the source can be reused or dropped afterwards.
///
/// # Arguments
/// * `image` - Source sprite sheet.
/// * `tile_width` - Width of one tile in pixels.
/// * `tile_height` - Height of one tile in pixels.
///
/// # Errors
/// Returns `InvalidArgument` when either tile dimension is zero or when not a
/// single full tile fits into the image.
pub fn split(image: &RgbaImage, tile_width: u32, tile_height: u32) -> Result<TileGrid> {
    if tile_width == 0 || tile_height == 0 {
        return Err(AtlasError::invalid(format!(
            "tile size must be positive, got {tile_width}x{tile_height}"
        )));
    }

    let (width, height) = image.dimensions();
    let cols = width / tile_width;
    let rows = height / tile_height;
    if cols == 0 || rows == 0 {
        return Err(AtlasError::invalid(format!(
            "no {tile_width}x{tile_height} tile fits into a {width}x{height} image"
        )));
    }

    if width % tile_width != 0 || height % tile_height != 0 {
        warn!(
            "dropping {}px right / {}px bottom remainder of {width}x{height} image",
            width % tile_width,
            height % tile_height
        );
    }

    let mut cells = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let tile = imageops::crop_imm(
                image,
                col * tile_width,
                row * tile_height,
                tile_width,
                tile_height,
            )
            .to_image();
            cells.push(tile);
        }
    }
    debug!("split {width}x{height} into {rows}x{cols} tiles of {tile_width}x{tile_height}");

    TileGrid::new(rows as usize, cols as usize, cells)
}
