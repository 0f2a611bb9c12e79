//! Border expander: edge-clamp padding for tiles.
//!
//! Filtering samplers read texels just outside a sprite's rectangle. Padding
//! each tile with copies of its own edge pixels makes those reads return the
//! sprite's colour instead of a neighbour's (or transparent black).
//!
//! The padded image is defined per pixel: output `(x, y)` takes the source
//! pixel at `(clamp(x - b), clamp(y - b))`, clamped independently on each
//! axis. Top and bottom bands therefore repeat the first and last rows,
//! left and right bands repeat the first and last columns, and every corner
//! block is a solid copy of the matching source corner.

use crate::error::{AtlasError, Result};
use crate::grid::{TileGrid, rgba_buffer_len};
use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

/// Pad `tile` by `border_size` pixels on every side, replicating edge pixels.
///
/// A `border_size` of 0 returns a copy of the tile.
///
/// # Arguments
/// * `tile` - Source tile, at least 1x1.
/// * `border_size` - Padding in pixels added to each side.
///
/// # Return
/// A new `(w + 2b) x (h + 2b)` RGBA image with the tile at offset `(b, b)`.
///
/// # Errors
/// Returns `InvalidArgument` if `border_size` is negative, if the tile is
/// empty, or if the padded image would not fit in memory.
pub fn expand(tile: &RgbaImage, border_size: i32) -> Result<RgbaImage> {
    let b = border_from_i32(border_size)?;
    let (w, h) = tile.dimensions();
    if w == 0 || h == 0 {
        return Err(AtlasError::invalid("cannot expand an empty tile"));
    }
    if b == 0 {
        return Ok(tile.clone());
    }

    let new_w = padded_len(w, b)?;
    let new_h = padded_len(h, b)?;
    let len = rgba_buffer_len(new_w, new_h)?;

    // Copy whole rows: every output row is the clamped source row with its
    // first and last pixel smeared into the side bands.
    let row_bytes = new_w as usize * 4;
    let mut out = vec![0u8; len];
    let src = tile.as_raw();
    let src_row_bytes = w as usize * 4;
    for (y, dst_row) in out.chunks_exact_mut(row_bytes).enumerate() {
        let sy = clamp_axis(y as u32, b, h) as usize;
        let src_row = &src[sy * src_row_bytes..(sy + 1) * src_row_bytes];

        let left = b as usize * 4;
        let (left_band, rest) = dst_row.split_at_mut(left);
        let (center, right_band) = rest.split_at_mut(src_row_bytes);
        center.copy_from_slice(src_row);
        for px in left_band.chunks_exact_mut(4) {
            px.copy_from_slice(&src_row[..4]);
        }
        for px in right_band.chunks_exact_mut(4) {
            px.copy_from_slice(&src_row[src_row_bytes - 4..]);
        }
    }

    RgbaImage::from_raw(new_w, new_h, out)
        .ok_or_else(|| AtlasError::invalid("padded buffer size mismatch"))
}

/// Pad any decoded image, normalizing it to RGBA first.
///
/// Sources without an alpha channel come out fully opaque.
///
/// # Errors
/// Same conditions as [`expand`].
pub fn expand_dynamic(image: &DynamicImage, border_size: i32) -> Result<RgbaImage> {
    expand(&image.to_rgba8(), border_size)
}

/// Pad every tile of `grid` by the same border.
///
/// When `parallel` is set each tile is expanded on the rayon pool; tiles are
/// independent so no synchronisation is needed beyond the final collect.
///
/// # Errors
/// Returns the first expansion error in row-major order.
pub fn expand_grid(grid: TileGrid, border_size: i32, parallel: bool) -> Result<TileGrid> {
    border_from_i32(border_size)?;
    let (rows, cols) = (grid.rows(), grid.cols());
    let cells = grid.into_cells();

    let padded: Vec<RgbaImage> = if parallel {
        cells
            .into_par_iter()
            .map(|tile| expand(&tile, border_size))
            .collect::<Result<_>>()?
    } else {
        cells
            .into_iter()
            .map(|tile| expand(&tile, border_size))
            .collect::<Result<_>>()?
    };
    debug!(
        "expanded {rows}x{cols} tiles by {border_size}px (parallel: {parallel})"
    );

    TileGrid::new(rows, cols, padded)
}

fn border_from_i32(border_size: i32) -> Result<u32> {
    u32::try_from(border_size)
        .map_err(|_| AtlasError::invalid(format!("border size must be >= 0, got {border_size}")))
}

fn padded_len(len: u32, b: u32) -> Result<u32> {
    b.checked_mul(2)
        .and_then(|pad| len.checked_add(pad))
        .ok_or_else(|| AtlasError::invalid(format!("padding {len}px by {b}px overflows")))
}

// Map an output coordinate back into the source range [0, len).
fn clamp_axis(out: u32, b: u32, len: u32) -> u32 {
    out.saturating_sub(b).min(len - 1)
}
