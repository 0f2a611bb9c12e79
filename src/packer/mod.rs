//! Atlas packer and metadata emitter.
//!
//! Tiles are laid out on a plain row/column grid: cell `(row, col)` starts at
//! `(col * cell_w, row * cell_h)`. The canvas is the power-of-two rounding of
//! the grid's raw size. Packing and record emission both go through
//! [`GridLayout::origin`], so image and metadata always agree.

use crate::atlas::{PackedAtlas, PowerOfTwoRounding, TileRecord};
use crate::error::{AtlasError, Result};
use crate::grid::{TileGrid, rgba_buffer_len};
use image::RgbaImage;
use image::imageops;
use tracing::{debug, instrument};

/// Placement of a uniform grid on an atlas canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub cell_width: u32, // Width of one (padded) cell
    pub cell_height: u32, // Height of one (padded) cell
    pub raw_width: u32, // cols * cell_width
    pub raw_height: u32, // rows * cell_height
    pub atlas_width: u32, // raw_width rounded to a power of two
    pub atlas_height: u32, // raw_height rounded to a power of two
}

impl GridLayout {
    /// Compute the layout for `grid` under `rounding`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the cells are not all the same size or
    /// the atlas would be too large to allocate.
    pub fn for_grid(grid: &TileGrid, rounding: PowerOfTwoRounding) -> Result<Self> {
        let (cell_width, cell_height) = grid.uniform_cell_size()?;
        Self::from_parts(grid.rows(), grid.cols(), cell_width, cell_height, rounding)
    }

    /// Layout for a `rows x cols` grid of `cell_width x cell_height` cells.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the packed size overflows `u32` or the
    /// rounded canvas exceeds the largest allocatable RGBA buffer.
    pub fn from_parts(
        rows: usize,
        cols: usize,
        cell_width: u32,
        cell_height: u32,
        rounding: PowerOfTwoRounding,
    ) -> Result<Self> {
        let raw_width = span(cols, cell_width)?;
        let raw_height = span(rows, cell_height)?;
        let atlas_width = rounding.round(raw_width)?;
        let atlas_height = rounding.round(raw_height)?;
        rgba_buffer_len(atlas_width, atlas_height)?;
        Ok(Self {
            cell_width,
            cell_height,
            raw_width,
            raw_height,
            atlas_width,
            atlas_height,
        })
    }

    /// Top-left pixel of cell `(row, col)` on the canvas.
    #[must_use]
    pub fn origin(&self, row: usize, col: usize) -> (u32, u32) {
        // Both products are bounded by raw_width/raw_height, checked in `for_grid`.
        (col as u32 * self.cell_width, row as u32 * self.cell_height)
    }

    /// Unpadded sprite rectangle of cell `(row, col)`.
    #[must_use]
    pub fn record(&self, row: usize, col: usize, border: u32) -> TileRecord {
        let (x, y) = self.origin(row, col);
        TileRecord {
            x: x + border,
            y: y + border,
            width: self.cell_width - 2 * border,
            height: self.cell_height - 2 * border,
        }
    }

    /// Check that `border_size` leaves a non-empty sprite inside each cell.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a negative border or one that covers the
    /// whole cell on either axis.
    pub fn check_border(&self, border_size: i32) -> Result<u32> {
        let border = u32::try_from(border_size).map_err(|_| {
            AtlasError::invalid(format!("border size must be >= 0, got {border_size}"))
        })?;
        let min_side = self.cell_width.min(self.cell_height);
        if u64::from(border) * 2 >= u64::from(min_side) {
            return Err(AtlasError::invalid(format!(
                "border of {border}px leaves no sprite inside {}x{} cells",
                self.cell_width, self.cell_height
            )));
        }
        Ok(border)
    }
}

fn span(count: usize, cell: u32) -> Result<u32> {
    u32::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(cell))
        .ok_or_else(|| AtlasError::invalid(format!("{count} cells of {cell}px overflow u32")))
}

/// Composite every tile of `grid` onto a transparent power-of-two canvas.
///
/// # Errors
/// Returns `InvalidArgument` if the cells are not uniform in size.
pub fn pack(grid: &TileGrid, rounding: PowerOfTwoRounding) -> Result<RgbaImage> {
    let layout = GridLayout::for_grid(grid, rounding)?;
    Ok(composite(grid, &layout, |_, _| {}))
}

/// Sprite rectangles for every cell of `grid`, row-major.
///
/// # Arguments
/// * `grid` - Grid of padded tiles.
/// * `border_size` - Padding that was added to each side of every tile.
///
/// # Errors
/// Returns `InvalidArgument` if the cells are not uniform, the border is
/// negative, or `2 * border_size` reaches the cell's shorter side.
pub fn emit(grid: &TileGrid, border_size: i32) -> Result<Vec<TileRecord>> {
    // Rounding does not affect cell origins; any policy gives the same records.
    let layout = GridLayout::for_grid(grid, PowerOfTwoRounding::Ceil)?;
    let border = layout.check_border(border_size)?;
    Ok(grid
        .iter()
        .map(|(row, col, _)| layout.record(row, col, border))
        .collect())
}

/// Pack the atlas and emit its records in a single row-major traversal.
///
/// # Errors
/// Same conditions as [`pack`] and [`emit`]; all are checked before the
/// canvas is allocated.
#[instrument(skip_all, fields(rows = grid.rows(), cols = grid.cols(), border_size = border_size))]
pub fn pack_with_records(
    grid: &TileGrid,
    border_size: i32,
    rounding: PowerOfTwoRounding,
) -> Result<PackedAtlas> {
    let layout = GridLayout::for_grid(grid, rounding)?;
    let border = layout.check_border(border_size)?;

    let mut records = Vec::with_capacity(grid.len());
    let canvas = composite(grid, &layout, |row, col| {
        records.push(layout.record(row, col, border));
    });
    debug!(
        "packed {}x{} raw into {}x{} atlas",
        layout.raw_width, layout.raw_height, layout.atlas_width, layout.atlas_height
    );

    Ok(PackedAtlas {
        image: canvas,
        records,
        rows: grid.rows(),
        cols: grid.cols(),
        cell_width: layout.cell_width,
        cell_height: layout.cell_height,
        border_size: border,
    })
}

// Copies each cell to its origin and reports `(row, col)` to `on_cell` in
// the same pass.
fn composite(
    grid: &TileGrid,
    layout: &GridLayout,
    mut on_cell: impl FnMut(usize, usize),
) -> RgbaImage {
    // `RgbaImage::new` zero-fills, i.e. fully transparent.
    let mut canvas = RgbaImage::new(layout.atlas_width, layout.atlas_height);
    for (row, col, tile) in grid.iter() {
        let (x, y) = layout.origin(row, col);
        imageops::replace(&mut canvas, tile, i64::from(x), i64::from(y));
        on_cell(row, col);
    }
    canvas
}
