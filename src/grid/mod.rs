//! Tile grid: a flat, row-major container of equally-shaped RGBA tiles.
//!
//! Every stage after the tiler passes a `TileGrid` along by value. Cells are
//! stored contiguously so the packer can walk them in compositing order
//! without chasing nested vectors.

use crate::error::{AtlasError, Result};
use image::RgbaImage;

/// Row-major grid of tiles. Always at least 1x1 and rectangular.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    rows: usize, // Number of tile rows
    cols: usize, // Number of tile columns
    cells: Vec<RgbaImage>, // `rows * cols` tiles, row-major
}

impl TileGrid {
    /// Build a grid from a flat row-major vector of tiles.
    ///
    /// # Arguments
    /// * `rows` - Number of rows in the grid.
    /// * `cols` - Number of columns in the grid.
    /// * `cells` - Exactly `rows * cols` tiles, row-major.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when the shape is empty, when the cell
    /// count does not match the shape, or when any tile has a zero side.
    pub fn new(rows: usize, cols: usize, cells: Vec<RgbaImage>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(AtlasError::invalid(format!(
                "tile grid must be non-empty, got {rows}x{cols}"
            )));
        }
        if rows.checked_mul(cols) != Some(cells.len()) {
            return Err(AtlasError::invalid(format!(
                "tile grid of {rows}x{cols} needs {} cells, got {}",
                rows.saturating_mul(cols),
                cells.len()
            )));
        }
        if let Some(idx) = cells.iter().position(|c| c.width() == 0 || c.height() == 0) {
            return Err(AtlasError::invalid(format!(
                "tile {idx} has zero width or height"
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Build a grid from nested rows, rejecting ragged input.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if there are no rows, the first row is
    /// empty, or any row has a different column count than the first.
    pub fn from_rows(rows: Vec<Vec<RgbaImage>>) -> Result<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        if let Some(r) = rows.iter().position(|row| row.len() != num_cols) {
            return Err(AtlasError::invalid(format!(
                "tile grid is not rectangular: row {r} has {} columns, expected {num_cols}",
                rows[r].len()
            )));
        }
        Self::new(num_rows, num_cols, rows.into_iter().flatten().collect())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Never true for a constructed grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&RgbaImage> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Iterate `(row, col, tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &RgbaImage)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, tile)| (idx / cols, idx % cols, tile))
    }

    /// Tiles as a row-major slice.
    #[must_use]
    pub fn cells(&self) -> &[RgbaImage] {
        &self.cells
    }

    #[must_use]
    pub fn into_cells(self) -> Vec<RgbaImage> {
        self.cells
    }

    /// Shared `(width, height)` of every cell.
    ///
    /// # Errors
    /// Returns `InvalidArgument` naming the first cell whose size differs
    /// from cell (0, 0).
    pub fn uniform_cell_size(&self) -> Result<(u32, u32)> {
        let first = self.cells[0].dimensions();
        for (row, col, tile) in self.iter() {
            if tile.dimensions() != first {
                return Err(AtlasError::invalid(format!(
                    "tile ({row}, {col}) is {}x{}, expected {}x{}",
                    tile.width(),
                    tile.height(),
                    first.0,
                    first.1
                )));
            }
        }
        Ok(first)
    }
}

/// Byte length of a `width x height` RGBA8 buffer.
///
/// # Errors
/// Returns `InvalidArgument` when the length overflows `usize` or exceeds
/// the largest allocation a `Vec` can hold.
pub(crate) fn rgba_buffer_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or_else(|| {
            AtlasError::invalid(format!("a {width}x{height} RGBA buffer is too large to allocate"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    #[test]
    fn new_rejects_empty_shape() {
        let err = TileGrid::new(0, 3, Vec::new()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn new_rejects_cell_count_mismatch() {
        let err = TileGrid::new(2, 2, vec![solid(4, 4, 0); 3]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![solid(4, 4, 0); 2], vec![solid(4, 4, 0); 1]];
        assert!(TileGrid::from_rows(rows).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn from_rows_rejects_no_rows() {
        assert!(TileGrid::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn iter_is_row_major() {
        let rows = vec![
            vec![solid(2, 2, 0), solid(2, 2, 1)],
            vec![solid(2, 2, 2), solid(2, 2, 3)],
        ];
        let grid = TileGrid::from_rows(rows).unwrap();
        let order: Vec<_> = grid
            .iter()
            .map(|(r, c, t)| (r, c, t.get_pixel(0, 0)[0]))
            .collect();
        assert_eq!(order, vec![(0, 0, 0), (0, 1, 1), (1, 0, 2), (1, 1, 3)]);
        assert_eq!(grid.get(1, 0).unwrap().get_pixel(0, 0)[0], 2);
        assert!(grid.get(2, 0).is_none());
    }

    #[test]
    fn uniform_cell_size_reports_odd_cell() {
        let grid = TileGrid::new(1, 2, vec![solid(4, 4, 0), solid(4, 5, 0)]).unwrap();
        assert!(grid.uniform_cell_size().unwrap_err().is_invalid_argument());

        let grid = TileGrid::new(1, 2, vec![solid(4, 5, 0), solid(4, 5, 0)]).unwrap();
        assert_eq!(grid.uniform_cell_size().unwrap(), (4, 5));
    }

    #[test]
    fn buffer_len_rejects_overflow() {
        assert_eq!(rgba_buffer_len(20, 36).unwrap(), 20 * 36 * 4);
        assert!(rgba_buffer_len(u32::MAX, u32::MAX).unwrap_err().is_invalid_argument());
    }
}
