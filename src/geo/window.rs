// src/geo/window.rs
use log::debug;

use super::affine::Affine;
use super::reproject::Reproject;
use crate::error::Result;

/// Bounding box in an arbitrary coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: String,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: impl Into<String>) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            crs: crs.into(),
        }
    }

    /// From `[min_x, min_y, max_x, max_y]`.
    pub fn from_array(coords: [f64; 4], crs: impl Into<String>) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3], crs)
    }

    pub fn upper_left(&self) -> (f64, f64) {
        (self.min_x, self.max_y)
    }

    pub fn lower_right(&self) -> (f64, f64) {
        (self.max_x, self.min_y)
    }

    /// True if this box overlaps `other` (`[min_x, min_y, max_x, max_y]`, same CRS).
    pub fn intersects(&self, other: &[f64; 4]) -> bool {
        self.min_x <= other[2]
            && self.max_x >= other[0]
            && self.min_y <= other[3]
            && self.max_y >= other[1]
    }
}

/// Rectangular pixel-space region. Offsets may be negative and the extent may
/// run past the raster edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: i64,
    pub row_off: i64,
    pub width: i64,
    pub height: i64,
}

impl Window {
    pub fn new(col_off: i64, row_off: i64, width: i64, height: i64) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// No pixel in range.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Array shape `(rows, cols)`; zero for empty windows.
    pub fn shape(&self) -> (usize, usize) {
        if self.is_empty() {
            (0, 0)
        } else {
            (self.height as usize, self.width as usize)
        }
    }

    /// Part of the window inside a raster of `raster_width` x `raster_height`
    /// pixels, in raster coordinates.
    pub fn intersection(&self, raster_width: usize, raster_height: usize) -> Option<Window> {
        if self.is_empty() {
            return None;
        }

        let col_start = self.col_off.max(0);
        let row_start = self.row_off.max(0);
        let col_end = (self.col_off + self.width).min(raster_width as i64);
        let row_end = (self.row_off + self.height).min(raster_height as i64);

        if col_start >= col_end || row_start >= row_end {
            return None;
        }

        Some(Window::new(
            col_start,
            row_start,
            col_end - col_start,
            row_end - row_start,
        ))
    }
}

/// Resolve the pixel window covering `bbox` on a raster with the given
/// transform and CRS.
///
/// Both corners always go through `reprojector`, even when the CRS strings
/// match. The result is not clamped to the raster.
pub fn resolve_window(
    bbox: &BoundingBox,
    raster_transform: &Affine,
    raster_crs: &str,
    reprojector: &dyn Reproject,
) -> Result<Window> {
    let mut corners = [bbox.upper_left(), bbox.lower_right()];
    reprojector.transform_points(&bbox.crs, raster_crs, &mut corners)?;

    let (ul_col, ul_row) = raster_transform.rowcol(corners[0].0, corners[0].1)?;
    let (lr_col, lr_row) = raster_transform.rowcol(corners[1].0, corners[1].1)?;

    let window = Window::new(ul_col, ul_row, lr_col - ul_col, lr_row - ul_row);
    debug!("Resolved window {:?} for bbox {:?}", window, bbox);
    Ok(window)
}
