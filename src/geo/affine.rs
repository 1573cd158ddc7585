// src/geo/affine.rs
use crate::error::{Result, WaterError};

/// Affine transform mapping pixel space (col, row) to projected space (x, y):
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with its upper-left corner at (`west`, `north`).
    pub fn from_origin(west: f64, north: f64, pixel_size_x: f64, pixel_size_y: f64) -> Self {
        Self::new(pixel_size_x, 0.0, west, 0.0, -pixel_size_y, north)
    }

    /// Build from a GDAL geotransform `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Pixel (col, row) to projected (x, y).
    pub fn to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Projected (x, y) to fractional pixel (col, row).
    pub fn to_pixel(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(WaterError::DegenerateTransform);
        }

        let dx = x - self.c;
        let dy = y - self.f;
        let col = (self.e * dx - self.b * dy) / det;
        let row = (self.a * dy - self.d * dx) / det;
        Ok((col, row))
    }

    /// Projected (x, y) to the nearest integer pixel (col, row).
    ///
    /// Ties round to even, so 0.5 -> 0 and 1.5 -> 2.
    pub fn rowcol(&self, x: f64, y: f64) -> Result<(i64, i64)> {
        let (col, row) = self.to_pixel(x, y)?;
        Ok((col.round_ties_even() as i64, row.round_ties_even() as i64))
    }

    /// Transform of a sub-grid whose pixel (0, 0) sits at (`col_off`, `row_off`).
    pub fn for_window(&self, col_off: i64, row_off: i64) -> Self {
        let (c, f) = self.to_geo(col_off as f64, row_off as f64);
        Self { c, f, ..*self }
    }
}
