// src/io/reader.rs
use gdal::Dataset;
use log::debug;
use ndarray::{s, Array2};

use crate::error::{Result, WaterError};
use crate::geo::{Affine, Window};

/// Spatial reference of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct GeoReference {
    pub transform: Affine,
    /// CRS definition (WKT for GDAL sources)
    pub crs: String,
    /// (width, height) in pixels
    pub size: (usize, usize),
}

/// Raster collaborator: georeferencing plus boundless windowed reads of band 1
pub trait RasterSource {
    fn georeference(&self, href: &str) -> Result<GeoReference>;

    /// Read `window`; pixels outside the raster are set to `fill_value`.
    fn read_window(&self, href: &str, window: &Window, fill_value: f64) -> Result<Array2<f64>>;
}

pub fn is_remote(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("s3://")
}

/// Map an asset href onto a path GDAL can open.
pub fn gdal_path(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        format!("/vsicurl/{href}")
    } else if let Some(key) = href.strip_prefix("s3://") {
        format!("/vsis3/{key}")
    } else {
        href.to_string()
    }
}

/// Boundless read: `read` is called with the part of `window` inside a raster
/// of `raster_size` (width, height) and must return it as (rows, cols); the
/// rest of the output holds `fill_value`.
pub fn read_boundless<F>(
    window: &Window,
    raster_size: (usize, usize),
    fill_value: f64,
    read: F,
) -> Result<Array2<f64>>
where
    F: FnOnce(&Window) -> Result<Array2<f64>>,
{
    let mut out = Array2::from_elem(window.shape(), fill_value);

    let Some(inner) = window.intersection(raster_size.0, raster_size.1) else {
        return Ok(out);
    };

    let block = read(&inner)?;
    let (rows, cols) = inner.shape();
    if block.dim() != (rows, cols) {
        return Err(WaterError::ShapeMismatch {
            expected: (rows, cols),
            actual: block.dim(),
        });
    }

    let r0 = (inner.row_off - window.row_off) as usize;
    let c0 = (inner.col_off - window.col_off) as usize;
    out.slice_mut(s![r0..r0 + rows, c0..c0 + cols]).assign(&block);
    Ok(out)
}

/// GDAL backed raster source
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalRasterSource;

impl RasterSource for GdalRasterSource {
    fn georeference(&self, href: &str) -> Result<GeoReference> {
        let dataset = Dataset::open(gdal_path(href))?;
        let geo_transform = dataset.geo_transform()?;

        Ok(GeoReference {
            transform: Affine::from_gdal(&geo_transform),
            crs: dataset.projection(),
            size: dataset.raster_size(),
        })
    }

    fn read_window(&self, href: &str, window: &Window, fill_value: f64) -> Result<Array2<f64>> {
        let dataset = Dataset::open(gdal_path(href))?;
        let band = dataset.rasterband(1)?;

        read_boundless(window, dataset.raster_size(), fill_value, |inner| {
            let (rows, cols) = inner.shape();
            debug!("Reading {}x{} pixels at ({}, {}) from {}", cols, rows, inner.col_off, inner.row_off, href);

            let buffer = band.read_as::<f64>(
                (inner.col_off as isize, inner.row_off as isize),
                (cols, rows),
                (cols, rows),
                None,
            )?;
            Array2::from_shape_vec((rows, cols), buffer.data().to_vec()).map_err(|_| {
                WaterError::ShapeMismatch {
                    expected: (rows, cols),
                    actual: (buffer.data().len(), 1),
                }
            })
        })
    }
}
