// src/io/writer.rs
use std::path::Path;

use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{DriverManager, Metadata};
use log::info;
use ndarray::Array2;

use super::reader::GeoReference;
use crate::error::Result;
use crate::geo::Window;

/// GeoTIFF creation settings
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub compress: String,
    pub compress_level: u8,
    pub tiled: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            compress: "DEFLATE".to_string(),
            compress_level: 6,
            tiled: true,
        }
    }
}

impl OutputOptions {
    pub fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        // Add compression if not NONE
        if compress != "NONE" {
            options.push(format!("COMPRESS={compress}"));

            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }

        // Always use multi-threading
        options.push("NUM_THREADS=ALL_CPUS".to_string());

        options
    }
}

/// Write `grid` as a single band Float64 GeoTIFF. The scene's CRS is reused and
/// its transform is shifted to the window origin; nodata is NaN.
pub fn write_grid(
    output_path: &Path,
    grid: &Array2<f64>,
    georef: &GeoReference,
    window: &Window,
    options: &OutputOptions,
    description: &str,
) -> Result<()> {
    let (height, width) = grid.dim();
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(options.creation_options());

    let mut out_ds = driver.create_with_band_type_with_options::<f64, _>(
        output_path,
        width,
        height,
        1,
        &creation_options,
    )?;

    out_ds.set_projection(&georef.crs)?;
    out_ds.set_geo_transform(
        &georef
            .transform
            .for_window(window.col_off, window.row_off)
            .to_gdal(),
    )?;

    let mut band = out_ds.rasterband(1)?;
    band.set_no_data_value(Some(f64::NAN))?;
    band.set_description(description)?;

    let data: Vec<f64> = grid.iter().copied().collect();
    let mut buffer = Buffer::new((width, height), data);
    band.write((0, 0), (width, height), &mut buffer)?;

    out_ds.flush_cache()?;
    info!("Wrote {} ({}x{}) to {}", description, width, height, output_path.display());
    Ok(())
}
