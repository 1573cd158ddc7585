// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{GdalRasterSource, GeoReference, RasterSource};
pub use writer::{write_grid, OutputOptions};
