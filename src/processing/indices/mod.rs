// src/processing/indices/mod.rs
use ndarray::Array2;

pub mod ndwi;

// Re-export indices
pub use ndwi::{ndwi, NDWI};

/// Trait for spectral index calculators
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index from reflectance bands. NaN marks no-data.
    fn calculate(&self, inputs: &[Array2<f64>]) -> Array2<f64>;

    /// Return the number of required input bands
    fn required_bands(&self) -> usize;

    /// Return the name of the index
    fn name(&self) -> &str;
}
