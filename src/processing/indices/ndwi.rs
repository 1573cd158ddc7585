// src/processing/indices/ndwi.rs
use ndarray::{Array2, Zip};

use super::IndexCalculator;

/// Normalized difference `(a - b) / (a + b)`, element-wise.
///
/// A zero denominator yields NaN or +/-inf; masking happens downstream.
///
/// # Panics
///
/// Panics if the two bands differ in shape.
pub fn ndwi(band_a: &Array2<f64>, band_b: &Array2<f64>) -> Array2<f64> {
    Zip::from(band_a)
        .and(band_b)
        .par_map_collect(|&a, &b| (a - b) / (a + b))
}

/// Normalized Difference Water Index (NDWI) calculator, (GREEN - SWIR) / (GREEN + SWIR)
pub struct NDWI {
    green_index: usize,
    swir_index: usize,
    name: String,
}

impl NDWI {
    pub fn new(green_index: usize, swir_index: usize, name: Option<String>) -> Self {
        Self {
            green_index,
            swir_index,
            name: name.unwrap_or_else(|| "NDWI".to_string()),
        }
    }
}

impl IndexCalculator for NDWI {
    fn calculate(&self, inputs: &[Array2<f64>]) -> Array2<f64> {
        ndwi(&inputs[self.green_index], &inputs[self.swir_index])
    }

    fn required_bands(&self) -> usize {
        2 // green and SWIR
    }

    fn name(&self) -> &str {
        &self.name
    }
}
