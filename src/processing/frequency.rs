// src/processing/frequency.rs
use ndarray::{stack, Array2, Array3, ArrayView2, Axis, Zip};

use crate::error::{Result, WaterError};

/// Index value at or above which a pixel counts as water
pub const WATER_THRESHOLD: f64 = 0.3;

/// Stack per-scene index rasters into a (scenes, rows, cols) array.
pub fn stack_scenes(scenes: &[Array2<f64>]) -> Result<Array3<f64>> {
    let Some(first) = scenes.first() else {
        return Ok(Array3::zeros((0, 0, 0)));
    };

    let expected = first.dim();
    if let Some(bad) = scenes.iter().find(|s| s.dim() != expected) {
        return Err(WaterError::ShapeMismatch {
            expected,
            actual: bad.dim(),
        });
    }

    let views: Vec<ArrayView2<f64>> = scenes.iter().map(|s| s.view()).collect();
    stack(Axis(0), &views).map_err(|_| WaterError::ShapeMismatch {
        expected,
        actual: expected,
    })
}

/// Number of scenes per pixel that are not NaN.
pub fn valid_pixel_count(stack: &Array3<f64>) -> Array2<u32> {
    stack.map_axis(Axis(0), |lane| {
        lane.iter().filter(|v| !v.is_nan()).count() as u32
    })
}

/// Number of scenes per pixel with `index >= threshold`. NaN never counts.
pub fn water_count(stack: &Array3<f64>, threshold: f64) -> Array2<u32> {
    stack.map_axis(Axis(0), |lane| {
        lane.iter().filter(|&&v| v >= threshold).count() as u32
    })
}

/// Fraction of valid observations classified as water; NaN where a pixel was
/// never observed.
pub fn water_frequency(stack: &Array3<f64>, threshold: f64) -> Array2<f64> {
    ratio(&water_count(stack, threshold), &valid_pixel_count(stack))
}

fn ratio(water: &Array2<u32>, valid: &Array2<u32>) -> Array2<f64> {
    Zip::from(water)
        .and(valid)
        .map_collect(|&w, &n| w as f64 / n as f64)
}

/// Running water and valid-observation counts over a time series.
#[derive(Debug, Clone)]
pub struct FrequencyAccumulator {
    threshold: f64,
    water: Array2<u32>,
    valid: Array2<u32>,
    scenes: usize,
}

impl FrequencyAccumulator {
    pub fn new(shape: (usize, usize), threshold: f64) -> Self {
        Self {
            threshold,
            water: Array2::zeros(shape),
            valid: Array2::zeros(shape),
            scenes: 0,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.water.dim()
    }

    pub fn scenes(&self) -> usize {
        self.scenes
    }

    /// Add one masked index raster.
    pub fn add_scene(&mut self, index: &Array2<f64>) -> Result<()> {
        if index.dim() != self.shape() {
            return Err(WaterError::ShapeMismatch {
                expected: self.shape(),
                actual: index.dim(),
            });
        }

        let threshold = self.threshold;
        Zip::from(&mut self.water)
            .and(&mut self.valid)
            .and(index)
            .for_each(|water, valid, &value| {
                if !value.is_nan() {
                    *valid += 1;
                }
                if value >= threshold {
                    *water += 1;
                }
            });
        self.scenes += 1;
        Ok(())
    }

    pub fn valid_count(&self) -> &Array2<u32> {
        &self.valid
    }

    pub fn water_count(&self) -> &Array2<u32> {
        &self.water
    }

    pub fn frequency(&self) -> Array2<f64> {
        ratio(&self.water, &self.valid)
    }
}
