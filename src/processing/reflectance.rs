// src/processing/reflectance.rs
use ndarray::Array2;

/// Linear top-of-atmosphere rescaling coefficients for one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub mult: f64,
    pub add: f64,
}

impl Calibration {
    pub fn apply(&self, raw: &Array2<f64>) -> Array2<f64> {
        to_toa(raw, self.add, self.mult)
    }
}

/// Convert raw digital numbers to top-of-atmosphere reflectance:
/// `mult * raw + add`. NaN stays NaN.
pub fn to_toa(raw: &Array2<f64>, add: f64, mult: f64) -> Array2<f64> {
    raw.mapv(|dn| mult * dn + add)
}
