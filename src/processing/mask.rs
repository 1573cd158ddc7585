// src/processing/mask.rs
use ndarray::{Array2, Zip};

/// Raw value a boundless read returns outside the scene
pub const FILL_VALUE: f64 = 65535.0;

/// True where every band holds an observation: not the fill sentinel and a
/// strictly positive digital number.
///
/// # Panics
///
/// Panics if a band's shape differs from the first band's.
pub fn valid_pixels(bands: &[&Array2<f64>], fill_value: f64) -> Array2<bool> {
    let Some(first) = bands.first() else {
        return Array2::from_elem((0, 0), false);
    };

    let mut valid = Array2::from_elem(first.raw_dim(), true);
    for band in bands {
        Zip::from(&mut valid).and(*band).for_each(|v, &dn| {
            *v = *v && dn != fill_value && dn > 0.0;
        });
    }
    valid
}

/// Overwrite invalid pixels with NaN.
///
/// # Panics
///
/// Panics if `index` and `valid` differ in shape.
pub fn apply_mask(index: &Array2<f64>, valid: &Array2<bool>) -> Array2<f64> {
    Zip::from(index)
        .and(valid)
        .map_collect(|&value, &ok| if ok { value } else { f64::NAN })
}
