// src/geo/reproject.rs
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};

use crate::error::{Result, WaterError};

/// Coordinate transformation between two reference systems.
pub trait Reproject {
    /// Transform `(x, y)` points in place from `from` to `to`.
    ///
    /// x is easting/longitude and y is northing/latitude regardless of the
    /// axis order the authority defines.
    fn transform_points(&self, from: &str, to: &str, points: &mut [(f64, f64)]) -> Result<()>;
}

/// GDAL/PROJ backed reprojection. Accepts anything `OSRSetFromUserInput`
/// understands (`EPSG:4326`, WKT, PROJ strings).
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalReprojector;

impl GdalReprojector {
    fn spatial_ref(definition: &str) -> gdal::errors::Result<SpatialRef> {
        let mut srs = SpatialRef::from_definition(definition)?;
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(srs)
    }
}

impl Reproject for GdalReprojector {
    fn transform_points(&self, from: &str, to: &str, points: &mut [(f64, f64)]) -> Result<()> {
        let err = |e: gdal::errors::GdalError| WaterError::Reprojection {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        };

        let source = Self::spatial_ref(from).map_err(err)?;
        let target = Self::spatial_ref(to).map_err(err)?;
        let transform = CoordTransform::new(&source, &target).map_err(err)?;

        let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let mut ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let mut zs = vec![0.0; points.len()];
        transform
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .map_err(err)?;

        for (point, (x, y)) in points.iter_mut().zip(xs.into_iter().zip(ys)) {
            *point = (x, y);
        }
        Ok(())
    }
}
