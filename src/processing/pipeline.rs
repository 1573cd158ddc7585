// src/processing/pipeline.rs
use log::{info, warn};
use ndarray::Array2;

use super::frequency::{FrequencyAccumulator, WATER_THRESHOLD};
use super::indices::{IndexCalculator, NDWI};
use super::mask::{apply_mask, valid_pixels, FILL_VALUE};
use crate::catalog::{search_scenes, SceneCatalog, SceneDescriptor, SearchRequest};
use crate::error::{Result, WaterError};
use crate::geo::{resolve_window, BoundingBox, Reproject, Window};
use crate::io::{GeoReference, RasterSource};
use crate::metadata::MtlMetadata;

/// Band and classification settings for a water frequency run
#[derive(Debug, Clone)]
pub struct PipelineParams {
    pub green_asset: String,
    pub swir_asset: String,
    pub green_band: u8,
    pub swir_band: u8,
    pub metadata_asset: String,
    pub fill_value: f64,
    pub threshold: f64,
    pub max_scenes: Option<usize>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            green_asset: "B3".to_string(),
            swir_asset: "B7".to_string(),
            green_band: 3,
            swir_band: 7,
            metadata_asset: "MTL".to_string(),
            fill_value: FILL_VALUE,
            threshold: WATER_THRESHOLD,
            max_scenes: None,
        }
    }
}

/// Output of a water frequency run
#[derive(Debug, Clone)]
pub struct FrequencyResult {
    pub frequency: Array2<f64>,
    pub valid_count: Array2<u32>,
    pub scenes: usize,
    /// Georeference of the last SWIR band read
    pub georef: GeoReference,
    /// Window of that band the grids cover
    pub window: Window,
}

/// One scene's NDWI with the spatial context it was read in
pub struct SceneIndex {
    pub index: Array2<f64>,
    pub georef: GeoReference,
    pub window: Window,
}

/// Sequential per-scene driver: search, read, calibrate, index, mask, accumulate.
pub struct WaterFrequencyPipeline<'a> {
    catalog: &'a dyn SceneCatalog,
    source: &'a dyn RasterSource,
    reprojector: &'a dyn Reproject,
    params: PipelineParams,
    calculator: NDWI,
}

impl<'a> WaterFrequencyPipeline<'a> {
    pub fn new(
        catalog: &'a dyn SceneCatalog,
        source: &'a dyn RasterSource,
        reprojector: &'a dyn Reproject,
        params: PipelineParams,
    ) -> Self {
        Self {
            catalog,
            source,
            reprojector,
            params,
            calculator: NDWI::new(0, 1, None),
        }
    }

    pub fn run(&self, request: &SearchRequest) -> Result<FrequencyResult> {
        let mut scenes = search_scenes(self.catalog, request)?;
        if let Some(max) = self.params.max_scenes {
            scenes.truncate(max);
        }

        let total = scenes.len();
        let mut accumulator: Option<FrequencyAccumulator> = None;
        let mut last: Option<(GeoReference, Window)> = None;

        for (i, scene) in scenes.iter().enumerate() {
            let Some(scene_index) = self.process_scene(scene, &request.bbox)? else {
                warn!("Scene {} has no pixels inside the bounding box, skipped", scene.id);
                continue;
            };

            let acc = accumulator.get_or_insert_with(|| {
                FrequencyAccumulator::new(scene_index.index.dim(), self.params.threshold)
            });
            acc.add_scene(&scene_index.index)?;
            last = Some((scene_index.georef, scene_index.window));

            info!(
                "{} scene {} was added ({} of {} scenes)",
                self.calculator.name(),
                scene.id,
                i + 1,
                total
            );
        }

        let (Some(acc), Some((georef, window))) = (accumulator, last) else {
            return Err(WaterError::NoScenes);
        };

        info!("Calculated the water frequency over {} scenes", acc.scenes());
        Ok(FrequencyResult {
            frequency: acc.frequency(),
            valid_count: acc.valid_count().clone(),
            scenes: acc.scenes(),
            georef,
            window,
        })
    }

    /// Masked NDWI of one scene, or `None` when the bbox covers no pixel.
    ///
    /// Both windows are resolved before the metadata is fetched, so a scene
    /// outside the bbox is skipped whatever its metadata holds.
    pub fn process_scene(
        &self,
        scene: &SceneDescriptor,
        bbox: &BoundingBox,
    ) -> Result<Option<SceneIndex>> {
        let Some((green_href, _, green_window)) =
            self.locate_band(scene, &self.params.green_asset, bbox)?
        else {
            return Ok(None);
        };
        let Some((swir_href, georef, window)) =
            self.locate_band(scene, &self.params.swir_asset, bbox)?
        else {
            return Ok(None);
        };

        let lines = self.catalog.fetch_metadata(scene, &self.params.metadata_asset)?;
        let metadata = MtlMetadata::parse(&lines);
        let green_cal = metadata.calibration(self.params.green_band)?;
        let swir_cal = metadata.calibration(self.params.swir_band)?;

        let fill = self.params.fill_value;
        let green = self.source.read_window(green_href, &green_window, fill)?;
        let swir = self.source.read_window(swir_href, &window, fill)?;

        if green.dim() != swir.dim() {
            return Err(WaterError::ShapeMismatch {
                expected: green.dim(),
                actual: swir.dim(),
            });
        }

        let valid = valid_pixels(&[&green, &swir], fill);
        let reflectance = [green_cal.apply(&green), swir_cal.apply(&swir)];
        let index = apply_mask(&self.calculator.calculate(&reflectance), &valid);

        Ok(Some(SceneIndex {
            index,
            georef,
            window,
        }))
    }

    /// Asset href, georeference and read window of one band, `None` if the
    /// window is empty.
    fn locate_band<'s>(
        &self,
        scene: &'s SceneDescriptor,
        asset: &str,
        bbox: &BoundingBox,
    ) -> Result<Option<(&'s str, GeoReference, Window)>> {
        let href = scene.asset_href(asset)?;
        let georef = self.source.georeference(href)?;
        let window = resolve_window(bbox, &georef.transform, &georef.crs, self.reprojector)?;
        if window.is_empty() {
            return Ok(None);
        }
        Ok(Some((href, georef, window)))
    }
}
