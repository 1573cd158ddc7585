// src/config.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{ManifestCatalog, SearchRequest, TimeRange};
use crate::geo::{BoundingBox, GdalReprojector};
use crate::io::{write_grid, GdalRasterSource, OutputOptions};
use crate::processing::{PipelineParams, WaterFrequencyPipeline};

#[derive(Deserialize, Serialize, Debug)]
pub struct FrequencyConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub output_dir: PathBuf,
    /// Scene manifest the catalog is built from
    pub catalog: PathBuf,
    pub sites: BTreeMap<String, Site>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GlobalParams {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_bbox_crs")]
    pub bbox_crs: String,
    #[serde(default = "default_green_asset")]
    pub green_asset: String,
    #[serde(default = "default_swir_asset")]
    pub swir_asset: String,
    #[serde(default = "default_green_band")]
    pub green_band: u8,
    #[serde(default = "default_swir_band")]
    pub swir_band: u8,
    #[serde(default = "default_metadata_asset")]
    pub metadata_asset: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_fill_value")]
    pub fill_value: f64,
    #[serde(default)]
    pub max_scenes: Option<usize>,
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
    #[serde(default)]
    pub write_valid_count: bool,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            bbox_crs: default_bbox_crs(),
            green_asset: default_green_asset(),
            swir_asset: default_swir_asset(),
            green_band: default_green_band(),
            swir_band: default_swir_band(),
            metadata_asset: default_metadata_asset(),
            threshold: default_threshold(),
            fill_value: default_fill_value(),
            max_scenes: None,
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
            write_valid_count: false,
        }
    }
}

fn default_collection() -> String {
    "landsat-8-l1".to_string()
}

fn default_bbox_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_green_asset() -> String {
    "B3".to_string()
}

fn default_swir_asset() -> String {
    "B7".to_string()
}

fn default_green_band() -> u8 {
    3
}

fn default_swir_band() -> u8 {
    7
}

fn default_metadata_asset() -> String {
    "MTL".to_string()
}

fn default_threshold() -> f64 {
    0.3
}

fn default_fill_value() -> f64 {
    65535.0
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

/// Area of interest
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Site {
    /// Output file prefix; the site key when absent
    pub name: Option<String>,
    /// `[min_x, min_y, max_x, max_y]` in `global.bbox_crs`
    pub bbox: [f64; 4],
    /// `YYYY-MM-DD/YYYY-MM-DD`
    pub time: String,
    /// Maximum cloud cover in percent
    pub cloud_cover: f64,
    pub threshold: Option<f64>,
    pub collection: Option<String>,
}

impl FrequencyConfig {
    /// Load a config; relative `output_dir` and `catalog` resolve against the
    /// config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: FrequencyConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        if let Some(base) = path.parent() {
            if config.output_dir.is_relative() {
                config.output_dir = base.join(&config.output_dir);
            }
            if config.catalog.is_relative() {
                config.catalog = base.join(&config.catalog);
            }
        }
        Ok(config)
    }

    pub fn pipeline_params(&self, site: &Site) -> PipelineParams {
        PipelineParams {
            green_asset: self.global.green_asset.clone(),
            swir_asset: self.global.swir_asset.clone(),
            green_band: self.global.green_band,
            swir_band: self.global.swir_band,
            metadata_asset: self.global.metadata_asset.clone(),
            fill_value: self.global.fill_value,
            threshold: site.threshold.unwrap_or(self.global.threshold),
            max_scenes: self.global.max_scenes,
        }
    }

    pub fn search_request(&self, site: &Site) -> Result<SearchRequest> {
        Ok(SearchRequest {
            bbox: BoundingBox::from_array(site.bbox, self.global.bbox_crs.clone()),
            time: TimeRange::parse(&site.time)?,
            max_cloud_cover: site.cloud_cover,
            collection: site
                .collection
                .clone()
                .unwrap_or_else(|| self.global.collection.clone()),
        })
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            compress: self.global.compress.clone(),
            compress_level: self.global.compress_level,
            tiled: self.global.tiled,
        }
    }
}

pub fn process_config(config_path: &Path) -> Result<()> {
    let config = FrequencyConfig::load(config_path)?;
    let catalog = ManifestCatalog::open(&config.catalog)
        .with_context(|| format!("opening catalog {}", config.catalog.display()))?;
    let source = GdalRasterSource;
    let reprojector = GdalReprojector;
    let options = config.output_options();

    fs::create_dir_all(&config.output_dir)?;

    info!("Starting water frequency for {} sites...", config.sites.len());

    for (i, (key, site)) in config.sites.iter().enumerate() {
        let name = site.name.as_deref().unwrap_or(key);
        info!("[{}/{}] Processing site {}", i + 1, config.sites.len(), name);

        let request = config.search_request(site)?;
        let pipeline =
            WaterFrequencyPipeline::new(&catalog, &source, &reprojector, config.pipeline_params(site));
        let result = pipeline
            .run(&request)
            .with_context(|| format!("processing site {name}"))?;

        let frequency_path = config.output_dir.join(format!("{name}_waterfrequency.tif"));
        write_grid(
            &frequency_path,
            &result.frequency,
            &result.georef,
            &result.window,
            &options,
            "water frequency",
        )?;

        if config.global.write_valid_count {
            let valid_path = config.output_dir.join(format!("{name}_validpixels.tif"));
            let valid = result.valid_count.mapv(f64::from);
            write_grid(
                &valid_path,
                &valid,
                &result.georef,
                &result.window,
                &options,
                "valid pixels",
            )?;
        }
    }

    info!("Water frequency complete!");
    Ok(())
}
