// src/catalog/mod.rs
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WaterError};
use crate::geo::BoundingBox;

pub mod manifest;

pub use manifest::ManifestCatalog;

/// Inclusive acquisition date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    /// Parse `YYYY-MM-DD/YYYY-MM-DD`. A reversed range is swapped with a
    /// warning so the search can still run.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || WaterError::InvalidTimeRange(s.to_string());

        let (start, end) = s.trim().split_once('/').ok_or_else(invalid)?;
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;

        if start > end {
            warn!("Switch start and end time of your timespan: searching {end}/{start}");
            return Ok(Self {
                start: end,
                end: start,
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

/// Parameters of one catalog query
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub bbox: BoundingBox,
    pub time: TimeRange,
    /// Scenes must have strictly less cloud cover (percent)
    pub max_cloud_cover: f64,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Asset {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneProperties {
    pub datetime: DateTime<Utc>,
    #[serde(rename = "eo:cloud_cover", alias = "cloud_cover")]
    pub cloud_cover: f64,
}

/// One scene returned by a catalog search
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneDescriptor {
    pub id: String,
    pub collection: String,
    pub properties: SceneProperties,
    /// Footprint `[min_x, min_y, max_x, max_y]` in the search bbox CRS
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    pub assets: HashMap<String, Asset>,
}

impl SceneDescriptor {
    pub fn asset_href(&self, key: &str) -> Result<&str> {
        self.assets
            .get(key)
            .map(|asset| asset.href.as_str())
            .ok_or_else(|| WaterError::MissingAsset {
                scene: self.id.clone(),
                asset: key.to_string(),
            })
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.properties.datetime
    }

    pub fn cloud_cover(&self) -> f64 {
        self.properties.cloud_cover
    }
}

/// Scene catalog collaborator
pub trait SceneCatalog {
    fn collection_exists(&self, collection: &str) -> Result<bool>;

    /// Scenes matching the request, in any order
    fn search(&self, request: &SearchRequest) -> Result<Vec<SceneDescriptor>>;

    /// Lines of the scene's metadata asset
    fn fetch_metadata(&self, scene: &SceneDescriptor, asset: &str) -> Result<Vec<String>>;
}

/// Run a search, aborting on an unknown collection. Scenes come back in
/// acquisition order.
pub fn search_scenes(
    catalog: &dyn SceneCatalog,
    request: &SearchRequest,
) -> Result<Vec<SceneDescriptor>> {
    if !catalog.collection_exists(&request.collection)? {
        return Err(WaterError::UnknownCollection(request.collection.clone()));
    }

    let mut scenes = catalog.search(request)?;
    scenes.sort_by_key(|scene| scene.datetime());

    info!(
        "{} satellite scenes were found in {} for {}",
        scenes.len(),
        request.collection,
        request.time
    );
    debug!("Scenes: {}", scenes.iter().map(|s| &s.id).join(", "));
    Ok(scenes)
}
