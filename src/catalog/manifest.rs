// src/catalog/manifest.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use super::{SceneCatalog, SceneDescriptor, SearchRequest};
use crate::error::{Result, WaterError};
use crate::io::reader::is_remote;

/// Item collection file listing the scenes available locally
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(alias = "features")]
    pub scenes: Vec<SceneDescriptor>,
}

/// Catalog backed by a JSON manifest on disk. Relative asset hrefs resolve
/// against the manifest's directory.
#[derive(Debug)]
pub struct ManifestCatalog {
    scenes: Vec<SceneDescriptor>,
}

impl ManifestCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        debug!("Loaded {} scenes from {}", manifest.scenes.len(), path.display());
        Ok(Self::from_scenes(base_dir, manifest.scenes))
    }

    pub fn from_scenes(base_dir: impl Into<PathBuf>, scenes: Vec<SceneDescriptor>) -> Self {
        let base_dir = base_dir.into();
        let scenes = scenes
            .into_iter()
            .map(|mut scene| {
                for asset in scene.assets.values_mut() {
                    asset.href = resolve_href(&base_dir, &asset.href);
                }
                scene
            })
            .collect();
        Self { scenes }
    }
}

fn resolve_href(base_dir: &Path, href: &str) -> String {
    if is_remote(href) || href.starts_with("/vsi") || Path::new(href).is_absolute() {
        href.to_string()
    } else {
        base_dir.join(href).to_string_lossy().into_owned()
    }
}

impl SceneCatalog for ManifestCatalog {
    fn collection_exists(&self, collection: &str) -> Result<bool> {
        Ok(self.scenes.iter().any(|s| s.collection == collection))
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<SceneDescriptor>> {
        Ok(self
            .scenes
            .iter()
            .filter(|s| s.collection == request.collection)
            .filter(|s| s.cloud_cover() < request.max_cloud_cover)
            .filter(|s| request.time.contains(s.datetime().date_naive()))
            .filter(|s| s.bbox.map_or(true, |footprint| request.bbox.intersects(&footprint)))
            .cloned()
            .collect())
    }

    fn fetch_metadata(&self, scene: &SceneDescriptor, asset: &str) -> Result<Vec<String>> {
        let href = scene.asset_href(asset)?;
        if is_remote(href) {
            return Err(WaterError::RemoteMetadata(href.to_string()));
        }

        let content = fs::read_to_string(href)?;
        Ok(content.lines().map(str::to_string).collect())
    }
}
