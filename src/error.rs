// src/error.rs

/// Error types for water frequency processing
#[derive(Debug, thiserror::Error)]
pub enum WaterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Adapt the time period to an appropriate format of type 'YYYY-MM-DD/YYYY-MM-DD' (got '{0}')")]
    InvalidTimeRange(String),

    #[error("Collection '{0}' does not exist in the catalog, e.g. try 'landsat-8-l1' or 'sentinel-s2-l1c'")]
    UnknownCollection(String),

    #[error("Scene '{scene}' has no asset '{asset}'")]
    MissingAsset { scene: String, asset: String },

    #[error("Metadata key '{0}' not found")]
    MissingMetadata(String),

    #[error("Remote metadata is not supported: {0}")]
    RemoteMetadata(String),

    #[error("Affine transform is not invertible")]
    DegenerateTransform,

    #[error("Reprojection from {from} to {to} failed: {reason}")]
    Reprojection {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("No scene could be processed")]
    NoScenes,
}

/// Result type for water frequency operations
pub type Result<T> = std::result::Result<T, WaterError>;
