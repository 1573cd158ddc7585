// src/processing/mod.rs
pub mod frequency;
pub mod indices;
pub mod mask;
pub mod pipeline;
pub mod reflectance;

// Re-export main components
pub use frequency::{water_frequency, FrequencyAccumulator, WATER_THRESHOLD};
pub use mask::FILL_VALUE;
pub use pipeline::{FrequencyResult, PipelineParams, WaterFrequencyPipeline};
