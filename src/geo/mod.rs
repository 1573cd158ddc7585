// src/geo/mod.rs
pub mod affine;
pub mod reproject;
pub mod window;

pub use affine::Affine;
pub use reproject::{GdalReprojector, Reproject};
pub use window::{resolve_window, BoundingBox, Window};
