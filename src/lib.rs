// src/lib.rs
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod io;
pub mod metadata;
pub mod processing;

pub use error::{Result, WaterError};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
