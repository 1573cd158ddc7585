use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "water-frequency")]
#[command(about = "Surface water frequency from Landsat time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Worker threads for per-pixel computation (default: all CPUs)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the water frequency for every site in a config file
    Run {
        /// JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the pixel window a bounding box covers on a raster
    Window {
        /// Raster file or URL
        #[arg(short, long)]
        raster: String,

        /// Bounding box: min_x min_y max_x max_y
        #[arg(short, long, num_args = 4, allow_negative_numbers = true)]
        bbox: Vec<f64>,

        /// CRS of the bounding box
        #[arg(long, default_value = "EPSG:4326")]
        bbox_crs: String,
    },
}
