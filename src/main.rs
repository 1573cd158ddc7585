// src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use water_frequency::cli::{Cli, Commands};
use water_frequency::config::process_config;
use water_frequency::geo::{resolve_window, BoundingBox, GdalReprojector};
use water_frequency::io::{GdalRasterSource, RasterSource};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs();
    builder.init();

    let threads = cli.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    match &cli.command {
        Commands::Run { config } => {
            process_config(config)?;
        }
        Commands::Window {
            raster,
            bbox,
            bbox_crs,
        } => {
            let coords: [f64; 4] = bbox
                .as_slice()
                .try_into()
                .map_err(|_| anyhow!("--bbox takes exactly 4 values"))?;
            let bbox = BoundingBox::from_array(coords, bbox_crs.clone());
            let georef = GdalRasterSource.georeference(raster)?;
            let window = resolve_window(&bbox, &georef.transform, &georef.crs, &GdalReprojector)?;

            info!("Raster size: {}x{}", georef.size.0, georef.size.1);
            println!(
                "col_off={} row_off={} width={} height={}",
                window.col_off, window.row_off, window.width, window.height
            );
        }
    }

    Ok(())
}
