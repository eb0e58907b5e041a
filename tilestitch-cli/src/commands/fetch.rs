//! `tilestitch fetch`: fetch a region and write it as PNG plus JSON sidecar.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use serde_json::json;
use tilestitch::coord::Origin;
use tilestitch::mosaic::Mosaic;
use tilestitch::service::TileService;
use tracing::info;

use super::common::{BoundingBox, ProviderArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Options for `fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Region as lon0,lat0,lon1,lat1 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// Zoom level
    #[arg(long, short)]
    pub zoom: u8,

    /// Output PNG; the sidecar is written next to it with a .json extension
    #[arg(long, short, default_value = "mosaic.png")]
    pub output: PathBuf,

    /// Skip the persistent tile cache
    #[arg(long)]
    pub no_cache: bool,

    /// Maximum concurrent tile requests
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// Run the fetch command.
pub fn run(runner: &CliRunner, args: FetchArgs) -> Result<(), CliError> {
    let config = runner.effective_config(&args.provider);
    let provider_config = config.provider_config()?;

    let mut service_config = config.service_config();
    if args.no_cache {
        service_config = service_config.without_cache();
    }
    if let Some(n) = args.max_concurrent {
        service_config = service_config.with_max_concurrent(n);
    }

    let service = TileService::from_provider_config(&provider_config, service_config)?;
    let domain = args.bbox.to_domain();

    println!("Provider: {}", service.provider().name());
    println!("Zoom:     {}", args.zoom);

    let start = Instant::now();
    let mosaic = service.image_for_domain_blocking(&domain, args.zoom)?;
    println!(
        "Fetched {}x{} pixels in {:.2}s ({:.1}% coverage)",
        mosaic.width(),
        mosaic.height(),
        start.elapsed().as_secs_f64(),
        mosaic.coverage_ratio() * 100.0
    );

    write_png(&mosaic, &args.output)?;
    let sidecar = sidecar_path(&args.output);
    write_sidecar(&mosaic, args.zoom, &sidecar)?;

    info!(output = %args.output.display(), sidecar = %sidecar.display(), "Mosaic written");
    println!("✓ Saved {} and {}", args.output.display(), sidecar.display());
    Ok(())
}

fn write_png(mosaic: &Mosaic, path: &Path) -> Result<(), CliError> {
    mosaic
        .to_rgba_image()
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| CliError::FileWrite {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// The PNG is written north-up, so its origin is `upper`.
fn sidecar_json(mosaic: &Mosaic, zoom: u8) -> serde_json::Value {
    let extent = mosaic.extent();
    json!({
        "extent": [extent.x0(), extent.x1(), extent.y0(), extent.y1()],
        "origin": Origin::Upper.to_string(),
        "width": mosaic.width(),
        "height": mosaic.height(),
        "zoom": zoom,
        "coverage": mosaic.coverage_ratio(),
    })
}

fn write_sidecar(mosaic: &Mosaic, zoom: u8, path: &Path) -> Result<(), CliError> {
    let file_error = |error: String| CliError::FileWrite {
        path: path.to_path_buf(),
        error,
    };
    let body = serde_json::to_string_pretty(&sidecar_json(mosaic, zoom))
        .map_err(|e| file_error(e.to_string()))?;
    std::fs::write(path, body).map_err(|e| file_error(e.to_string()))
}

fn sidecar_path(output: &Path) -> PathBuf {
    output.with_extension("json")
}
