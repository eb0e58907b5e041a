//! `tilestitch tiles`: list the tiles covering a region without fetching.

use clap::Args;
use tilestitch::coord::TileGrid;
use tilestitch::domain::DomainTileFinder;
use tilestitch::provider::ProviderFactory;

use super::common::{BoundingBox, ProviderArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Options for `tiles`.
#[derive(Debug, Args)]
pub struct TilesArgs {
    /// Region as lon0,lat0,lon1,lat1 in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// Zoom level
    #[arg(long, short)]
    pub zoom: u8,

    /// Print the bounding box of each tile as well
    #[arg(long)]
    pub extent: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// Run the tiles command.
pub fn run(runner: &CliRunner, args: TilesArgs) -> Result<(), CliError> {
    let config = runner.effective_config(&args.provider);
    let provider = ProviderFactory::create(&config.provider_config()?)?;

    let grid = TileGrid::web_mercator().with_y_axis(config.provider.y_axis);
    let addressing = config
        .provider
        .addressing
        .unwrap_or_else(|| provider.addressing());
    let finder = DomainTileFinder::new(grid, addressing);

    let domain = args.bbox.to_domain();
    let mut count = 0usize;
    for tile in finder.find(&domain, args.zoom)? {
        if args.extent {
            let (x0, x1, y0, y1) = grid.bounding_box(&tile).as_tuple();
            println!("{}\t{:.3}\t{:.3}\t{:.3}\t{:.3}", tile, x0, x1, y0, y1);
        } else {
            println!("{}", tile);
        }
        count += 1;
    }
    eprintln!("{} tiles ({} addressing)", count, addressing);
    Ok(())
}
