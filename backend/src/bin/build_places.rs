use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailgeo::{
    checkpoint::write_json_atomic,
    config::AppConfig,
    dataset::{dedupe_places, place_from_element},
    models::PlaceDocument,
    overpass::OverpassResponse,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build place documents from an Overpass JSON export"
)]
struct Args {
    /// Overpass response saved with `[out:json]` (nodes, ways or relations with `out center`)
    #[arg(long)]
    input: PathBuf,

    /// Where the place documents are written as a JSON array
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON config; falls back to TRAILGEO_CONFIG, then built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    tracing::info!("building places from {:?} into {:?}", args.input, args.output);

    let response = OverpassResponse::from_path(&args.input)?;
    let total = response.elements.len();

    let built: Vec<PlaceDocument> = response
        .elements
        .par_iter()
        .filter_map(|element| match place_from_element(element, &config) {
            Ok(place) => place,
            Err(err) => {
                tracing::warn!("skipping {} {}: {err}", element.kind.as_str(), element.id);
                None
            }
        })
        .collect();
    let skipped = total - built.len();

    let (places, duplicates) = dedupe_places(built);
    tracing::info!(
        "elements={} places={} skipped={} duplicates={}",
        total,
        places.len(),
        skipped,
        duplicates
    );

    write_json_atomic(&args.output, &places, &config.retry)?;
    tracing::info!("places written to {:?}", args.output);

    Ok(())
}
