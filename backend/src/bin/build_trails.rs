use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailgeo::{
    checkpoint::{write_json_atomic, ResumableJob},
    config::AppConfig,
    dataset::trail_from_element,
    models::{Difficulty, TrailDocument},
    overpass::OverpassResponse,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build trail documents from an Overpass `out geom` export, resumably"
)]
struct Args {
    /// Overpass response containing hiking ways and route relations with geometry
    #[arg(long)]
    input: PathBuf,

    /// Where the trail documents are written as a JSON array
    #[arg(long)]
    output: PathBuf,

    /// Checkpoint file; defaults to `<output>.checkpoint.json`
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Optional JSON config; falls back to TRAILGEO_CONFIG, then built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn checkpoint_path(&self) -> PathBuf {
        self.checkpoint.clone().unwrap_or_else(|| {
            let mut name = self.output.clone().into_os_string();
            name.push(".checkpoint.json");
            PathBuf::from(name)
        })
    }
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
    tracing::info!("building trails from {:?} into {:?}", args.input, args.output);

    let response = OverpassResponse::from_path(&args.input)?;
    let mut job: ResumableJob<TrailDocument> = ResumableJob::open(
        args.checkpoint_path(),
        config.checkpoint_interval,
        config.retry.clone(),
    )?;

    let mut seen_names: HashSet<String> = job
        .results()
        .iter()
        .map(|trail| trail.name.to_lowercase())
        .collect();

    for element in &response.elements {
        let id = format!("{}/{}", element.kind.as_str(), element.id);
        if job.is_processed(&id) {
            continue;
        }

        let trail = match trail_from_element(element, &config) {
            Ok(Some(trail)) if seen_names.insert(trail.name.to_lowercase()) => Some(trail),
            Ok(Some(trail)) => {
                tracing::debug!("duplicate trail name {:?}, skipping {id}", trail.name);
                None
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("skipping {id}: {err}");
                None
            }
        };
        job.record(id, trail)?;
    }

    tracing::info!("processed {} elements", job.processed_count());
    write_json_atomic(&args.output, job.results(), &config.retry)?;
    let trails = job.finish()?;

    let mut by_difficulty: BTreeMap<Difficulty, usize> =
        Difficulty::ALL.iter().map(|d| (*d, 0)).collect();
    for trail in &trails {
        *by_difficulty.entry(trail.difficulty).or_default() += 1;
    }
    tracing::info!("trails written to {:?}: {}", args.output, trails.len());
    for (difficulty, count) in by_difficulty {
        tracing::info!("  {difficulty}: {count}");
    }

    Ok(())
}
