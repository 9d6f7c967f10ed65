mod pipeline;

use anyhow::Result;
use clap::Parser;
use dota_data::HeroRegistry;
use dota_vision::{EngineConfig, TesseractReader};
use std::path::PathBuf;
use tracing::{error, info};

pub use pipeline::{format_report, DraftReport, Pipeline};

/// Identify the heroes on Ability Draft screenshots
#[derive(Debug, Parser)]
#[command(name = "draft-reader", version)]
pub struct Args {
    /// Draft screenshots to read, in order
    #[arg(required = true)]
    pub screenshots: Vec<PathBuf>,

    /// JSON file overriding the engine's calibration constants
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding heroes.json
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Print each result as JSON instead of name/id lines
    #[arg(long)]
    pub json: bool,

    /// Log every isolation attempt and match scan
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "draft_reader_lib=debug,dota_vision=debug,dota_data=debug"
    } else {
        "draft_reader_lib=info,dota_vision=info,dota_data=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let registry = HeroRegistry::load(&args.data_dir)?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut pipeline = Pipeline::new(&registry, config, TesseractReader::new());
    let mut failures = 0;
    for path in &args.screenshots {
        match pipeline.process(path) {
            Ok(report) => println!("{}", format_report(&report, args.json)?),
            Err(e) => {
                error!("{}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }

    let timings = pipeline.timings();
    if !timings.is_empty() {
        let total: f64 = timings.iter().map(|d| d.as_secs_f64()).sum();
        info!(
            "Read {} screenshot(s), {:.3}s average",
            timings.len(),
            total / timings.len() as f64
        );
    }

    if failures > 0 {
        anyhow::bail!("{} screenshot(s) could not be read", failures);
    }
    Ok(())
}
