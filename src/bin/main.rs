use std::path::PathBuf;

use clap::Parser;
use simulation::{init, App, Settings};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Simulation settings json file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, short, default_value = "300")]
    ticks: usize,

    /// Terrain seed, overrides the settings file
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<(), String> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(path) => init::json::parse_settings(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.terrain = settings.terrain.with_seed(seed);
    }

    let mut app = App::try_new(settings).map_err(|e| e.to_string())?;

    let now = std::time::Instant::now();
    let result = app.run(cli.ticks);
    let elapsed = now.elapsed();

    println!("Run ended with result: {result:?} time: {elapsed:?}");

    app.print_flight_state_results();
    Ok(())
}
