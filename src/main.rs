use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use telemetry_dash::config::DashboardConfig;
use telemetry_dash::sink::channel_readings;
use telemetry_dash::source::{SimulatedSource, SourceRunner};
use telemetry_dash::run_dashboard;

#[derive(Parser)]
#[command(name = "telemetry-dash")]
#[command(about = "Realtime vehicle telemetry dashboard", long_about = None)]
struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(long, default_value = "config/dashboard.json")]
    config: PathBuf,
    /// Override the persisted layout path from the configuration
    #[arg(long)]
    layout: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = match DashboardConfig::load_or_default(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(layout) = cli.layout {
        cfg.layout_path = Some(layout);
    }

    let (sink, rx) = channel_readings();
    let mut runner = match SourceRunner::spawn(SimulatedSource::default(), sink, cfg.source.timing()) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "could not start reading source");
            return ExitCode::FAILURE;
        }
    };

    let result = run_dashboard(&cfg, rx, None);
    runner.stop();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dashboard window failed");
            ExitCode::FAILURE
        }
    }
}
