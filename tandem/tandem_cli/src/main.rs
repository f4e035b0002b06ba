use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use tandem_concurrency::{Runner, RunnerConfig, WaitStrategy};

/// Tandem counter
///
/// Counts up through the configured range (0 to 20 by default) on one thread,
/// then back down on another once the first signals completion.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// TOML file with run settings (start, end, wait, wait_timeout_ms)
    #[clap(long)]
    config: Option<PathBuf>,

    /// How the down-counter waits for the up-counter [block, spin]
    #[clap(long)]
    wait: Option<WaitStrategy>,

    /// Log filter for diagnostics on stderr; RUST_LOG is used when absent
    #[clap(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(cli: &Cli) -> Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RunnerConfig::default(),
    };

    if let Some(wait) = cli.wait {
        config = config.with_wait(wait);
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = load_config(&cli)?;
    let runner = Runner::new(config).context("invalid run configuration")?;
    debug!("Using configuration: {:?}", runner.config());

    let report = runner.run(io::stdout()).context("counting run failed")?;

    info!(
        "Done: {} lines up, {} lines down ({} wait)",
        report.up_emitted, report.down_emitted, report.wait
    );

    Ok(())
}
