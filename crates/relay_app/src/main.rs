mod cli;
mod config;
mod wiring;

use std::process::ExitCode;

use clap::Parser;
use relay_engine::{DedupStore, Pipeline, RunStatus};
use relay_logging::{relay_error, relay_info, relay_warn, LevelFilter, LogDestination};

use crate::cli::Args;
use crate::config::AppConfig;

const EXIT_RUN_FAILED: u8 = 1;
const EXIT_BAD_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::resolve(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &config.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    relay_logging::initialize(level, &destination);

    match run(&config).await {
        Ok(RunStatus::Success) => ExitCode::SUCCESS,
        Ok(RunStatus::PartialFailure) => {
            relay_warn!("Some entries failed; they will be retried on the next run");
            ExitCode::SUCCESS
        }
        Err(err) => {
            relay_error!("Run failed: {:#}", err);
            ExitCode::from(EXIT_RUN_FAILED)
        }
    }
}

async fn run(config: &AppConfig) -> anyhow::Result<RunStatus> {
    let collaborators = wiring::collaborators(config)?;
    if config.rehost_images && config.storage.is_none() {
        relay_info!("No image storage configured; images keep their original sources");
    }
    let dedup = DedupStore::load(&config.state_file);
    relay_info!(
        "Relaying {} into {:?} ({} entries max, {})",
        config.feed_url,
        config.target_language,
        config.max_items,
        if config.draft { "drafts" } else { "live" }
    );

    let mut pipeline = Pipeline::new(config.pipeline_config(), collaborators, dedup);
    let report = pipeline.run().await?;
    relay_info!(
        "{} entries recorded in {:?}",
        pipeline.dedup().len(),
        config.state_file
    );
    Ok(report.status())
}
