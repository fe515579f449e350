use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use company_jobs::cli::{Cli, Command};
use company_jobs::config::Config;
use company_jobs::pipeline::Pipeline;
use company_jobs::report::Report;
use company_jobs::{telemetry, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("company-jobs: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init(&config.log_dir) {
        eprintln!(
            "company-jobs: failed to initialize logging in {}: {}",
            config.log_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    info!("Starting company-jobs ({:?})", cli.command());
    info!("  - Employers configured: {}", config.employers.len());
    info!("  - Listing API: {}", config.source.api_url);
    info!(
        "  - Database server: {}:{}",
        config.database.host, config.database.port
    );

    match execute(&cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Finished with failed report queries");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Run aborted while {}: {}", e.stage(), e);
            eprintln!("company-jobs: {} failed: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every report query succeeded.
async fn execute(cli: &Cli, config: &Config) -> Result<bool> {
    let pipeline = Pipeline::new(config, cli.database.clone())?;

    let pool = match cli.command() {
        Command::Run | Command::Load => {
            let (pool, summary) = pipeline.ingest().await?;
            info!(
                "Loaded {} employers and {} jobs",
                summary.employers, summary.jobs
            );
            pool
        }
        Command::Report => pipeline.connect().await?,
    };

    if cli.command() == Command::Load {
        pool.close().await;
        return Ok(true);
    }

    let report = Report::gather(&pool, &cli.keyword).await;
    pool.close().await;
    info!("Database connections closed");

    if let Err(e) = report.render(cli.format, &mut std::io::stdout().lock()) {
        error!("Failed to write report: {}", e);
        return Ok(false);
    }
    Ok(report.failures() == 0)
}
