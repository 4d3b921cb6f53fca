//! Main entry point for alertstat.

use alertstat_bot::{authorize, logging_config, App, Args, ReportKind, SchedulerService};
use alertstat_common::init_logging;
use alertstat_config::{Config, ConfigLoader};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_file(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Configuration is incomplete")?;

    let _log_guard = init_logging(&logging_config(&config, args.log_level.as_deref()))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting alertstat");

    tokio::fs::create_dir_all(&config.report.data_dir)
        .await
        .with_context(|| format!("Cannot create {}", config.report.data_dir.display()))?;

    if args.auth {
        authorize(&config).await?;
        return Ok(());
    }

    let app = App::build(&config)?;
    let kinds = args.report_kinds();
    if kinds.is_empty() && app.forwarder.is_none() {
        info!("Nothing enabled: pass --weekly or --monthly, or configure forwarding");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let forwarder = app.forwarder.map(|forwarder| {
        let cancel = cancel.clone();
        tokio::spawn(async move { forwarder.run(cancel).await })
    });

    let scheduler = SchedulerService::new().await?;
    for kind in &kinds {
        schedule(&scheduler, &config, *kind, app.runner.clone()).await?;
        if args.run_now {
            let runner = app.runner.clone();
            let kind = *kind;
            tokio::spawn(async move { runner.run_logged(kind).await });
        }
    }
    scheduler.start().await?;

    info!(jobs = kinds.len(), forwarding = forwarder.is_some(), "alertstat is running, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Received shutdown signal, stopping");
    cancel.cancel();
    scheduler.stop().await?;
    if let Some(handle) = forwarder {
        if let Err(e) = handle.await {
            error!("Forwarder task ended abnormally: {e}");
        }
    }
    info!("alertstat has shut down");
    Ok(())
}

async fn schedule(
    scheduler: &SchedulerService,
    config: &Config,
    kind: ReportKind,
    runner: Arc<alertstat_bot::ReportRunner>,
) -> Result<()> {
    let (cron, description) = match kind {
        ReportKind::Weekly => (&config.report.weekly_cron, "Outage statistics for the last 7 days"),
        ReportKind::Monthly => (&config.report.monthly_cron, "Outage statistics for the previous month"),
    };
    scheduler
        .add_job(kind.name(), cron.as_str(), Some(description.to_string()), move || {
            let runner = runner.clone();
            async move { runner.run_logged(kind).await }
        })
        .await?;
    Ok(())
}
