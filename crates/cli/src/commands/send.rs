//! `send` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use contracts::{Codec, PipelineBlueprint, SinkConfig};
use http_sink::{JsonCodec, MetricsSnapshot, RawJsonCodec, SinkHandle, SinkRegistry};
use observability::DeliverySummary;

use crate::cli::{CodecKind, SendArgs};
use crate::error::CliError;
use crate::input;

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let sinks = select_sinks(&blueprint, args.sink.as_deref())?;

    let events = input::read_events(args.input.as_deref()).await?;
    let batches = input::into_batches(events, args.batch_size as usize);

    info!(
        sinks = sinks.len(),
        batches = batches.len(),
        events = batches.iter().map(|b| b.len()).sum::<usize>(),
        codec = ?args.codec,
        "Input loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration and input are valid, exiting");
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::install_prometheus(observability::metrics_addr_for_port(args.metrics_port))?;
    }

    let registry = SinkRegistry::with_builtin().with_codec(codec_for(args.codec));

    let mut handles = Vec::with_capacity(sinks.len());
    for config in &sinks {
        let handle = registry
            .spawn(config)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to create sink '{}'", config.name))?;
        handles.push(handle);
    }

    tokio::select! {
        _ = feed(&handles, batches) => {}
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, draining queued batches...");
        }
    }

    let mut total_failed = 0;
    for handle in handles {
        let name = handle.name().to_string();
        let metrics = Arc::clone(handle.metrics());
        let summary = handle.shutdown().await;
        total_failed += summary.failed;
        println!("{}", format_summary(&name, &summary, &metrics.snapshot()));
    }

    if total_failed > 0 {
        return Err(CliError::Delivery {
            failed: total_failed,
            sinks: sinks.len(),
        }
        .into());
    }

    info!("Batch Sink finished");
    Ok(())
}

/// Resolve which configured sinks receive the input
fn select_sinks(
    blueprint: &PipelineBlueprint,
    only: Option<&str>,
) -> Result<Vec<SinkConfig>, CliError> {
    match only {
        None => Ok(blueprint.sinks.clone()),
        Some(name) => blueprint
            .sinks
            .iter()
            .find(|s| s.name == name)
            .map(|s| vec![s.clone()])
            .ok_or_else(|| CliError::unknown_sink(name)),
    }
}

fn codec_for(kind: CodecKind) -> Arc<dyn Codec> {
    match kind {
        CodecKind::Json => Arc::new(JsonCodec::new()),
        CodecKind::RawJson => Arc::new(RawJsonCodec),
    }
}

/// Hand every batch to every sink, in input order
async fn feed(handles: &[SinkHandle], batches: Vec<contracts::Batch>) {
    for batch in batches {
        for handle in handles {
            if !handle.send(batch.clone()).await {
                warn!(sink = %handle.name(), "Sink queue closed, batch not enqueued");
            }
        }
    }
}

/// Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn format_summary(name: &str, summary: &DeliverySummary, snapshot: &MetricsSnapshot) -> String {
    format!(
        "\n[{}]\n{}Rejected batches (queue full): {}",
        name, summary, snapshot.rejected_count
    )
}
