//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{PipelineBlueprint, SinkConfig};
use http_sink::{GzipBase64, Identity, WireTransform};

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    addr: String,
    content_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    strict_status: bool,
    on_compression_error: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn content_type_of(config: &SinkConfig) -> &'static str {
    if config.sink_type == Identity::SINK_TYPE {
        Identity.content_type()
    } else {
        GzipBase64::default().content_type()
    }
}

fn build_config_info(blueprint: &PipelineBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: s.sink_type.to_string(),
            addr: s.addr.clone(),
            content_type: content_type_of(s),
            timeout_ms: s.timeout_ms,
            strict_status: s.strict_status,
            on_compression_error: format!("{:?}", s.on_compression_error),
            queue_capacity: s.queue_capacity,
            headers: if args.headers {
                s.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            } else {
                BTreeMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        sinks,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Batch Sink Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Version: {}", info.version);
    println!("\n📤 Sinks ({})", info.sinks.len());
    for (i, sink) in info.sinks.iter().enumerate() {
        let is_last = i == info.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child = if is_last { "   " } else { "│  " };

        println!("   {} {} ({})", prefix, sink.name, sink.sink_type);
        println!("   {}  ├─ Target: {}", child, sink.addr);
        println!("   {}  ├─ Content-Type: {}", child, sink.content_type);
        match sink.timeout_ms {
            Some(ms) => println!("   {}  ├─ Timeout: {} ms", child, ms),
            None => println!("   {}  ├─ Timeout: none", child),
        }
        println!("   {}  ├─ Strict status: {}", child, sink.strict_status);
        println!(
            "   {}  ├─ On compression error: {}",
            child, sink.on_compression_error
        );
        for (name, value) in &sink.headers {
            println!("   {}  ├─ Header: {}: {}", child, name, value);
        }
        println!("   {}  └─ Queue capacity: {}", child, sink.queue_capacity);
    }

    println!();
}
