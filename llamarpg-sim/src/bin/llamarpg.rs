//! LlamaRPG console entry point.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use llamarpg_core::{SimConfig, World};
use llamarpg_sim::cli::Args;
use llamarpg_sim::{Console, LlmDecisionSource, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    init_tracing(&config.general.log_level, args.log_json);

    let source = LlmDecisionSource::from_config(&config.llm).context("building decision source")?;
    if source.is_available() {
        info!(provider = %config.llm.provider, model = %config.llm.model, "decision source ready");
    } else {
        warn!("no inference provider configured; every NPC will use the fallback heuristic");
    }

    let world = Arc::new(World::new(config, args.seed).context("spawning roster")?);
    info!(npcs = world.len(), "world created");

    let (shutdown, stop) = watch::channel(false);
    let runner = tokio::spawn(Runner::new(Arc::clone(&world), Arc::new(source)).run(stop));

    let console = Console::new(Arc::clone(&world), !args.no_color);
    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        console.run(stdin.lock(), &mut stdout)
    })
    .await
    .context("console task panicked")?
    .context("console I/O")?;

    shutdown.send_replace(true);
    let ticks = runner.await.context("tick loop panicked")?;
    info!(ticks, events = world.event_count(), "simulation finished");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level. Logs go to stderr.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
