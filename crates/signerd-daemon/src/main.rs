use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use signerd_core::SignerdConfig;
use signerd_scheduler::SchedulerEngine;

mod pipeline;

#[derive(Parser, Debug)]
#[command(name = "signerd", about = "DNSSEC zone-signing daemon")]
struct Args {
    /// Path to signerd.toml (falls back to SIGNERD_CONFIG, then
    /// ~/.signerd/signerd.toml).
    #[arg(short, long)]
    config: Option<String>,

    /// Log debug detail (RUST_LOG overrides this).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "signerd_daemon=debug,signerd_scheduler=debug,task=debug"
    } else {
        "signerd_daemon=info,signerd_scheduler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    // load config: explicit path > SIGNERD_CONFIG env > ~/.signerd/signerd.toml
    let config_path = args.config.or_else(|| std::env::var("SIGNERD_CONFIG").ok());
    let config = SignerdConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({e}), using defaults");
        SignerdConfig::default()
    });

    let context = Arc::new(pipeline::SignerContext::new(&config));
    let mut engine = SchedulerEngine::new(&config.scheduler, context)?;

    pipeline::register_zones(&mut engine, &config);
    info!(
        zones = config.zones.len(),
        workers = config.scheduler.workers,
        "zones registered"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("ctrl-c received, shutting down");
    shutdown_tx.send(true)?;
    engine_task.await?;

    Ok(())
}
