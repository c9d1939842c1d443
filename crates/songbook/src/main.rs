//! songbook - the pianola song server
//!
//! Serves `songs`, `addSong`, and `deleteSong` over JSON-RPC at `POST /rpc`.

use anyhow::{Context, Result};
use clap::Parser;
use pianoconf::PianoConfig;
use songbook::{router, SongService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod telemetry;

#[derive(Parser, Debug)]
#[command(name = "songbook")]
#[command(about = "In-memory song store behind a JSON-RPC API")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./pianola.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Artificial latency for songs/addSong, in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = PianoConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.bind.http_port = port;
    }
    if let Some(latency_ms) = cli.latency_ms {
        config.service.latency_ms = latency_ms;
    }

    if cli.print_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    let telemetry = telemetry::init(&config.telemetry).context("Failed to initialize tracing")?;

    for file in &sources.files {
        info!("Loaded config: {}", file.display());
    }
    for var in &sources.env_overrides {
        info!("Config override from env: {}", var);
    }

    let latency = Duration::from_millis(config.service.latency_ms);
    let service = Arc::new(SongService::in_memory(latency));
    let app = router(service);

    let addr = format!("0.0.0.0:{}", config.bind.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🎹 songbook ready");
    info!("   JSON-RPC: POST http://{}/rpc", addr);
    info!("   Health:   GET  http://{}/health", addr);
    info!("   Latency:  {}ms on songs/addSong", config.service.latency_ms);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
