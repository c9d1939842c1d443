//! keyroll - piano recorder CLI for pianola
//!
//! Subcommands:
//! - `keyroll list` - Show stored songs
//! - `keyroll delete <id>` - Delete a song
//! - `keyroll play <id>` - Replay a song, printing each note transition
//! - `keyroll session` - Interactive record/play session over stdin

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pianoconf::PianoConfig;
use songbook::SongClient;
use tracing_subscriber::EnvFilter;

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "keyroll")]
#[command(about = "Record, replay, and manage piano songs")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./pianola.toml)
    #[arg(short, long, global = true, env = "PIANOLA_CONFIG")]
    config: Option<PathBuf>,

    /// Song server JSON-RPC endpoint (overrides client.server_url)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored songs
    List,

    /// Delete a stored song
    Delete {
        /// Song id
        id: String,
    },

    /// Replay a stored song
    Play {
        /// Song id
        id: String,
    },

    /// Run an interactive recording session
    Session {
        /// Title for new recordings
        #[arg(short, long)]
        title: Option<String>,

        /// Print every state change as a JSON line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = PianoConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        config.client.server_url = server;
    }

    // Logs go to stderr so they stay out of the session output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    for file in &sources.files {
        tracing::debug!("Loaded config: {}", file.display());
    }
    for var in &sources.env_overrides {
        tracing::debug!("Config override from env: {}", var);
    }

    let client = SongClient::with_timeout(
        &config.client.server_url,
        Duration::from_millis(config.client.timeout_ms),
    )
    .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::List => commands::list(&client).await?,
        Commands::Delete { id } => commands::delete(&client, &id).await?,
        Commands::Play { id } => commands::play(&client, &id).await?,
        Commands::Session { title, json } => {
            commands::session(client, &config.session, title, json).await?
        }
    }

    Ok(())
}
