mod api;
mod app;
mod blocklist;
mod cache;
mod commands;
mod config;
mod event;
mod task;
mod ui;

use blocklist::BlocklistService;
use cache::{CacheLayer, KeyValueStore, NoopStore, SqliteStore};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blockwatch")]
#[command(about = "A terminal dashboard for a guild's blocked users")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./blockwatch.yaml or $XDG_CONFIG_HOME/blockwatch/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Guild id to open
  #[arg(short, long)]
  guild: Option<String>,

  /// Always load from the API, never from the local cache
  #[arg(long)]
  no_cache: bool,
}

/// Log to a file under the data dir; the terminal belongs to the UI.
///
/// The returned guard flushes the writer when dropped.
fn init_logging() -> Result<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("blockwatch");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&log_dir, "blockwatch.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("BLOCKWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

fn open_store(enabled: bool) -> Arc<dyn KeyValueStore> {
  if !enabled {
    return Arc::new(NoopStore);
  }
  match SqliteStore::open() {
    Ok(store) => Arc::new(store),
    Err(e) => {
      warn!("Cache unavailable, continuing without it: {}", e);
      Arc::new(NoopStore)
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_logging()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override guild if specified on command line
  if let Some(guild) = args.guild {
    config.default_guild = Some(guild);
  }

  let store = open_store(config.cache.enabled && !args.no_cache);
  let cache = CacheLayer::new(store).with_ttl(config.cache.ttl());
  let client = api::ApiClient::new(&config)?;
  let service = BlocklistService::new(Arc::new(client), cache);

  info!(api = %config.api.url, guild = ?config.default_guild, "Starting blockwatch");

  // Initialize and run the app
  let mut app = app::App::new(config, service);
  app.run().await?;

  Ok(())
}
