//! Taskframe server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the frame transport plus the
//! dashboard JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use taskframe_api::ApiState;
use taskframe_frame::{AppState as FrameState, FrameConfig};
use taskframe_identity::{DEFAULT_API_BASE, HubClient, HubConfig};
use taskframe_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  host:              String,
  port:              u16,
  /// External base URL the frame's image and callback URLs embed.
  base_url:          String,
  /// Where the full dashboard lives; the frame's open-app button links here.
  app_url:           String,
  store_path:        PathBuf,
  identity_api_key:  String,
  /// Defaults to the hosted service when unset.
  identity_api_base: Option<String>,
}

#[derive(Parser)]
#[command(author, version, about = "Taskframe server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TASKFRAME"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Identity client for the dashboard login path.
  let verifier = HubClient::new(HubConfig {
    api_base: server_cfg
      .identity_api_base
      .clone()
      .unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
    api_key:  server_cfg.identity_api_key.clone(),
  })
  .context("failed to build identity client")?;

  // Build application state for both surfaces.
  let frame_state = FrameState {
    store:  store.clone(),
    config: Arc::new(FrameConfig {
      base_url: server_cfg.base_url.clone(),
      app_url:  server_cfg.app_url.clone(),
    }),
  };
  let api_state = ApiState { store, verifier: Arc::new(verifier) };

  let app = taskframe_frame::router(frame_state)
    .nest("/api", taskframe_api::api_router(api_state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
