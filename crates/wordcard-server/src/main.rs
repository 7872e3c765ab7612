//! wordcard server binary.
//!
//! Reads `wordcard.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the REST API plus static front end over HTTP.
//!
//! # Maintenance
//!
//! ```text
//! wordcard --purge   # delete every stored word
//! wordcard --dump    # print every stored record
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wordcard_core::{Cancel, store::WordStore};
use wordcard_server::ServerConfig;
use wordcard_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "wordcard vocabulary server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(long, default_value = "wordcard.toml")]
  config: PathBuf,

  /// Port to listen on; overrides the configuration.
  #[arg(short, long)]
  port: Option<u16>,

  /// Delete every stored word and exit.
  #[arg(short = 'c', long)]
  purge: bool,

  /// Print every stored record and exit.
  #[arg(short, long)]
  dump: bool,
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
    .add_source(
      config::Environment::with_prefix("WORDCARD")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Maintenance modes: act on the store and exit.
  if cli.purge {
    let n = store.purge(Cancel::never()).await.context("failed to purge store")?;
    println!("{n} record(s) deleted");
    return Ok(());
  }
  if cli.dump {
    let text = wordcard_server::dump(&store).await.context("failed to dump store")?;
    print!("{text}");
    return Ok(());
  }

  let dict = server_cfg
    .dictionary
    .build()
    .context("failed to build dictionary client")?;

  let assets_dir = server_cfg.assets_dir.as_deref().map(expand_tilde);
  let state = wordcard_server::state(store, dict, &server_cfg);
  let app = wordcard_server::app(state, assets_dir.as_deref());
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
