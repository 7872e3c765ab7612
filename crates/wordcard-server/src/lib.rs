//! The wordcard HTTP server: configuration, router assembly and the
//! maintenance modes of the `wordcard` binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use serde::Deserialize;
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use wordcard_api::AppState;
use wordcard_core::{
  Cancel,
  dictionary::Dictionary,
  record::{Record, WordDefinition},
  store::WordStore,
};
use wordcard_dict::{AnyDictionary, FreeDictionary, OxfordDictionary, Provider};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `wordcard.toml` and
/// `WORDCARD_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// Directory served at `/`. Nothing is served there when unset.
  #[serde(default)]
  pub assets_dir:           Option<PathBuf>,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
  #[serde(default)]
  pub dictionary:           DictionaryConfig,
}

/// Dictionary provider settings (`[dictionary]` table).
#[derive(Debug, Deserialize, Clone)]
pub struct DictionaryConfig {
  #[serde(default)]
  pub provider: Provider,
  #[serde(default = "default_lang")]
  pub lang:     String,
  /// Overrides the provider's public endpoint.
  #[serde(default)]
  pub base_url: Option<String>,
  /// Oxford credentials; fall back to `API_ID` / `API_KEY`.
  #[serde(default)]
  pub app_id:   Option<String>,
  #[serde(default)]
  pub app_key:  Option<String>,
}

fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("./words.db") }
fn default_request_timeout() -> u64 { 10 }
fn default_lang() -> String { "en".to_string() }

impl Default for DictionaryConfig {
  fn default() -> Self {
    Self {
      provider: Provider::default(),
      lang:     default_lang(),
      base_url: None,
      app_id:   None,
      app_key:  None,
    }
  }
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("oxford provider needs `{0}` (config or environment)")]
  MissingCredential(&'static str),

  #[error(transparent)]
  Dictionary(#[from] wordcard_dict::Error),
}

impl DictionaryConfig {
  /// Build the configured client.
  pub fn build(&self) -> Result<AnyDictionary, ConfigError> {
    match self.provider {
      Provider::Free => {
        let dict = match &self.base_url {
          Some(url) => FreeDictionary::with_base_url(url.clone())?,
          None => FreeDictionary::new()?,
        };
        Ok(AnyDictionary::Free(dict))
      }
      Provider::Oxford => {
        let app_id = credential(&self.app_id, "API_ID")?;
        let app_key = credential(&self.app_key, "API_KEY")?;
        let base_url = self.base_url.as_deref().unwrap_or(wordcard_dict::oxford::BASE_URL);
        Ok(AnyDictionary::Oxford(OxfordDictionary::with_base_url(
          base_url, app_id, app_key,
        )?))
      }
    }
  }
}

fn credential(configured: &Option<String>, var: &'static str) -> Result<String, ConfigError> {
  configured
    .clone()
    .or_else(|| std::env::var(var).ok())
    .filter(|v| !v.is_empty())
    .ok_or(ConfigError::MissingCredential(var))
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application state for a store and dictionary under `cfg`.
pub fn state<S, D>(store: S, dict: D, cfg: &ServerConfig) -> AppState<S, D> {
  AppState {
    store:           Arc::new(store),
    dict:            Arc::new(dict),
    lang:            cfg.dictionary.lang.clone(),
    request_timeout: Duration::from_secs(cfg.request_timeout_secs),
  }
}

/// The full application: REST API under `/v1`, static assets at `/`.
pub fn app<S, D>(state: AppState<S, D>, assets_dir: Option<&Path>) -> Router
where
  S: WordStore + 'static,
  D: Dictionary + 'static,
{
  let router = Router::new().nest("/v1", wordcard_api::api_router(state));
  let router = match assets_dir {
    Some(dir) => router.fallback_service(ServeDir::new(dir)),
    None => router,
  };
  router.layer(TraceLayer::new_for_http())
}

// ─── Maintenance ──────────────────────────────────────────────────────────────

/// Render one stored record for `--dump`: its definitions followed by the
/// contexts it was seen in.
pub fn render_record(record: &Record) -> String {
  let mut out = WordDefinition::from(record).to_string();
  if record.mastered {
    out.push_str("[mastered]\n");
  }
  for context in &record.contexts {
    out.push_str(&format!("  > {context}\n"));
  }
  out
}

/// Every stored record, rendered and separated by blank lines.
pub async fn dump<S: WordStore>(store: &S) -> Result<String, S::Error> {
  let records = store.list_records(Cancel::never()).await?;
  Ok(
    records
      .iter()
      .map(render_record)
      .collect::<Vec<_>>()
      .join("\n"),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use wordcard_store_sqlite::SqliteStore;

  fn config_from(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  fn offline_dictionary() -> AnyDictionary {
    AnyDictionary::Free(FreeDictionary::with_base_url("http://127.0.0.1:9").unwrap())
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = config_from("");
    assert_eq!(cfg.host, "localhost");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.store_path, PathBuf::from("./words.db"));
    assert!(cfg.assets_dir.is_none());
    assert_eq!(cfg.dictionary.provider, Provider::Free);
    assert_eq!(cfg.dictionary.lang, "en");
  }

  #[test]
  fn dictionary_table_is_read() {
    let cfg = config_from(
      r#"
      port = 21000

      [dictionary]
      provider = "oxford"
      lang = "en-gb"
      app_id = "id"
      app_key = "key"
      "#,
    );
    assert_eq!(cfg.port, 21000);
    assert_eq!(cfg.dictionary.provider, Provider::Oxford);
    assert!(matches!(cfg.dictionary.build().unwrap(), AnyDictionary::Oxford(_)));
  }

  #[test]
  fn blank_oxford_credential_is_missing() {
    let cfg = DictionaryConfig {
      provider: Provider::Oxford,
      app_id: Some(String::new()),
      app_key: Some("key".into()),
      ..Default::default()
    };
    assert!(matches!(cfg.build(), Err(ConfigError::MissingCredential("API_ID"))));
  }

  #[test]
  fn render_lists_definitions_then_contexts() {
    let record = Record::new("run")
      .with_context("run fast")
      .with_definition("verb", "to move swiftly");
    let text = render_record(&record);
    assert!(text.starts_with("run "), "{text}");
    assert!(text.contains("verb\n    0. to move swiftly\n"), "{text}");
    assert!(text.ends_with("  > run fast\n"), "{text}");
    assert!(!text.contains("[mastered]"));
  }

  #[tokio::test]
  async fn dump_renders_every_record() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.insert_record(Record::new("alpha"), Cancel::never()).await.unwrap();
    store.insert_record(Record::new("beta"), Cancel::never()).await.unwrap();

    let text = dump(&store).await.unwrap();
    assert!(text.contains("alpha"));
    assert!(text.contains("beta"));
  }

  #[tokio::test]
  async fn api_is_nested_under_v1() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cfg = config_from("");
    let app = app(state(store, offline_dictionary(), &cfg), None);

    let req = Request::builder().uri("/v1/word").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn assets_are_served_at_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>wordcard</h1>").unwrap();

    let store = SqliteStore::open_in_memory().await.unwrap();
    let cfg = config_from("");
    let app = app(state(store, offline_dictionary(), &cfg), Some(dir.path()));

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>wordcard</h1>");
  }
}
