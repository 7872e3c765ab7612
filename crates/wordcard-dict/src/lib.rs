//! HTTP clients for external dictionary providers.
//!
//! Each client implements [`wordcard_core::dictionary::Dictionary`] and turns
//! the provider's JSON into a [`WordDefinition`] with definitions grouped by
//! category. [`AnyDictionary`] picks a provider at runtime.

pub mod free;
pub mod oxford;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use wordcard_core::{dictionary::Dictionary, record::WordDefinition};

pub use free::FreeDictionary;
pub use oxford::OxfordDictionary;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{provider} has no entry for {word:?}")]
  NotFound { provider: &'static str, word: String },

  #[error("{provider} answered {status} for {word:?}")]
  Status {
    provider: &'static str,
    word:     String,
    status:   reqwest::StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn http_client() -> Result<Client> {
  Ok(Client::builder().timeout(Duration::from_secs(30)).build()?)
}

// ─── Provider selection ───────────────────────────────────────────────────────

/// Which provider to query, as named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  #[default]
  Free,
  Oxford,
}

/// A dictionary whose provider is chosen at runtime.
#[derive(Clone)]
pub enum AnyDictionary {
  Free(FreeDictionary),
  Oxford(OxfordDictionary),
}

impl Dictionary for AnyDictionary {
  type Error = Error;

  async fn lookup(&self, word: &str, lang: &str) -> Result<WordDefinition> {
    match self {
      AnyDictionary::Free(d) => d.lookup(word, lang).await,
      AnyDictionary::Oxford(d) => d.lookup(word, lang).await,
    }
  }
}
