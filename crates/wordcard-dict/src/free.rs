//! Client for the Free Dictionary API (`dictionaryapi.dev`).
//!
//! `GET {base}/{lang}/{word}` returns an array of entries; every meaning's
//! definitions are grouped under its `partOfSpeech`.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use wordcard_core::{
  dictionary::Dictionary,
  record::{Definitions, WordDefinition},
};

use crate::{Error, Result, http_client};

pub const BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries";

const PROVIDER: &str = "free dictionary";

#[derive(Debug, Deserialize)]
struct Entry {
  word:     String,
  #[serde(default)]
  phonetic: Option<String>,
  #[serde(default)]
  meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Meaning {
  #[serde(rename = "partOfSpeech")]
  category:    String,
  #[serde(default)]
  definitions: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct Sense {
  definition: String,
}

/// Free Dictionary API client.
#[derive(Clone)]
pub struct FreeDictionary {
  client:   Client,
  base_url: String,
}

impl FreeDictionary {
  pub fn new() -> Result<Self> { Self::with_base_url(BASE_URL) }

  pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
    Ok(Self { client: http_client()?, base_url: base_url.into() })
  }
}

impl Dictionary for FreeDictionary {
  type Error = Error;

  async fn lookup(&self, word: &str, lang: &str) -> Result<WordDefinition> {
    let url = format!(
      "{}/{}/{}",
      self.base_url.trim_end_matches('/'),
      lang,
      word.to_lowercase()
    );
    debug!(%url, "free dictionary lookup");

    let resp = self.client.get(&url).send().await?;
    match resp.status() {
      s if s.is_success() => {}
      StatusCode::NOT_FOUND => {
        return Err(Error::NotFound { provider: PROVIDER, word: word.to_owned() });
      }
      status => {
        return Err(Error::Status { provider: PROVIDER, word: word.to_owned(), status });
      }
    }

    let entries: Vec<Entry> = resp.json().await?;
    parse(word, entries)
  }
}

fn parse(word: &str, entries: Vec<Entry>) -> Result<WordDefinition> {
  let Some(first) = entries.first() else {
    return Err(Error::NotFound { provider: PROVIDER, word: word.to_owned() });
  };

  let mut out = WordDefinition {
    word:        first.word.clone(),
    phonetic:    first.phonetic.clone().unwrap_or_default(),
    definitions: Definitions::new(),
  };

  for meaning in entries.into_iter().flat_map(|e| e.meanings) {
    out
      .definitions
      .entry(meaning.category)
      .or_default()
      .extend(meaning.definitions.into_iter().map(|s| s.definition));
  }

  Ok(out)
}
