//! Client for the Oxford Dictionaries API.
//!
//! Requests carry `app_id` / `app_key` headers. Definitions are grouped by the
//! lexical category of each lexical entry. The API returns no phonetic in
//! `fields=definitions` mode, so [`WordDefinition::phonetic`] stays empty.

use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::debug;
use wordcard_core::{
  dictionary::Dictionary,
  record::{Definitions, WordDefinition},
};

use crate::{Error, Result, http_client};

pub const BASE_URL: &str = "https://od-api.oxforddictionaries.com/api/v2/entries";

const PROVIDER: &str = "oxford";

#[derive(Debug, Deserialize)]
struct Response {
  word:    String,
  #[serde(default)]
  results: Vec<Headword>,
}

#[derive(Debug, Deserialize)]
struct Headword {
  #[serde(rename = "lexicalEntries", default)]
  lexical_entries: Vec<LexicalEntry>,
}

#[derive(Debug, Deserialize)]
struct LexicalEntry {
  #[serde(rename = "lexicalCategory")]
  category: Category,
  #[serde(default)]
  entries:  Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Category {
  text: String,
}

#[derive(Debug, Deserialize)]
struct Entry {
  #[serde(default)]
  senses: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct Sense {
  #[serde(default)]
  definitions: Vec<String>,
}

/// Oxford Dictionaries API client.
#[derive(Clone)]
pub struct OxfordDictionary {
  client:   Client,
  base_url: String,
  app_id:   String,
  app_key:  String,
}

impl OxfordDictionary {
  pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Result<Self> {
    Self::with_base_url(BASE_URL, app_id, app_key)
  }

  pub fn with_base_url(
    base_url: impl Into<String>,
    app_id: impl Into<String>,
    app_key: impl Into<String>,
  ) -> Result<Self> {
    Ok(Self {
      client:   http_client()?,
      base_url: base_url.into(),
      app_id:   app_id.into(),
      app_key:  app_key.into(),
    })
  }
}

impl Dictionary for OxfordDictionary {
  type Error = Error;

  async fn lookup(&self, word: &str, lang: &str) -> Result<WordDefinition> {
    let url = format!(
      "{}/{}/{}",
      self.base_url.trim_end_matches('/'),
      lang,
      word.to_lowercase()
    );
    debug!(%url, "oxford lookup");

    let resp = self
      .client
      .get(&url)
      .query(&[("fields", "definitions")])
      .header(header::ACCEPT, "application/json")
      .header("app_id", &self.app_id)
      .header("app_key", &self.app_key)
      .send()
      .await?;

    match resp.status() {
      s if s.is_success() => {}
      StatusCode::NOT_FOUND => {
        return Err(Error::NotFound { provider: PROVIDER, word: word.to_owned() });
      }
      status => {
        return Err(Error::Status { provider: PROVIDER, word: word.to_owned(), status });
      }
    }

    let body: Response = resp.json().await?;
    Ok(parse(body))
  }
}

fn parse(body: Response) -> WordDefinition {
  let mut definitions = Definitions::new();
  for lexical in body.results.into_iter().flat_map(|r| r.lexical_entries) {
    let texts = definitions.entry(lexical.category.text).or_default();
    for sense in lexical.entries.into_iter().flat_map(|e| e.senses) {
      texts.extend(sense.definitions);
    }
  }

  WordDefinition { word: body.word, phonetic: String::new(), definitions }
}
