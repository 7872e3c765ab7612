//! Record — the read/write boundary shape for a vocabulary card.
//!
//! A record is never persisted as one unit. The store splits it into a word
//! row plus dependent context, definition and mastery rows, and assembles it
//! back on read.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Surrogate key of a stored word.
pub type WordId = i64;

/// Definitions grouped by category (usually part of speech).
pub type Definitions = BTreeMap<String, Vec<String>>;

/// A word together with its usage contexts, definitions and mastery flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub word:        String,
  #[serde(rename = "context", default, skip_serializing_if = "Vec::is_empty")]
  pub contexts:    Vec<String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub mastered:    bool,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub definitions: Definitions,
}

impl Record {
  pub fn new(word: impl Into<String>) -> Self {
    Self { word: word.into(), ..Default::default() }
  }

  pub fn with_context(mut self, context: impl Into<String>) -> Self {
    self.contexts.push(context.into());
    self
  }

  pub fn with_definition(
    mut self,
    category: impl Into<String>,
    text: impl Into<String>,
  ) -> Self {
    self.definitions.entry(category.into()).or_default().push(text.into());
    self
  }

  /// Reject records that cannot be stored: the word must carry text and no
  /// context may be blank.
  pub fn validate(&self) -> Result<()> {
    if self.word.trim().is_empty() {
      return Err(Error::EmptyWord);
    }
    if self.contexts.iter().any(|c| c.trim().is_empty()) {
      return Err(Error::EmptyContext(self.word.clone()));
    }
    Ok(())
  }
}

/// The result of a dictionary lookup, consumed verbatim as
/// [`Record::definitions`] when a word is first stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDefinition {
  pub word:        String,
  #[serde(default)]
  pub phonetic:    String,
  #[serde(default)]
  pub definitions: Definitions,
}

impl fmt::Display for WordDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{} {}", self.word, self.phonetic)?;
    writeln!(f)?;
    for (category, texts) in &self.definitions {
      writeln!(f, "{category}")?;
      for (i, text) in texts.iter().enumerate() {
        writeln!(f, "    {i}. {text}")?;
      }
    }
    Ok(())
  }
}

impl From<&Record> for WordDefinition {
  fn from(record: &Record) -> Self {
    Self {
      word:        record.word.clone(),
      phonetic:    String::new(),
      definitions: record.definitions.clone(),
    }
  }
}
