//! Parameterised clause fragments built from ordered equality pairs.
//!
//! Callers pass [`Conditions`], an explicitly ordered list of
//! `(column, value)` pairs, so the generated SQL text is identical for
//! identical input. Values are always bound as `?` arguments; column names are
//! checked to be plain identifiers before they reach the query text.

use crate::{entity::Value, error::MappingError};

/// An ordered list of `column = value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions(Vec<(&'static str, Value)>);

impl Conditions {
  /// No conditions. As a `WHERE` this matches every row.
  pub fn new() -> Self { Self::default() }

  /// Append `column = value`.
  pub fn and(mut self, column: &'static str, value: impl Into<Value>) -> Self {
    self.0.push((column, value.into()));
    self
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Value)> { self.0.iter() }
}

impl FromIterator<(&'static str, Value)> for Conditions {
  fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Which clause a set of pairs renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
  /// ` WHERE a = ? AND b = ?`
  Where,
  /// ` SET a = ?, b = ?`
  Set,
}

impl Keyword {
  fn prefix(self) -> &'static str {
    match self {
      Keyword::Where => " WHERE ",
      Keyword::Set => " SET ",
    }
  }

  fn separator(self) -> &'static str {
    match self {
      Keyword::Where => " AND ",
      Keyword::Set => ", ",
    }
  }
}

/// A rendered fragment and the arguments bound to its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
  pub sql:  String,
  pub args: Vec<Value>,
}

/// Render `pairs` as a `keyword` fragment. Empty input renders as an empty
/// fragment with no arguments, not as a vacuous clause.
pub fn build(keyword: Keyword, pairs: &Conditions) -> Result<Clause, MappingError> {
  if pairs.is_empty() {
    return Ok(Clause::default());
  }

  let mut terms = Vec::with_capacity(pairs.len());
  let mut args = Vec::with_capacity(pairs.len());
  for (column, value) in pairs.iter() {
    check_ident(column)?;
    terms.push(format!("{column} = ?"));
    args.push(value.clone());
  }

  Ok(Clause {
    sql: format!("{}{}", keyword.prefix(), terms.join(keyword.separator())),
    args,
  })
}

/// `?, ?, ?` with `n` placeholders.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`.
pub fn check_ident(name: &str) -> Result<(), MappingError> {
  let mut chars = name.chars();
  let valid = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
  if valid {
    Ok(())
  } else {
    Err(MappingError::InvalidIdentifier(name.to_owned()))
  }
}
