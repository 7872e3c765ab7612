//! JSON REST API for wordcard.
//!
//! Exposes an axum [`Router`] backed by any [`WordStore`] and [`Dictionary`].
//! Static assets, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/v1", wordcard_api::api_router(state))
//! ```

pub mod define;
pub mod error;
pub mod master;
pub mod words;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, put},
};
use serde::{Deserialize, Serialize};
use wordcard_core::{Cancel, dictionary::Dictionary, store::WordStore};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, D> {
  pub store:           Arc<S>,
  pub dict:            Arc<D>,
  /// Language passed to the dictionary on lookup.
  pub lang:            String,
  /// Upper bound on the store work done for a single request.
  pub request_timeout: Duration,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:           self.store.clone(),
      dict:            self.dict.clone(),
      lang:            self.lang.clone(),
      request_timeout: self.request_timeout,
    }
  }
}

impl<S, D> AppState<S, D> {
  pub fn new(store: Arc<S>, dict: Arc<D>) -> Self {
    Self {
      store,
      dict,
      lang: "en".to_string(),
      request_timeout: Duration::from_secs(10),
    }
  }

  /// A fresh cancellation signal bounded by the request timeout.
  pub fn cancel(&self) -> Cancel { Cancel::never().with_timeout(self.request_timeout) }
}

// ─── Envelope ─────────────────────────────────────────────────────────────────

/// The `{"msg": ..., "data": ...}` body every endpoint answers with.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub msg:  String,
  pub data: Option<T>,
}

impl<T> Envelope<T> {
  pub fn new(msg: impl Into<String>, data: T) -> Self {
    Self { msg: msg.into(), data: Some(data) }
  }

  pub fn message(msg: impl Into<String>) -> Self { Self { msg: msg.into(), data: None } }
}

/// `?word=<text>` — shared by every endpoint addressing a single word.
#[derive(Debug, Deserialize)]
pub struct WordParam {
  pub word: Option<String>,
}

impl WordParam {
  /// The non-empty word, or a 400.
  pub fn require(self) -> Result<String, ApiError> {
    match self.word {
      Some(w) if !w.trim().is_empty() => Ok(w),
      _ => Err(ApiError::BadRequest("missing `word` parameter".to_string())),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(state: AppState<S, D>) -> Router<()>
where
  S: WordStore + 'static,
  D: Dictionary + 'static,
{
  Router::new()
    .route(
      "/word",
      get(words::list::<S, D>)
        .post(words::create::<S, D>)
        .delete(words::remove::<S, D>),
    )
    .route("/define", get(define::handler::<S, D>))
    .route("/master", put(master::handler::<S, D>))
    .with_state(state)
}
