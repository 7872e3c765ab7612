//! Handlers for `/word`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/word` | Every stored word text |
//! | `POST`   | `/word` | Body: `{"word":"…","context":["…"]}` |
//! | `DELETE` | `/word?word=<text>` | 404 if not stored |

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
};
use tracing::info;
use wordcard_core::{dictionary::Dictionary, record::Record, store::WordStore};

use crate::{AppState, Envelope, WordParam, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /word`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
) -> Result<Json<Envelope<Vec<String>>>, ApiError>
where
  S: WordStore,
  D: Dictionary,
{
  let words = state
    .store
    .list_words(state.cancel())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Envelope::new("", words)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /word`
///
/// A word seen for the first time is looked up in the dictionary and stored
/// with its definitions. For a word already stored, only the first supplied
/// context is appended.
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  body: Result<Json<Record>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError>
where
  S: WordStore,
  D: Dictionary,
{
  let Json(mut record) = body?;
  record.validate().map_err(ApiError::from_store)?;

  let existing = state
    .store
    .find_word(&record.word, state.cancel())
    .await
    .map_err(ApiError::from_store)?;

  match existing {
    None => {
      let found = state
        .dict
        .lookup(&record.word, &state.lang)
        .await
        .map_err(ApiError::internal)?;
      record.definitions = found.definitions;
      // Mastery is never set by a client on creation.
      record.mastered = false;

      state
        .store
        .insert_record(record, state.cancel())
        .await
        .map_err(ApiError::from_store)?;
    }
    Some(word_id) => {
      let Some(context) = record.contexts.into_iter().next() else {
        return Err(ApiError::BadRequest(format!("no context for {:?}", record.word)));
      };
      state
        .store
        .append_context(word_id, context, state.cancel())
        .await
        .map_err(ApiError::from_store)?;
      info!(word = %record.word, word_id, "context appended");
    }
  }

  Ok(Json(Envelope::message("Record Successfully")))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /word?word=<text>`
pub async fn remove<S, D>(
  State(state): State<AppState<S, D>>,
  Query(param): Query<WordParam>,
) -> Result<Json<Envelope<()>>, ApiError>
where
  S: WordStore,
  D: Dictionary,
{
  let word = param.require()?;
  let word_id = state
    .store
    .find_word(&word, state.cancel())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(word.clone()))?;

  if !state
    .store
    .delete_word(word_id, state.cancel())
    .await
    .map_err(ApiError::from_store)?
  {
    return Err(ApiError::NotFound(word));
  }

  Ok(Json(Envelope::message("Delete Successfully")))
}
