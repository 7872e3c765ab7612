//! Handler for `PUT /master?word=<text>` — mark a word as mastered.

use axum::{
  Json,
  extract::{Query, State},
};
use wordcard_core::{dictionary::Dictionary, store::WordStore};

use crate::{AppState, Envelope, WordParam, error::ApiError};

pub async fn handler<S, D>(
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
    .ok_or_else(|| ApiError::NotFound(word))?;

  state
    .store
    .master_word(word_id, true, state.cancel())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Envelope::message("")))
}
