//! Handler for `GET /define?word=<text>` — the assembled record of one word.

use axum::{
  Json,
  extract::{Query, State},
};
use wordcard_core::{dictionary::Dictionary, record::Record, store::WordStore};

use crate::{AppState, Envelope, WordParam, error::ApiError};

pub async fn handler<S, D>(
  State(state): State<AppState<S, D>>,
  Query(param): Query<WordParam>,
) -> Result<Json<Envelope<Record>>, ApiError>
where
  S: WordStore,
  D: Dictionary,
{
  let word = param.require()?;
  let record = state
    .store
    .assemble_record(&word, state.cancel())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Envelope::new("", record)))
}
