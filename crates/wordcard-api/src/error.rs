//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the service as a `{"msg": ..., "data": null}`
//! envelope with a fixed message; backend detail is only logged.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use wordcard_core::{Classify, ErrorClass};

use crate::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error by its [`ErrorClass`].
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match err.class() {
      ErrorClass::NotFound => ApiError::NotFound(err.to_string()),
      ErrorClass::Invalid => ApiError::BadRequest(err.to_string()),
      ErrorClass::Cancelled | ErrorClass::Internal => ApiError::Internal(Box::new(err)),
    }
  }

  pub fn internal<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Internal(Box::new(err))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, msg) = match &self {
      ApiError::NotFound(detail) => {
        tracing::debug!(%detail, "not found");
        (StatusCode::NOT_FOUND, "No such word")
      }
      ApiError::BadRequest(detail) => {
        tracing::debug!(%detail, "rejected request");
        (StatusCode::BAD_REQUEST, "Invalid Parameters")
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
      }
    };
    (status, Json(Envelope::<()>::message(msg))).into_response()
  }
}
