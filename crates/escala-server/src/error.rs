//! Error types and axum `IntoResponse` implementation.
//!
//! Every error renders as `{"error": "<message>"}`. Store failures are logged
//! in full and reach the caller only as a generic message.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("not found: {0}")]
  NotFound(String),
  #[error("{0}")]
  Validation(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<escala_core::Error> for Error {
  fn from(e: escala_core::Error) -> Self {
    match e {
      escala_core::Error::Validation(msg) => Error::Validation(msg),
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self { Error::Validation(rejection.body_text()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"escala\""),
        );
        return res;
      }
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m),
      Error::Validation(m) => (StatusCode::BAD_REQUEST, m),
      Error::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
