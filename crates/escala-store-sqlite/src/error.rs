//! Error type for `escala-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row could not be read back right after it was written.
  #[error("assignment {0} missing after write")]
  MissingAfterWrite(uuid::Uuid),

  /// A stored tag column held a value outside its enumeration.
  #[error("unknown {column} value: {value:?}")]
  UnknownTag {
    column: &'static str,
    value:  String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
