//! Error types for `escala-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A required field was missing or malformed. The message is safe to show
  /// to the caller.
  #[error("{0}")]
  Validation(String),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
