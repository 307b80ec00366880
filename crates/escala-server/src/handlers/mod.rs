pub mod assignments;
pub mod people;
pub mod register;
pub mod roster;

use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::Error;

/// `?id=<uuid>` query string shared by the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
  pub id: Option<String>,
}

impl IdQuery {
  pub(super) fn require(&self) -> Result<Uuid, Error> {
    let raw = self
      .id
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or_else(|| Error::Validation("id is required".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| Error::Validation(format!("invalid id {raw:?}")))
  }
}

pub(super) fn success() -> Json<Value> { Json(json!({ "success": true })) }

pub(super) fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
