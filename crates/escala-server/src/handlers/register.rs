//! `POST /auth/register`: open account creation.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use escala_core::{
  store::RosterStore,
  user::{DEFAULT_ROLE, NewUser, validate_registration},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::store_error;
use crate::{AppState, auth::hash_password, error::Error};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:    Option<String>,
  pub password: Option<String>,
  pub name:     Option<String>,
}

pub async fn register<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let Json(body) = payload?;
  let email = body.email.unwrap_or_default();
  let password = body.password.unwrap_or_default();
  let name = body.name.unwrap_or_default();
  validate_registration(&email, &password, &name)?;

  let password_hash =
    hash_password(&password).map_err(|e| Error::Store(e.to_string().into()))?;
  let user = state
    .store
    .add_user(NewUser {
      email: email.trim().to_string(),
      name: name.trim().to_string(),
      role: DEFAULT_ROLE.to_string(),
      password_hash,
    })
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::Validation("email is already registered".to_string()))?;

  tracing::info!(user_id = %user.id, "account registered");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "user registered", "user_id": user.id })),
  ))
}
