//! `/people`: the person registry.

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use escala_core::{
  person::{Instrument, NewPerson, Person, PersonKind},
  store::RosterStore,
};
use serde::Deserialize;
use serde_json::Value;

use super::{IdQuery, store_error, success};
use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct PersonBody {
  pub nome:         Option<String>,
  pub tipo:         Option<PersonKind>,
  pub instrumentos: Option<Vec<Instrument>>,
}

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Person>>, Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let people = state.store.list_people().await.map_err(store_error)?;
  Ok(Json(people))
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  payload: Result<Json<PersonBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let Json(body) = payload?;

  let (Some(name), Some(kind)) = (body.nome.as_deref(), body.tipo) else {
    return Err(Error::Validation("nome and tipo are required".to_string()));
  };
  let input = NewPerson::new(name, kind, body.instrumentos.unwrap_or_default())?;

  let person = state.store.add_person(input).await.map_err(store_error)?;
  tracing::info!(id = %person.id, kind = %person.kind, "person added");
  Ok((StatusCode::CREATED, Json(person)))
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Query(query): Query<IdQuery>,
) -> Result<Json<Value>, Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let id = query.require()?;
  state.store.delete_person(id).await.map_err(store_error)?;
  tracing::info!(%id, "person deleted");
  Ok(success())
}
