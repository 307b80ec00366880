//! `/assignments`: dated service records.
//!
//! Create and update share one body shape. The period rule is applied before
//! the store is touched, so a Sunday without `periodo` never reaches it.

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use escala_core::{
  assignment::{Assignment, InstrumentSlots, NewAssignment, Period, parse_date},
  store::RosterStore,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{IdQuery, store_error, success};
use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Default, Deserialize)]
pub struct AssignmentBody {
  /// Only read by `PATCH`.
  pub id:                Option<Uuid>,
  pub data:              Option<String>,
  pub periodo:           Option<Period>,
  pub minister:          Option<Uuid>,
  pub backing_vocalists: Option<Vec<Uuid>>,
  pub instrument_slots:  Option<InstrumentSlots<Uuid>>,
}

impl AssignmentBody {
  fn into_new_assignment(self) -> Result<NewAssignment, Error> {
    let raw_date = self
      .data
      .filter(|d| !d.trim().is_empty())
      .ok_or_else(|| Error::Validation("data is required".to_string()))?;
    let date = parse_date(&raw_date)?;

    Ok(NewAssignment::new(
      date,
      self.periodo,
      self.minister,
      self.backing_vocalists.unwrap_or_default(),
      self.instrument_slots.unwrap_or_default(),
    )?)
  }
}

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Assignment>>, Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let assignments = state.store.list_assignments().await.map_err(store_error)?;
  Ok(Json(assignments))
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  payload: Result<Json<AssignmentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Assignment>), Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let Json(body) = payload?;
  let input = body.into_new_assignment()?;

  let stored = state.store.add_assignment(input).await.map_err(store_error)?;
  tracing::info!(id = %stored.id, date = %stored.date, "assignment added");
  Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  payload: Result<Json<AssignmentBody>, JsonRejection>,
) -> Result<Json<Assignment>, Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let Json(mut body) = payload?;
  let id = body
    .id
    .take()
    .ok_or_else(|| Error::Validation("id and data are required".to_string()))?;
  if body.data.is_none() {
    return Err(Error::Validation("id and data are required".to_string()));
  }
  let input = body.into_new_assignment()?;

  let updated = state
    .store
    .update_assignment(id, input)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("assignment {id}")))?;
  tracing::info!(%id, "assignment updated");
  Ok(Json(updated))
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
  state.store.delete_assignment(id).await.map_err(store_error)?;
  tracing::info!(%id, "assignment deleted");
  Ok(success())
}
