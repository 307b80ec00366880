//! `GET /roster?month=YYYY-MM`

use axum::{
  Json,
  extract::{Query, State},
};
use escala_core::{
  roster::{MonthKey, MonthlyRoster, group_by_month},
  store::RosterStore,
};
use serde::Deserialize;

use super::store_error;
use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
  pub month: Option<String>,
}

pub async fn month<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Query(query): Query<RosterQuery>,
) -> Result<Json<MonthlyRoster>, Error>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let month = match query.month.as_deref() {
    Some(raw) => raw.parse::<MonthKey>()?,
    None => MonthKey::current(),
  };

  let all = state.store.list_assignments().await.map_err(store_error)?;
  Ok(Json(group_by_month(&all, month)))
}
