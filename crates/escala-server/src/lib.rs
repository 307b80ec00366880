//! JSON API for the Escala roster.
//!
//! Exposes an axum [`Router`] over any [`RosterStore`]. Everything except
//! registration and the liveness probe sits behind the Basic-auth session gate.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use escala_core::store::RosterStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{assignments, people, register, roster};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ESCALA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Admin account created on first start when the store has no users.
  #[serde(default)]
  pub admin_email:         Option<String>,
  #[serde(default)]
  pub admin_name:          Option<String>,
  #[serde(default)]
  pub admin_password_hash: Option<String>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RosterStore> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/health",        get(health))
    .route("/auth/register", post(register::register::<S>))
    .route(
      "/people",
      get(people::list::<S>)
        .post(people::create::<S>)
        .delete(people::delete::<S>),
    )
    .route(
      "/assignments",
      get(assignments::list::<S>)
        .post(assignments::create::<S>)
        .patch(assignments::update::<S>)
        .delete(assignments::delete::<S>),
    )
    .route("/roster",        get(roster::month::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
