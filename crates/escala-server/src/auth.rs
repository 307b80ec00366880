//! Session gate: HTTP Basic credentials checked against stored accounts, plus
//! password hashing and first-run admin seeding.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use escala_core::{
  store::RosterStore,
  user::{DEFAULT_ROLE, NewUser, User},
};
use rand_core::OsRng;

use crate::{AppState, ServerConfig, error::Error};

/// Proof that the request carried valid credentials, holding the account.
pub struct Authenticated(pub User);

/// Split an `Authorization: Basic …` header into `(email, password)`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Check `password` against an argon2 PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Produce an argon2 PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// Resolve the caller's account from request headers.
pub async fn verify_auth<S>(headers: &HeaderMap, store: &S) -> Result<User, Error>
where
  S: RosterStore,
{
  let (email, password) = basic_credentials(headers)?;

  let user = store
    .find_user_by_email(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  if !verify_password(&password, &user.password_hash) {
    tracing::debug!(%email, "rejected credentials");
    return Err(Error::Unauthorized);
  }
  Ok(user)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = verify_auth(&parts.headers, state.store.as_ref()).await?;
    Ok(Authenticated(user))
  }
}

/// Create the configured admin account if the store has no users yet.
///
/// Returns `true` if an account was created.
pub async fn seed_admin<S>(store: &S, config: &ServerConfig) -> Result<bool, S::Error>
where
  S: RosterStore,
{
  if store.count_users().await? > 0 {
    return Ok(false);
  }

  let (Some(email), Some(hash)) = (&config.admin_email, &config.admin_password_hash) else {
    tracing::warn!("no users exist and no admin is configured; register one via POST /auth/register");
    return Ok(false);
  };

  let created = store
    .add_user(NewUser {
      email:         email.clone(),
      name:          config
        .admin_name
        .clone()
        .unwrap_or_else(|| "Administrator".to_string()),
      role:          DEFAULT_ROLE.to_string(),
      password_hash: hash.clone(),
    })
    .await?;
  if created.is_some() {
    tracing::info!(%email, "seeded initial admin account");
  }
  Ok(created.is_some())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{path::PathBuf, sync::Arc};

  use axum::http::{Request, header};
  use escala_store_sqlite::SqliteStore;

  fn config(admin_hash: Option<String>) -> ServerConfig {
    ServerConfig {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      store_path:          PathBuf::from(":memory:"),
      admin_email:         Some("admin@example.org".to_string()),
      admin_name:          None,
      admin_password_hash: admin_hash,
    }
  }

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cfg = config(Some(hash_password(password).unwrap()));
    seed_admin(&store, &cfg).await.unwrap();
    AppState { store: Arc::new(store) }
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<Authenticated, Error> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("admin@example.org", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    let Authenticated(user) = extract(req, &state).await.unwrap();
    assert_eq!(user.email, "admin@example.org");
    assert_eq!(user.role, "admin");
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("admin@example.org", "wrong"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("someone@example.org", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret").await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn seeding_runs_only_on_empty_store() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let cfg = config(Some(hash_password("secret").unwrap()));
    assert!(seed_admin(&store, &cfg).await.unwrap());
    assert!(!seed_admin(&store, &cfg).await.unwrap());
    assert_eq!(store.count_users().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn seeding_skipped_without_hash() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    assert!(!seed_admin(&store, &config(None)).await.unwrap());
    assert_eq!(store.count_users().await.unwrap(), 0);
  }

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("hunter22").unwrap();
    assert!(verify_password("hunter22", &phc));
    assert!(!verify_password("hunter23", &phc));
    assert!(!verify_password("hunter22", "not a phc string"));
  }
}
