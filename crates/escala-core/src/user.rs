//! Accounts allowed past the session gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Role given to every account created through registration or seeding.
pub const DEFAULT_ROLE: &str = "admin";

/// A stored account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            Uuid,
  pub email:         String,
  pub name:          String,
  pub role:          String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RosterStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          String,
  pub role:          String,
  pub password_hash: String,
}

/// Check raw registration fields before anything is hashed or stored.
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<()> {
  if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
    return Err(Error::validation("email, password and name are required"));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn registration_rules() {
    assert!(validate_registration("a@b.c", "secret", "Admin").is_ok());
    assert!(validate_registration("a@b.c", "short", "Admin").is_err());
    assert!(validate_registration("", "secret", "Admin").is_err());
    assert!(validate_registration("a@b.c", "secret", "  ").is_err());
  }
}
