//! The `RosterStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `escala-store-sqlite`).
//! Higher layers (`escala-server`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assignment::{Assignment, NewAssignment},
  person::{NewPerson, Person},
  user::{NewUser, User},
};

/// Abstraction over an Escala store backend.
///
/// Inputs arrive already validated. Deleting an id that does not exist is not
/// an error, and references to deleted people resolve to empty slots on read.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Person registry ───────────────────────────────────────────────────

  /// All people ordered by name, ties in insertion order.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Remove a person. Assignments that reference them are left untouched.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// All assignments ordered by date, with references resolved.
  fn list_assignments(
    &self,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// A single resolved assignment. Returns `None` if not found.
  fn get_assignment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + '_;

  fn add_assignment(
    &self,
    input: NewAssignment,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  /// Replace every mutable field of an assignment. Returns `None` if `id` does
  /// not exist.
  fn update_assignment(
    &self,
    id: Uuid,
    input: NewAssignment,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + '_;

  fn delete_assignment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  fn count_users(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Insert an account. Returns `None`, writing nothing, when the email is
  /// already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
