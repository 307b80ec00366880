//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use escala_core::{
  assignment::{InstrumentSlots, NewAssignment, Period, parse_date},
  person::{Instrument, NewPerson, PersonKind},
  roster::{MonthKey, group_by_month},
  store::RosterStore,
  user::NewUser,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(name: &str, kind: PersonKind) -> NewPerson {
  NewPerson::new(name, kind, []).unwrap()
}

fn service(date: &str, period: Option<Period>) -> NewAssignment {
  NewAssignment::new(
    parse_date(date).unwrap(),
    period,
    None,
    [],
    InstrumentSlots::default(),
  )
  .unwrap()
}

// ─── Person registry ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_people_sorted_by_name_then_insertion() {
  let s = store().await;
  let first_joao = s.add_person(person("João", PersonKind::Minister)).await.unwrap();
  s.add_person(person("Ana", PersonKind::BackingVocalist)).await.unwrap();
  let second_joao = s
    .add_person(person("João", PersonKind::BackingVocalist))
    .await
    .unwrap();

  let people = s.list_people().await.unwrap();
  let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Ana", "João", "João"]);
  assert_eq!(people[1].id, first_joao.id);
  assert_eq!(people[2].id, second_joao.id);
}

#[tokio::test]
async fn instrument_set_round_trips() {
  let s = store().await;
  let input = NewPerson::new(
    "Bruno",
    PersonKind::Instrumentalist,
    [Instrument::Guitar, Instrument::Drums],
  )
  .unwrap();
  s.add_person(input).await.unwrap();

  let people = s.list_people().await.unwrap();
  let got: HashSet<Instrument> = people[0].instruments.iter().copied().collect();
  let want: HashSet<Instrument> = [Instrument::Drums, Instrument::Guitar].into();
  assert_eq!(got, want);
  assert_eq!(people[0].kind, PersonKind::Instrumentalist);
}

#[tokio::test]
async fn delete_missing_person_is_a_no_op() {
  let s = store().await;
  s.add_person(person("Ana", PersonKind::Minister)).await.unwrap();

  s.delete_person(Uuid::new_v4()).await.unwrap();

  assert_eq!(s.list_people().await.unwrap().len(), 1);
}

// ─── Assignments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_assignment_resolves_names() {
  let s = store().await;
  let minister = s.add_person(person("Carla", PersonKind::Minister)).await.unwrap();
  let vocal = s
    .add_person(person("Davi", PersonKind::BackingVocalist))
    .await
    .unwrap();
  let drummer = s
    .add_person(
      NewPerson::new("Eli", PersonKind::Instrumentalist, [Instrument::Drums]).unwrap(),
    )
    .await
    .unwrap();

  let mut slots = InstrumentSlots::default();
  slots.set(Instrument::Drums, Some(drummer.id));
  let input = NewAssignment::new(
    parse_date("2025-03-09").unwrap(),
    Some(Period::Morning),
    Some(minister.id),
    [vocal.id],
    slots,
  )
  .unwrap();

  let stored = s.add_assignment(input).await.unwrap();
  assert_eq!(stored.period, Some(Period::Morning));
  assert_eq!(stored.minister.as_ref().map(|r| r.name.as_str()), Some("Carla"));
  assert_eq!(stored.backing_vocalists.len(), 1);
  assert_eq!(stored.backing_vocalists[0].name, "Davi");
  assert_eq!(
    stored.instrument_slots.drums.as_ref().map(|r| r.id),
    Some(drummer.id)
  );
  assert!(stored.instrument_slots.guitar.is_none());

  let listed = s.list_assignments().await.unwrap();
  assert_eq!(listed, vec![stored]);
}

#[tokio::test]
async fn weekday_service_stored_as_evening() {
  let s = store().await;
  let stored = s
    .add_assignment(service("2025-03-11", Some(Period::Morning)))
    .await
    .unwrap();
  assert_eq!(stored.period, Some(Period::Evening));
}

#[tokio::test]
async fn deleted_person_resolves_to_empty_slot() {
  let s = store().await;
  let minister = s.add_person(person("Carla", PersonKind::Minister)).await.unwrap();
  let vocal = s
    .add_person(person("Davi", PersonKind::BackingVocalist))
    .await
    .unwrap();
  let keep = s
    .add_person(person("Fabi", PersonKind::BackingVocalist))
    .await
    .unwrap();

  let input = NewAssignment::new(
    parse_date("2025-03-11").unwrap(),
    None,
    Some(minister.id),
    [vocal.id, keep.id],
    InstrumentSlots::default(),
  )
  .unwrap();
  s.add_assignment(input).await.unwrap();

  s.delete_person(minister.id).await.unwrap();
  s.delete_person(vocal.id).await.unwrap();

  let listed = s.list_assignments().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert!(listed[0].minister.is_none());
  let vocals: Vec<&str> = listed[0]
    .backing_vocalists
    .iter()
    .map(|r| r.name.as_str())
    .collect();
  assert_eq!(vocals, ["Fabi"]);
}

#[tokio::test]
async fn update_replaces_all_fields() {
  let s = store().await;
  let minister = s.add_person(person("Carla", PersonKind::Minister)).await.unwrap();
  let original = s
    .add_assignment(
      NewAssignment::new(
        parse_date("2025-03-09").unwrap(),
        Some(Period::Morning),
        Some(minister.id),
        [],
        InstrumentSlots::default(),
      )
      .unwrap(),
    )
    .await
    .unwrap();

  let updated = s
    .update_assignment(original.id, service("2025-03-16", Some(Period::Evening)))
    .await
    .unwrap()
    .expect("row exists");

  assert_eq!(updated.id, original.id);
  assert_eq!(updated.date.to_string(), "2025-03-16");
  assert_eq!(updated.period, Some(Period::Evening));
  assert!(updated.minister.is_none());
  assert_eq!(updated.created_at, original.created_at);
}

#[tokio::test]
async fn update_missing_assignment_returns_none() {
  let s = store().await;
  let result = s
    .update_assignment(Uuid::new_v4(), service("2025-03-11", None))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_assignment_and_missing_id() {
  let s = store().await;
  let a = s.add_assignment(service("2025-03-11", None)).await.unwrap();

  s.delete_assignment(Uuid::new_v4()).await.unwrap();
  assert_eq!(s.list_assignments().await.unwrap().len(), 1);

  s.delete_assignment(a.id).await.unwrap();
  assert!(s.list_assignments().await.unwrap().is_empty());
  assert!(s.get_assignment(a.id).await.unwrap().is_none());
}

#[tokio::test]
async fn legacy_row_without_period_groups_as_sunday_morning() {
  let s = store().await;
  s.insert_raw_assignment(Uuid::new_v4(), "2025-03-02", None)
    .await
    .unwrap();
  s.add_assignment(service("2025-03-02", Some(Period::Evening)))
    .await
    .unwrap();

  let listed = s.list_assignments().await.unwrap();
  assert!(listed.iter().any(|a| a.period.is_none()));

  let month: MonthKey = "2025-03".parse().unwrap();
  let roster = group_by_month(&listed, month);
  assert_eq!(roster.counts.sunday_morning, 1);
  assert_eq!(roster.counts.sunday_evening, 1);
}

#[tokio::test]
async fn list_assignments_ordered_by_date() {
  let s = store().await;
  s.add_assignment(service("2025-03-25", None)).await.unwrap();
  s.add_assignment(service("2025-03-04", None)).await.unwrap();
  s.add_assignment(service("2025-03-18", None)).await.unwrap();

  let dates: Vec<String> = s
    .list_assignments()
    .await
    .unwrap()
    .iter()
    .map(|a| a.date.to_string())
    .collect();
  assert_eq!(dates, ["2025-03-04", "2025-03-18", "2025-03-25"]);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_user() {
  let s = store().await;
  assert_eq!(s.count_users().await.unwrap(), 0);

  s.add_user(NewUser {
    email:         "admin@example.org".into(),
    name:          "Admin".into(),
    role:          "admin".into(),
    password_hash: "$argon2id$placeholder".into(),
  })
  .await
  .unwrap();

  assert_eq!(s.count_users().await.unwrap(), 1);
  let found = s
    .find_user_by_email("admin@example.org")
    .await
    .unwrap()
    .expect("user exists");
  assert_eq!(found.name, "Admin");
  assert!(s.find_user_by_email("nobody@example.org").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  let user = || NewUser {
    email:         "admin@example.org".into(),
    name:          "Admin".into(),
    role:          "admin".into(),
    password_hash: "$argon2id$placeholder".into(),
  };
  assert!(s.add_user(user()).await.unwrap().is_some());
  assert!(s.add_user(user()).await.unwrap().is_none());
  assert_eq!(s.count_users().await.unwrap(), 1);
}
