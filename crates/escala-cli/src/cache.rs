//! Client-side copy of the person registry and assignment list.
//!
//! Mutations go to the server first and, once it accepts them, are patched
//! into the local lists instead of re-fetching everything. The local lists
//! keep the server's ordering: people by name, assignments by date.

use anyhow::{Result, anyhow, bail};
use escala_core::{
  assignment::Assignment,
  person::{Instrument, Person, PersonKind},
  roster::{MonthKey, MonthlyRoster, group_by_month},
};
use uuid::Uuid;

use crate::client::{ApiClient, AssignmentRequest, PersonRequest};

// ─── Slot eligibility ────────────────────────────────────────────────────────

/// A role within an assignment, used to decide who may be picked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
  Minister,
  BackingVocal,
  Instrument(Instrument),
}

impl Slot {
  pub fn accepts(self, person: &Person) -> bool {
    match self {
      Slot::Minister => person.kind == PersonKind::Minister,
      Slot::BackingVocal => person.kind == PersonKind::BackingVocalist,
      Slot::Instrument(instrument) => person.plays(instrument),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Slot::Minister => "minister",
      Slot::BackingVocal => "backing vocalist",
      Slot::Instrument(i) => i.label(),
    }
  }
}

// ─── Cache ────────────────────────────────────────────────────────────────────

pub struct RosterCache {
  client:      ApiClient,
  people:      Vec<Person>,
  assignments: Vec<Assignment>,
}

impl RosterCache {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      people: Vec::new(),
      assignments: Vec::new(),
    }
  }

  pub fn client(&self) -> &ApiClient { &self.client }

  pub fn people(&self) -> &[Person] { &self.people }

  pub fn assignments(&self) -> &[Assignment] { &self.assignments }

  /// Group the cached assignments for `month`.
  pub fn roster(&self, month: MonthKey) -> MonthlyRoster {
    group_by_month(&self.assignments, month)
  }

  /// Fetch both lists in parallel. The cache is only replaced if both
  /// requests succeed.
  pub async fn reload(&mut self) -> Result<()> {
    let (people, assignments) = tokio::try_join!(
      self.client.list_people(),
      self.client.list_assignments()
    )?;
    tracing::debug!(
      people = people.len(),
      assignments = assignments.len(),
      "cache reloaded"
    );
    self.people = people;
    self.assignments = assignments;
    Ok(())
  }

  // ── People ────────────────────────────────────────────────────────────────

  pub async fn add_person(&mut self, body: &PersonRequest) -> Result<Person> {
    let person = self.client.add_person(body).await?;
    self.people.push(person.clone());
    self.people.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(person)
  }

  /// Delete a person. Cached assignments drop their references to them, as
  /// the server would on the next read.
  pub async fn delete_person(&mut self, id: Uuid) -> Result<()> {
    self.client.delete_person(id).await?;
    self.people.retain(|p| p.id != id);
    for a in &mut self.assignments {
      if a.minister.as_ref().is_some_and(|r| r.id == id) {
        a.minister = None;
      }
      a.backing_vocalists.retain(|r| r.id != id);
      let held: Vec<Instrument> = a
        .instrument_slots
        .iter()
        .filter(|(_, r)| r.is_some_and(|r| r.id == id))
        .map(|(i, _)| i)
        .collect();
      for instrument in held {
        a.instrument_slots.set(instrument, None);
      }
    }
    Ok(())
  }

  /// Find a cached person by id or by display name (case-insensitive).
  ///
  /// With a `slot`, only people eligible for it are considered.
  pub fn find_person(&self, query: &str, slot: Option<Slot>) -> Result<&Person> {
    let query = query.trim();
    let eligible = |p: &&Person| slot.is_none_or(|s| s.accepts(p));

    if let Ok(id) = Uuid::parse_str(query) {
      let person = self
        .people
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| anyhow!("no person with id {id}"))?;
      if !eligible(&person) {
        bail!("{} cannot fill the {} slot", person.name, slot_label(slot));
      }
      return Ok(person);
    }

    let wanted = query.to_lowercase();
    let matches: Vec<&Person> = self
      .people
      .iter()
      .filter(|p| p.name.to_lowercase() == wanted)
      .filter(eligible)
      .collect();

    match matches.as_slice() {
      [one] => Ok(*one),
      [] => Err(anyhow!("no {} named {query:?}", slot_label(slot))),
      _ => Err(anyhow!(
        "{} people named {query:?}; use an id instead",
        matches.len()
      )),
    }
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  pub async fn add_assignment(&mut self, body: &AssignmentRequest) -> Result<Assignment> {
    let stored = self.client.add_assignment(body).await?;
    self.assignments.push(stored.clone());
    self.sort_assignments();
    Ok(stored)
  }

  pub async fn update_assignment(&mut self, body: &AssignmentRequest) -> Result<Assignment> {
    let stored = self.client.update_assignment(body).await?;
    match self.assignments.iter_mut().find(|a| a.id == stored.id) {
      Some(slot) => *slot = stored.clone(),
      None => self.assignments.push(stored.clone()),
    }
    self.sort_assignments();
    Ok(stored)
  }

  /// Date first, then creation order, matching the server's `date, rowid`.
  fn sort_assignments(&mut self) { self.assignments.sort_by_key(|a| (a.date, a.created_at)); }

  pub async fn delete_assignment(&mut self, id: Uuid) -> Result<()> {
    self.client.delete_assignment(id).await?;
    self.assignments.retain(|a| a.id != id);
    Ok(())
  }
}

fn slot_label(slot: Option<Slot>) -> &'static str { slot.map_or("person", Slot::label) }
