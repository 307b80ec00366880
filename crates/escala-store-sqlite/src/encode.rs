//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and service dates as
//! `YYYY-MM-DD`. Tag sets and id lists are stored as compact JSON. UUIDs are
//! stored as hyphenated lowercase strings.

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use escala_core::{
  assignment::{Assignment, DATE_FORMAT, InstrumentSlots, Period, PersonRef},
  person::{Instrument, Person, PersonKind},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_ids(ids: &[Uuid]) -> Result<String> {
  let strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();
  Ok(serde_json::to_string(&strs)?)
}

fn decode_ids(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

fn decode_tag<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownTag {
    column,
    value: s.to_owned(),
  })
}

pub fn encode_instruments(instruments: &[Instrument]) -> Result<String> {
  Ok(serde_json::to_string(instruments)?)
}

fn decode_instruments(s: &str) -> Result<Vec<Instrument>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub id:          String,
  pub name:        String,
  pub kind:        String,
  pub instruments: String,
  pub created_at:  String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      kind:        decode_tag::<PersonKind>("kind", &self.kind)?,
      instruments: decode_instruments(&self.instruments)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// A person id column joined with the name of the person it points at. The
/// name is `None` when the person no longer exists.
pub struct RawRef {
  pub id:   Option<String>,
  pub name: Option<String>,
}

impl RawRef {
  fn resolve(self) -> Result<Option<PersonRef>> {
    match (self.id, self.name) {
      (Some(id), Some(name)) => Ok(Some(PersonRef {
        id: decode_uuid(&id)?,
        name,
      })),
      (Some(id), None) => {
        tracing::debug!(person_id = %id, "dangling person reference resolved to empty slot");
        Ok(None)
      }
      (None, _) => Ok(None),
    }
  }
}

/// Raw strings read from an `assignments` row joined with `people` once per
/// single-person slot.
pub struct RawAssignment {
  pub id:                String,
  pub date:              String,
  pub period:            Option<String>,
  pub minister:          RawRef,
  pub backing_vocalists: String,
  pub guitar:            RawRef,
  pub keyboard:          RawRef,
  pub bass:              RawRef,
  pub drums:             RawRef,
  pub created_at:        String,
}

impl RawAssignment {
  /// Decode the row. `names` maps every existing person id to its name and is
  /// used to resolve the backing-vocalist list; ids missing from it are
  /// dropped.
  pub fn into_assignment(self, names: &HashMap<String, String>) -> Result<Assignment> {
    let period = self
      .period
      .as_deref()
      .map(|p| decode_tag::<Period>("period", p))
      .transpose()?;

    let mut backing_vocalists = Vec::new();
    for id in decode_ids(&self.backing_vocalists)? {
      let name = names.get(&id).cloned();
      if let Some(r) = (RawRef { id: Some(id), name }).resolve()? {
        backing_vocalists.push(r);
      }
    }

    Ok(Assignment {
      id: decode_uuid(&self.id)?,
      date: decode_date(&self.date)?,
      period,
      minister: self.minister.resolve()?,
      backing_vocalists,
      instrument_slots: InstrumentSlots {
        guitar:   self.guitar.resolve()?,
        keyboard: self.keyboard.resolve()?,
        bass:     self.bass.resolve()?,
        drums:    self.drums.resolve()?,
      },
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:            String,
  pub email:         String,
  pub name:          String,
  pub role:          String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.id)?,
      email:         self.email,
      name:          self.name,
      role:          self.role,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
