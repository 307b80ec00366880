//! People on the worship team and the role/instrument tags that decide which
//! slots they may fill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Tags ────────────────────────────────────────────────────────────────────

/// The role a person plays on the team. Closed set.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PersonKind {
  Minister,
  BackingVocalist,
  Instrumentalist,
}

/// An instrument an instrumentalist can be tagged with. Each one has a
/// matching slot in every assignment.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Instrument {
  Guitar,
  Keyboard,
  Bass,
  Drums,
}

impl Instrument {
  /// All instruments in slot display order.
  pub const ALL: [Instrument; 4] =
    [Self::Guitar, Self::Keyboard, Self::Bass, Self::Drums];

  /// Column heading used when rendering a roster.
  pub fn label(self) -> &'static str {
    match self {
      Self::Guitar => "Guitar",
      Self::Keyboard => "Keyboard",
      Self::Bass => "Bass",
      Self::Drums => "Drums",
    }
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A registered team member. Immutable once created; only deletion is
/// supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          Uuid,
  #[serde(rename = "nome")]
  pub name:        String,
  #[serde(rename = "tipo")]
  pub kind:        PersonKind,
  /// Always empty unless `kind` is [`PersonKind::Instrumentalist`].
  #[serde(rename = "instrumentos", default)]
  pub instruments: Vec<Instrument>,
  pub created_at:  DateTime<Utc>,
}

impl Person {
  pub fn plays(&self, instrument: Instrument) -> bool {
    self.kind == PersonKind::Instrumentalist
      && self.instruments.contains(&instrument)
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::RosterStore::add_person`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:        String,
  pub kind:        PersonKind,
  pub instruments: Vec<Instrument>,
}

impl NewPerson {
  /// Build a registry entry from raw form input.
  ///
  /// The name is trimmed and must not be empty. Instrument tags are dropped
  /// for anyone who is not an instrumentalist, and duplicates collapse to
  /// their first occurrence.
  pub fn new(
    name: &str,
    kind: PersonKind,
    instruments: impl IntoIterator<Item = Instrument>,
  ) -> Result<Self> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::validation("nome and tipo are required"));
    }

    let mut tags = Vec::new();
    if kind == PersonKind::Instrumentalist {
      for instrument in instruments {
        if !tags.contains(&instrument) {
          tags.push(instrument);
        }
      }
    }

    Ok(Self {
      name: name.to_owned(),
      kind,
      instruments: tags,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_name_is_rejected() {
    let err = NewPerson::new("   ", PersonKind::Minister, []).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn instruments_dropped_for_non_instrumentalists() {
    let p = NewPerson::new(
      "Ana",
      PersonKind::BackingVocalist,
      [Instrument::Guitar],
    )
    .unwrap();
    assert!(p.instruments.is_empty());
  }

  #[test]
  fn duplicate_instruments_collapse() {
    let p = NewPerson::new(
      " Bruno ",
      PersonKind::Instrumentalist,
      [Instrument::Drums, Instrument::Guitar, Instrument::Drums],
    )
    .unwrap();
    assert_eq!(p.name, "Bruno");
    assert_eq!(p.instruments, vec![Instrument::Drums, Instrument::Guitar]);
  }

  #[test]
  fn kind_wire_names() {
    assert_eq!(PersonKind::BackingVocalist.as_ref(), "backing_vocalist");
    assert_eq!(
      "instrumentalist".parse::<PersonKind>().unwrap(),
      PersonKind::Instrumentalist
    );
    assert_eq!(
      serde_json::to_value(Instrument::Keyboard).unwrap(),
      serde_json::json!("keyboard")
    );
  }
}
