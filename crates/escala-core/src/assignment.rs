//! Assignments: one dated service mapped to its role slots.
//!
//! Slots hold non-owning references to people. A reference can outlive the
//! person it points to; readers resolve such references to an empty slot.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, person::Instrument};

/// Wire and storage format for service dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Period ──────────────────────────────────────────────────────────────────

/// Time of day of a service. Only Sundays have more than one.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
  Morning,
  Evening,
}

impl Period {
  pub fn label(self) -> &'static str {
    match self {
      Self::Morning => "Morning",
      Self::Evening => "Evening",
    }
  }
}

// ─── Date rules ──────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` service date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
    .map_err(|_| Error::validation(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

/// Weekday index of `date`, with 0 = Sunday.
///
/// A `NaiveDate` has neither time of day nor offset, so the result is the
/// weekday of the calendar day itself, the same one a midday reading gives in
/// any timezone.
pub fn weekday_index(date: NaiveDate) -> u32 { date.weekday().num_days_from_sunday() }

pub fn is_sunday(date: NaiveDate) -> bool { weekday_index(date) == 0 }

/// The period that is actually stored for a service on `date`.
///
/// Sundays keep the requested period, which is then mandatory. Every other
/// day is an evening service no matter what was requested.
pub fn effective_period(date: NaiveDate, requested: Option<Period>) -> Result<Period> {
  if is_sunday(date) {
    requested.ok_or_else(|| Error::validation("periodo is required for Sunday services"))
  } else {
    Ok(Period::Evening)
  }
}

// ─── Slots ───────────────────────────────────────────────────────────────────

/// The four instrument slots of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSlots<T> {
  pub guitar:   Option<T>,
  pub keyboard: Option<T>,
  pub bass:     Option<T>,
  pub drums:    Option<T>,
}

impl<T> Default for InstrumentSlots<T> {
  fn default() -> Self {
    Self {
      guitar:   None,
      keyboard: None,
      bass:     None,
      drums:    None,
    }
  }
}

impl<T> InstrumentSlots<T> {
  pub fn get(&self, instrument: Instrument) -> Option<&T> {
    match instrument {
      Instrument::Guitar => self.guitar.as_ref(),
      Instrument::Keyboard => self.keyboard.as_ref(),
      Instrument::Bass => self.bass.as_ref(),
      Instrument::Drums => self.drums.as_ref(),
    }
  }

  pub fn set(&mut self, instrument: Instrument, value: Option<T>) {
    let slot = match instrument {
      Instrument::Guitar => &mut self.guitar,
      Instrument::Keyboard => &mut self.keyboard,
      Instrument::Bass => &mut self.bass,
      Instrument::Drums => &mut self.drums,
    };
    *slot = value;
  }

  /// Slots in display order.
  pub fn iter(&self) -> impl Iterator<Item = (Instrument, Option<&T>)> {
    Instrument::ALL.into_iter().map(move |i| (i, self.get(i)))
  }
}

/// A resolved reference: the person's id with their display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
  pub id:   Uuid,
  #[serde(rename = "nome")]
  pub name: String,
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// A roster entry as read back from the store, with every reference already
/// resolved to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub id:                Uuid,
  #[serde(rename = "data")]
  pub date:              NaiveDate,
  /// `None` only for legacy records stored before periods were tracked.
  #[serde(rename = "periodo")]
  pub period:            Option<Period>,
  pub minister:          Option<PersonRef>,
  #[serde(default)]
  pub backing_vocalists: Vec<PersonRef>,
  #[serde(default)]
  pub instrument_slots:  InstrumentSlots<PersonRef>,
  pub created_at:        DateTime<Utc>,
}

impl Assignment {
  pub fn weekday_index(&self) -> u32 { weekday_index(self.date) }
}

// ─── NewAssignment ───────────────────────────────────────────────────────────

/// Validated input to
/// [`crate::store::RosterStore::add_assignment`] and
/// [`crate::store::RosterStore::update_assignment`].
///
/// The period has already been normalised by [`effective_period`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
  pub date:              NaiveDate,
  pub period:            Period,
  pub minister:          Option<Uuid>,
  pub backing_vocalists: Vec<Uuid>,
  pub instrument_slots:  InstrumentSlots<Uuid>,
}

impl NewAssignment {
  /// Apply the Sunday-only period rule and collapse duplicate vocalists.
  pub fn new(
    date: NaiveDate,
    requested_period: Option<Period>,
    minister: Option<Uuid>,
    backing_vocalists: impl IntoIterator<Item = Uuid>,
    instrument_slots: InstrumentSlots<Uuid>,
  ) -> Result<Self> {
    let period = effective_period(date, requested_period)?;

    let mut vocalists = Vec::new();
    for id in backing_vocalists {
      if !vocalists.contains(&id) {
        vocalists.push(id);
      }
    }

    Ok(Self {
      date,
      period,
      minister,
      backing_vocalists: vocalists,
      instrument_slots,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  #[test]
  fn weekday_index_starts_on_sunday() {
    assert_eq!(weekday_index(date("2025-03-09")), 0);
    assert_eq!(weekday_index(date("2025-03-11")), 2);
    assert_eq!(weekday_index(date("2025-03-15")), 6);
  }

  #[test]
  fn non_sunday_is_always_evening() {
    // Mon 2025-03-10 through Sat 2025-03-15.
    for day in 10..=15 {
      let d = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
      for requested in [None, Some(Period::Morning), Some(Period::Evening)] {
        assert_eq!(effective_period(d, requested).unwrap(), Period::Evening);
      }
    }
  }

  #[test]
  fn sunday_keeps_requested_period() {
    let sunday = date("2025-03-23");
    assert_eq!(
      effective_period(sunday, Some(Period::Morning)).unwrap(),
      Period::Morning
    );
    assert_eq!(
      effective_period(sunday, Some(Period::Evening)).unwrap(),
      Period::Evening
    );
  }

  #[test]
  fn sunday_without_period_is_rejected() {
    let err = effective_period(date("2025-03-23"), None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn malformed_date_is_rejected() {
    assert!(parse_date("2025-13-01").is_err());
    assert!(parse_date("not a date").is_err());
    assert!(parse_date("").is_err());
  }

  #[test]
  fn new_assignment_dedups_vocalists() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let entry = NewAssignment::new(
      date("2025-03-11"),
      Some(Period::Morning),
      None,
      [a, b, a],
      InstrumentSlots::default(),
    )
    .unwrap();
    assert_eq!(entry.backing_vocalists, vec![a, b]);
    assert_eq!(entry.period, Period::Evening);
  }

  #[test]
  fn resolved_assignment_wire_shape() {
    let id = Uuid::new_v4();
    let a = Assignment {
      id,
      date: date("2025-03-09"),
      period: Some(Period::Morning),
      minister: None,
      backing_vocalists: vec![],
      instrument_slots: InstrumentSlots::default(),
      created_at: Utc::now(),
    };
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["data"], "2025-03-09");
    assert_eq!(v["periodo"], "morning");
    assert!(v["minister"].is_null());
    assert!(v["instrument_slots"]["drums"].is_null());
  }

  #[test]
  fn resolved_assignment_reads_back_from_json() {
    let carla = Uuid::new_v4();
    let eli = Uuid::new_v4();
    let raw = serde_json::json!({
      "id": Uuid::new_v4(),
      "data": "2025-03-09",
      "periodo": "evening",
      "minister": { "id": carla, "nome": "Carla" },
      "instrument_slots": { "drums": { "id": eli, "nome": "Eli" } },
      "created_at": "2025-03-01T12:00:00Z",
    });

    let a: Assignment = serde_json::from_value(raw).unwrap();
    assert_eq!(a.period, Some(Period::Evening));
    assert_eq!(a.minister.unwrap().name, "Carla");
    assert!(a.backing_vocalists.is_empty());
    assert_eq!(a.instrument_slots.get(Instrument::Drums).unwrap().id, eli);
    assert!(a.instrument_slots.guitar.is_none());
  }
}
