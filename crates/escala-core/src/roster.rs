//! Monthly roster view: filter a month's assignments and split them into the
//! three recurring services.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  Error, Result,
  assignment::{Assignment, Period},
};

// ─── MonthKey ────────────────────────────────────────────────────────────────

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
  year:  i32,
  month: u32,
}

impl MonthKey {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
      return Err(Error::validation(format!(
        "invalid month {year:04}-{month:02}"
      )));
    }
    Ok(Self { year, month })
  }

  /// The month containing `date`.
  pub fn of(date: NaiveDate) -> Self {
    Self {
      year:  date.year(),
      month: date.month(),
    }
  }

  /// The current month in the local timezone.
  pub fn current() -> Self { Self::of(Local::now().date_naive()) }

  pub fn year(self) -> i32 { self.year }

  pub fn month(self) -> u32 { self.month }

  /// Whether `date` falls in this month, i.e. its ISO form starts with
  /// `YYYY-MM-`.
  pub fn contains(self, date: NaiveDate) -> bool { Self::of(date) == self }

  pub fn next(self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }

  pub fn prev(self) -> Self {
    if self.month == 1 {
      Self { year: self.year - 1, month: 12 }
    } else {
      Self { year: self.year, month: self.month - 1 }
    }
  }
}

impl fmt::Display for MonthKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for MonthKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::validation(format!("invalid month {s:?}, expected YYYY-MM"));

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
      return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    Self::new(year, month).map_err(|_| invalid())
  }
}

impl Serialize for MonthKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for MonthKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// Weekday index of the recurring weeknight service.
pub const TUESDAY: u32 = 2;

/// The display sections of a monthly roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
  Tuesday,
  SundayMorning,
  SundayEvening,
}

impl Bucket {
  /// Buckets in display order.
  pub const ALL: [Bucket; 3] =
    [Self::Tuesday, Self::SundayMorning, Self::SundayEvening];

  pub fn title(self) -> &'static str {
    match self {
      Self::Tuesday => "Tuesday",
      Self::SundayMorning => "Sunday morning",
      Self::SundayEvening => "Sunday evening",
    }
  }

  /// The bucket an assignment is shown in, or `None` if its weekday has no
  /// section.
  ///
  /// Sunday records without a period predate period tracking and are shown
  /// with the morning service.
  pub fn of(assignment: &Assignment) -> Option<Self> {
    match (assignment.weekday_index(), assignment.period) {
      (TUESDAY, _) => Some(Self::Tuesday),
      (0, Some(Period::Evening)) => Some(Self::SundayEvening),
      (0, Some(Period::Morning) | None) => Some(Self::SundayMorning),
      _ => None,
    }
  }
}

/// Number of entries per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
  pub tuesday:        usize,
  pub sunday_morning: usize,
  pub sunday_evening: usize,
}

/// One month of assignments split into buckets, each sorted by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRoster {
  pub month:          MonthKey,
  pub tuesday:        Vec<Assignment>,
  pub sunday_morning: Vec<Assignment>,
  pub sunday_evening: Vec<Assignment>,
  pub counts:         BucketCounts,
}

impl MonthlyRoster {
  pub fn bucket(&self, bucket: Bucket) -> &[Assignment] {
    match bucket {
      Bucket::Tuesday => &self.tuesday,
      Bucket::SundayMorning => &self.sunday_morning,
      Bucket::SundayEvening => &self.sunday_evening,
    }
  }

  /// Total entries across all buckets.
  pub fn len(&self) -> usize {
    self.counts.tuesday + self.counts.sunday_morning + self.counts.sunday_evening
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Entries in display order: bucket by bucket, then by date.
  pub fn iter(&self) -> impl Iterator<Item = (Bucket, &Assignment)> {
    Bucket::ALL
      .into_iter()
      .flat_map(move |b| self.bucket(b).iter().map(move |a| (b, a)))
  }
}

/// Group the assignments of `month` into their display buckets.
///
/// Entries on weekdays without a section are left out. Ties on the same date
/// keep their input order.
pub fn group_by_month<'a, I>(assignments: I, month: MonthKey) -> MonthlyRoster
where
  I: IntoIterator<Item = &'a Assignment>,
{
  let mut tuesday = Vec::new();
  let mut sunday_morning = Vec::new();
  let mut sunday_evening = Vec::new();

  for a in assignments.into_iter().filter(|a| month.contains(a.date)) {
    match Bucket::of(a) {
      Some(Bucket::Tuesday) => tuesday.push(a.clone()),
      Some(Bucket::SundayMorning) => sunday_morning.push(a.clone()),
      Some(Bucket::SundayEvening) => sunday_evening.push(a.clone()),
      None => {}
    }
  }

  for bucket in [&mut tuesday, &mut sunday_morning, &mut sunday_evening] {
    bucket.sort_by_key(|a| a.date);
  }

  let counts = BucketCounts {
    tuesday:        tuesday.len(),
    sunday_morning: sunday_morning.len(),
    sunday_evening: sunday_evening.len(),
  };

  MonthlyRoster {
    month,
    tuesday,
    sunday_morning,
    sunday_evening,
    counts,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::assignment::{InstrumentSlots, parse_date};

  fn entry(date: &str, period: Option<Period>) -> Assignment {
    Assignment {
      id: Uuid::new_v4(),
      date: parse_date(date).unwrap(),
      period,
      minister: None,
      backing_vocalists: Vec::new(),
      instrument_slots: InstrumentSlots::default(),
      created_at: Utc::now(),
    }
  }

  fn march() -> MonthKey { "2025-03".parse().unwrap() }

  #[test]
  fn month_key_parse_and_display() {
    let m: MonthKey = "2025-03".parse().unwrap();
    assert_eq!((m.year(), m.month()), (2025, 3));
    assert_eq!(m.to_string(), "2025-03");
    assert!("2025-3".parse::<MonthKey>().is_err());
    assert!("2025-13".parse::<MonthKey>().is_err());
    assert!("March".parse::<MonthKey>().is_err());
  }

  #[test]
  fn month_key_steps_across_years() {
    let dec: MonthKey = "2024-12".parse().unwrap();
    assert_eq!(dec.next().to_string(), "2025-01");
    assert_eq!(dec.next().prev(), dec);
  }

  #[test]
  fn one_entry_per_bucket_and_other_months_excluded() {
    let all = vec![
      entry("2025-03-11", Some(Period::Evening)),
      entry("2025-03-09", Some(Period::Morning)),
      entry("2025-03-16", Some(Period::Evening)),
      entry("2025-04-06", Some(Period::Morning)),
      entry("2025-02-25", Some(Period::Evening)),
    ];

    let roster = group_by_month(&all, march());
    assert_eq!(roster.tuesday.len(), 1);
    assert_eq!(roster.sunday_morning.len(), 1);
    assert_eq!(roster.sunday_evening.len(), 1);
    assert_eq!(
      roster.counts,
      BucketCounts {
        tuesday:        1,
        sunday_morning: 1,
        sunday_evening: 1,
      }
    );
    assert!(roster.iter().all(|(_, a)| march().contains(a.date)));
  }

  #[test]
  fn buckets_sorted_by_date() {
    let all = vec![
      entry("2025-03-23", Some(Period::Morning)),
      entry("2025-03-09", Some(Period::Morning)),
    ];
    let roster = group_by_month(&all, march());
    let dates: Vec<String> = roster
      .sunday_morning
      .iter()
      .map(|a| a.date.to_string())
      .collect();
    assert_eq!(dates, ["2025-03-09", "2025-03-23"]);
  }

  #[test]
  fn legacy_sunday_without_period_is_morning() {
    let all = vec![entry("2025-03-02", None)];
    let roster = group_by_month(&all, march());
    assert_eq!(roster.sunday_morning.len(), 1);
    assert!(roster.sunday_evening.is_empty());
  }

  #[test]
  fn other_weekdays_are_dropped() {
    // Wednesday and Saturday.
    let all = vec![
      entry("2025-03-12", Some(Period::Evening)),
      entry("2025-03-15", Some(Period::Evening)),
    ];
    let roster = group_by_month(&all, march());
    assert!(roster.is_empty());
  }

  #[test]
  fn roster_serialises_month_as_string() {
    let roster = group_by_month(&Vec::<Assignment>::new(), march());
    let v = serde_json::to_value(&roster).unwrap();
    assert_eq!(v["month"], "2025-03");
    assert_eq!(v["counts"]["sunday_evening"], 0);
  }
}
