//! Plain-text rendering of a monthly roster, shared by the TUI tables and
//! `roster show`.

use escala_core::{
  assignment::{Assignment, PersonRef},
  person::Instrument,
  roster::{Bucket, MonthlyRoster},
};

/// Placeholder for an empty slot.
pub const EMPTY: &str = "-";

/// Column headings, in the order of [`row_cells`].
pub const HEADERS: [&str; 7] = [
  "Date",
  "Minister",
  "Backing vocals",
  "Guitar",
  "Keyboard",
  "Bass",
  "Drums",
];

pub fn section_title(bucket: Bucket, count: usize) -> String {
  format!("{} ({count})", bucket.title())
}

/// `dd/mm/yyyy`, followed by the period when one is recorded.
pub fn date_label(a: &Assignment) -> String {
  let date = a.date.format("%d/%m/%Y");
  match a.period {
    Some(p) => format!("{date} ({})", p.label()),
    None => date.to_string(),
  }
}

fn name_or_empty(r: Option<&PersonRef>) -> String {
  r.map_or_else(|| EMPTY.to_string(), |r| r.name.clone())
}

/// One table row: date, minister, vocals, then the four instruments.
pub fn row_cells(a: &Assignment) -> [String; 7] {
  let vocals = if a.backing_vocalists.is_empty() {
    EMPTY.to_string()
  } else {
    a.backing_vocalists
      .iter()
      .map(|r| r.name.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  };
  let slot = |i: Instrument| name_or_empty(a.instrument_slots.get(i));

  [
    date_label(a),
    name_or_empty(a.minister.as_ref()),
    vocals,
    slot(Instrument::Guitar),
    slot(Instrument::Keyboard),
    slot(Instrument::Bass),
    slot(Instrument::Drums),
  ]
}

/// Render the whole month as aligned text tables, one per non-empty bucket.
pub fn render_roster(roster: &MonthlyRoster) -> String {
  let mut out = format!("Roster {}\n", roster.month);
  if roster.is_empty() {
    out.push_str("\nNo services scheduled.\n");
    return out;
  }

  for bucket in Bucket::ALL {
    let entries = roster.bucket(bucket);
    if entries.is_empty() {
      continue;
    }
    out.push('\n');
    out.push_str(&section_title(bucket, entries.len()));
    out.push('\n');

    let rows: Vec<[String; 7]> = entries.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
      for (w, cell) in widths.iter_mut().zip(row) {
        *w = (*w).max(cell.chars().count());
      }
    }

    let headers = HEADERS.map(str::to_string);
    for row in std::iter::once(&headers).chain(&rows) {
      let line = row
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
      out.push_str(line.trim_end());
      out.push('\n');
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use escala_core::{
    assignment::{InstrumentSlots, Period, parse_date},
    roster::group_by_month,
  };
  use uuid::Uuid;

  use super::*;

  fn person(name: &str) -> PersonRef {
    PersonRef {
      id:   Uuid::new_v4(),
      name: name.to_string(),
    }
  }

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

  #[test]
  fn date_label_includes_period() {
    assert_eq!(
      date_label(&entry("2025-03-09", Some(Period::Morning))),
      "09/03/2025 (Morning)"
    );
    assert_eq!(date_label(&entry("2025-03-02", None)), "02/03/2025");
  }

  #[test]
  fn empty_slots_render_as_dash() {
    let mut a = entry("2025-03-11", Some(Period::Evening));
    a.minister = Some(person("Carla"));
    a.backing_vocalists = vec![person("Davi"), person("Fabi")];
    a.instrument_slots.bass = Some(person("Gil"));

    assert_eq!(
      row_cells(&a),
      [
        "11/03/2025 (Evening)",
        "Carla",
        "Davi, Fabi",
        "-",
        "-",
        "Gil",
        "-",
      ]
      .map(str::to_string)
    );
  }

  #[test]
  fn only_non_empty_sections_are_rendered() {
    let all = vec![
      entry("2025-03-11", Some(Period::Evening)),
      entry("2025-03-18", Some(Period::Evening)),
      entry("2025-03-09", Some(Period::Morning)),
    ];
    let text = render_roster(&group_by_month(&all, "2025-03".parse().unwrap()));

    assert!(text.starts_with("Roster 2025-03\n"));
    assert!(text.contains("Tuesday (2)\n"));
    assert!(text.contains("Sunday morning (1)\n"));
    assert!(!text.contains("Sunday evening"));
    assert!(text.contains("18/03/2025 (Evening)"));
  }

  #[test]
  fn empty_month() {
    let text = render_roster(&group_by_month(
      &Vec::<Assignment>::new(),
      "2025-03".parse().unwrap(),
    ));
    assert_eq!(text, "Roster 2025-03\n\nNo services scheduled.\n");
  }
}
