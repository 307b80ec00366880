//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use escala_core::{
  assignment::Assignment,
  person::Person,
  roster::{MonthKey, MonthlyRoster},
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use uuid::Uuid;

use crate::{cache::RosterCache, render};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// One month of services, split into the three buckets.
  Roster,
  /// The person registry.
  People,
}

/// A delete waiting for `y` to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
  Assignment { id: Uuid, label: String },
  Person { id: Uuid, name: String },
}

impl PendingDelete {
  pub fn prompt(&self) -> String {
    match self {
      Self::Assignment { label, .. } => format!("Delete service {label}? [y/N]"),
      Self::Person { name, .. } => format!("Delete {name}? [y/N]"),
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// Local copy of people and assignments.
  pub cache: RosterCache,

  /// Month shown on the roster screen.
  pub month: MonthKey,

  /// Cursor over the month's entries in display order.
  pub roster_cursor: usize,

  /// Cursor within the *filtered* people list.
  pub people_cursor: usize,

  /// Current fuzzy-filter string for the people screen.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  pub pending_delete: Option<PendingDelete>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(cache: RosterCache, month: MonthKey) -> Self {
    Self {
      screen: Screen::Roster,
      cache,
      month,
      roster_cursor: 0,
      people_cursor: 0,
      filter: String::new(),
      filter_active: false,
      pending_delete: None,
      status_msg: String::new(),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Refetch everything. On failure the previous data stays on screen.
  pub async fn reload(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    match self.cache.reload().await {
      Ok(()) => {
        self.clamp_cursors();
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn roster(&self) -> MonthlyRoster { self.cache.roster(self.month) }

  /// The roster entry under the cursor, if any.
  pub fn cursor_assignment(&self) -> Option<Assignment> {
    self
      .roster()
      .iter()
      .nth(self.roster_cursor)
      .map(|(_, a)| a.clone())
  }

  /// People matching the current filter query, by name or role.
  pub fn filtered_people(&self) -> Vec<&Person> {
    if self.filter.is_empty() {
      return self.cache.people().iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .cache
      .people()
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.name, &self.filter).is_some()
          || matcher.fuzzy_match(p.kind.as_ref(), &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_person(&self) -> Option<&Person> {
    self.filtered_people().get(self.people_cursor).copied()
  }

  fn clamp_cursors(&mut self) {
    let entries = self.roster().len();
    self.roster_cursor = self.roster_cursor.min(entries.saturating_sub(1));
    let people = self.filtered_people().len();
    self.people_cursor = self.people_cursor.min(people.saturating_sub(1));
  }

  fn set_month(&mut self, month: MonthKey) {
    self.month = month;
    self.roster_cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Some(pending) = self.pending_delete.take() {
      if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        self.delete(pending).await;
      } else {
        self.status_msg = "Cancelled.".into();
      }
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Tab => {
        self.screen = match self.screen {
          Screen::Roster => Screen::People,
          Screen::People => Screen::Roster,
        };
        self.status_msg.clear();
      }
      KeyCode::Char('r') => {
        // Error already in the status bar.
        let _ = self.reload().await;
      }
      _ => match self.screen {
        Screen::Roster => self.handle_roster_key(key),
        Screen::People => self.handle_people_key(key),
      },
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.people_cursor = 0;
  }

  fn handle_roster_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.set_month(self.month.prev()),
      KeyCode::Right | KeyCode::Char('l') => self.set_month(self.month.next()),
      KeyCode::Char('t') => self.set_month(MonthKey::current()),
      KeyCode::Down | KeyCode::Char('j') => {
        if self.roster_cursor + 1 < self.roster().len() {
          self.roster_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.roster_cursor = self.roster_cursor.saturating_sub(1);
      }
      KeyCode::Char('d') => {
        if let Some(a) = self.cursor_assignment() {
          let pending = PendingDelete::Assignment {
            id:    a.id,
            label: render::date_label(&a),
          };
          self.status_msg = pending.prompt();
          self.pending_delete = Some(pending);
        }
      }
      _ => {}
    }
  }

  fn handle_people_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.people_cursor + 1 < self.filtered_people().len() {
          self.people_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.people_cursor = self.people_cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.people_cursor = 0;
      }
      KeyCode::Esc => {
        self.filter.clear();
        self.people_cursor = 0;
      }
      KeyCode::Char('d') => {
        if let Some(p) = self.cursor_person() {
          let pending = PendingDelete::Person {
            id:   p.id,
            name: p.name.clone(),
          };
          self.status_msg = pending.prompt();
          self.pending_delete = Some(pending);
        }
      }
      _ => {}
    }
  }

  async fn delete(&mut self, pending: PendingDelete) {
    let result = match &pending {
      PendingDelete::Assignment { id, .. } => self.cache.delete_assignment(*id).await,
      PendingDelete::Person { id, .. } => self.cache.delete_person(*id).await,
    };
    self.status_msg = match result {
      Ok(()) => match pending {
        PendingDelete::Assignment { label, .. } => format!("Deleted {label}"),
        PendingDelete::Person { name, .. } => format!("Deleted {name}"),
      },
      Err(e) => {
        tracing::warn!(error = %e, "delete failed");
        format!("Error: {e}")
      }
    };
    self.clamp_cursors();
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyEventKind;

  use super::*;
  use crate::client::{ApiClient, ApiConfig};

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap();
    App::new(RosterCache::new(client), "2025-01".parse().unwrap())
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
      code,
      modifiers: KeyModifiers::NONE,
      kind: KeyEventKind::Press,
      state: crossterm::event::KeyEventState::NONE,
    }
  }

  #[tokio::test]
  async fn arrows_step_months() {
    let mut app = app();
    app.handle_key(key(KeyCode::Left)).await.unwrap();
    assert_eq!(app.month.to_string(), "2024-12");
    app.handle_key(key(KeyCode::Right)).await.unwrap();
    app.handle_key(key(KeyCode::Right)).await.unwrap();
    assert_eq!(app.month.to_string(), "2025-02");
  }

  #[tokio::test]
  async fn filter_mode_captures_keys() {
    let mut app = app();
    app.handle_key(key(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.screen, Screen::People);

    app.handle_key(key(KeyCode::Char('/'))).await.unwrap();
    for c in "qa".chars() {
      assert!(app.handle_key(key(KeyCode::Char(c))).await.unwrap());
    }
    assert_eq!(app.filter, "qa");
    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert!(!app.filter_active);
    assert!(app.filter.is_empty());
  }

  #[tokio::test]
  async fn quit_keys() {
    let mut app = app();
    assert!(!app.handle_key(key(KeyCode::Char('q'))).await.unwrap());
    let ctrl_c = KeyEvent {
      modifiers: KeyModifiers::CONTROL,
      ..key(KeyCode::Char('c'))
    };
    assert!(!app.handle_key(ctrl_c).await.unwrap());
  }

  #[tokio::test]
  async fn delete_on_empty_month_does_nothing() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    assert!(app.pending_delete.is_none());
  }
}
