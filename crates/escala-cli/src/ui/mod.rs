//! TUI rendering; orchestrates all panes.

pub mod people_list;
pub mod roster_view;

use chrono::{Datelike, NaiveDate};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Roster => roster_view::draw(f, rows[1], app),
    Screen::People => people_list::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// `March 2025` for the month on screen.
pub fn month_title(app: &App) -> String {
  NaiveDate::from_ymd_opt(app.month.year(), app.month.month(), 1)
    .map(|d| format!("{} {}", d.format("%B"), d.year()))
    .unwrap_or_else(|| app.month.to_string())
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let tab = |label: &'static str, active: bool| {
    if active {
      Span::styled(
        format!(" {label} "),
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
    } else {
      Span::styled(format!(" {label} "), Style::default().fg(Color::White))
    }
  };

  let left = Span::styled(
    " escala ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} ", month_title(app)),
    Style::default().fg(Color::Gray),
  );

  let tabs = [
    tab("Roster", app.screen == Screen::Roster),
    tab("People", app.screen == Screen::People),
  ];

  // Simple left-right header: pad the middle.
  let used: usize = std::iter::once(&left)
    .chain(&tabs)
    .chain(std::iter::once(&right))
    .map(|s| s.content.chars().count())
    .sum();
  let pad = (area.width as usize).saturating_sub(used);

  let mut spans = vec![left];
  spans.extend(tabs);
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    _ if app.pending_delete.is_some() => ("CONFIRM", "y delete  any other key cancel"),
    Screen::People if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter keep",
    ),
    Screen::Roster => (
      "ROSTER",
      "←→/hl month  t today  ↑↓/jk move  d delete  r reload  Tab people  q quit",
    ),
    Screen::People => (
      "PEOPLE",
      "↑↓/jk move  / search  d delete  r reload  Tab roster  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
