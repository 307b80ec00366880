//! Roster screen: three titled tables for the month on screen.

use escala_core::roster::{Bucket, MonthlyRoster};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Paragraph, Row, Table},
};

use crate::{app::App, render};

const WIDTHS: [Constraint; 7] = [
  Constraint::Length(21),
  Constraint::Percentage(16),
  Constraint::Percentage(24),
  Constraint::Percentage(12),
  Constraint::Percentage(12),
  Constraint::Percentage(12),
  Constraint::Percentage(12),
];

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let roster = app.roster();

  if roster.is_empty() {
    let block = Block::default()
      .title(format!(" {} ", super::month_title(app)))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
      Paragraph::new("No services scheduled for this month.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  // Empty buckets get no table. Each shown table gets its rows plus borders
  // and a header line.
  let shown = visible_buckets(&roster);
  let constraints: Vec<Constraint> = shown
    .iter()
    .map(|b| Constraint::Length(roster.bucket(*b).len() as u16 + 3))
    .chain(std::iter::once(Constraint::Min(0)))
    .collect();
  let areas = Layout::default()
    .direction(Direction::Vertical)
    .constraints(constraints)
    .split(area);

  let mut offset = 0;
  for (i, bucket) in shown.into_iter().enumerate() {
    draw_bucket(f, areas[i], &roster, bucket, offset, app.roster_cursor);
    offset += roster.bucket(bucket).len();
  }
}

fn visible_buckets(roster: &MonthlyRoster) -> Vec<Bucket> {
  Bucket::ALL
    .into_iter()
    .filter(|b| !roster.bucket(*b).is_empty())
    .collect()
}

/// `offset` is the position of the bucket's first row in the month's
/// display order, which is what the roster cursor counts.
fn draw_bucket(
  f: &mut Frame,
  area: Rect,
  roster: &MonthlyRoster,
  bucket: Bucket,
  offset: usize,
  cursor: usize,
) {
  let entries = roster.bucket(bucket);
  let block = Block::default()
    .title(format!(" {} ", render::section_title(bucket, entries.len())))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let header = Row::new(render::HEADERS).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let rows = entries.iter().enumerate().map(|(i, a)| {
    let row = Row::new(render::row_cells(a));
    if offset + i == cursor {
      row.style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
    } else {
      row
    }
  });

  f.render_widget(Table::new(rows, WIDTHS).header(header).block(block), area);
}
