//! People screen: the registry with a fuzzy filter.

use escala_core::person::PersonKind;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::App;

/// Render the people list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_people();
  let total = app.cache.people().len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" People ({}/{}) ", filtered.len(), total)
  } else {
    format!(" People ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|p| {
      let role = match p.kind {
        PersonKind::Minister => "minister".to_string(),
        PersonKind::BackingVocalist => "backing vocalist".to_string(),
        PersonKind::Instrumentalist if p.instruments.is_empty() => {
          "instrumentalist".to_string()
        }
        PersonKind::Instrumentalist => {
          let tags: Vec<&str> = p.instruments.iter().map(|i| i.label()).collect();
          tags.join(", ")
        }
      };
      ListItem::new(Line::from(vec![
        Span::raw(format!("{:<28}", p.name)),
        Span::styled(role, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner line while a query is set.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.people_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
