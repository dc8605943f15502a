//! View rendering.

pub mod people;

use crate::state::App;
use crate::theme::{hit_rate_color, query_status_color};
use crate::widgets::StatusLine;
use holocron_core::normalize_search;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const HELP: &str = "type to search • ↑/↓ PgUp/PgDn move • Enter favorite • Ctrl+R refetch • Esc quit";

/// Screen areas, top to bottom.
pub struct ScreenLayout {
    pub search: Rect,
    pub status: Rect,
    pub body: Rect,
    pub footer: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    ScreenLayout {
        search: chunks[0],
        status: chunks[1],
        body: chunks[2],
        footer: chunks[3],
    }
}

/// Rows available to the people list on a screen of `area`.
pub fn list_viewport_height(area: Rect) -> u64 {
    let body = screen_layout(area).body;
    u64::from(people::split_body(body).0.height.saturating_sub(2))
}

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = screen_layout(f.size());
    render_search(f, app, layout.search);
    render_status(f, app, layout.status);
    people::render(f, app, layout.body);
    render_footer(f, app, layout.footer);
}

fn render_search(f: &mut Frame<'_>, app: &App, area: Rect) {
    let title = if normalize_search(&app.search).is_empty() {
        "Search people".to_string()
    } else {
        format!("Search people | showing \"{}\"", app.search.trim())
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(app.input_value.as_str(), Style::default().fg(app.theme.text)),
        Span::styled("▏", Style::default().fg(app.theme.primary)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_focus))
            .title(Span::styled(title, Style::default().fg(app.theme.primary))),
    );
    f.render_widget(input, area);
}

/// Status text: loading, the error message, or the result count.
pub fn status_text(app: &App) -> String {
    if let Some(error) = &app.query.error {
        return error.clone();
    }
    if app.query.is_fetching {
        return "Loading...".to_string();
    }
    if normalize_search(&app.search).is_empty() {
        return "Type a name to search".to_string();
    }
    match app.query.people.len() {
        1 => "1 person".to_string(),
        n => format!("{} people", n),
    }
}

fn render_status(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(36)])
        .split(area);

    StatusLine {
        text: status_text(app),
        style: Style::default().fg(query_status_color(&app.query, &app.theme)),
    }
    .render(f, chunks[0]);

    let rate = app.stats.hit_rate();
    StatusLine {
        text: format!(
            "favorites {} | cache hits {:.0}%",
            app.favorites.len(),
            rate * 100.0
        ),
        style: Style::default().fg(hit_rate_color(rate, &app.theme)),
    }
    .render(f, chunks[1]);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let footer = Paragraph::new(HELP).style(Style::default().fg(app.theme.text_dim));
    f.render_widget(footer, area);
}
