//! Windowed people list.
//!
//! Only the items in the computed window are laid out; an item cut by the
//! top or bottom edge is drawn partially.

use crate::state::App;
use crate::theme::favorite_color;
use crate::widgets::{DetailPanel, PersonCard};
use holocron_core::Window;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Split the body into the list and the detail panel.
pub fn split_body(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Where one item lands inside a viewport of `viewport_height` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlacement {
    /// First viewport row covered by the item.
    pub y: u16,
    /// Rows of the item that are visible.
    pub height: u16,
    /// Leading item rows hidden above the viewport.
    pub skip: u16,
}

/// Place item `index` given the scroll offset, or `None` if it is off screen.
///
/// Overscanned items are materialized by the window but have no visible rows.
pub fn place_row(
    index: usize,
    item_height: u64,
    scroll_offset: u64,
    viewport_height: u64,
) -> Option<RowPlacement> {
    let top = index as u64 * item_height;
    let bottom = top + item_height;
    let view_bottom = scroll_offset + viewport_height;
    if bottom <= scroll_offset || top >= view_bottom {
        return None;
    }
    let visible_top = top.max(scroll_offset);
    let visible_bottom = bottom.min(view_bottom);
    Some(RowPlacement {
        y: u16::try_from(visible_top - scroll_offset).ok()?,
        height: u16::try_from(visible_bottom - visible_top).ok()?,
        skip: u16::try_from(visible_top - top).ok()?,
    })
}

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (list_area, detail_area) = split_body(area);

    let title = format!("People ({})", app.query.people.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(title);
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    match app.window() {
        Ok(window) => render_window(f, app, inner, window),
        Err(err) => {
            let message = Paragraph::new(err.to_string()).style(Style::default().fg(app.theme.error));
            f.render_widget(message, inner);
        }
    }

    DetailPanel {
        title: "Details",
        person: app.selected_person(),
        label_style: Style::default().fg(app.theme.secondary),
    }
    .render(f, detail_area);
}

fn render_window(f: &mut Frame<'_>, app: &App, inner: Rect, window: Window) {
    let item_height = app.config.list.item_height;
    let viewport = u64::from(inner.height);

    for index in window.indices() {
        let Some(person) = app.query.people.get(index) else {
            break;
        };
        let Some(placement) = place_row(index, item_height, app.list.scroll_offset, viewport)
        else {
            continue;
        };
        let area = Rect {
            x: inner.x,
            y: inner.y + placement.y,
            width: inner.width,
            height: placement.height,
        };
        PersonCard {
            person,
            selected: index == app.list.selected,
            name_style: Style::default().fg(app.theme.text),
            marker_style: Style::default().fg(favorite_color(person.favorite, &app.theme)),
            detail_style: Style::default().fg(app.theme.text_dim),
            highlight: Style::default().bg(app.theme.bg_highlight),
            skip_rows: placement.skip,
        }
        .render(f, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_visible_row() {
        let placement = place_row(2, 4, 0, 20).unwrap();
        assert_eq!(placement, RowPlacement { y: 8, height: 4, skip: 0 });
    }

    #[test]
    fn test_row_cut_at_top() {
        // Item 1 spans rows 4..8; scrolled to row 6.
        let placement = place_row(1, 4, 6, 20).unwrap();
        assert_eq!(placement, RowPlacement { y: 0, height: 2, skip: 2 });
    }

    #[test]
    fn test_row_cut_at_bottom() {
        let placement = place_row(4, 4, 0, 18).unwrap();
        assert_eq!(placement, RowPlacement { y: 16, height: 2, skip: 0 });
    }

    #[test]
    fn test_overscanned_rows_are_off_screen() {
        assert!(place_row(0, 4, 40, 20).is_none());
        assert!(place_row(20, 4, 0, 20).is_none());
    }
}
