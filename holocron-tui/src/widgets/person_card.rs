//! One row of the people list.

use holocron_core::Person;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub const FAVORITE_MARKER: &str = "★";
pub const PLAIN_MARKER: &str = "☆";

pub struct PersonCard<'a> {
    pub person: &'a Person,
    pub selected: bool,
    pub name_style: Style,
    pub marker_style: Style,
    pub detail_style: Style,
    pub highlight: Style,
    /// Leading rows hidden above the viewport.
    pub skip_rows: u16,
}

impl<'a> PersonCard<'a> {
    pub fn lines(&self) -> Vec<Line<'a>> {
        let person = self.person;
        let marker = if person.favorite {
            FAVORITE_MARKER
        } else {
            PLAIN_MARKER
        };
        let films = if person.films.is_empty() {
            "no films".to_string()
        } else {
            person.films.join(", ")
        };
        vec![
            Line::from(vec![
                Span::styled(marker, self.marker_style),
                Span::raw(" "),
                Span::styled(
                    person.name.as_str(),
                    self.name_style.add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "  height {} | mass {} | gender {}",
                    person.height, person.mass, person.gender
                ),
                self.detail_style,
            )),
            Line::from(Span::styled(format!("  {}", films), self.detail_style)),
        ]
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut paragraph = Paragraph::new(self.lines()).scroll((self.skip_rows, 0));
        if self.selected {
            paragraph = paragraph.style(self.highlight);
        }
        f.render_widget(paragraph, area);
    }
}
