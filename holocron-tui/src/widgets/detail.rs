//! Detail panel for the selected person.

use holocron_core::Person;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub person: Option<&'a Person>,
    pub label_style: Style,
}

impl<'a> DetailPanel<'a> {
    fn lines(&self) -> Vec<Line<'a>> {
        let Some(person) = self.person else {
            return vec![Line::from("Nothing selected")];
        };

        let field = |label: &'a str, value: String| {
            Line::from(vec![
                Span::styled(format!("{}: ", label), self.label_style),
                Span::raw(value),
            ])
        };
        let mut lines = vec![
            field("Name", person.name.clone()),
            field("Height", person.height.clone()),
            field("Mass", person.mass.clone()),
            field("Gender", person.gender.clone()),
            field("Favorite", if person.favorite { "yes" } else { "no" }.to_string()),
            Line::default(),
            Line::from(Span::styled("Films", self.label_style)),
        ];
        lines.extend(person.films.iter().map(|film| Line::from(format!("  {}", film))));
        lines
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let widget = Paragraph::new(Text::from(self.lines()))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }
}
