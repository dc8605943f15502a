//! One-line query status.

use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

pub struct StatusLine {
    pub text: String,
    pub style: Style,
}

impl StatusLine {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Paragraph::new(self.text.as_str()).style(self.style), area);
    }
}
