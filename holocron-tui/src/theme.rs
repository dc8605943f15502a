//! Color palette and the state-to-color mappings the views use.

use crate::state::QueryView;
use ratatui::style::Color;

/// Neon-on-black palette.
#[derive(Debug, Clone)]
pub struct HoloTheme {
    pub bg_highlight: Color,
    pub primary: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl HoloTheme {
    pub fn holo() -> Self {
        Self {
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

/// Color of the status line for a query.
pub fn query_status_color(view: &QueryView, theme: &HoloTheme) -> Color {
    if view.error.is_some() {
        theme.error
    } else if view.is_fetching {
        theme.warning
    } else {
        theme.success
    }
}

pub fn favorite_color(favorite: bool, theme: &HoloTheme) -> Color {
    if favorite {
        theme.tertiary
    } else {
        theme.text_dim
    }
}

/// Hit-rate color: green when most queries are served from the cache.
pub fn hit_rate_color(rate: f64, theme: &HoloTheme) -> Color {
    if rate >= 0.5 {
        theme.success
    } else if rate >= 0.2 {
        theme.warning
    } else {
        theme.text_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_bands() {
        let theme = HoloTheme::holo();
        assert_eq!(hit_rate_color(0.9, &theme), theme.success);
        assert_eq!(hit_rate_color(0.3, &theme), theme.warning);
        assert_eq!(hit_rate_color(0.0, &theme), theme.text_dim);
    }

    #[test]
    fn test_favorite_marker_color() {
        let theme = HoloTheme::holo();
        assert_eq!(favorite_color(true, &theme), theme.tertiary);
        assert_eq!(favorite_color(false, &theme), theme.text_dim);
    }
}
