//! Application state.

use crate::config::TuiConfig;
use crate::theme::HoloTheme;
use holocron_cache::{CacheEntry, CacheStats};
use holocron_core::{compute_window, max_scroll_offset, Person, ValidationError, Window};

/// The current query as the list renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryView {
    pub people: Vec<Person>,
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl QueryView {
    pub fn from_entry(entry: &CacheEntry<Vec<Person>>) -> Self {
        Self {
            people: entry.data.clone().unwrap_or_default(),
            is_fetching: entry.is_loading(),
            error: entry
                .error
                .as_ref()
                .filter(|_| entry.is_error())
                .map(ToString::to_string),
        }
    }
}

/// Names the user marked as favorite, in the order they were marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteNames {
    names: Vec<String>,
}

impl FavoriteNames {
    /// Add `name` if absent, remove it if present. Returns whether it is now present.
    pub fn toggle(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => {
                self.names.remove(idx);
                false
            }
            None => {
                self.names.push(name.to_string());
                true
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Selection and scroll position of the people list, in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListState {
    pub selected: usize,
    pub scroll_offset: u64,
}

impl ListState {
    fn clamp(&mut self, item_count: usize) {
        self.selected = self.selected.min(item_count.saturating_sub(1));
    }

    /// Scroll just enough to keep the selected item fully visible.
    fn follow_selection(&mut self, item_height: u64, viewport_height: u64, item_count: usize) {
        let top = self.selected as u64 * item_height;
        let bottom = top + item_height;
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + viewport_height {
            self.scroll_offset = bottom.saturating_sub(viewport_height);
        }
        self.scroll_offset = self
            .scroll_offset
            .min(max_scroll_offset(item_height, viewport_height, item_count));
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: HoloTheme,
    /// Text in the search box.
    pub input_value: String,
    /// Committed search term; the list shows its results.
    pub search: String,
    pub favorites: FavoriteNames,
    pub query: QueryView,
    pub list: ListState,
    /// Rows available to the list.
    pub viewport_height: u64,
    pub stats: CacheStats,
}

impl App {
    pub fn new(config: TuiConfig) -> Self {
        Self {
            config,
            theme: HoloTheme::holo(),
            input_value: String::new(),
            search: String::new(),
            favorites: FavoriteNames::default(),
            query: QueryView::default(),
            list: ListState::default(),
            viewport_height: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn set_input_value(&mut self, value: impl Into<String>) {
        self.input_value = value.into();
    }

    pub fn insert_char(&mut self, c: char) {
        self.input_value.push(c);
    }

    pub fn delete_char(&mut self) {
        self.input_value.pop();
    }

    pub fn clear_input(&mut self) {
        self.input_value.clear();
    }

    /// Make the input text the search. Returns `true` when the search changed.
    pub fn commit_search(&mut self) -> bool {
        if self.search == self.input_value {
            return false;
        }
        self.search = self.input_value.clone();
        self.query = QueryView::default();
        self.list = ListState::default();
        true
    }

    /// Apply a snapshot for `search`; snapshots for an older search are ignored.
    pub fn apply_query(&mut self, search: &str, view: QueryView) -> bool {
        if search != self.search {
            return false;
        }
        self.query = view;
        self.list.clamp(self.query.people.len());
        self.follow_selection();
        true
    }

    pub fn toggle_favorite_name(&mut self, name: &str) -> bool {
        self.favorites.toggle(name)
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.query.people.get(self.list.selected)
    }

    pub fn set_viewport_height(&mut self, rows: u64) {
        self.viewport_height = rows;
        self.follow_selection();
    }

    fn item_height(&self) -> u64 {
        self.config.list.item_height
    }

    /// Items that fit in the viewport, at least one.
    pub fn page_size(&self) -> usize {
        match self.item_height() {
            0 => 1,
            h => ((self.viewport_height / h) as usize).max(1),
        }
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(self.page_size() as isize);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(self.page_size() as isize));
    }

    pub fn select_first(&mut self) {
        self.list.selected = 0;
        self.follow_selection();
    }

    pub fn select_last(&mut self) {
        self.list.selected = self.query.people.len().saturating_sub(1);
        self.follow_selection();
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.query.people.len();
        if count == 0 {
            return;
        }
        self.list.selected = self.list.selected.saturating_add_signed(delta).min(count - 1);
        self.follow_selection();
    }

    fn follow_selection(&mut self) {
        let item_height = self.item_height();
        let count = self.query.people.len();
        self.list
            .follow_selection(item_height, self.viewport_height, count);
    }

    /// Items to render for the current scroll position.
    pub fn window(&self) -> Result<Window, ValidationError> {
        compute_window(
            self.list.scroll_offset,
            self.item_height(),
            self.viewport_height,
            self.query.people.len(),
            self.config.list.overscan,
        )
    }
}
