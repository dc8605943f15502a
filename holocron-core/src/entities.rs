//! Catalog entity types.

use serde::{Deserialize, Serialize};

/// Anything with a stable identity inside a result list.
pub trait Identified {
    /// Identity used to find the entity in a cached list.
    fn identity(&self) -> &str;
}

/// A person as returned by the primary listing endpoint.
///
/// `films` holds resource URLs that still have to be dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub gender: String,
    #[serde(default)]
    pub films: Vec<String>,
}

/// A person with film references resolved to titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub gender: String,
    /// Film titles, in the order the summary referenced them.
    pub films: Vec<String>,
    /// Client-side flag, toggled optimistically.
    #[serde(default)]
    pub favorite: bool,
}

impl Person {
    /// Merge a summary with its resolved film titles.
    pub fn from_summary(summary: PersonSummary, films: Vec<String>) -> Self {
        Self {
            name: summary.name,
            height: summary.height,
            mass: summary.mass,
            gender: summary.gender,
            films,
            favorite: false,
        }
    }

    /// Row key used by list views.
    pub fn row_key(&self) -> String {
        format!("{}_{}", self.name, self.height)
    }

    /// Flip the favorite flag.
    pub fn toggle_favorite(&mut self) {
        self.favorite = !self.favorite;
    }
}

impl Identified for Person {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// Film resource; only the title is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
}

/// One page of the people listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeoplePage {
    #[serde(default)]
    pub results: Option<Vec<PersonSummary>>,
}

impl PeoplePage {
    /// Results, treating a missing array as empty.
    pub fn into_results(self) -> Vec<PersonSummary> {
        self.results.unwrap_or_default()
    }
}

/// Find an entity by identity and apply `f` to it.
///
/// Returns `false` when no entity matched.
pub fn update_by_identity<T, F>(items: &mut [T], identity: &str, f: F) -> bool
where
    T: Identified,
    F: FnOnce(&mut T),
{
    match items.iter_mut().find(|item| item.identity() == identity) {
        Some(item) => {
            f(item);
            true
        }
        None => false,
    }
}
