//! Reusable widget components.

pub mod detail;
pub mod person_card;
pub mod status;

pub use detail::DetailPanel;
pub use person_card::PersonCard;
pub use status::StatusLine;
