//! Card texts, reading positions and image paths.
//!
//! The deck never depends on this data: formations only need card ids. The
//! presentation layer loads a [`CardData`] through a [`CardDataSource`] to
//! label cards and build interpretations, and falls back to
//! [`CardData::placeholder`] when the source is down.

pub mod record;
pub mod source;

pub use record::{CardData, CardRecord, ReadingResult};
pub use source::{parse_records, respond_cards, CardDataSource, JsonCardSource};
