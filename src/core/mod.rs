//! Core deck types: cards, RNG, configuration, errors.
//!
//! These are the building blocks every other module leans on. Hosts tune
//! decks through `DeckConfig` and `DeckParams` rather than by touching
//! formation code.

pub mod card;
pub mod config;
pub mod error;
pub mod rng;

pub use card::{Card, CardId, Property, Transform, TransformOrigin};
pub use config::{
    merge_json, Anchor, BigBangPositions, CutPositions, DeckConfig, DeckParams, DelayParams,
    DisplayPositions, GridLayout, PositionParams, RegroupPositions, Size, TimeParams,
    UniqPositions,
};
pub use error::{DataError, DeckError, DeckResult, LayoutError, LayoutResult, PresentationError};
pub use rng::{DeckRng, DeckRngState};
