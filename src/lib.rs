//! # tarot-deck
//!
//! Animation state engine for an interactive tarot card reading.
//!
//! ## Design Principles
//!
//! 1. **Renderer-Agnostic**: The deck computes target transforms and hands
//!    them to a `Scheduler`. Hosts render and report completions back.
//!
//! 2. **Completion, Not Time**: Formations settle when every card's tween
//!    is reported finished, in whatever order, never by elapsed time.
//!
//! 3. **Configuration Over Convention**: Timings, positions and grid
//!    layouts live in `DeckConfig` / `DeckParams` and can be patched at
//!    runtime from JSON.
//!
//! ## Architecture
//!
//! - **Two Lanes**: Parity piles animate on parallel lanes; a shared
//!   `ParallelCompletionGate` joins them.
//!
//! - **Modeled Transforms**: Relative deltas resolve against the deck's own
//!   model at submission, so schedulers only see absolute targets.
//!
//! - **Persistent Data Structures**: O(1) snapshots via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: Card ids and transforms, RNG, configuration, errors
//! - `layout`: Grid calculation and layout math
//! - `animation`: Tweens, easing, schedulers, completion gates
//! - `events`: Deck events and the event bus
//! - `deck`: The card deck, its formations and card operations
//! - `data`: Card texts, reading results and data sources
//! - `presentation`: Step-driven orchestration of a deck

pub mod core;
pub mod layout;
pub mod animation;
pub mod events;
pub mod deck;
pub mod data;
pub mod presentation;

// Re-export commonly used types
pub use crate::core::{
    Card, CardId, Property, Transform, TransformOrigin,
    DeckRng, DeckRngState,
    DeckConfig, DeckParams, GridLayout, Size,
    DataError, DeckError, DeckResult, LayoutError, LayoutResult, PresentationError,
};

pub use crate::layout::{
    compute_circle_grid, compute_matrix_grid, even_spacing, GridSlot, Point,
    LightSourceTracker, ShadowOffset, UniqueDrawTracker,
};

pub use crate::animation::{
    Ease, Lane, Placement, ParallelCompletionGate,
    RecordingScheduler, Scheduler, TransformPatch, Tween, TweenBatch, TweenId, TweenTarget,
};

pub use crate::events::{DeckEvent, EventBus, EventName, HandlerId};

pub use crate::deck::{CardDeck, DeckSnapshot, DisplayKind, Formation, FormationState};

pub use crate::data::{CardData, CardDataSource, CardRecord, JsonCardSource};

pub use crate::presentation::{
    DeckCommand, Phase, PresentationController, StepEntered, StepId, StepNavigator, StepPlan,
};
