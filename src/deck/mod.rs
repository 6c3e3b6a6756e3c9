//! The card deck and its choreography.
//!
//! ## Key Features
//!
//! - **Formations**: deck-wide arrangements (center, fan, spread, cut, ...)
//!   built from staged tween batches on two parallel lanes
//! - **Card operations**: highlight, flips, grid placement, hover and click
//! - **Completion gates**: every formation settles exactly once, after all
//!   of its cards finish, whatever order the host reports them in
//! - **Formation guard**: a formation still settling blocks the next one
//!
//! ## Usage
//!
//! ```
//! use tarot_deck::animation::RecordingScheduler;
//! use tarot_deck::core::{CardId, DeckConfig};
//! use tarot_deck::deck::CardDeck;
//! use tarot_deck::layout::Point;
//!
//! let mut deck = CardDeck::new(DeckConfig::new(22), RecordingScheduler::new());
//! deck.shuffle_one().unwrap();
//! deck.run_to_idle().unwrap();
//!
//! deck.fan().unwrap();
//! deck.run_to_idle().unwrap();
//!
//! let slot = deck.draw_to_grid(CardId::new(7), Point::default()).unwrap();
//! assert_eq!(slot, 0);
//! ```

#[allow(clippy::module_inception)]
mod deck;
mod card_ops;
mod formation;
mod formations;

pub use deck::{CardDeck, DeckSnapshot};
pub use formation::{DisplayKind, Formation, FormationState};
