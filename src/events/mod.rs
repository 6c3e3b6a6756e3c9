//! Deck event system.
//!
//! The deck fires a [`DeckEvent`] when a formation settles or a card
//! operation finishes. Owners subscribe through the deck's [`EventBus`].

pub mod bus;
pub mod event;

pub use bus::{EventBus, Handler, HandlerId};
pub use event::{DeckEvent, EventName};
