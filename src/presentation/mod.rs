//! Presentation orchestration.
//!
//! A host-side navigator moves between steps and reports each step it
//! enters. The [`PresentationController`] maps steps to [`StepPlan`]s and
//! runs their [`DeckCommand`]s against the deck, one completion event at a
//! time, pausing for the user's cut and draw clicks.
//!
//! ## Usage
//!
//! ```
//! use tarot_deck::animation::RecordingScheduler;
//! use tarot_deck::core::DeckConfig;
//! use tarot_deck::deck::{CardDeck, Formation};
//! use tarot_deck::presentation::{
//!     DeckCommand, PresentationController, StepEntered, StepId, StepNavigator, StepPlan,
//! };
//!
//! struct Slides;
//!
//! impl StepNavigator for Slides {
//!     fn goto(&mut self, _step: &StepId, _duration_ms: u64) -> bool { true }
//!     fn next(&mut self) -> bool { true }
//!     fn prev(&mut self) -> bool { true }
//! }
//!
//! let deck = CardDeck::new(DeckConfig::new(22), RecordingScheduler::new());
//! let mut ctl = PresentationController::new(deck, Slides).with_plan(
//!     "shuffle",
//!     StepPlan::new(vec![DeckCommand::ShuffleOne, DeckCommand::Fan]),
//! );
//!
//! ctl.step_entered(&StepEntered::first("shuffle")).unwrap();
//! while let Some(done) = ctl.deck_mut().scheduler_mut().pop_next() {
//!     ctl.tween_completed(done.tween.id).unwrap();
//! }
//! assert_eq!(ctl.deck().formation().current(), Formation::Fan);
//! ```

pub mod controller;
pub mod step;

pub use controller::{Phase, PresentationController, PresentationResult};
pub use step::{DeckCommand, StepEntered, StepId, StepNavigator, StepPlan};
