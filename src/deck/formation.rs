//! Formation names and the deck's formation state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{DeckError, DeckResult};

/// Instantaneous layouts produced by [`CardDeck::display`](super::CardDeck::display).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayKind {
    /// Two fanned piles, one per parity class.
    #[default]
    Cut,
    Left,
    Right,
    Middle,
    Light,
}

impl DisplayKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
            Self::Light => "light",
        }
    }
}

/// The arrangement the deck is in, or is moving to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    /// Per-card operations use this as the requested formation.
    #[default]
    None,
    Display(DisplayKind),
    Center,
    Regroup,
    Spread,
    Spreado,
    ReverseSpreado,
    LightSpreado,
    Snail,
    Fan,
    Unfan,
    Disperse,
    Roll,
    Cut,
    ShuffleOne,
    BigBanged,
    SendToGrid,
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Display(kind) => return write!(f, "display:{}", kind.name()),
            Self::Center => "center",
            Self::Regroup => "regroup",
            Self::Spread => "spread",
            Self::Spreado => "spreado",
            Self::ReverseSpreado => "reverseSpreado",
            Self::LightSpreado => "lightSpreado",
            Self::Snail => "snail",
            Self::Fan => "fan",
            Self::Unfan => "unfan",
            Self::Disperse => "disperse",
            Self::Roll => "roll",
            Self::Cut => "cut",
            Self::ShuffleOne => "shuffleOne",
            Self::BigBanged => "bigbanged",
            Self::SendToGrid => "sendToGrid",
        };
        f.write_str(name)
    }
}

/// Current formation plus the one still settling, if any.
///
/// Only one deck-wide formation can be in flight. Starting another before
/// the first settles is rejected instead of overlapping the animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationState {
    current: Formation,
    pending: Option<Formation>,
}

impl FormationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last formation that settled.
    #[must_use]
    pub fn current(&self) -> Formation {
        self.current
    }

    /// The formation still settling.
    #[must_use]
    pub fn pending(&self) -> Option<Formation> {
        self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fail if something is still settling.
    pub fn ensure_idle(&self, requested: Formation) -> DeckResult<()> {
        match self.pending {
            Some(active) => Err(DeckError::FormationPending { active, requested }),
            None => Ok(()),
        }
    }

    /// Mark `requested` as in flight.
    pub fn begin(&mut self, requested: Formation) -> DeckResult<()> {
        self.ensure_idle(requested)?;
        self.pending = Some(requested);
        Ok(())
    }

    /// `formation` has finished; it becomes current.
    pub fn settle(&mut self, formation: Formation) {
        if self.pending == Some(formation) {
            self.pending = None;
        }
        self.current = formation;
    }

    /// Forget any pending formation and return to `None`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
