//! Steps, the navigator seam, and the commands a step runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::CardId;
use crate::deck::DisplayKind;
use crate::events::EventName;
use crate::layout::Point;

/// Identifier of a presentation step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification that the navigator entered a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntered {
    pub step: StepId,
    /// The step was visited before in this session.
    pub is_reentry: bool,
}

impl StepEntered {
    pub fn first(step: impl Into<String>) -> Self {
        Self {
            step: StepId::new(step),
            is_reentry: false,
        }
    }

    pub fn again(step: impl Into<String>) -> Self {
        Self {
            step: StepId::new(step),
            is_reentry: true,
        }
    }
}

/// Moves the viewport between steps. Implemented by the host.
pub trait StepNavigator {
    /// Go to `step` over `duration_ms`. Returns `false` if there is no such
    /// step.
    fn goto(&mut self, step: &StepId, duration_ms: u64) -> bool;

    fn next(&mut self) -> bool;

    fn prev(&mut self) -> bool;
}

/// One thing a step asks of the deck or the navigator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DeckCommand {
    Display(DisplayKind),
    Center { rotate: bool },
    Regroup,
    RegroupRotate,
    Spread,
    Spreado(Option<u32>),
    ReverseSpreado,
    LightSpreado { random: bool },
    Roll { way: f64, angle: f64 },
    BigBang { radius: f64, rotation: f64 },
    Snail,
    Fan,
    Unfan,
    Disperse,
    ShuffleOne,
    CenterGrid(Point),
    HandleLastCard,
    MoveCardsAway(Vec<CardId>),
    ResetCards,
    /// Record hover resting positions of the undrawn cards.
    ArmHover,
    SetParams(serde_json::Value),
    /// Stop until the user clicks the card to cut at.
    AwaitCut,
    /// Stop until the user has drawn up to the draw limit.
    AwaitDraws,
    /// Move the navigator to the next step.
    Advance,
    Goto(StepId),
}

impl DeckCommand {
    /// The event that marks this command finished, if it completes
    /// asynchronously.
    #[must_use]
    pub fn completion(&self) -> Option<EventName> {
        let name = match self {
            Self::Center { .. } => EventName::Center,
            Self::Regroup | Self::RegroupRotate => EventName::Regroup,
            Self::Spread => EventName::Spread,
            Self::Spreado(tag) => EventName::Spreado(*tag),
            Self::ReverseSpreado => EventName::ReverseSpreado,
            Self::LightSpreado { .. } => EventName::LightSpreado,
            Self::Roll { .. } => EventName::Roll,
            Self::BigBang { .. } => EventName::BigBang,
            Self::Snail => EventName::Snail,
            Self::Fan => EventName::Fan,
            Self::Unfan => EventName::Unfan,
            Self::Disperse => EventName::Disperse,
            Self::ShuffleOne => EventName::ShuffleOne,
            Self::CenterGrid(_) => EventName::CenterGrid,
            Self::HandleLastCard => EventName::HandleLastCard,
            Self::MoveCardsAway(_) => EventName::MoveCardsAway,
            Self::Display(_)
            | Self::ResetCards
            | Self::ArmHover
            | Self::SetParams(_)
            | Self::AwaitCut
            | Self::AwaitDraws
            | Self::Advance
            | Self::Goto(_) => return None,
        };
        Some(name)
    }
}

/// Commands a step runs on its first visit and on later visits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepPlan {
    pub on_enter: Vec<DeckCommand>,
    pub on_reenter: Vec<DeckCommand>,
}

impl StepPlan {
    /// Same commands on every visit.
    #[must_use]
    pub fn new(commands: Vec<DeckCommand>) -> Self {
        Self {
            on_reenter: commands.clone(),
            on_enter: commands,
        }
    }

    #[must_use]
    pub fn with_reentry(mut self, commands: Vec<DeckCommand>) -> Self {
        self.on_reenter = commands;
        self
    }

    #[must_use]
    pub fn commands(&self, is_reentry: bool) -> &[DeckCommand] {
        if is_reentry {
            &self.on_reenter
        } else {
            &self.on_enter
        }
    }
}
