//! Named deck and card events.
//!
//! Event names render to the `Deck:*` / `Card:*` strings presentation
//! scripts listen for, so a host bridging to a scripting layer can forward
//! `event.name.to_string()` unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::CardId;

/// Every event a deck can fire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    // === Deck formations ===
    Display,
    Center,
    Regroup,
    Spread,
    /// Optional caller tag, rendered as `Deck:spreado:<tag>`.
    Spreado(Option<u32>),
    ReverseSpreado,
    LightSpreado,
    Roll,
    BigBang,
    Snail,
    Fan,
    Unfan,
    Disperse,
    ShuffleOne,
    Cut,

    // === Deck bookkeeping ===
    HandleLastCard,
    CenterGrid,
    MoveCardsAway,

    // === Card operations ===
    /// Optional class of the clicked card, rendered as `Card:click.<class>`.
    CardClick(Option<String>),
    Highlight,
    Flip,
    SendAway,
    NiceSlide,
    NiceFlip,
    FlipOnItself,
    /// First stage of the uniQ presentation.
    UniQRaised,
    UniQ,
    SendToGrid,
    RecenterGrid,
}

impl EventName {
    /// Is this a `Deck:*` event?
    #[must_use]
    pub fn is_deck(&self) -> bool {
        !self.is_card()
    }

    /// Is this a `Card:*` event?
    #[must_use]
    pub fn is_card(&self) -> bool {
        matches!(
            self,
            Self::CardClick(_)
                | Self::Highlight
                | Self::Flip
                | Self::SendAway
                | Self::NiceSlide
                | Self::NiceFlip
                | Self::FlipOnItself
                | Self::UniQRaised
                | Self::UniQ
                | Self::SendToGrid
                | Self::RecenterGrid
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Display => "Deck:display",
            Self::Center => "Deck:center",
            Self::Regroup => "Deck:regroup",
            Self::Spread => "Deck:spread",
            Self::Spreado(None) => "Deck:spreado",
            Self::Spreado(Some(tag)) => return write!(f, "Deck:spreado:{tag}"),
            Self::ReverseSpreado => "Deck:reverseSpreado",
            Self::LightSpreado => "Deck:lightSpreado",
            Self::Roll => "Deck:roll",
            Self::BigBang => "Deck:bigBang",
            Self::Snail => "Deck:snail",
            Self::Fan => "Deck:fan",
            Self::Unfan => "Deck:unfan",
            Self::Disperse => "Deck:disperse",
            Self::ShuffleOne => "Deck:shuffleOne",
            Self::Cut => "Deck:cut",
            Self::HandleLastCard => "Deck:handleLastCard",
            Self::CenterGrid => "Deck:centerGrid",
            Self::MoveCardsAway => "Deck:moveCardsAway",
            Self::CardClick(None) => "Card:click",
            Self::CardClick(Some(class)) => return write!(f, "Card:click.{class}"),
            Self::Highlight => "Card:highlight",
            Self::Flip => "Card:flip",
            Self::SendAway => "Card:sendAway",
            Self::NiceSlide => "Card:niceSlide",
            Self::NiceFlip => "Card:niceFlip",
            Self::FlipOnItself => "Card:flipOnItself",
            Self::UniQRaised => "Card:uniQ:1",
            Self::UniQ => "Card:uniQ",
            Self::SendToGrid => "Card:sendToGrid",
            Self::RecenterGrid => "Card:recenterGrid",
        };
        f.write_str(name)
    }
}

/// A fired event: its name and the ids of the cards involved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEvent {
    pub name: EventName,
    pub cards: SmallVec<[CardId; 2]>,
    /// Grid slot, for `Card:recenterGrid`.
    pub slot: Option<usize>,
}

impl DeckEvent {
    /// Event without a card payload.
    #[must_use]
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            cards: SmallVec::new(),
            slot: None,
        }
    }

    /// Event about a single card.
    #[must_use]
    pub fn for_card(name: EventName, card: CardId) -> Self {
        Self::new(name).with_card(card)
    }

    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.cards.push(card);
        self
    }

    #[must_use]
    pub fn with_cards(mut self, cards: &[CardId]) -> Self {
        self.cards.extend_from_slice(cards);
        self
    }

    #[must_use]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// First card of the payload.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        self.cards.first().copied()
    }
}

impl fmt::Display for DeckEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.cards.is_empty() {
            let ids: Vec<String> = self.cards.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", ids.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_render() {
        assert_eq!(EventName::Center.to_string(), "Deck:center");
        assert_eq!(EventName::Spreado(None).to_string(), "Deck:spreado");
        assert_eq!(EventName::Spreado(Some(3)).to_string(), "Deck:spreado:3");
        assert_eq!(EventName::UniQRaised.to_string(), "Card:uniQ:1");
        assert_eq!(EventName::CardClick(None).to_string(), "Card:click");
        assert_eq!(EventName::CardClick(Some("cut".into())).to_string(), "Card:click.cut");
    }

    #[test]
    fn test_event_kind() {
        assert!(EventName::Cut.is_deck());
        assert!(EventName::SendToGrid.is_card());
        assert!(!EventName::CenterGrid.is_card());
    }

    #[test]
    fn test_event_payload() {
        let event = DeckEvent::for_card(EventName::RecenterGrid, CardId::new(4)).with_slot(1);
        assert_eq!(event.card(), Some(CardId::new(4)));
        assert_eq!(event.slot, Some(1));
        assert_eq!(event.to_string(), "Card:recenterGrid [card_4]");
    }
}
