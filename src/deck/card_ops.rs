//! Single-card choreography, drawing, grid placement and pointer handling.
//!
//! Card operations start right away instead of queueing on a lane, and are
//! refused while a deck-wide formation is still settling. Each one fires its
//! `Card:*` event with the card id once its last tween completes.

use super::deck::{CardDeck, Entry, Settle};
use super::formation::Formation;
use crate::animation::{Ease, Placement, Scheduler, TransformPatch, TweenId, TweenProps, TweenTarget};
use crate::core::{CardId, DeckError, DeckResult, Property, TransformOrigin};
use crate::events::{DeckEvent, EventName};
use crate::layout::Point;

/// Angle at which a turning card shows its edge and the face swaps in.
const EDGE_ANGLE: f64 = 92.9;

/// Pivot pair and direction of a two-stage turn.
struct Turn {
    from: TransformOrigin,
    to: TransformOrigin,
    sign: f64,
}

fn sideways_turn(way: i32) -> Turn {
    if way >= 0 {
        Turn {
            from: TransformOrigin::new(100.0, 50.0),
            to: TransformOrigin::new(0.0, 50.0),
            sign: 1.0,
        }
    } else {
        Turn {
            from: TransformOrigin::new(0.0, 50.0),
            to: TransformOrigin::new(100.0, 50.0),
            sign: -1.0,
        }
    }
}

fn vertical_turn(way: i32) -> Turn {
    if way >= 0 {
        Turn {
            from: TransformOrigin::new(50.0, 0.0),
            to: TransformOrigin::CENTER_BOTTOM,
            sign: 1.0,
        }
    } else {
        Turn {
            from: TransformOrigin::CENTER_BOTTOM,
            to: TransformOrigin::new(50.0, 0.0),
            sign: -1.0,
        }
    }
}

impl<S: Scheduler> CardDeck<S> {
    /// Refuse card work while a formation settles; check the card exists.
    fn card_op(&self, card: CardId) -> DeckResult<()> {
        self.ensure_idle(Formation::None)?;
        self.require_card(card)?;
        Ok(())
    }

    /// Schedule one tween on `card` and fire `event` when it completes.
    fn animate_card(
        &mut self,
        card: CardId,
        props: TweenProps,
        event: EventName,
    ) -> DeckResult<TweenId> {
        let id = self.submit_one(Placement::Immediate, Entry::card(card, props))?;
        self.gate(&[id], Settle::Notify(DeckEvent::for_card(event, card)));
        self.run_settled()?;
        Ok(id)
    }

    // === Choreography ===

    /// Center the card, straighten it and widen it slightly.
    pub fn highlight(&mut self, card: CardId) -> DeckResult<()> {
        self.card_op(card)?;
        let width = self.require_card(card)?.transform.width;
        let props = self
            .props(self.config.params.times.highlight)
            .to(Property::Left, 50.0 - (width + 3.0) / 2.0)
            .to(Property::Z, 1.0)
            .shortest(Property::Rotation, 0.0)
            .to(Property::Width, width + 3.0);
        self.animate_card(card, props, EventName::Highlight)?;
        Ok(())
    }

    /// Squeeze the card to zero width, reveal its face, and stretch it back.
    pub fn flip(&mut self, card: CardId) -> DeckResult<()> {
        self.card_op(card)?;
        let (left, width) = {
            let t = &self.require_card(card)?.transform;
            (t.left, t.width)
        };
        let half = self.config.params.times.flip / 2.0;

        let squeeze = self
            .props(half)
            .to(Property::Left, 50.0)
            .to(Property::Width, 0.0);
        let first = self.submit_one(Placement::Immediate, Entry::card(card, squeeze))?;
        self.gate(&[first], Settle::Reveal(card));

        let stretch = self
            .props(half)
            .to(Property::Left, left)
            .to(Property::Width, width)
            .delay(half);
        self.animate_card(card, stretch, EventName::Flip)?;
        Ok(())
    }

    /// Slide the card off to the left.
    pub fn send_away(&mut self, card: CardId) -> DeckResult<()> {
        self.card_op(card)?;
        let times = &self.config.params.times;
        let props = self
            .props(times.send_away)
            .by(Property::Left, -150.0)
            .delay(times.delay_send_away);
        self.animate_card(card, props, EventName::SendAway)?;
        Ok(())
    }

    /// Glide the card to the reading position.
    pub fn nice_slide(&mut self, card: CardId) -> DeckResult<()> {
        self.card_op(card)?;
        let params = &self.config.params;
        let props = TweenProps::new(params.times.nice_slide)
            .to(Property::X, params.position.nice_slide.x)
            .to(Property::Y, params.position.nice_slide.y)
            .to(Property::Z, 1.0)
            .shortest(Property::Rotation, 0.0)
            .ease(Ease::Linear);
        self.animate_card(card, props, EventName::NiceSlide)?;
        Ok(())
    }

    /// Turn the card over sideways about its vertical edge.
    ///
    /// `way >= 0` pivots on the right edge and lands on the left one; a
    /// negative `way` mirrors it.
    pub fn nice_flip(&mut self, card: CardId, way: i32) -> DeckResult<()> {
        self.card_op(card)?;
        let turn = sideways_turn(way);
        let props = TweenProps::new(self.config.params.times.nice_flip / 2.0)
            .to(Property::RotationY, turn.sign * EDGE_ANGLE)
            .to(Property::Z, 1.0)
            .to(Property::ZIndex, 101.0)
            .origin(turn.from)
            .ease(Ease::InCubic);
        let id = self.submit_one(Placement::Immediate, Entry::card(card, props))?;
        self.gate(&[id], Settle::NiceFlipTurn { card, way });
        self.run_settled()
    }

    pub(crate) fn nice_flip_turn(&mut self, card: CardId, way: i32) -> DeckResult<()> {
        let turn = sideways_turn(way);
        self.reveal(card)?;

        let x = self.config.params.position.nice_slide.x + turn.sign * 100.0;
        self.set(
            TweenTarget::Card(card),
            TransformPatch::new()
                .with(Property::ScaleX, -1.0)
                .with(Property::X, x)
                .with_origin(turn.to),
        )?;

        let props = TweenProps::new(self.config.params.times.nice_flip / 2.0)
            .to(Property::RotationY, turn.sign * 180.0)
            .ease(Ease::OutCubic);
        let id = self.submit_one(Placement::Immediate, Entry::card(card, props))?;
        self.gate(&[id], Settle::Notify(DeckEvent::for_card(EventName::NiceFlip, card)));
        Ok(())
    }

    /// Turn the card over top to bottom about its horizontal edge.
    pub fn flip_on_itself(&mut self, card: CardId, way: i32) -> DeckResult<()> {
        self.card_op(card)?;
        let turn = vertical_turn(way);
        let props = TweenProps::new(self.config.params.times.flip_on_itself / 2.0)
            .to(Property::RotationX, turn.sign * EDGE_ANGLE)
            .to(Property::Z, 1.0)
            .origin(turn.from)
            .ease(Ease::InCubic);
        let id = self.submit_one(Placement::Immediate, Entry::card(card, props))?;
        self.gate(&[id], Settle::FlipOnItselfTurn { card, way });
        self.run_settled()
    }

    pub(crate) fn flip_on_itself_turn(&mut self, card: CardId, way: i32) -> DeckResult<()> {
        let turn = vertical_turn(way);
        self.reveal(card)?;

        // Moving the pivot to the opposite edge shifts the card by its height.
        let height = self.config.card_height();
        let (top, scale_x) = {
            let t = &self.require_card(card)?.transform;
            (t.top, t.scale_x)
        };
        self.set(
            TweenTarget::Card(card),
            TransformPatch::new()
                .with(Property::Top, top - turn.sign * height)
                .with(Property::ScaleY, -scale_x)
                .with_origin(turn.to),
        )?;

        let props = TweenProps::new(self.config.params.times.flip_on_itself / 2.0)
            .to(Property::RotationX, turn.sign * 180.0)
            .by(Property::Top, turn.sign * height)
            .ease(Ease::OutCubic);
        let id = self.submit_one(Placement::Immediate, Entry::card(card, props))?;
        self.gate(&[id], Settle::Notify(DeckEvent::for_card(EventName::FlipOnItself, card)));
        Ok(())
    }

    /// Raise the card to the single-card reading spot, then enlarge it.
    ///
    /// Fires `Card:uniQ:1` after the first stage and `Card:uniQ` at the end.
    pub fn uniq(&mut self, card: CardId) -> DeckResult<()> {
        self.card_op(card)?;
        let width = self.require_card(card)?.transform.width;
        let params = &self.config.params;
        let uniq = params.position.uni_q;
        let duration = params.times.uni_q;

        let raise = TweenProps::new(duration)
            .to(Property::Left, uniq.left)
            .to(Property::X, 0.0)
            .to(Property::Y, 0.0)
            .to(Property::Top, uniq.top1)
            .shortest(Property::Rotation, 0.0)
            .ease(Ease::Linear);
        self.animate_card(card, raise, EventName::UniQRaised)?;

        let enlarge = TweenProps::new(duration)
            .to(Property::Width, uniq.width)
            .to(Property::Left, uniq.left - (uniq.width - width) / 2.0)
            .to(Property::Top, uniq.top2)
            .delay(duration)
            .ease(Ease::Linear);
        self.animate_card(card, enlarge, EventName::UniQ)?;
        Ok(())
    }

    // === Drawing and the grid ===

    /// Move `card` from the undrawn pool to the end of the drawn sequence.
    ///
    /// Returns the card's grid slot.
    pub fn draw(&mut self, card: CardId) -> DeckResult<usize> {
        self.check_draw(card)?;
        self.card_mut(card)?.drawn = true;
        self.drawn.push_back(card);
        let slot = self.drawn.len() - 1;
        tracing::debug!(%card, slot, "card drawn");
        Ok(slot)
    }

    fn check_draw(&self, card: CardId) -> DeckResult<()> {
        let max = self.config.max_draught;
        let result = match self.require_card(card) {
            Err(err) => Err(err),
            Ok(c) if c.drawn => Err(DeckError::AlreadyDrawn(card)),
            Ok(_) if self.drawn.len() >= max => Err(DeckError::DrawLimitReached { max }),
            Ok(_) => Ok(()),
        };
        result.inspect_err(|err| tracing::warn!(%card, error = %err, "draw rejected"))
    }

    /// Fail unless the grid for `origin` has a slot `index`.
    fn check_grid_slot(&mut self, index: usize, origin: Point) -> DeckResult<()> {
        let len = self.grid_for(origin)?.len();
        if index >= len {
            return Err(DeckError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Draw `card` and send it to its grid slot.
    ///
    /// Nothing changes when the card cannot be drawn or the grid has no
    /// slot for it.
    pub fn draw_to_grid(&mut self, card: CardId, origin: Point) -> DeckResult<usize> {
        self.card_op(card)?;
        self.check_draw(card)?;
        let next = self.drawn.len();
        self.check_grid_slot(next, origin)?;
        let slot = self.draw(card)?;
        self.send_to_grid(card, Some(slot), origin, Placement::Immediate)?;
        Ok(slot)
    }

    /// Move `card` to grid slot `slot`, computing the grid for `origin` if
    /// it is not cached.
    ///
    /// With no slot, a drawn card goes to its draw position and an undrawn
    /// one to the next free slot.
    pub fn send_to_grid(
        &mut self,
        card: CardId,
        slot: Option<usize>,
        origin: Point,
        placement: Placement,
    ) -> DeckResult<()> {
        self.ensure_idle(Formation::SendToGrid)?;
        self.require_card(card)?;
        let index = slot.unwrap_or_else(|| {
            self.drawn
                .iter()
                .position(|&id| id == card)
                .unwrap_or(self.drawn.len())
        });

        let (id, rotate) = self.send_to_grid_tween(card, index, origin, placement)?;
        self.gate(&[id], Settle::SentToGrid { card, rotate });
        self.run_settled()
    }

    /// Submit the grid tween of `card`. Returns it with the slot rotation.
    pub(crate) fn send_to_grid_tween(
        &mut self,
        card: CardId,
        index: usize,
        origin: Point,
        placement: Placement,
    ) -> DeckResult<(TweenId, Option<f64>)> {
        let grid = self.grid_for(origin)?;
        let slot = grid
            .get(index)
            .copied()
            .ok_or(DeckError::IndexOutOfRange { index, len: grid.len() })?;

        let times = &self.config.params.times;
        let delay = if index == 0 && times.delay_send_to_grid < 0.0 {
            0.0
        } else {
            times.delay_send_to_grid
        };
        let props = self
            .props(times.send_to_grid)
            .to(Property::X, 0.0)
            .to(Property::Y, 0.0)
            .to(Property::Left, slot.left)
            .to(Property::Top, slot.top)
            .delay(delay);

        tracing::trace!(%card, index, left = slot.left, top = slot.top, "sending to grid");
        let id = self.submit_one(placement, Entry::card(card, props))?;
        Ok((id, slot.rotate))
    }

    /// Draw a random undrawn card and send it to its grid slot.
    ///
    /// Uses the origin of the cached grid. Fires `Card:sendToGrid` and then
    /// `Deck:handleLastCard` when the card lands.
    pub fn handle_last_card(&mut self) -> DeckResult<CardId> {
        self.ensure_idle(Formation::SendToGrid)?;
        let undrawn = self.undrawn_cards();
        let card = *self.rng.choose(&undrawn).ok_or(DeckError::NoCardsLeft)?;
        self.check_draw(card)?;
        let origin = self.grid_origin().unwrap_or_default();
        let next = self.drawn.len();
        self.check_grid_slot(next, origin)?;

        let slot = self.draw(card)?;
        self.set(
            TweenTarget::Card(card),
            TransformPatch::new().with(Property::ZIndex, 10.0),
        )?;

        let (id, rotate) = self.send_to_grid_tween(card, slot, origin, Placement::Immediate)?;
        self.gate(&[id], Settle::SentToGrid { card, rotate });
        self.gate(&[id], Settle::Notify(DeckEvent::for_card(EventName::HandleLastCard, card)));
        self.run_settled()?;
        Ok(card)
    }

    /// Recompute the grid for `origin` and move every drawn card onto it.
    ///
    /// Fires `Card:recenterGrid` per card as it is sent, `Card:sendToGrid`
    /// per card as it lands, and `Deck:centerGrid` once all have landed.
    #[tracing::instrument(skip(self))]
    pub fn center_grid(&mut self, origin: Point) -> DeckResult<()> {
        self.ensure_idle(Formation::SendToGrid)?;
        self.invalidate_grid();

        let drawn = self.drawn();
        if let Some(last) = drawn.len().checked_sub(1) {
            self.check_grid_slot(last, origin)?;
        }
        let mut ids = Vec::with_capacity(drawn.len());
        for (index, &card) in drawn.iter().enumerate() {
            let (id, rotate) = self.send_to_grid_tween(card, index, origin, Placement::Immediate)?;
            self.gate(&[id], Settle::SentToGrid { card, rotate });
            self.fire(DeckEvent::for_card(EventName::RecenterGrid, card).with_slot(index));
            ids.push(id);
        }

        self.gate(&ids, Settle::Notify(DeckEvent::new(EventName::CenterGrid)));
        self.run_settled()
    }

    /// Return every card to the undrawn pool, face down.
    pub fn reset_cards(&mut self) -> DeckResult<()> {
        self.ensure_idle(Formation::None)?;
        let face_up: Vec<CardId> = self
            .cards
            .iter()
            .filter(|card| card.face_up)
            .map(|card| card.id)
            .collect();

        for card in self.cards.iter_mut() {
            card.drawn = false;
            card.face_up = false;
        }
        self.drawn.clear();
        for card in face_up {
            self.scheduler.reveal(card, false);
        }
        tracing::debug!("cards reset");
        Ok(())
    }

    /// Hide `ids`, or every card except `ids` when `exclude` is set.
    ///
    /// Hidden cards stay in the deck. Returns how many were hidden.
    pub fn remove_cards(&mut self, ids: &[CardId], exclude: bool) -> DeckResult<usize> {
        for &id in ids {
            self.require_card(id)?;
        }
        let targets: Vec<CardId> = self
            .cards
            .iter()
            .filter(|card| ids.contains(&card.id) != exclude && !card.hidden)
            .map(|card| card.id)
            .collect();

        for &card in &targets {
            self.card_mut(card)?.hidden = true;
            self.scheduler.set_visible(card, false);
        }
        Ok(targets.len())
    }

    /// Drop `cards` out of view. Fires `Deck:moveCardsAway`.
    pub fn move_cards_away(&mut self, cards: &[CardId]) -> DeckResult<()> {
        self.ensure_idle(Formation::None)?;
        let props = self
            .props(self.config.params.times.move_away)
            .to(Property::Y, 300.0)
            .to(Property::Z, 2.0);
        let entries = cards.iter().map(|&card| Entry::card(card, props.clone())).collect();
        let ids = self.submit(Placement::Immediate, entries)?;

        let event = DeckEvent::new(EventName::MoveCardsAway).with_cards(cards);
        self.gate(&ids, Settle::Notify(event));
        self.run_settled()
    }

    // === Pointer ===

    /// Record resting positions for hover and stack `cards` in depth.
    ///
    /// `None` arms every undrawn card.
    pub fn arm_hover(&mut self, cards: Option<&[CardId]>) -> DeckResult<()> {
        let cards = match cards {
            Some(cards) => cards.to_vec(),
            None => self.undrawn_cards(),
        };
        for (i, &card) in cards.iter().enumerate() {
            let c = self.card_mut(card)?;
            c.rest_y = Some(c.transform.y);
            self.set(
                TweenTarget::Card(card),
                TransformPatch::new().with(Property::Z, i as f64 / 100.0),
            )?;
        }
        Ok(())
    }

    /// Lift `card` while the pointer is over it; drop it back on leave.
    ///
    /// In a fan the pivot moves with the card so it rises along its own axis.
    pub fn hover(&mut self, card: CardId, entering: bool) -> DeckResult<()> {
        self.card_op(card)?;
        let c = self.require_card(card)?;
        let rest = c.rest_y.unwrap_or(c.transform.y);

        let params = &self.config.params;
        let lift = if entering { params.fan_hover_top } else { 0.0 };
        let mut patch = TransformPatch::new().with(Property::Y, rest - lift);
        if self.formation.current() == Formation::Fan {
            patch = patch.with_origin(TransformOrigin::center_at(params.fan_origin + lift));
        }
        self.set(TweenTarget::Card(card), patch)
    }

    /// Report a click on `card`, tagged with the card's class if any.
    ///
    /// A lifted card drops back before `Card:click` fires.
    pub fn click(&mut self, card: CardId, class: Option<&str>) -> DeckResult<()> {
        let c = self.require_card(card)?;
        if c.rest_y.is_some() && !self.formation.is_pending() {
            self.hover(card, false)?;
        }
        self.fire(DeckEvent::for_card(EventName::CardClick(class.map(String::from)), card));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::RecordingScheduler;
    use crate::core::{DeckConfig, GridLayout};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn deck(n: usize) -> CardDeck<RecordingScheduler> {
        CardDeck::new(DeckConfig::new(n), RecordingScheduler::new())
    }

    fn record(deck: &mut CardDeck<RecordingScheduler>, name: EventName) -> Rc<RefCell<Vec<DeckEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        deck.on(name, move |e| l.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn test_highlight_fires_with_card() {
        let mut deck = deck(3);
        let log = record(&mut deck, EventName::Highlight);
        deck.highlight(CardId::new(2)).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].card(), Some(CardId::new(2)));
        let t = &deck.card(CardId::new(2)).unwrap().transform;
        assert_eq!(t.width, 22.0);
        assert_eq!(t.left, 50.0 - 11.0);
    }

    #[test]
    fn test_flip_reveals_at_midpoint() {
        let mut deck = deck(1);
        let card = CardId::new(1);
        deck.flip(card).unwrap();

        let first = deck.scheduler_mut().pop_next().unwrap();
        assert!(!deck.card(card).unwrap().face_up);
        deck.complete(first.tween.id).unwrap();
        assert!(deck.card(card).unwrap().face_up);
        assert_eq!(deck.scheduler().faces(), &[(card, true)]);

        deck.run_to_idle().unwrap();
        assert_eq!(deck.card(card).unwrap().transform.width, 19.0);
    }

    #[test]
    fn test_send_away_is_relative() {
        let mut deck = deck(1);
        deck.send_away(CardId::new(1)).unwrap();
        deck.send_away(CardId::new(1)).unwrap();
        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.left, -300.0);
    }

    #[test]
    fn test_nice_flip_mirrors_card() {
        let mut deck = deck(1);
        let card = CardId::new(1);
        let log = record(&mut deck, EventName::NiceFlip);
        deck.nice_flip(card, 1).unwrap();
        deck.run_to_idle().unwrap();

        let c = deck.card(card).unwrap();
        assert!(c.face_up);
        assert_eq!(c.transform.rotation_y, 180.0);
        assert_eq!(c.transform.scale_x, -1.0);
        assert_eq!(c.transform.origin, TransformOrigin::new(0.0, 50.0));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_flip_on_itself_keeps_top() {
        let mut deck = deck(1);
        let card = CardId::new(1);
        deck.flip_on_itself(card, -1).unwrap();
        deck.run_to_idle().unwrap();

        let c = deck.card(card).unwrap();
        assert_eq!(c.transform.rotation_x, -180.0);
        assert!(c.transform.top.abs() < 1e-9);
        assert_eq!(c.transform.scale_y, -1.0);
    }

    #[test]
    fn test_uniq_fires_both_stages_in_order() {
        let mut deck = deck(1);
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [EventName::UniQRaised, EventName::UniQ] {
            let l = Rc::clone(&log);
            deck.on(name, move |e| l.borrow_mut().push(e.name.to_string()));
        }
        deck.uniq(CardId::new(1)).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(*log.borrow(), vec!["Card:uniQ:1", "Card:uniQ"]);
        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.left, 41.0 - 8.0);
    }

    #[test]
    fn test_draw_cap_and_duplicates() {
        let mut deck = CardDeck::new(DeckConfig::new(5).with_max_draught(2), RecordingScheduler::new());
        assert_eq!(deck.draw(CardId::new(3)), Ok(0));
        assert_eq!(deck.draw(CardId::new(3)), Err(DeckError::AlreadyDrawn(CardId::new(3))));
        assert_eq!(deck.draw(CardId::new(1)), Ok(1));
        assert_eq!(deck.draw(CardId::new(2)), Err(DeckError::DrawLimitReached { max: 2 }));
        assert_eq!(deck.drawn(), vec![CardId::new(3), CardId::new(1)]);
        assert_eq!(deck.undrawn_cards().len(), 3);
    }

    #[test]
    fn test_send_to_grid_out_of_range() {
        let mut deck = deck(5);
        let err = deck
            .send_to_grid(CardId::new(1), Some(7), Point::default(), Placement::Immediate)
            .unwrap_err();
        assert_eq!(err, DeckError::IndexOutOfRange { index: 7, len: 5 });
    }

    #[test]
    fn test_send_to_grid_applies_slot_rotation() {
        let mut deck = CardDeck::new(
            DeckConfig::new(4).with_layout(GridLayout::Circle {
                center: Point::new(50.0, 50.0),
                radius: 20.0,
                start: 0.0,
            }),
            RecordingScheduler::new(),
        );
        let log = record(&mut deck, EventName::SendToGrid);
        deck.draw_to_grid(CardId::new(2), Point::default()).unwrap();
        deck.draw_to_grid(CardId::new(4), Point::default()).unwrap();
        deck.run_to_idle().unwrap();

        let c4 = &deck.card(CardId::new(4)).unwrap().transform;
        assert_eq!(c4.rotation, 120.0);
        assert_eq!(c4.origin, TransformOrigin::CENTER_BOTTOM);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(deck.formation().current(), Formation::SendToGrid);
    }

    #[test]
    fn test_handle_last_card_events_in_order() {
        let mut deck = deck(3);
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [EventName::SendToGrid, EventName::HandleLastCard] {
            let l = Rc::clone(&log);
            deck.on(name, move |e| l.borrow_mut().push(e.name.clone()));
        }
        deck.draw(CardId::new(1)).unwrap();
        deck.draw(CardId::new(2)).unwrap();

        let card = deck.handle_last_card().unwrap();
        assert_eq!(card, CardId::new(3));
        deck.run_to_idle().unwrap();
        assert_eq!(*log.borrow(), vec![EventName::SendToGrid, EventName::HandleLastCard]);
        assert_eq!(deck.handle_last_card(), Err(DeckError::NoCardsLeft));
    }

    #[test]
    fn test_center_grid_events() {
        let mut deck = deck(6);
        let recentered = record(&mut deck, EventName::RecenterGrid);
        let centered = record(&mut deck, EventName::CenterGrid);
        deck.draw(CardId::new(4)).unwrap();
        deck.draw(CardId::new(2)).unwrap();

        deck.center_grid(Point::new(5.0, 0.0)).unwrap();
        assert_eq!(recentered.borrow().len(), 2);
        assert_eq!(recentered.borrow()[1].slot, Some(1));
        assert_eq!(centered.borrow().len(), 0);

        deck.run_to_idle().unwrap();
        assert_eq!(centered.borrow().len(), 1);
        assert_eq!(deck.grid_origin(), Some(Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_reset_and_remove_cards() {
        let mut deck = deck(4);
        deck.draw(CardId::new(1)).unwrap();
        deck.reveal(CardId::new(1)).unwrap();
        deck.reset_cards().unwrap();
        assert!(deck.drawn().is_empty());
        assert!(deck.cards().all(|c| !c.face_up && !c.drawn));

        assert_eq!(deck.remove_cards(&[CardId::new(2)], true).unwrap(), 3);
        assert!(!deck.card(CardId::new(2)).unwrap().hidden);
        assert_eq!(deck.scheduler().visibility().len(), 3);
        assert_eq!(deck.remove_cards(&[CardId::new(9)], false), Err(DeckError::UnknownCard(CardId::new(9))));
    }

    #[test]
    fn test_move_cards_away() {
        let mut deck = deck(3);
        let log = record(&mut deck, EventName::MoveCardsAway);
        deck.move_cards_away(&[CardId::new(1), CardId::new(3)]).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(log.borrow()[0].cards.as_slice(), &[CardId::new(1), CardId::new(3)]);
        assert_eq!(deck.card(CardId::new(3)).unwrap().transform.y, 300.0);
    }

    #[test]
    fn test_hover_in_fan_moves_pivot() {
        let mut deck = deck(3);
        deck.fan().unwrap();
        deck.run_to_idle().unwrap();
        deck.arm_hover(None).unwrap();

        let card = CardId::new(2);
        let rest = deck.card(card).unwrap().transform.y;
        deck.hover(card, true).unwrap();
        let t = &deck.card(card).unwrap().transform;
        assert_eq!(t.y, rest - 1.0);
        assert_eq!(t.origin, TransformOrigin::center_at(201.0));

        deck.hover(card, false).unwrap();
        assert_eq!(deck.card(card).unwrap().transform.y, rest);
    }

    #[test]
    fn test_click_with_class() {
        let mut deck = deck(2);
        let log = record(&mut deck, EventName::CardClick(Some("cut".into())));
        deck.click(CardId::new(1), Some("cut")).unwrap();
        assert_eq!(log.borrow()[0].to_string(), "Card:click.cut [card_1]");
    }

    #[test]
    fn test_card_ops_rejected_during_formation() {
        let mut deck = deck(3);
        deck.center(false).unwrap();
        assert!(matches!(
            deck.highlight(CardId::new(1)),
            Err(DeckError::FormationPending { requested: Formation::None, .. })
        ));
    }
}
