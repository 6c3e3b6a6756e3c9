//! Deck-wide formations.
//!
//! Every formation follows the same shape: pick the cards, mark the
//! formation pending, submit its stages, and gate on the tweens that finish
//! each card. The gate settles the formation and fires its `Deck:*` event.
//! A formation over zero cards settles immediately.

use std::f64::consts::PI;

use super::deck::{stagger, CardDeck, Entry, Settle};
use super::formation::{DisplayKind, Formation};
use crate::animation::{Ease, Lane, Placement, Scheduler, TransformPatch, TweenProps, TweenTarget};
use crate::core::{CardId, DeckResult, Property, TransformOrigin};
use crate::events::{DeckEvent, EventName};

pub(crate) const PRIMARY: Placement = Placement::Lane(Lane::Primary);
pub(crate) const SECONDARY: Placement = Placement::Lane(Lane::Secondary);

impl<S: Scheduler> CardDeck<S> {
    /// Lay the undrawn cards out instantly.
    pub fn display(&mut self, kind: DisplayKind) -> DeckResult<()> {
        let formation = Formation::Display(kind);
        self.ensure_idle(formation)?;

        let cards = self.undrawn_cards();
        let display = self.config.params.position.display.clone();
        let light_step = self.config.params.light_rotation_step;
        let middle_x = {
            let card_px = self.config.card_width_px();
            if card_px > 0.0 {
                (self.config.container.width / 2.0 - card_px / 2.0) / card_px * 100.0
            } else {
                0.0
            }
        };

        for (i, &card) in cards.iter().enumerate() {
            let fi = i as f64;
            let even = i % 2 == 0;
            let base = TransformPatch::new().with(Property::ZIndex, fi);
            let patch = match kind {
                DisplayKind::Cut => {
                    let (left, rotation, origin) = if even {
                        (display.cut.left, 10.0 - fi, TransformOrigin::RIGHT_BOTTOM)
                    } else {
                        (display.cut.left2, fi - 10.0, TransformOrigin::LEFT_BOTTOM)
                    };
                    base.with(Property::Top, display.top)
                        .with(Property::Left, left)
                        .with(Property::Rotation, rotation)
                        .with_origin(origin)
                }
                DisplayKind::Left => base
                    .with(Property::Y, display.y)
                    .with(Property::X, display.left.x)
                    .with(Property::Rotation, 10.0 - fi / 2.0)
                    .with_origin(TransformOrigin::RIGHT_BOTTOM),
                DisplayKind::Right => base
                    .with(Property::Y, display.y)
                    .with(Property::X, display.right.x)
                    .with(Property::Rotation, fi / 2.0 + 10.0)
                    .with_origin(TransformOrigin::LEFT_BOTTOM),
                DisplayKind::Middle => base
                    .with(Property::X, middle_x)
                    .with(Property::Y, display.middle.y),
                DisplayKind::Light => base
                    .with(Property::Y, display.y)
                    .with(Property::X, display.light.x)
                    .with(Property::Rotation, fi * light_step)
                    .with_origin(TransformOrigin::RIGHT_BOTTOM),
            };
            self.set(TweenTarget::Card(card), patch)?;
        }

        self.formation.settle(formation);
        tracing::debug!(%formation, cards = cards.len(), "display set");
        self.fire(DeckEvent::new(EventName::Display));
        Ok(())
    }

    /// Gather the undrawn cards at the center, one after another.
    pub fn center(&mut self, rotate: bool) -> DeckResult<()> {
        let cards = self.undrawn_cards();
        self.begin(Formation::Center, cards.len())?;

        let params = self.config.params.clone();
        let mut props = self
            .props(params.times.center)
            .to(Property::X, params.position.center.x)
            .to(Property::Y, params.position.center.y)
            .to(Property::Z, 2.0)
            .delay(params.delay.center);
        if rotate {
            props = props.shortest(Property::Rotation, 0.0);
        }

        let ids = self.submit(PRIMARY, stagger(&cards, &props, params.times.stagger_interval))?;
        self.gate(&ids, Settle::Formation(Formation::Center, EventName::Center));
        self.run_settled()
    }

    /// Slide both parity piles to the regroup column, then straighten them.
    pub fn regroup(&mut self) -> DeckResult<()> {
        let params = self.config.params.clone();
        let slide = self
            .props(params.times.regroup)
            .to(Property::Left, params.position.regroup.left)
            .delay(params.delay.regroup);
        let straighten = self
            .props(params.times.regroup)
            .shortest(Property::Rotation, 0.0);
        self.two_lane_regroup(slide, straighten)
    }

    /// Spin both parity piles by the regroup rotation, then straighten them into
    /// the regroup column.
    pub fn regroup_rotate(&mut self) -> DeckResult<()> {
        let params = self.config.params.clone();
        let spin = self
            .props(params.times.regroup)
            .by(Property::Rotation, params.position.regroup.rotation)
            .delay(params.delay.regroup);
        let settle = self
            .props(params.times.regroup)
            .shortest(Property::Rotation, 0.0)
            .to(Property::Left, params.position.regroup.left);
        self.two_lane_regroup(spin, settle)
    }

    fn two_lane_regroup(&mut self, first: TweenProps, second: TweenProps) -> DeckResult<()> {
        let even = self.get_cards(Some(0), true);
        let odd = self.get_cards(Some(1), true);
        self.begin(Formation::Regroup, even.len() + odd.len())?;

        let interval = self.config.params.times.stagger_interval;
        self.submit(PRIMARY, stagger(&even, &first, interval))?;
        self.submit(SECONDARY, stagger(&odd, &first, interval))?;

        let mut last = self.submit(PRIMARY, stagger(&even, &second, interval))?;
        last.extend(self.submit(SECONDARY, stagger(&odd, &second, interval))?);

        self.gate(&last, Settle::Formation(Formation::Regroup, EventName::Regroup));
        self.run_settled()
    }

    /// Spread every card along the horizontal axis, one card at a time.
    pub fn spread(&mut self) -> DeckResult<()> {
        let cards = self.get_cards(None, true);
        let n = cards.len();
        self.begin(Formation::Spread, n)?;

        let params = self.config.params.clone();
        let base = params.position.spread.x;
        let step = if n > 0 { params.spread_length / n as f64 } else { 0.0 };

        let gather = self
            .props(params.times.spread_regroup)
            .shortest(Property::Rotation, 0.0)
            .to(Property::X, base)
            .to(Property::ZIndex, n as f64);
        self.submit(PRIMARY, stagger(&cards, &gather, 0.0))?;

        let mut last = Vec::with_capacity(n);
        for (i, &card) in cards.iter().enumerate() {
            let props = self
                .props(params.times.spread)
                .to(Property::X, base + (n - i) as f64 * step)
                .to(Property::ZIndex, i as f64);
            last.push(self.submit_one(PRIMARY, Entry::card(card, props))?);
        }

        self.gate(&last, Settle::Formation(Formation::Spread, EventName::Spread));
        self.run_settled()
    }

    /// Cumulative spread: every step moves all cards not yet placed.
    ///
    /// `tag` is echoed in the event name (`Deck:spreado:<tag>`).
    pub fn spreado(&mut self, tag: Option<u32>) -> DeckResult<()> {
        let params = self.config.params.clone();
        self.cumulative_spread(
            Formation::Spreado,
            EventName::Spreado(tag),
            params.position.spreado.x,
            params.times.spreado,
            0.0,
        )
    }

    /// Cumulative spread from the far side, stacked above other cards.
    pub fn reverse_spreado(&mut self) -> DeckResult<()> {
        let params = self.config.params.clone();
        self.cumulative_spread(
            Formation::ReverseSpreado,
            EventName::ReverseSpreado,
            params.position.reverse_spreado.x,
            params.times.reverse_spreado,
            200.0,
        )
    }

    fn cumulative_spread(
        &mut self,
        formation: Formation,
        event: EventName,
        base: f64,
        duration: f64,
        z_offset: f64,
    ) -> DeckResult<()> {
        let cards = self.get_cards(None, true);
        let n = cards.len();
        self.begin(formation, n)?;

        let params = self.config.params.clone();
        let step = if n > 0 { params.spread_length / n as f64 } else { 0.0 };

        let gather = self
            .props(params.times.spread_regroup)
            .shortest(Property::Rotation, 0.0)
            .to(Property::X, base);
        self.submit(PRIMARY, stagger(&cards, &gather, 0.0))?;

        // Step i moves cards[i..]; cards[i] is never moved again after it.
        let mut last = Vec::with_capacity(n);
        let mut x = base;
        for i in 0..n {
            x += step;
            let props = self
                .props(duration)
                .to(Property::X, x)
                .to(Property::ZIndex, i as f64 + z_offset);
            let ids = self.submit(PRIMARY, stagger(&cards[i..], &props, 0.0))?;
            last.extend(ids.first().copied());
        }

        self.gate(&last, Settle::Formation(formation, event));
        self.run_settled()
    }

    /// Cumulative spread two cards per step, optionally with a small random
    /// tilt per step.
    pub fn light_spreado(&mut self, random: bool) -> DeckResult<()> {
        let cards = self.get_cards(None, true);
        let n = cards.len();
        self.begin(Formation::LightSpreado, n)?;

        let params = self.config.params.clone();
        let base = params.position.light_spreado.x;
        let step = if n > 0 { params.spread_length / (n as f64 / 2.0) } else { 0.0 };

        let gather = self
            .props(params.times.spread_regroup)
            .shortest(Property::Rotation, 0.0)
            .to(Property::Y, params.position.light_spreado.y)
            .to(Property::X, base);
        self.submit(PRIMARY, stagger(&cards, &gather, 0.0))?;

        let mut last = Vec::with_capacity(n);
        let mut x = base;
        for i in 0..n.div_ceil(2) {
            x += step;
            let mut props = self
                .props(params.times.light_spreado)
                .to(Property::X, x)
                .to(Property::ZIndex, i as f64);
            if random {
                let tilt = self.rng.gen_range(0..10);
                let tilt = if tilt % 2 == 0 { -tilt } else { tilt };
                props = props.to(Property::Rotation, f64::from(tilt));
            }
            let ids = self.submit(PRIMARY, stagger(&cards[2 * i..], &props, 0.0))?;
            last.extend(ids.iter().take(2).copied());
        }

        self.gate(&last, Settle::Formation(Formation::LightSpreado, EventName::LightSpreado));
        self.run_settled()
    }

    /// Rotate the undrawn cards about their centers in a sweep of `angle`
    /// degrees. `way` is `-1` or `1`.
    pub fn roll(&mut self, way: f64, angle: f64) -> DeckResult<()> {
        let cards = self.undrawn_cards();
        let n = cards.len();
        self.begin(Formation::Roll, n)?;

        let params = self.config.params.clone();
        let step = if n > 1 { angle / (n - 1) as f64 } else { 0.0 };

        let mut last = Vec::with_capacity(n);
        for (i, &card) in cards.iter().enumerate() {
            let props = self
                .props(params.times.roll)
                .to(Property::ZIndex, i as f64)
                .to(Property::Y, params.position.roll.y)
                .to(Property::X, params.position.roll.x)
                .to(Property::Rotation, way * i as f64 * step)
                .origin(TransformOrigin::CENTER);
            last.push(self.submit_one(PRIMARY, Entry::card(card, props))?);
        }

        self.gate(&last, Settle::Formation(Formation::Roll, EventName::Roll));
        self.run_settled()
    }

    /// Gather, explode outward on a circle of `radius`, then spin the whole
    /// deck by `rotation` degrees.
    pub fn big_bang(&mut self, radius: f64, rotation: f64) -> DeckResult<()> {
        let cards = self.undrawn_cards();
        self.begin(Formation::BigBanged, cards.len())?;

        let params = self.config.params.clone();
        let y = if self.config.full_page {
            params.position.big_bang.y_big
        } else {
            params.position.big_bang.y_small
        };

        let gather = self.props(params.times.big_bang_gather).to(Property::Y, y);
        let ids = self.submit(Placement::Immediate, stagger(&cards, &gather, 0.0))?;
        self.gate(&ids, Settle::BigBangExplode { cards, radius, rotation, y });
        self.run_settled()
    }

    pub(crate) fn big_bang_explode(
        &mut self,
        cards: Vec<CardId>,
        radius: f64,
        rotation: f64,
        y: f64,
    ) -> DeckResult<()> {
        let duration = self.config.params.times.big_bang;
        let alpha = if cards.is_empty() { 0.0 } else { 2.0 * PI / cards.len() as f64 };

        let mut beta = -PI / 2.0;
        let mut entries = Vec::with_capacity(cards.len());
        for &card in &cards {
            let props = self
                .props(duration)
                .to(Property::X, radius * beta.cos())
                .to(Property::Y, y + radius * beta.sin())
                .ease(Ease::InExpo);
            entries.push(Entry::card(card, props));
            beta += alpha;
        }

        let ids = self.submit(Placement::Immediate, entries)?;
        self.gate(&ids, Settle::BigBangSpin { cards, rotation });
        Ok(())
    }

    pub(crate) fn big_bang_spin(&mut self, cards: &[CardId], rotation: f64) -> DeckResult<()> {
        self.scheduler.wrap(cards);
        let props = TweenProps::new(self.config.params.times.big_bang_spin)
            .to(Property::Rotation, rotation)
            .ease(Ease::InOutQuart);
        let id = self.submit_one(
            Placement::Immediate,
            Entry {
                target: TweenTarget::Wrapper,
                offset: 0.0,
                props,
            },
        )?;
        self.gate(&[id], Settle::Formation(Formation::BigBanged, EventName::BigBang));
        Ok(())
    }

    /// Rotation of a fan step while `remaining` cards are still moving.
    ///
    /// Spreads evenly from `fan_start` down by `2 * fan_angle` over the deck.
    #[must_use]
    pub fn fan_rotation(&self, remaining: usize) -> f64 {
        let params = &self.config.params;
        let n = self.card_count();
        if n <= 1 {
            return params.fan_start();
        }
        params.fan_start() - (n as f64 - remaining as f64) * (params.fan_angle * 2.0 / (n - 1) as f64)
    }

    /// Fan the deck like a hand of cards.
    pub fn fan(&mut self) -> DeckResult<()> {
        let mut cards = self.get_cards(None, true);
        let n = cards.len();
        self.begin(Formation::Fan, n)?;

        let params = self.config.params.clone();
        self.straighten_now(&cards)?;

        let gather = self
            .props(params.times.fan_regroup)
            .to(Property::Rotation, params.fan_start())
            .to(Property::Y, params.position.fan.y)
            .origin(TransformOrigin::center_at(params.fan_origin));
        self.submit(PRIMARY, stagger(&cards, &gather, params.times.stagger_interval))?;

        // Each step peels one card off the moving set; its tween in that
        // step is the last one it gets.
        let mut last = Vec::with_capacity(n);
        for _ in 0..n {
            let props = self
                .props(params.times.fan)
                .to(Property::Rotation, self.fan_rotation(cards.len()));
            let ids = self.submit(PRIMARY, stagger(&cards, &props, 0.0))?;
            if params.fan_origin < 0.0 {
                last.extend(ids.first().copied());
                cards.remove(0);
            } else {
                last.extend(ids.last().copied());
                cards.pop();
            }
        }

        self.gate(&last, Settle::Formation(Formation::Fan, EventName::Fan));
        self.run_settled()
    }

    /// Fan with a pivot that shifts per card, curling the deck.
    pub fn snail(&mut self) -> DeckResult<()> {
        let mut cards = self.get_cards(None, true);
        let n = cards.len();
        self.begin(Formation::Snail, n)?;

        let params = self.config.params.clone();
        self.straighten_now(&cards)?;

        let gather = self
            .props(params.times.fan_regroup)
            .to(Property::Rotation, params.fan_start())
            .to(Property::Top, params.position.fan.top)
            .origin(TransformOrigin::center_at(params.fan_origin));
        self.submit(PRIMARY, stagger(&cards, &gather, params.times.stagger_interval))?;

        let mut last = Vec::with_capacity(n);
        for i in 0..n {
            let props = self
                .props(params.times.fan)
                .to(Property::Rotation, self.fan_rotation(cards.len()))
                .to(Property::ZIndex, i as f64)
                .origin(TransformOrigin::center_at(params.fan_origin + i as f64 * 3.0));
            let ids = self.submit(PRIMARY, stagger(&cards, &props, 0.0))?;
            if params.fan_origin < 0.0 {
                last.extend(ids.last().copied());
                cards.pop();
            } else {
                last.extend(ids.first().copied());
                cards.remove(0);
            }
        }

        self.gate(&last, Settle::Formation(Formation::Snail, EventName::Snail));
        self.run_settled()
    }

    /// Bring every rotation back to zero through the shortest arc, instantly.
    fn straighten_now(&mut self, cards: &[CardId]) -> DeckResult<()> {
        let props = TweenProps::new(0.0).shortest(Property::Rotation, 0.0);
        self.submit(Placement::Immediate, stagger(cards, &props, 0.0))?;
        Ok(())
    }

    /// Stagger the undrawn cards back to zero rotation.
    pub fn unfan(&mut self) -> DeckResult<()> {
        let cards = self.undrawn_cards();
        self.begin(Formation::Unfan, cards.len())?;

        let times = self.config.params.times.clone();
        let props = self.props(times.unfan).shortest(Property::Rotation, 0.0);
        let ids = self.submit(PRIMARY, stagger(&cards, &props, times.stagger_interval))?;

        self.gate(&ids, Settle::Formation(Formation::Unfan, EventName::Unfan));
        self.run_settled()
    }

    /// Scatter every card to a random spot inside the container.
    ///
    /// No two cards share a left or a top pixel offset. Both trackers are
    /// reset at the start of each call.
    pub fn disperse(&mut self) -> DeckResult<()> {
        self.ensure_idle(Formation::Disperse)?;
        let cards = self.get_cards(None, false);

        let container = self.config.container;
        let max_left = (container.width - self.config.card_width_px()).trunc() as i32;
        let max_top = (container.height - self.config.card_height_px()).trunc() as i32;

        self.disperse_left.reset();
        self.disperse_top.reset();
        let mut targets = Vec::with_capacity(cards.len());
        for &card in &cards {
            let top = self.disperse_top.draw(&mut self.rng, 1, max_top)?;
            let left = self.disperse_left.draw(&mut self.rng, 1, max_left)?;
            targets.push((
                card,
                f64::from(top) * 100.0 / container.height,
                f64::from(left) * 100.0 / container.width,
            ));
        }

        self.begin(Formation::Disperse, cards.len())?;
        let duration = self.config.params.times.disperse;
        let mut last = Vec::with_capacity(targets.len());
        for (card, top, left) in targets {
            let props = self
                .props(duration)
                .to(Property::Top, top)
                .to(Property::Left, left);
            last.push(self.submit_one(PRIMARY, Entry::card(card, props))?);
        }

        self.gate(&last, Settle::Formation(Formation::Disperse, EventName::Disperse));
        self.run_settled()
    }

    /// Split the deck into its parity piles, lift, and drop them back in a
    /// new order. Marks the deck shuffled.
    pub fn shuffle_one(&mut self) -> DeckResult<()> {
        self.ensure_idle(Formation::ShuffleOne)?;
        self.shuffled = true;

        let even = self.get_cards(Some(0), true);
        let odd = self.get_cards(Some(1), true);
        self.begin(Formation::ShuffleOne, even.len() + odd.len())?;

        let params = self.config.params.clone();
        let times = &params.times;
        let cut = params.position.display.cut;
        let y = params.position.display.y;

        let apart = |x: f64| {
            TweenProps::new(times.shuffle_lift)
                .ease(params.easing)
                .to(Property::X, x)
                .to(Property::Y, y)
                .shortest(Property::Rotation, 0.0)
        };
        self.submit(PRIMARY, stagger(&even, &apart(cut.x), times.stagger_interval))?;
        self.submit(SECONDARY, stagger(&odd, &apart(cut.x2), times.stagger_interval))?;

        let lift = self
            .props(times.shuffle_lift)
            .by(Property::Z, params.shuffle_z)
            .to(Property::Scale, 2.0)
            .origin(TransformOrigin::CENTER);
        self.submit(PRIMARY, stagger(&even, &lift, times.stagger_interval))?;
        self.submit(SECONDARY, stagger(&odd, &lift, times.stagger_interval))?;

        let drop = self
            .props(times.shuffle_one)
            .by(Property::Z, -params.shuffle_z)
            .to(Property::Scale, 1.0)
            .to(Property::X, params.position.center.x)
            .to(Property::Y, params.position.center.y);
        let interval = times.shuffle_settle_interval;
        let mut last = self.submit(PRIMARY, stagger(&even, &drop, interval))?;
        last.extend(self.submit(SECONDARY, stagger(&odd, &drop, interval))?);

        self.gate(&last, Settle::Formation(Formation::ShuffleOne, EventName::ShuffleOne));
        self.run_settled()
    }

    /// Cut the undrawn deck at `card`.
    ///
    /// Cards up to and including `card` slide to the near edge, the rest to
    /// the far edge; both halves return to the center with their depth
    /// swapped. `Deck:cut` fires once, even when the far half is empty.
    pub fn cut(&mut self, card: CardId) -> DeckResult<()> {
        self.ensure_idle(Formation::Cut)?;
        if self.require_card(card)?.drawn {
            return Err(crate::core::DeckError::AlreadyDrawn(card));
        }

        let ordered = self.get_cards(None, true);
        let cards: Vec<CardId> = ordered
            .into_iter()
            .filter(|id| self.card(*id).is_some_and(|c| !c.drawn))
            .collect();
        let index = cards
            .iter()
            .position(|&id| id == card)
            .ok_or(crate::core::DeckError::UnknownCard(card))?;

        let x_of = |deck: &Self, id: Option<&CardId>| {
            id.and_then(|id| deck.card(*id)).map_or(0.0, |c| c.transform.x)
        };
        let close_x = x_of(self, cards.first());
        let far_x = x_of(self, cards.last());

        let (near, far) = cards.split_at(index + 1);
        let split = !far.is_empty();
        self.begin(Formation::Cut, cards.len())?;

        let params = self.config.params.clone();
        let t = params.times.cut;
        let interval = params.times.stagger_interval;
        let nb = self.card_count() as f64;
        let center_x = params.position.center.x;

        self.submit(PRIMARY, stagger(near, &self.props(t).to(Property::X, close_x), interval))?;
        let mut mid = self.props(t).to(Property::X, center_x);
        let mut end = self.props(t);
        if split {
            mid = mid.by(Property::Z, nb / 100.0).by(Property::ZIndex, nb);
            end = end.by(Property::Z, -nb / 100.0).by(Property::ZIndex, -nb);
        }
        self.submit(PRIMARY, stagger(near, &mid, interval))?;
        let mut last = self.submit(PRIMARY, stagger(near, &end, interval))?;

        if split {
            self.submit(SECONDARY, stagger(far, &self.props(t).to(Property::X, far_x), interval))?;
            let mid = self
                .props(t)
                .to(Property::X, center_x)
                .to(Property::Scale, 0.99)
                .by(Property::Z, -nb / 100.0)
                .by(Property::ZIndex, -nb);
            self.submit(SECONDARY, stagger(far, &mid, interval))?;
            let end = self
                .props(t)
                .to(Property::Scale, 1.0)
                .by(Property::Z, nb / 100.0)
                .by(Property::ZIndex, nb);
            last.extend(self.submit(SECONDARY, stagger(far, &end, interval))?);
        }

        tracing::debug!(%card, near = near.len(), far = far.len(), "deck cut");
        self.gate(&last, Settle::Formation(Formation::Cut, EventName::Cut));
        self.run_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::RecordingScheduler;
    use crate::core::{DeckConfig, DeckError};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn deck(n: usize) -> CardDeck<RecordingScheduler> {
        CardDeck::new(DeckConfig::new(n), RecordingScheduler::new())
    }

    fn count(deck: &mut CardDeck<RecordingScheduler>, name: EventName) -> Rc<RefCell<usize>> {
        let counter = Rc::new(RefCell::new(0));
        let c = Rc::clone(&counter);
        deck.on(name, move |_| *c.borrow_mut() += 1);
        counter
    }

    #[test]
    fn test_display_is_instant() {
        let mut deck = deck(4);
        let fired = count(&mut deck, EventName::Display);
        deck.display(DisplayKind::Cut).unwrap();

        assert_eq!(*fired.borrow(), 1);
        assert_eq!(deck.formation().current(), Formation::Display(DisplayKind::Cut));
        assert_eq!(deck.scheduler().sets().len(), 4);

        let c1 = &deck.card(CardId::new(1)).unwrap().transform;
        let c2 = &deck.card(CardId::new(2)).unwrap().transform;
        assert_eq!(c1.left, 20.0);
        assert_eq!(c1.rotation, 10.0);
        assert_eq!(c2.left, 61.0);
        assert_eq!(c2.rotation, -9.0);
        assert_eq!(c2.origin, TransformOrigin::LEFT_BOTTOM);
    }

    #[test]
    fn test_center_staggers_and_settles() {
        let mut deck = deck(3);
        let fired = count(&mut deck, EventName::Center);
        deck.center(true).unwrap();

        let starts: Vec<f64> = deck.scheduler().history().iter().map(|s| s.start).collect();
        assert!((starts[1] - starts[0] - 0.07).abs() < 1e-9);
        assert!(deck.formation().is_pending());

        deck.run_to_idle().unwrap();
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(deck.formation().current(), Formation::Center);
        assert_eq!(deck.card(CardId::new(2)).unwrap().transform.z, 2.0);
    }

    #[test]
    fn test_formation_rejected_while_pending() {
        let mut deck = deck(3);
        deck.center(false).unwrap();
        assert_eq!(
            deck.fan(),
            Err(DeckError::FormationPending {
                active: Formation::Center,
                requested: Formation::Fan,
            })
        );
    }

    #[test]
    fn test_zero_cards_settle_immediately() {
        let mut deck = deck(0);
        let fired = count(&mut deck, EventName::Unfan);
        deck.unfan().unwrap();
        assert_eq!(*fired.borrow(), 1);
        assert!(!deck.formation().is_pending());
    }

    #[test]
    fn test_regroup_waits_for_both_lanes() {
        let mut deck = deck(5);
        let fired = count(&mut deck, EventName::Regroup);
        deck.regroup().unwrap();

        // Finish the secondary lane first; the event must still wait.
        let pending = deck.scheduler_mut().take_pending();
        let (odd, even): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|s| s.placement == Placement::Lane(Lane::Secondary));
        for s in odd {
            deck.complete(s.tween.id).unwrap();
        }
        assert_eq!(*fired.borrow(), 0);
        for s in even {
            deck.complete(s.tween.id).unwrap();
        }
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_regroup_rotate_spins_from_current_rotation() {
        let mut deck = deck(4);
        deck.display(DisplayKind::Cut).unwrap();
        let before: Vec<(CardId, f64)> = deck.cards().map(|c| (c.id, c.transform.rotation)).collect();
        deck.regroup_rotate().unwrap();

        let spins: Vec<(TweenTarget, Option<f64>)> = deck.scheduler().history()[..4]
            .iter()
            .map(|s| (s.tween.target, s.tween.patch.get(Property::Rotation)))
            .collect();
        for (card, start) in before {
            assert!(spins.contains(&(TweenTarget::Card(card), Some(start - 300.0))));
        }

        deck.run_to_idle().unwrap();
        assert!(deck.cards().all(|c| c.transform.rotation.rem_euclid(360.0) == 0.0));
        assert_eq!(deck.formation().current(), Formation::Regroup);
    }

    #[test]
    fn test_spread_positions() {
        let mut deck = deck(4);
        deck.spread().unwrap();
        deck.run_to_idle().unwrap();

        // Cards are taken in reverse; card 4 is first and goes furthest.
        let x = |id| deck.card(CardId::new(id)).unwrap().transform.x;
        assert_eq!(x(4), 20.0 + 4.0 * 95.0);
        assert_eq!(x(1), 20.0 + 95.0);
        assert_eq!(deck.card(CardId::new(4)).unwrap().transform.z_index, 0.0);
        assert_eq!(deck.formation().current(), Formation::Spread);
    }

    #[test]
    fn test_spreado_tag_and_cumulative_positions() {
        let mut deck = deck(4);
        let fired = count(&mut deck, EventName::Spreado(Some(2)));
        deck.spreado(Some(2)).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(*fired.borrow(), 1);
        let x = |id| deck.card(CardId::new(id)).unwrap().transform.x;
        assert_eq!(x(4), 20.0 + 95.0);
        assert_eq!(x(1), 20.0 + 4.0 * 95.0);
        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.z_index, 3.0);
    }

    #[test]
    fn test_reverse_spreado_stacks_above() {
        let mut deck = deck(3);
        deck.reverse_spreado().unwrap();
        deck.run_to_idle().unwrap();
        assert_eq!(deck.card(CardId::new(3)).unwrap().transform.z_index, 200.0);
        assert_eq!(deck.formation().current(), Formation::ReverseSpreado);
    }

    #[test]
    fn test_light_spreado_tilts_stay_small() {
        let mut deck = deck(7);
        deck.light_spreado(true).unwrap();
        deck.run_to_idle().unwrap();

        for card in deck.cards() {
            assert!(card.transform.rotation.abs() <= 9.0);
        }
        assert_eq!(deck.formation().current(), Formation::LightSpreado);
    }

    #[test]
    fn test_roll_rotations() {
        let mut deck = deck(5);
        deck.roll(-1.0, 180.0).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.rotation, 0.0);
        assert_eq!(deck.card(CardId::new(5)).unwrap().transform.rotation, -180.0);
        assert_eq!(deck.card(CardId::new(3)).unwrap().transform.origin, TransformOrigin::CENTER);
    }

    #[test]
    fn test_roll_single_card_does_not_divide_by_zero() {
        let mut deck = deck(1);
        deck.roll(1.0, 180.0).unwrap();
        deck.run_to_idle().unwrap();
        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.rotation, 0.0);
    }

    #[test]
    fn test_fan_rotation_spans_the_fan() {
        let deck = deck(5);
        assert_eq!(deck.fan_rotation(5), 50.0);
        assert_eq!(deck.fan_rotation(1), -50.0);
        assert_eq!(deck.fan_rotation(3), 0.0);
    }

    #[test]
    fn test_fan_final_rotations() {
        let mut deck = deck(5);
        let fired = count(&mut deck, EventName::Fan);
        deck.fan().unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(*fired.borrow(), 1);
        // The deck is taken in reverse and the last card is peeled first, so
        // card 1 stops at the first step.
        assert_eq!(deck.card(CardId::new(1)).unwrap().transform.rotation, 50.0);
        assert_eq!(deck.card(CardId::new(5)).unwrap().transform.rotation, -50.0);
    }

    #[test]
    fn test_snail_shifts_pivot() {
        let mut deck = deck(3);
        deck.snail().unwrap();
        deck.run_to_idle().unwrap();

        // Card 3 comes first and is peeled off at step 0.
        let c3 = &deck.card(CardId::new(3)).unwrap().transform;
        assert_eq!(c3.origin, TransformOrigin::center_at(200.0));
        let c1 = &deck.card(CardId::new(1)).unwrap().transform;
        assert_eq!(c1.origin, TransformOrigin::center_at(206.0));
        assert_eq!(deck.formation().current(), Formation::Snail);
    }

    #[test]
    fn test_big_bang_three_stages() {
        let mut deck = deck(4);
        let fired = count(&mut deck, EventName::BigBang);
        deck.big_bang(200.0, 10800.0).unwrap();

        assert_eq!(deck.scheduler().history().len(), 4);
        deck.run_to_idle().unwrap();

        assert_eq!(*fired.borrow(), 1);
        assert_eq!(deck.scheduler().wrapped().len(), 4);
        assert_eq!(deck.wrapper().rotation, 10800.0);
        assert_eq!(deck.formation().current(), Formation::BigBanged);

        // First card explodes straight up.
        let c1 = &deck.card(CardId::new(1)).unwrap().transform;
        assert!(c1.x.abs() < 1e-9);
        assert!((c1.y - (-130.0 - 200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_disperse_positions_are_unique() {
        let mut deck = deck(22);
        deck.disperse().unwrap();
        deck.run_to_idle().unwrap();

        let mut lefts: Vec<i64> = deck
            .cards()
            .map(|c| (c.transform.left * 652.0 / 100.0).round() as i64)
            .collect();
        lefts.sort_unstable();
        lefts.dedup();
        assert_eq!(lefts.len(), 22);
        assert_eq!(deck.formation().current(), Formation::Disperse);
    }

    #[test]
    fn test_disperse_fails_when_card_fills_container() {
        let mut deck = CardDeck::new(
            DeckConfig::new(2).with_card_width(100.0),
            RecordingScheduler::new(),
        );
        assert!(matches!(deck.disperse(), Err(DeckError::Layout(_))));
        assert!(!deck.formation().is_pending());
    }

    #[test]
    fn test_shuffle_one_marks_shuffled() {
        let mut deck = deck(6);
        let fired = count(&mut deck, EventName::ShuffleOne);
        deck.shuffle_one().unwrap();
        assert!(deck.is_shuffled());

        deck.run_to_idle().unwrap();
        assert_eq!(*fired.borrow(), 1);
        for card in deck.cards() {
            assert_eq!(card.transform.z, 0.0);
            assert_eq!(card.transform.scale, 1.0);
        }
    }

    #[test]
    fn test_cut_at_last_card_fires_once() {
        let mut deck = deck(5);
        let fired = count(&mut deck, EventName::Cut);
        // Cards are ordered in reverse, so card 1 is last.
        deck.cut(CardId::new(1)).unwrap();
        deck.run_to_idle().unwrap();

        assert_eq!(*fired.borrow(), 1);
        assert!(deck
            .scheduler()
            .history()
            .iter()
            .all(|s| s.placement == PRIMARY));
    }

    #[test]
    fn test_cut_unknown_card() {
        let mut deck = deck(3);
        assert_eq!(deck.cut(CardId::new(9)), Err(DeckError::UnknownCard(CardId::new(9))));
    }
}
