//! The deck aggregate: cards, selection, caches and completion routing.
//!
//! Formations and card operations (in sibling modules) describe their
//! animations as staged tween batches. This module resolves them against the
//! modeled transforms, hands them to the [`Scheduler`], and tracks which
//! completion gates each tween feeds. When the host reports a tween as
//! finished through [`CardDeck::complete`], every gate it feeds counts it;
//! gates that open run their continuation (fire an event, start the next
//! stage, settle the formation).
//!
//! Modeled transforms always hold the most recently submitted target, so
//! relative deltas in later stages resolve against where the previous stage
//! leaves the card.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use super::formation::{Formation, FormationState};
use crate::animation::{
    GateId, Lane, ParallelCompletionGate, Placement, RecordingScheduler, Scheduler, TransformPatch,
    Tween, TweenBatch, TweenId, TweenProps, TweenTarget,
};
use crate::core::{
    Card, CardId, DeckConfig, DeckError, DeckResult, DeckRng, DeckRngState, GridLayout, Property,
    Transform, TransformOrigin,
};
use crate::events::{DeckEvent, EventBus, EventName, HandlerId};
use crate::layout::{
    compute_circle_grid, compute_matrix_grid, matrix_row_span, GridSlot, LightSourceTracker,
    Point, ShadowOffset, UniqueDrawTracker,
};

/// One tween of a stage before resolution.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub target: TweenTarget,
    pub offset: f64,
    pub props: TweenProps,
}

impl Entry {
    pub(crate) fn card(card: CardId, props: TweenProps) -> Self {
        Self {
            target: TweenTarget::Card(card),
            offset: 0.0,
            props,
        }
    }
}

/// Same props for every card, start times `interval` apart.
pub(crate) fn stagger(cards: &[CardId], props: &TweenProps, interval: f64) -> Vec<Entry> {
    cards
        .iter()
        .enumerate()
        .map(|(i, &card)| Entry {
            target: TweenTarget::Card(card),
            offset: i as f64 * interval,
            props: props.clone(),
        })
        .collect()
}

/// What runs when a gate opens.
#[derive(Clone, Debug)]
pub(crate) enum Settle {
    /// Formation finished: make it current and announce it.
    Formation(Formation, EventName),
    Notify(DeckEvent),
    /// Show the card's face.
    Reveal(CardId),
    SentToGrid { card: CardId, rotate: Option<f64> },
    BigBangExplode { cards: Vec<CardId>, radius: f64, rotation: f64, y: f64 },
    BigBangSpin { cards: Vec<CardId>, rotation: f64 },
    NiceFlipTurn { card: CardId, way: i32 },
    FlipOnItselfTurn { card: CardId, way: i32 },
}

/// Cheap, immutable view of the deck's state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeckSnapshot {
    pub cards: im::Vector<Card>,
    pub drawn: im::Vector<CardId>,
    pub formation: FormationState,
    pub shuffled: bool,
    pub wrapper: Transform,
    /// Choreography and shuffle stream positions.
    pub rng: DeckRngState,
    pub shuffle_rng: DeckRngState,
}

/// A deck of cards driven through a [`Scheduler`].
///
/// ## Usage
///
/// ```
/// use tarot_deck::animation::RecordingScheduler;
/// use tarot_deck::core::DeckConfig;
/// use tarot_deck::deck::{CardDeck, Formation};
///
/// let mut deck = CardDeck::new(DeckConfig::new(6), RecordingScheduler::new());
/// deck.center(true).unwrap();
/// deck.run_to_idle().unwrap();
/// assert_eq!(deck.formation().current(), Formation::Center);
/// ```
pub struct CardDeck<S: Scheduler> {
    pub(crate) config: DeckConfig,
    pub(crate) scheduler: S,
    pub(crate) events: EventBus,
    pub(crate) cards: im::Vector<Card>,
    pub(crate) drawn: im::Vector<CardId>,
    pub(crate) wrapper: Transform,
    pub(crate) formation: FormationState,
    pub(crate) shuffled: bool,
    shuffle_cache: FxHashMap<(Option<u8>, bool), Vec<CardId>>,
    grid: Option<(Point, Vec<GridSlot>)>,
    pub(crate) rng: DeckRng,
    shuffle_rng: DeckRng,
    pub(crate) disperse_left: UniqueDrawTracker,
    pub(crate) disperse_top: UniqueDrawTracker,
    light: LightSourceTracker,
    next_tween: u64,
    next_gate: u64,
    in_flight: FxHashMap<TweenId, SmallVec<[GateId; 2]>>,
    /// Lane of each scheduled lane tween, and how many each lane holds.
    lane_of: FxHashMap<TweenId, Lane>,
    lane_load: [usize; 2],
    gates: FxHashMap<GateId, (ParallelCompletionGate, Settle)>,
    instant: VecDeque<TweenId>,
    settled: VecDeque<Settle>,
}

impl<S: Scheduler> CardDeck<S> {
    /// Build `config.card_count` face-down cards with ids `1..=card_count`.
    pub fn new(config: DeckConfig, scheduler: S) -> Self {
        let cards = (1..=config.card_count as u32)
            .map(|id| Card::new(CardId::new(id), config.card_width))
            .collect();
        let rng = DeckRng::new(config.seed);
        let shuffle_rng = rng.for_context("shuffle");

        tracing::debug!(cards = config.card_count, seed = config.seed, "deck built");

        Self {
            config,
            scheduler,
            events: EventBus::new(),
            cards,
            drawn: im::Vector::new(),
            wrapper: Transform::default(),
            formation: FormationState::new(),
            shuffled: false,
            shuffle_cache: FxHashMap::default(),
            grid: None,
            rng,
            shuffle_rng,
            disperse_left: UniqueDrawTracker::new(),
            disperse_top: UniqueDrawTracker::new(),
            light: LightSourceTracker::new(),
            next_tween: 0,
            next_gate: 0,
            in_flight: FxHashMap::default(),
            lane_of: FxHashMap::default(),
            lane_load: [0; 2],
            gates: FxHashMap::default(),
            instant: VecDeque::new(),
            settled: VecDeque::new(),
        }
    }

    /// Like [`CardDeck::new`], but rejects a config whose grid cannot hold
    /// every drawable card.
    pub fn try_new(config: DeckConfig, scheduler: S) -> DeckResult<Self> {
        config.validate()?;
        Ok(Self::new(config, scheduler))
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Shorthand for `events_mut().on(..)`.
    pub fn on(&mut self, name: EventName, handler: impl FnMut(&DeckEvent) + 'static) -> HandlerId {
        self.events.on(name, handler)
    }

    /// Shorthand for `events_mut().once(..)`.
    pub fn once(
        &mut self,
        name: EventName,
        handler: impl FnMut(&DeckEvent) + 'static,
    ) -> HandlerId {
        self.events.once(name, handler)
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index()).filter(|card| card.id == id)
    }

    pub(crate) fn card_mut(&mut self, id: CardId) -> DeckResult<&mut Card> {
        self.cards
            .get_mut(id.index())
            .filter(|card| card.id == id)
            .ok_or(DeckError::UnknownCard(id))
    }

    pub(crate) fn require_card(&self, id: CardId) -> DeckResult<&Card> {
        self.card(id).ok_or(DeckError::UnknownCard(id))
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.iter()
    }

    /// Drawn cards in draw order.
    #[must_use]
    pub fn drawn(&self) -> Vec<CardId> {
        self.drawn.iter().copied().collect()
    }

    #[must_use]
    pub fn formation(&self) -> FormationState {
        self.formation
    }

    #[must_use]
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Transform of the wrapper container (big bang spin).
    #[must_use]
    pub fn wrapper(&self) -> &Transform {
        &self.wrapper
    }

    /// The cached grid, if one has been computed.
    #[must_use]
    pub fn grid(&self) -> Option<&[GridSlot]> {
        self.grid.as_ref().map(|(_, slots)| slots.as_slice())
    }

    /// Tweens submitted and not yet reported complete.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// O(1) copy of the deck state.
    #[must_use]
    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            cards: self.cards.clone(),
            drawn: self.drawn.clone(),
            formation: self.formation,
            shuffled: self.shuffled,
            wrapper: self.wrapper.clone(),
            rng: self.rng.state(),
            shuffle_rng: self.shuffle_rng.state(),
        }
    }

    // === Configuration ===

    /// Deep-merge a partial JSON object into the deck params.
    ///
    /// The cached grid is dropped since its inputs may have changed.
    pub fn set_params(&mut self, patch: &serde_json::Value) -> DeckResult<()> {
        let params = self
            .config
            .params
            .merged(patch)
            .map_err(|e| DeckError::InvalidParams(e.to_string()))?;
        self.config.params = params;
        self.invalidate_grid();
        Ok(())
    }

    /// Replace the grid layout and drop the cached grid.
    ///
    /// A layout with fewer slots than `max_draught` is rejected and the
    /// current one kept.
    pub fn set_layout(&mut self, layout: GridLayout) -> DeckResult<()> {
        let config = DeckConfig {
            layout,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.invalidate_grid();
        Ok(())
    }

    pub fn invalidate_grid(&mut self) {
        self.grid = None;
    }

    // === Selection ===

    /// Cards of a parity class (all when `None`), optionally reversed.
    ///
    /// Once the deck is shuffled, each `(parity, reverse)` key gets one
    /// permutation, generated on first request and returned as a fresh copy
    /// ever after.
    pub fn get_cards(&mut self, parity: Option<u8>, reverse: bool) -> Vec<CardId> {
        let key = (parity, reverse);
        if self.shuffled {
            if let Some(cached) = self.shuffle_cache.get(&key) {
                return cached.clone();
            }
        }

        let mut cards: Vec<CardId> = self
            .cards
            .iter()
            .filter(|card| parity.is_none_or(|p| card.id.parity() == p))
            .map(|card| card.id)
            .collect();
        if reverse {
            cards.reverse();
        }

        if self.shuffled {
            self.shuffle_rng.shuffle(&mut cards);
            self.shuffle_cache.insert(key, cards.clone());
        }
        cards
    }

    /// Undrawn cards in build order.
    #[must_use]
    pub fn undrawn_cards(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| !card.drawn)
            .map(|card| card.id)
            .collect()
    }

    // === Light source ===

    /// Drop shadow for a card at its modeled position.
    pub fn light_shadow(&mut self, id: CardId) -> DeckResult<ShadowOffset> {
        let transform = &self.require_card(id)?.transform;
        let container = self.config.container;
        let card_w = self.config.card_width_px();
        let card_h = self.config.card_height_px();
        let element = Point::new(
            transform.left * container.width / 100.0 + transform.x * card_w / 100.0,
            transform.top * container.height / 100.0 + transform.y * card_h / 100.0,
        );
        Ok(self.light.light_shadow(container, element))
    }

    /// Forget the latched light origin.
    pub fn reset_light(&mut self) {
        self.light.reset();
    }

    // === Grid ===

    /// Origin of the cached grid.
    #[must_use]
    pub fn grid_origin(&self) -> Option<Point> {
        self.grid.as_ref().map(|(origin, _)| *origin)
    }

    /// Grid for `origin`, computed on first use and cached per origin.
    pub(crate) fn grid_for(&mut self, origin: Point) -> DeckResult<&[GridSlot]> {
        let stale = self.grid.as_ref().is_none_or(|(cached, _)| *cached != origin);
        if stale {
            let slots = self.compute_grid(origin)?;
            tracing::debug!(slots = slots.len(), ?origin, "grid computed");
            self.grid = Some((origin, slots));
        }
        Ok(self.grid.as_ref().map_or(&[][..], |(_, slots)| slots.as_slice()))
    }

    fn compute_grid(&self, origin: Point) -> DeckResult<Vec<GridSlot>> {
        let width = self.config.card_width;
        let height = self.config.card_height();

        match &self.config.layout {
            GridLayout::Circle { center, radius, start } => {
                let center = Point::new(center.x + origin.x, center.y + origin.y);
                Ok(compute_circle_grid(
                    self.config.max_draught,
                    *radius,
                    center,
                    *start,
                    width,
                    height,
                ))
            }
            GridLayout::Matrix { rows, half_zero } => {
                let span = rows
                    .first()
                    .map_or(0.0, |row| matrix_row_span(row, *half_zero));
                let grid_origin = Point::new(
                    (100.0 - (width + 1.0) * span) / 2.0 + origin.x,
                    (100.0 - (height + 3.0) * rows.len() as f64) / 2.0 + origin.y + 4.0,
                );
                Ok(compute_matrix_grid(rows, width + 1.0, height + 1.0, grid_origin, *half_zero)?)
            }
        }
    }

    // === Submission ===

    /// Tween props with the deck's default easing.
    pub(crate) fn props(&self, duration: f64) -> TweenProps {
        TweenProps::new(duration).ease(self.config.params.easing)
    }

    fn transform_mut(&mut self, target: TweenTarget) -> DeckResult<&mut Transform> {
        match target {
            TweenTarget::Card(id) => Ok(&mut self.card_mut(id)?.transform),
            TweenTarget::Wrapper => Ok(&mut self.wrapper),
        }
    }

    /// Apply values instantly, in the model and on the scheduler.
    pub(crate) fn set(&mut self, target: TweenTarget, patch: TransformPatch) -> DeckResult<()> {
        patch.apply_to(self.transform_mut(target)?);
        self.scheduler.set(target, &patch);
        Ok(())
    }

    /// Resolve and schedule one stage. Returns the tween ids in entry order.
    pub(crate) fn submit(
        &mut self,
        placement: Placement,
        entries: Vec<Entry>,
    ) -> DeckResult<Vec<TweenId>> {
        let mut ids = Vec::with_capacity(entries.len());
        let mut tweens = Vec::with_capacity(entries.len());
        for entry in entries {
            ids.push(self.resolve(placement, entry, &mut tweens)?);
        }
        if !tweens.is_empty() {
            self.scheduler.schedule(&TweenBatch { placement, tweens });
        }
        Ok(ids)
    }

    /// Resolve and schedule a single tween.
    pub(crate) fn submit_one(&mut self, placement: Placement, entry: Entry) -> DeckResult<TweenId> {
        let mut tweens = Vec::with_capacity(1);
        let id = self.resolve(placement, entry, &mut tweens)?;
        if !tweens.is_empty() {
            self.scheduler.schedule(&TweenBatch { placement, tweens });
        }
        Ok(id)
    }

    /// Resolve `entry` against the model and move the model to its target.
    ///
    /// Instant tweens are set right away and queued for inline completion,
    /// unless their lane still holds earlier tweens; the rest are pushed
    /// onto `batch`.
    fn resolve(
        &mut self,
        placement: Placement,
        entry: Entry,
        batch: &mut Vec<Tween>,
    ) -> DeckResult<TweenId> {
        let transform = self.transform_mut(entry.target)?;
        let patch = entry.props.resolve(transform);
        patch.apply_to(transform);

        self.next_tween += 1;
        let tween = Tween {
            id: TweenId::new(self.next_tween),
            target: entry.target,
            offset: entry.offset,
            delay: entry.props.delay,
            duration: entry.props.duration,
            ease: entry.props.ease,
            patch,
        };
        let id = tween.id;
        self.in_flight.insert(id, SmallVec::new());

        let lane = match placement {
            Placement::Lane(lane) => Some(lane),
            Placement::Immediate => None,
        };
        let lane_idle = lane.is_none_or(|lane| self.lane_load[lane.index()] == 0);

        if tween.is_instant() && lane_idle {
            self.scheduler.set(tween.target, &tween.patch);
            self.instant.push_back(id);
        } else {
            tracing::trace!(tween = %id, target = ?tween.target, "tween submitted");
            if let Some(lane) = lane {
                self.lane_of.insert(id, lane);
                self.lane_load[lane.index()] += 1;
            }
            batch.push(tween);
        }
        Ok(id)
    }

    /// Run `settle` once every tween in `tweens` completes.
    pub(crate) fn gate(&mut self, tweens: &[TweenId], settle: Settle) -> GateId {
        self.next_gate += 1;
        let id = GateId::new(self.next_gate);
        let gate = ParallelCompletionGate::new(tweens.len());

        if gate.is_open() {
            self.settled.push_back(settle);
            return id;
        }

        for tween in tweens {
            if let Some(feeds) = self.in_flight.get_mut(tween) {
                feeds.push(id);
            }
        }
        self.gates.insert(id, (gate, settle));
        id
    }

    /// Start a deck-wide formation.
    pub(crate) fn begin(&mut self, formation: Formation, cards: usize) -> DeckResult<()> {
        if let Err(err) = self.formation.begin(formation) {
            tracing::warn!(%formation, error = %err, "formation rejected");
            return Err(err);
        }
        tracing::debug!(%formation, cards, "formation submitted");
        Ok(())
    }

    /// Fail if a deck-wide formation is still settling.
    pub(crate) fn ensure_idle(&self, requested: Formation) -> DeckResult<()> {
        self.formation.ensure_idle(requested).inspect_err(|err| {
            tracing::warn!(%requested, error = %err, "operation rejected");
        })
    }

    // === Completion ===

    /// Report a finished tween.
    ///
    /// Gates fed by the tween count it; those that open run their
    /// continuation before this returns.
    #[tracing::instrument(skip(self))]
    pub fn complete(&mut self, id: TweenId) -> DeckResult<()> {
        if !self.finish_tween(id) {
            return Err(DeckError::UnknownTween(id));
        }
        self.run_settled()
    }

    fn finish_tween(&mut self, id: TweenId) -> bool {
        let Some(feeds) = self.in_flight.remove(&id) else {
            return false;
        };
        if let Some(lane) = self.lane_of.remove(&id) {
            self.lane_load[lane.index()] -= 1;
        }
        for gate_id in feeds {
            let opened = self
                .gates
                .get_mut(&gate_id)
                .is_some_and(|(gate, _)| gate.complete_one());
            if opened {
                if let Some((_, settle)) = self.gates.remove(&gate_id) {
                    tracing::debug!(gate = %gate_id, "gate settled");
                    self.settled.push_back(settle);
                }
            }
        }
        true
    }

    /// Complete instant tweens and run opened continuations until quiet.
    pub(crate) fn run_settled(&mut self) -> DeckResult<()> {
        loop {
            if let Some(id) = self.instant.pop_front() {
                self.finish_tween(id);
            } else if let Some(settle) = self.settled.pop_front() {
                self.run_settle(settle)?;
            } else {
                return Ok(());
            }
        }
    }

    fn run_settle(&mut self, settle: Settle) -> DeckResult<()> {
        match settle {
            Settle::Formation(formation, name) => {
                self.formation.settle(formation);
                tracing::debug!(%formation, "formation settled");
                self.fire(DeckEvent::new(name));
            }
            Settle::Notify(event) => self.fire(event),
            Settle::Reveal(card) => self.reveal(card)?,
            Settle::SentToGrid { card, rotate } => {
                let mut patch = TransformPatch::new().with(Property::ScaleX, 1.0);
                match rotate {
                    Some(angle) => {
                        patch = patch
                            .with(Property::Rotation, angle)
                            .with_origin(TransformOrigin::CENTER_BOTTOM);
                    }
                    None => {
                        patch = patch
                            .with(Property::Rotation, 0.0)
                            .with(Property::RotationY, 0.0);
                    }
                }
                self.set(TweenTarget::Card(card), patch)?;
                if !self.formation.is_pending() {
                    self.formation.settle(Formation::SendToGrid);
                }
                self.fire(DeckEvent::for_card(EventName::SendToGrid, card));
            }
            Settle::BigBangExplode { cards, radius, rotation, y } => {
                self.big_bang_explode(cards, radius, rotation, y)?;
            }
            Settle::BigBangSpin { cards, rotation } => self.big_bang_spin(&cards, rotation)?,
            Settle::NiceFlipTurn { card, way } => self.nice_flip_turn(card, way)?,
            Settle::FlipOnItselfTurn { card, way } => self.flip_on_itself_turn(card, way)?,
        }
        Ok(())
    }

    pub(crate) fn reveal(&mut self, card: CardId) -> DeckResult<()> {
        self.card_mut(card)?.face_up = true;
        self.scheduler.reveal(card, true);
        Ok(())
    }

    pub(crate) fn fire(&mut self, event: DeckEvent) {
        tracing::debug!(event = %event, "event");
        self.events.fire(&event);
    }
}

impl CardDeck<RecordingScheduler> {
    /// Report every pending tween complete, in end-time order, until nothing
    /// is left. Continuations that submit more work are drained too.
    ///
    /// Returns how many tweens were completed.
    pub fn run_to_idle(&mut self) -> DeckResult<usize> {
        let mut completed = 0;
        while let Some(next) = self.scheduler.pop_next() {
            self.complete(next.tween.id)?;
            completed += 1;
        }
        Ok(completed)
    }
}

impl<S: Scheduler + std::fmt::Debug> std::fmt::Debug for CardDeck<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDeck")
            .field("cards", &self.cards.len())
            .field("drawn", &self.drawn)
            .field("formation", &self.formation)
            .field("shuffled", &self.shuffled)
            .field("in_flight", &self.in_flight.len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
