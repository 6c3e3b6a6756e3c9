//! Step-driven orchestration of a deck.
//!
//! The controller runs a step's commands one at a time. A command that
//! animates registers a handler for its completion event before it starts,
//! and the handler is unregistered as soon as that event arrives; only then
//! does the next command run. Events land in an inbox and are processed by
//! [`PresentationController::pump`], which the tween and click entry points
//! call for the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::step::{DeckCommand, StepEntered, StepId, StepNavigator, StepPlan};
use crate::animation::{Scheduler, TweenId};
use crate::core::{CardId, DeckResult, PresentationError};
use crate::data::{CardData, CardDataSource};
use crate::deck::CardDeck;
use crate::events::{DeckEvent, EventName, HandlerId};
use crate::layout::Point;

pub type PresentationResult<T> = Result<T, PresentationError>;

/// What the controller is waiting for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing queued.
    #[default]
    Idle,
    /// Running a step's commands.
    Running,
    /// A click on a card will cut the deck there.
    AwaitingCut,
    /// Clicks draw cards until `remaining` more are drawn.
    AwaitingDraws { remaining: usize },
}

struct Awaited {
    name: EventName,
    card: Option<CardId>,
    handler: HandlerId,
}

/// Owns the deck for a presentation session and drives it from steps.
pub struct PresentationController<S: Scheduler, N: StepNavigator> {
    deck: CardDeck<S>,
    navigator: N,
    plans: FxHashMap<StepId, StepPlan>,
    queue: VecDeque<DeckCommand>,
    awaited: Option<Awaited>,
    inbox: Rc<RefCell<VecDeque<DeckEvent>>>,
    phase: Phase,
    data: Option<CardData>,
    grid_origin: Point,
    goto_duration_ms: u64,
}

impl<S: Scheduler, N: StepNavigator> PresentationController<S, N> {
    pub fn new(deck: CardDeck<S>, navigator: N) -> Self {
        Self {
            deck,
            navigator,
            plans: FxHashMap::default(),
            queue: VecDeque::new(),
            awaited: None,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            phase: Phase::Idle,
            data: None,
            grid_origin: Point::default(),
            goto_duration_ms: 1000,
        }
    }

    #[must_use]
    pub fn with_plan(mut self, step: impl Into<String>, plan: StepPlan) -> Self {
        self.add_plan(StepId::new(step), plan);
        self
    }

    /// Grid origin used by draws.
    #[must_use]
    pub fn with_grid_origin(mut self, origin: Point) -> Self {
        self.grid_origin = origin;
        self
    }

    #[must_use]
    pub fn with_goto_duration(mut self, duration_ms: u64) -> Self {
        self.goto_duration_ms = duration_ms;
        self
    }

    pub fn add_plan(&mut self, step: StepId, plan: StepPlan) {
        self.plans.insert(step, plan);
    }

    pub fn deck(&self) -> &CardDeck<S> {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut CardDeck<S> {
        &mut self.deck
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Event the current command is waiting for.
    #[must_use]
    pub fn awaiting(&self) -> Option<&EventName> {
        self.awaited.as_ref().map(|a| &a.name)
    }

    /// Commands not yet started.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn data(&self) -> Option<&CardData> {
        self.data.as_ref()
    }

    // === Data ===

    /// Load card data from `source`.
    ///
    /// On failure placeholder data for the deck's cards is installed and the
    /// error is returned, so the presentation can carry on without texts.
    pub fn load_data(&mut self, source: &dyn CardDataSource) -> PresentationResult<&CardData> {
        match source.fetch() {
            Ok(data) => Ok(self.data.insert(data)),
            Err(err) => {
                tracing::warn!(error = %err, "card data unavailable, using placeholders");
                self.data = Some(CardData::placeholder(self.deck.card_count()));
                Err(err.into())
            }
        }
    }

    // === Step handling ===

    /// Start the plan of the entered step.
    ///
    /// Whatever the previous step still had queued is dropped, and its
    /// pending completion handler is unregistered.
    #[tracing::instrument(
        skip(self, entered),
        fields(step = %entered.step, reentry = entered.is_reentry)
    )]
    pub fn step_entered(&mut self, entered: &StepEntered) -> PresentationResult<()> {
        let plan = self
            .plans
            .get(&entered.step)
            .ok_or_else(|| PresentationError::UnknownStep(entered.step.clone()))?;
        let commands: VecDeque<DeckCommand> =
            plan.commands(entered.is_reentry).iter().cloned().collect();

        self.abandon();
        tracing::debug!(commands = commands.len(), "step plan started");
        self.queue = commands;
        self.phase = Phase::Running;
        self.run_queue()
    }

    fn abandon(&mut self) {
        if let Some(awaited) = self.awaited.take() {
            self.deck.events_mut().off(awaited.handler);
            tracing::debug!(event = %awaited.name, "dropped pending completion handler");
        }
        self.queue.clear();
        self.inbox.borrow_mut().clear();
        self.phase = Phase::Idle;
    }

    /// Report a finished tween to the deck and react to what it fired.
    pub fn tween_completed(&mut self, id: TweenId) -> PresentationResult<usize> {
        self.deck.complete(id)?;
        self.pump()
    }

    /// Process received events and run commands they unblock.
    ///
    /// Returns how many events were processed.
    pub fn pump(&mut self) -> PresentationResult<usize> {
        let mut processed = 0;
        while let Some(event) = self.next_event() {
            processed += 1;
            if !self.settle_awaited(&event) {
                continue;
            }
            if self.phase == (Phase::AwaitingDraws { remaining: 0 }) {
                self.phase = Phase::Running;
            }
            if self.phase == Phase::Running {
                self.run_queue()?;
            }
        }
        Ok(processed)
    }

    fn next_event(&self) -> Option<DeckEvent> {
        self.inbox.borrow_mut().pop_front()
    }

    /// Clear the wait if `event` is the one awaited, unregistering its
    /// handler.
    fn settle_awaited(&mut self, event: &DeckEvent) -> bool {
        let matched = self.awaited.as_ref().is_some_and(|a| {
            a.name == event.name && a.card.is_none_or(|card| event.card() == Some(card))
        });
        if matched {
            if let Some(awaited) = self.awaited.take() {
                self.deck.events_mut().off(awaited.handler);
                tracing::debug!(event = %event, "command completed");
            }
        }
        matched
    }

    /// Handle a click on a card.
    ///
    /// While awaiting a cut the click cuts the deck there; while awaiting
    /// draws it draws the card onto the grid. Returns whether the click was
    /// consumed by the current phase.
    pub fn card_clicked(&mut self, card: CardId) -> PresentationResult<bool> {
        match self.phase {
            Phase::AwaitingCut => {
                self.deck.click(card, Some("cut"))?;
                self.await_event(EventName::Cut, None, |deck| deck.cut(card))?;
                self.phase = Phase::Running;
            }
            Phase::AwaitingDraws { remaining } if remaining > 0 => {
                self.deck.click(card, Some("draw"))?;
                let origin = self.grid_origin;
                let remaining = remaining - 1;
                if remaining == 0 {
                    // The step goes on once the last drawn card lands.
                    self.await_event(EventName::SendToGrid, Some(card), |deck| {
                        deck.draw_to_grid(card, origin).map(|_| ())
                    })?;
                } else {
                    self.deck.draw_to_grid(card, origin)?;
                }
                self.phase = Phase::AwaitingDraws { remaining };
            }
            _ => {
                self.deck.click(card, None)?;
                return Ok(false);
            }
        }
        self.pump()?;
        Ok(true)
    }

    fn run_queue(&mut self) -> PresentationResult<()> {
        while self.awaited.is_none() && self.phase == Phase::Running {
            let Some(command) = self.queue.pop_front() else {
                self.phase = Phase::Idle;
                tracing::debug!("step plan finished");
                return Ok(());
            };
            if let Err(err) = self.execute(command) {
                self.queue.clear();
                self.phase = Phase::Idle;
                return Err(err);
            }
            // Zero-duration work completes inline.
            while let Some(event) = self.next_event() {
                self.settle_awaited(&event);
            }
        }
        Ok(())
    }

    fn execute(&mut self, command: DeckCommand) -> PresentationResult<()> {
        tracing::trace!(?command, "executing");
        if let Some(name) = command.completion() {
            return self.await_event(name, None, |deck| run_deck_command(deck, &command));
        }

        match command {
            DeckCommand::Display(kind) => self.deck.display(kind)?,
            DeckCommand::ResetCards => self.deck.reset_cards()?,
            DeckCommand::ArmHover => self.deck.arm_hover(None)?,
            DeckCommand::SetParams(patch) => self.deck.set_params(&patch)?,
            DeckCommand::AwaitCut => self.phase = Phase::AwaitingCut,
            DeckCommand::AwaitDraws => {
                let remaining = self
                    .deck
                    .config()
                    .max_draught
                    .saturating_sub(self.deck.drawn().len());
                if remaining > 0 {
                    self.phase = Phase::AwaitingDraws { remaining };
                }
            }
            DeckCommand::Advance => {
                if !self.navigator.next() {
                    tracing::debug!("navigator has no next step");
                }
            }
            DeckCommand::Goto(step) => {
                if !self.navigator.goto(&step, self.goto_duration_ms) {
                    tracing::warn!(%step, "navigator refused step");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Wait for `name` (about `card`, if given), then run `start`. The
    /// handler is dropped again if `start` fails.
    fn await_event(
        &mut self,
        name: EventName,
        card: Option<CardId>,
        start: impl FnOnce(&mut CardDeck<S>) -> DeckResult<()>,
    ) -> PresentationResult<()> {
        let inbox = Rc::clone(&self.inbox);
        let handler = self
            .deck
            .on(name.clone(), move |event| inbox.borrow_mut().push_back(event.clone()));
        self.awaited = Some(Awaited { name, card, handler });

        if let Err(err) = start(&mut self.deck) {
            if let Some(awaited) = self.awaited.take() {
                self.deck.events_mut().off(awaited.handler);
            }
            return Err(err.into());
        }
        Ok(())
    }
}

fn run_deck_command<S: Scheduler>(
    deck: &mut CardDeck<S>,
    command: &DeckCommand,
) -> DeckResult<()> {
    match command {
        DeckCommand::Center { rotate } => deck.center(*rotate),
        DeckCommand::Regroup => deck.regroup(),
        DeckCommand::RegroupRotate => deck.regroup_rotate(),
        DeckCommand::Spread => deck.spread(),
        DeckCommand::Spreado(tag) => deck.spreado(*tag),
        DeckCommand::ReverseSpreado => deck.reverse_spreado(),
        DeckCommand::LightSpreado { random } => deck.light_spreado(*random),
        DeckCommand::Roll { way, angle } => deck.roll(*way, *angle),
        DeckCommand::BigBang { radius, rotation } => deck.big_bang(*radius, *rotation),
        DeckCommand::Snail => deck.snail(),
        DeckCommand::Fan => deck.fan(),
        DeckCommand::Unfan => deck.unfan(),
        DeckCommand::Disperse => deck.disperse(),
        DeckCommand::ShuffleOne => deck.shuffle_one(),
        DeckCommand::CenterGrid(origin) => deck.center_grid(*origin),
        DeckCommand::HandleLastCard => deck.handle_last_card().map(|_| ()),
        DeckCommand::MoveCardsAway(cards) => deck.move_cards_away(cards),
        _ => Ok(()),
    }
}

impl<S: Scheduler + std::fmt::Debug, N: StepNavigator> std::fmt::Debug for PresentationController<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationController")
            .field("deck", &self.deck)
            .field("phase", &self.phase)
            .field("queued", &self.queue.len())
            .field("awaiting", &self.awaiting())
            .finish()
    }
}
