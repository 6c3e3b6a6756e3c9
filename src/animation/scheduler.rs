//! The seam between the deck and whatever renders it.
//!
//! A [`Scheduler`] receives resolved batches and instant property sets. The
//! host reports each finished tween back to the deck by id. The deck never
//! waits on wall-clock time itself.

use serde::{Deserialize, Serialize};

use super::tween::{Lane, Placement, TransformPatch, Tween, TweenBatch, TweenTarget};
use crate::core::CardId;

/// Receives animation work from a deck.
pub trait Scheduler {
    /// Queue a batch. Lane batches start after everything already queued on
    /// that lane; immediate batches start now.
    fn schedule(&mut self, batch: &TweenBatch);

    /// Apply values instantly.
    fn set(&mut self, target: TweenTarget, patch: &TransformPatch);

    /// Move `cards` into the wrapper container so it can be animated as one.
    fn wrap(&mut self, _cards: &[CardId]) {}

    /// Show the face (`true`) or the back of a card.
    fn reveal(&mut self, _card: CardId, _face_up: bool) {}

    /// Show or hide a card without removing it.
    fn set_visible(&mut self, _card: CardId, _visible: bool) {}

    /// Drop everything still queued.
    fn clear(&mut self) {}
}

/// A tween placed on the modeled clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTween {
    pub tween: Tween,
    pub placement: Placement,
    pub start: f64,
    pub end: f64,
}

/// Scheduler that models lane timing instead of rendering.
///
/// Used by tests and by headless hosts: every tween is recorded with an
/// absolute start and end time, and [`pop_next`](Self::pop_next) hands out
/// finished tweens in end-time order so a driver can report them back.
#[derive(Clone, Debug, Default)]
pub struct RecordingScheduler {
    now: f64,
    lane_ends: [f64; 2],
    history: Vec<ScheduledTween>,
    pending: Vec<ScheduledTween>,
    sets: Vec<(TweenTarget, TransformPatch)>,
    wrapped: Vec<CardId>,
    faces: Vec<(CardId, bool)>,
    visibility: Vec<(CardId, bool)>,
    batches: usize,
}

impl RecordingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current modeled time.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Time at which `lane` runs dry.
    #[must_use]
    pub fn lane_end(&self, lane: Lane) -> f64 {
        self.lane_ends[lane.index()]
    }

    /// Every tween ever scheduled, in submission order.
    #[must_use]
    pub fn history(&self) -> &[ScheduledTween] {
        &self.history
    }

    /// Tweens not yet handed out by `pop_next`.
    #[must_use]
    pub fn pending(&self) -> &[ScheduledTween] {
        &self.pending
    }

    /// Instant sets, in order.
    #[must_use]
    pub fn sets(&self) -> &[(TweenTarget, TransformPatch)] {
        &self.sets
    }

    #[must_use]
    pub fn wrapped(&self) -> &[CardId] {
        &self.wrapped
    }

    /// Face changes, in order.
    #[must_use]
    pub fn faces(&self) -> &[(CardId, bool)] {
        &self.faces
    }

    /// Visibility changes, in order.
    #[must_use]
    pub fn visibility(&self) -> &[(CardId, bool)] {
        &self.visibility
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    /// Tweens scheduled for `target`, in submission order.
    pub fn tweens_for(&self, target: TweenTarget) -> impl Iterator<Item = &ScheduledTween> + '_ {
        self.history.iter().filter(move |s| s.tween.target == target)
    }

    /// Remove the pending tween that ends first and advance the clock to it.
    ///
    /// Ties resolve in submission order.
    pub fn pop_next(&mut self) -> Option<ScheduledTween> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.end.total_cmp(&b.end))?;
        let next = self.pending.remove(index);
        self.now = self.now.max(next.end);
        Some(next)
    }

    /// Remove every pending tween, earliest end first.
    pub fn take_pending(&mut self) -> Vec<ScheduledTween> {
        let mut drained = Vec::with_capacity(self.pending.len());
        while let Some(next) = self.pop_next() {
            drained.push(next);
        }
        drained
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule(&mut self, batch: &TweenBatch) {
        let batch_start = match batch.placement {
            Placement::Lane(lane) => self.lane_ends[lane.index()].max(self.now),
            Placement::Immediate => self.now,
        };
        self.batches += 1;

        let mut batch_end = batch_start;
        for tween in &batch.tweens {
            let start = batch_start + tween.start();
            let end = start + tween.duration;
            batch_end = batch_end.max(end);

            let scheduled = ScheduledTween {
                tween: tween.clone(),
                placement: batch.placement,
                start,
                end,
            };
            self.history.push(scheduled.clone());
            self.pending.push(scheduled);
        }

        if let Placement::Lane(lane) = batch.placement {
            self.lane_ends[lane.index()] = batch_end;
        }
    }

    fn set(&mut self, target: TweenTarget, patch: &TransformPatch) {
        self.sets.push((target, patch.clone()));
    }

    fn wrap(&mut self, cards: &[CardId]) {
        self.wrapped = cards.to_vec();
    }

    fn reveal(&mut self, card: CardId, face_up: bool) {
        self.faces.push((card, face_up));
    }

    fn set_visible(&mut self, card: CardId, visible: bool) {
        self.visibility.push((card, visible));
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.lane_ends = [self.now; 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Ease, TweenId};
    use crate::core::Property;

    fn tween(id: u64, offset: f64, duration: f64) -> Tween {
        Tween {
            id: TweenId::new(id),
            target: TweenTarget::Card(CardId::new(id as u32)),
            offset,
            delay: 0.0,
            duration,
            ease: Ease::Linear,
            patch: TransformPatch::new().with(Property::X, 1.0),
        }
    }

    #[test]
    fn test_lane_batches_run_back_to_back() {
        let mut scheduler = RecordingScheduler::new();
        scheduler.schedule(&TweenBatch {
            placement: Placement::Lane(Lane::Primary),
            tweens: vec![tween(1, 0.0, 1.0), tween(2, 0.5, 1.0)],
        });
        scheduler.schedule(&TweenBatch {
            placement: Placement::Lane(Lane::Primary),
            tweens: vec![tween(3, 0.0, 1.0)],
        });

        assert_eq!(scheduler.lane_end(Lane::Primary), 2.5);
        assert_eq!(scheduler.history()[2].start, 1.5);
        assert_eq!(scheduler.batch_count(), 2);
    }

    #[test]
    fn test_lanes_are_independent() {
        let mut scheduler = RecordingScheduler::new();
        scheduler.schedule(&TweenBatch {
            placement: Placement::Lane(Lane::Primary),
            tweens: vec![tween(1, 0.0, 2.0)],
        });
        scheduler.schedule(&TweenBatch {
            placement: Placement::Lane(Lane::Secondary),
            tweens: vec![tween(2, 0.0, 1.0)],
        });
        scheduler.schedule(&TweenBatch {
            placement: Placement::Immediate,
            tweens: vec![tween(3, 0.0, 0.5)],
        });

        assert_eq!(scheduler.lane_end(Lane::Secondary), 1.0);
        let ids: Vec<u64> = scheduler.take_pending().iter().map(|s| s.tween.id.raw()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(scheduler.now(), 2.0);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut scheduler = RecordingScheduler::new();
        scheduler.schedule(&TweenBatch {
            placement: Placement::Lane(Lane::Primary),
            tweens: vec![tween(1, 0.0, 2.0)],
        });
        scheduler.clear();

        assert!(scheduler.pending().is_empty());
        assert_eq!(scheduler.lane_end(Lane::Primary), 0.0);
        assert_eq!(scheduler.history().len(), 1);
    }
}
