//! Tween descriptions handed to a [`Scheduler`](super::Scheduler).
//!
//! Formations describe what each card should do with [`TweenProps`]: a list
//! of property deltas plus timing. The deck resolves the deltas against its
//! modeled transforms, so the scheduler only ever sees absolute
//! [`TransformPatch`] values.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Ease;
use crate::core::{CardId, Property, Transform, TransformOrigin};
use crate::layout::Delta;

/// Unique identifier of a submitted tween.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TweenId(pub u64);

impl TweenId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tween_{}", self.0)
    }
}

/// What a tween animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TweenTarget {
    Card(CardId),
    /// Container holding every card, used by the big bang spin.
    Wrapper,
}

/// Absolute property values, applied together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    values: SmallVec<[(Property, f64); 6]>,
    origin: Option<TransformOrigin>,
}

impl TransformPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `property`, replacing an earlier value for it.
    #[must_use]
    pub fn with(mut self, property: Property, value: f64) -> Self {
        self.insert(property, value);
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: TransformOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn insert(&mut self, property: Property, value: f64) {
        match self.values.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.values.push((property, value)),
        }
    }

    #[must_use]
    pub fn get(&self, property: Property) -> Option<f64> {
        self.values.iter().find(|(p, _)| *p == property).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn origin(&self) -> Option<TransformOrigin> {
        self.origin
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f64)> + '_ {
        self.values.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.origin.is_none()
    }

    /// Write every value into `transform`.
    pub fn apply_to(&self, transform: &mut Transform) {
        for (property, value) in self.iter() {
            transform.set(property, value);
        }
        if let Some(origin) = self.origin {
            transform.origin = origin;
        }
    }
}

/// Relative tween description built by formations.
///
/// ```
/// use tarot_deck::animation::{Ease, TweenProps};
/// use tarot_deck::core::Property;
///
/// let props = TweenProps::new(0.5)
///     .to(Property::X, 20.0)
///     .by(Property::Left, -150.0)
///     .shortest(Property::Rotation, 0.0)
///     .delay(0.2)
///     .ease(Ease::Linear);
/// assert_eq!(props.duration, 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TweenProps {
    pub values: SmallVec<[(Property, Delta); 6]>,
    pub origin: Option<TransformOrigin>,
    pub duration: f64,
    pub delay: f64,
    pub ease: Ease,
}

impl TweenProps {
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            values: SmallVec::new(),
            origin: None,
            duration,
            delay: 0.0,
            ease: Ease::default(),
        }
    }

    #[must_use]
    pub fn to(self, property: Property, value: f64) -> Self {
        self.value(property, Delta::To(value))
    }

    #[must_use]
    pub fn by(self, property: Property, offset: f64) -> Self {
        self.value(property, Delta::By(offset))
    }

    #[must_use]
    pub fn shortest(self, property: Property, angle: f64) -> Self {
        self.value(property, Delta::Shortest(angle))
    }

    #[must_use]
    pub fn value(mut self, property: Property, delta: Delta) -> Self {
        match self.values.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = delta,
            None => self.values.push((property, delta)),
        }
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: TransformOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Absolute patch for a card currently at `current`.
    #[must_use]
    pub fn resolve(&self, current: &Transform) -> TransformPatch {
        let mut patch = TransformPatch::new();
        for &(property, delta) in &self.values {
            patch.insert(property, delta.resolve(current.get(property)));
        }
        patch.origin = self.origin;
        patch
    }
}

/// A resolved tween.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub id: TweenId,
    pub target: TweenTarget,
    /// Start offset inside its batch (stagger position).
    pub offset: f64,
    pub delay: f64,
    pub duration: f64,
    pub ease: Ease,
    pub patch: TransformPatch,
}

impl Tween {
    /// Start time relative to the batch start.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.offset + self.delay
    }

    /// Relative end time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start() + self.duration
    }

    /// Takes no time at all; the deck applies it directly.
    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.end() <= 0.0
    }
}

/// Sequential timeline a batch is appended to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Primary,
    Secondary,
}

impl Lane {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }

    /// Lane for an even (0) or odd (1) parity class.
    #[must_use]
    pub const fn for_parity(parity: usize) -> Self {
        if parity % 2 == 0 {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

/// Where a batch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// After everything already queued on the lane.
    Lane(Lane),
    /// Right away, outside both lanes.
    Immediate,
}

/// Tweens submitted together. Their offsets are relative to a shared start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenBatch {
    pub placement: Placement,
    pub tweens: Vec<Tween>,
}

impl TweenBatch {
    /// Relative end of the last tween.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.tweens.iter().map(Tween::end).fold(0.0, f64::max)
    }
}
