//! Numeric helpers shared by formations: spacing, parabolas, unique draws,
//! the light-source shadow model and relative tween deltas.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::grid::{even_spacing, Point};
use crate::core::{DeckRng, LayoutError, LayoutResult, Size};

/// Horizontal position of item `index` in an even row.
///
/// The spacing is truncated to whole units before scaling.
#[must_use]
pub fn position_x(index: usize, item_width: f64, total_width: f64, count: usize) -> f64 {
    index as f64 * even_spacing(total_width, item_width, count).trunc()
}

/// `a * (x - width/2 + offset)^2`.
#[must_use]
pub fn parabola_y(a: f64, x: f64, width: f64, offset: f64) -> f64 {
    let u = x - width / 2.0 + offset;
    a * u * u
}

/// Remembers integers already handed out so draws never repeat.
///
/// A tracker is owned by whoever needs the uniqueness (a deck keeps one per
/// axis for the disperse formation) and is reset explicitly.
#[derive(Clone, Debug, Default)]
pub struct UniqueDrawTracker {
    drawn: FxHashSet<i32>,
}

impl UniqueDrawTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw an integer in `[min, max)` not drawn before.
    pub fn draw(&mut self, rng: &mut DeckRng, min: i32, max: i32) -> LayoutResult<i32> {
        if min >= max {
            return Err(LayoutError::EmptyRange { min, max });
        }
        let span = i64::from(max) - i64::from(min);
        let taken = self.drawn.iter().filter(|&&v| v >= min && v < max).count() as i64;
        if taken >= span {
            return Err(LayoutError::RangeExhausted { min, max });
        }

        loop {
            let value = rng.gen_range(min..max);
            if self.drawn.insert(value) {
                return Ok(value);
            }
        }
    }

    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.drawn.contains(&value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    pub fn reset(&mut self) {
        self.drawn.clear();
    }
}

/// Random integer in `[min, max)`, unique against `tracker` when given.
pub fn random_unique_int(
    rng: &mut DeckRng,
    min: i32,
    max: i32,
    tracker: Option<&mut UniqueDrawTracker>,
) -> LayoutResult<i32> {
    match tracker {
        Some(tracker) => tracker.draw(rng, min, max),
        None if min >= max => Err(LayoutError::EmptyRange { min, max }),
        None => Ok(rng.gen_range(min..max)),
    }
}

/// Uniform in-place permutation.
pub fn shuffle<T>(rng: &mut DeckRng, items: &mut [T]) {
    rng.shuffle(items);
}

/// Drop shadow cast away from a light source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowOffset {
    pub dx: f64,
    pub dy: f64,
    pub blur: f64,
}

/// Light source placed at the container center on first use.
///
/// The origin is latched: later container resizes do not move it until
/// [`reset`](Self::reset) is called.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightSourceTracker {
    origin: Option<Point>,
}

impl LightSourceTracker {
    const SHADOW_SCALE: f64 = 0.05;
    const BLUR_SCALE: f64 = 0.8;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shadow for an element whose top-left corner is at `element`.
    pub fn light_shadow(&mut self, container: Size, element: Point) -> ShadowOffset {
        let origin = *self.origin.get_or_insert_with(|| {
            Point::new((container.width / 2.0).ceil(), (container.height / 2.0).ceil())
        });

        let dx = -(origin.x - element.x) * Self::SHADOW_SCALE;
        let dy = -(origin.y - element.y) * Self::SHADOW_SCALE;
        ShadowOffset {
            dx,
            dy,
            blur: (dx.abs() + dy.abs()) * Self::BLUR_SCALE,
        }
    }

    #[must_use]
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    pub fn reset(&mut self) {
        self.origin = None;
    }
}

/// Target of a single tweened property.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    /// Absolute value.
    To(f64),
    /// Offset from the value at submission.
    By(f64),
    /// Angle reached through the shortest arc.
    Shortest(f64),
}

impl Delta {
    /// Absolute target given the current value.
    #[must_use]
    pub fn resolve(self, current: f64) -> f64 {
        match self {
            Self::To(value) => value,
            Self::By(offset) => current + offset,
            Self::Shortest(target) => shortest_angle_to(current, target),
        }
    }
}

/// The angle equivalent to `target` that is at most 180 degrees from
/// `current`.
#[must_use]
pub fn shortest_angle_to(current: f64, target: f64) -> f64 {
    let mut diff = (target - current).rem_euclid(360.0);
    if diff > 180.0 {
        diff -= 360.0;
    }
    current + diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_x_truncates_spacing() {
        // spacing 17.5 truncates to 17
        assert_eq!(position_x(0, 30.0, 100.0, 4), 0.0);
        assert_eq!(position_x(2, 30.0, 100.0, 4), 34.0);
    }

    #[test]
    fn test_parabola() {
        assert_eq!(parabola_y(1.0, 50.0, 100.0, 0.0), 0.0);
        assert_eq!(parabola_y(0.5, 60.0, 100.0, 0.0), 50.0);
        assert_eq!(parabola_y(2.0, 50.0, 100.0, 3.0), 18.0);
    }

    #[test]
    fn test_unique_draws_cover_range() {
        let mut rng = DeckRng::new(42);
        let mut tracker = UniqueDrawTracker::new();

        let mut values: Vec<i32> = (0..5).map(|_| tracker.draw(&mut rng, 1, 6).unwrap()).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);

        assert_eq!(
            tracker.draw(&mut rng, 1, 6),
            Err(LayoutError::RangeExhausted { min: 1, max: 6 })
        );

        tracker.reset();
        assert!(tracker.is_empty());
        assert!(tracker.draw(&mut rng, 1, 6).is_ok());
    }

    #[test]
    fn test_empty_range() {
        let mut rng = DeckRng::new(1);
        assert_eq!(
            random_unique_int(&mut rng, 3, 3, None),
            Err(LayoutError::EmptyRange { min: 3, max: 3 })
        );
        let mut tracker = UniqueDrawTracker::new();
        assert_eq!(
            random_unique_int(&mut rng, 5, 2, Some(&mut tracker)),
            Err(LayoutError::EmptyRange { min: 5, max: 2 })
        );
    }

    #[test]
    fn test_untracked_draws_stay_in_range() {
        let mut rng = DeckRng::new(9);
        for _ in 0..200 {
            let v = random_unique_int(&mut rng, -3, 4, None).unwrap();
            assert!((-3..4).contains(&v));
        }
    }

    #[test]
    fn test_light_origin_is_latched() {
        let mut light = LightSourceTracker::new();
        let shadow = light.light_shadow(Size::new(101.0, 100.0), Point::new(11.0, 50.0));

        assert_eq!(light.origin(), Some(Point::new(51.0, 50.0)));
        assert!((shadow.dx - -2.0).abs() < 1e-9);
        assert_eq!(shadow.dy, 0.0);
        assert!((shadow.blur - 1.6).abs() < 1e-9);

        // A different container does not move the latched origin.
        light.light_shadow(Size::new(1000.0, 1000.0), Point::new(0.0, 0.0));
        assert_eq!(light.origin(), Some(Point::new(51.0, 50.0)));

        light.reset();
        assert_eq!(light.origin(), None);
    }

    #[test]
    fn test_shortest_angle() {
        assert_eq!(shortest_angle_to(350.0, 0.0), 360.0);
        assert_eq!(shortest_angle_to(10.0, 0.0), 0.0);
        assert_eq!(shortest_angle_to(-300.0, 0.0), -360.0);
        assert_eq!(shortest_angle_to(720.0, 90.0), 810.0);
        assert_eq!(shortest_angle_to(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_delta_resolve() {
        assert_eq!(Delta::To(5.0).resolve(100.0), 5.0);
        assert_eq!(Delta::By(-150.0).resolve(20.0), -130.0);
        assert_eq!(Delta::Shortest(0.0).resolve(190.0), 360.0);
    }
}
