//! Deck configuration.
//!
//! Hosts configure a deck at construction by providing:
//! - `DeckConfig`: card count, sizes, draw cap, grid layout, seed
//! - `DeckParams`: every timing, position and fan constant the formations use
//!
//! Param field names serialize in camelCase so partial JSON patches keep the
//! shape presentation scripts already use (`{"times": {"staggerInterval": 0}}`).

use serde::{Deserialize, Serialize};

use super::error::{DeckError, DeckResult};
use crate::animation::Ease;
use crate::layout::Point;

/// Container size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// How drawn cards are laid out on the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridLayout {
    /// Rows of digits; non-zero digits are occupied cells in placement order.
    Matrix {
        rows: Vec<String>,
        /// Zero cells advance half a cell instead of a full one.
        half_zero: bool,
    },
    /// Slots evenly spaced on a circle.
    Circle { center: Point, radius: f64, start: f64 },
}

impl GridLayout {
    /// Matrix layout from row strings.
    pub fn matrix<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self::Matrix {
            rows: rows.into_iter().map(Into::into).collect(),
            half_zero: false,
        }
    }

    /// Slots available to a deck drawing up to `max_draught` cards.
    ///
    /// A circle always has one per drawable card; a matrix has one per
    /// non-zero digit.
    #[must_use]
    pub fn slot_count(&self, max_draught: usize) -> usize {
        match self {
            Self::Matrix { rows, .. } => rows
                .iter()
                .flat_map(|row| row.chars())
                .filter(|c| matches!(c, '1'..='9'))
                .count(),
            Self::Circle { .. } => max_draught,
        }
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::matrix(["010", "234", "050"])
    }
}

/// Durations, intervals and delays in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeParams {
    pub stagger_interval: f64,
    pub center: f64,
    pub regroup: f64,
    pub spread_regroup: f64,
    pub spread: f64,
    pub spreado: f64,
    pub reverse_spreado: f64,
    pub light_spreado: f64,
    pub roll: f64,
    pub unfan: f64,
    pub fan_regroup: f64,
    pub fan: f64,
    pub disperse: f64,
    pub cut: f64,
    pub highlight: f64,
    pub flip: f64,
    pub send_away: f64,
    pub delay_send_away: f64,
    pub uni_q: f64,
    pub nice_slide: f64,
    pub nice_flip: f64,
    pub flip_on_itself: f64,
    pub send_to_grid: f64,
    pub delay_send_to_grid: f64,
    /// Spread-out and lift stages of a shuffle.
    pub shuffle_lift: f64,
    pub shuffle_one: f64,
    pub shuffle_settle_interval: f64,
    pub big_bang_gather: f64,
    pub big_bang: f64,
    pub big_bang_spin: f64,
    pub move_away: f64,
}

impl Default for TimeParams {
    fn default() -> Self {
        Self {
            stagger_interval: 0.07,
            center: 0.2,
            regroup: 0.5,
            spread_regroup: 0.4,
            spread: 0.1,
            spreado: 0.01,
            reverse_spreado: 0.01,
            light_spreado: 0.01,
            roll: 0.1,
            unfan: 0.5,
            fan_regroup: 0.5,
            fan: 0.02,
            disperse: 0.1,
            cut: 0.5,
            highlight: 0.5,
            flip: 1.0,
            send_away: 0.5,
            delay_send_away: 0.5,
            uni_q: 0.5,
            nice_slide: 0.5,
            nice_flip: 0.5,
            flip_on_itself: 0.5,
            send_to_grid: 0.5,
            delay_send_to_grid: 0.7,
            shuffle_lift: 0.5,
            shuffle_one: 0.5,
            shuffle_settle_interval: 0.1,
            big_bang_gather: 0.5,
            big_bang: 1.0,
            big_bang_spin: 3.0,
            move_away: 0.8,
        }
    }
}

/// A placement anchor; each formation reads the fields it needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchor {
    pub left: f64,
    pub top: f64,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    #[must_use]
    pub const fn new(left: f64, top: f64, x: f64, y: f64) -> Self {
        Self { left, top, x, y }
    }
}

/// Two piles used by the cut display and the shuffle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutPositions {
    pub left: f64,
    pub left2: f64,
    pub x: f64,
    pub x2: f64,
}

impl Default for CutPositions {
    fn default() -> Self {
        Self { left: 20.0, left2: 61.0, x: 20.0, x2: 400.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPositions {
    pub top: f64,
    pub y: f64,
    pub cut: CutPositions,
    pub left: Anchor,
    pub right: Anchor,
    pub middle: Anchor,
    pub light: Anchor,
}

impl Default for DisplayPositions {
    fn default() -> Self {
        Self {
            top: 15.0,
            y: 12.0,
            cut: CutPositions::default(),
            left: Anchor::new(20.0, 0.0, 368.0, 0.0),
            right: Anchor::new(68.0, 0.0, 368.0, 0.0),
            middle: Anchor::new(41.0, 0.0, 0.0, 130.0),
            light: Anchor::new(68.0, 0.0, 368.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegroupPositions {
    pub left: f64,
    /// Rotation the cards spin by before regrouping.
    pub rotation: f64,
}

impl Default for RegroupPositions {
    fn default() -> Self {
        Self { left: 40.0, rotation: -300.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqPositions {
    pub top1: f64,
    pub top2: f64,
    pub width: f64,
    pub left: f64,
}

impl Default for UniqPositions {
    fn default() -> Self {
        Self { top1: 8.0, top2: 21.0, width: 35.0, left: 41.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BigBangPositions {
    pub y_small: f64,
    pub y_big: f64,
}

impl Default for BigBangPositions {
    fn default() -> Self {
        Self { y_small: -130.0, y_big: -196.0 }
    }
}

/// Target positions of every formation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionParams {
    pub display: DisplayPositions,
    pub center: Anchor,
    pub regroup: RegroupPositions,
    pub spread: Anchor,
    pub spreado: Anchor,
    pub reverse_spreado: Anchor,
    pub light_spreado: Anchor,
    pub uni_q: UniqPositions,
    pub roll: Anchor,
    pub fan: Anchor,
    pub nice_slide: Anchor,
    pub big_bang: BigBangPositions,
}

impl Default for PositionParams {
    fn default() -> Self {
        Self {
            display: DisplayPositions::default(),
            center: Anchor::new(40.0, 50.0, 213.0, 130.0),
            regroup: RegroupPositions::default(),
            spread: Anchor::new(10.0, 0.0, 20.0, 0.0),
            spreado: Anchor::new(8.0, 0.0, 20.0, 0.0),
            reverse_spreado: Anchor::new(92.0, 0.0, 20.0, 0.0),
            light_spreado: Anchor::new(8.0, 5.0, 20.0, 100.0),
            uni_q: UniqPositions::default(),
            roll: Anchor::new(90.0, -15.0, 465.0, -30.0),
            fan: Anchor::new(0.0, 10.0, 0.0, 10.0),
            nice_slide: Anchor::new(0.0, 17.0, 112.0, 17.0),
            big_bang: BigBangPositions::default(),
        }
    }
}

/// Start delays in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParams {
    pub center: f64,
    pub regroup: f64,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self { center: 1.0, regroup: 1.0 }
    }
}

/// Formation tuning knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckParams {
    pub times: TimeParams,
    pub position: PositionParams,
    pub delay: DelayParams,
    /// Horizontal distance covered by the spread formations.
    pub spread_length: f64,
    /// First fan angle; `None` uses `fan_angle`.
    pub fan_start: Option<f64>,
    /// Half-width of the fan in degrees.
    pub fan_angle: f64,
    /// Vertical pivot of the fan in percent of card height. Negative fans
    /// from the opposite side.
    pub fan_origin: f64,
    pub fan_hover_top: f64,
    /// Depth added while shuffling piles are lifted.
    pub shuffle_z: f64,
    pub easing: Ease,
    /// Rotation added per card in the light display.
    pub light_rotation_step: f64,
}

impl Default for DeckParams {
    fn default() -> Self {
        Self {
            times: TimeParams::default(),
            position: PositionParams::default(),
            delay: DelayParams::default(),
            spread_length: 380.0,
            fan_start: None,
            fan_angle: 50.0,
            fan_origin: 200.0,
            fan_hover_top: 1.0,
            shuffle_z: 100.0,
            easing: Ease::InCubic,
            light_rotation_step: 1.0,
        }
    }
}

impl DeckParams {
    /// Deep-merge a partial JSON object into these params.
    ///
    /// Objects merge key by key; any other value replaces the target.
    pub fn merged(&self, patch: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        merge_json(&mut value, patch);
        serde_json::from_value(value)
    }

    /// Angle of the first fanned card.
    #[must_use]
    pub fn fan_start(&self) -> f64 {
        self.fan_start.unwrap_or(self.fan_angle)
    }
}

/// Recursive JSON merge: `patch` objects extend `target` objects.
pub fn merge_json(target: &mut serde_json::Value, patch: &serde_json::Value) {
    match (target, patch) {
        (serde_json::Value::Object(target), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(target.entry(key.clone()).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Complete deck configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckConfig {
    pub card_count: usize,
    /// Card width in percent of the container width.
    pub card_width: f64,
    /// Card height over card width.
    pub card_aspect: f64,
    pub container: Size,
    /// Maximum number of cards that can be drawn.
    pub max_draught: usize,
    pub layout: GridLayout,
    /// Presentation runs in the full-page layout.
    pub full_page: bool,
    pub seed: u64,
    pub params: DeckParams,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            card_count: 22,
            card_width: 19.0,
            card_aspect: 1.72,
            container: Size::new(652.0, 640.0),
            max_draught: 3,
            layout: GridLayout::default(),
            full_page: false,
            seed: 42,
            params: DeckParams::default(),
        }
    }
}

impl DeckConfig {
    /// Create a configuration for `card_count` cards with default sizes.
    #[must_use]
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_draught(mut self, max: usize) -> Self {
        self.max_draught = max;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_container(mut self, width: f64, height: f64) -> Self {
        self.container = Size::new(width, height);
        self
    }

    #[must_use]
    pub fn with_card_width(mut self, width: f64) -> Self {
        self.card_width = width;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: DeckParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn full_page(mut self) -> Self {
        self.full_page = true;
        self
    }

    /// Card width in pixels.
    #[must_use]
    pub fn card_width_px(&self) -> f64 {
        self.container.width * self.card_width / 100.0
    }

    /// Card height in pixels.
    #[must_use]
    pub fn card_height_px(&self) -> f64 {
        self.card_width_px() * self.card_aspect
    }

    /// Fail when the grid has fewer slots than cards that can be drawn.
    pub fn validate(&self) -> DeckResult<()> {
        let slots = self.layout.slot_count(self.max_draught);
        if slots < self.max_draught {
            return Err(DeckError::GridTooSmall {
                slots,
                max_draught: self.max_draught,
            });
        }
        Ok(())
    }

    /// Card height in percent of the container height.
    #[must_use]
    pub fn card_height(&self) -> f64 {
        self.card_height_px() * 100.0 / self.container.height
    }
}
