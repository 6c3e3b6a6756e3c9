//! Card identity and modeled visual state.
//!
//! A `Card` is owned by the deck for the whole session. Formations never
//! create or destroy cards; they only move the modeled `Transform` that
//! mirrors what the rendering layer shows.
//!
//! ## ID Layout
//!
//! Ids run `1..=card_count`, assigned at deck build time. The parity class
//! (`0` or `1`) follows the build index, so card 1 is class 0, card 2 is
//! class 1, and so on. Two-lane formations split the deck along it.

use serde::{Deserialize, Serialize};

/// Unique card identifier, stable for the lifetime of a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Zero-based build index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// Parity class used to split the deck across the two timelines.
    #[must_use]
    pub const fn parity(self) -> u8 {
        (self.index() % 2) as u8
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card_{}", self.0)
    }
}

/// A tweenable transform property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Left offset, % of container width.
    Left,
    /// Top offset, % of container height.
    Top,
    /// Horizontal translate, % of card width.
    X,
    /// Vertical translate, % of card height.
    Y,
    /// Depth translate.
    Z,
    /// In-plane rotation, degrees.
    Rotation,
    RotationX,
    RotationY,
    Scale,
    ScaleX,
    ScaleY,
    /// Rendered width, % of container width.
    Width,
    /// Stacking order.
    ZIndex,
}

/// Pivot for rotation and scale, in percent of the card box.
///
/// `0` is left/top, `50` center, `100` right/bottom. Values outside that
/// range are legal: fans pivot far below the card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformOrigin {
    pub x: f64,
    pub y: f64,
}

impl TransformOrigin {
    pub const CENTER: Self = Self::new(50.0, 50.0);
    pub const LEFT_BOTTOM: Self = Self::new(0.0, 100.0);
    pub const RIGHT_BOTTOM: Self = Self::new(100.0, 100.0);
    pub const CENTER_BOTTOM: Self = Self::new(50.0, 100.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontally centered pivot at a vertical percentage.
    #[must_use]
    pub const fn center_at(y: f64) -> Self {
        Self::new(50.0, y)
    }
}

impl Default for TransformOrigin {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Modeled visual state of one card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub left: f64,
    pub top: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub scale: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
    pub z_index: f64,
    pub origin: TransformOrigin,
}

impl Transform {
    /// Identity transform for a card of the given width.
    #[must_use]
    pub fn with_width(width: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            rotation: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width,
            z_index: 0.0,
            origin: TransformOrigin::CENTER,
        }
    }

    /// Read one property.
    #[must_use]
    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::Left => self.left,
            Property::Top => self.top,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Z => self.z,
            Property::Rotation => self.rotation,
            Property::RotationX => self.rotation_x,
            Property::RotationY => self.rotation_y,
            Property::Scale => self.scale,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::Width => self.width,
            Property::ZIndex => self.z_index,
        }
    }

    /// Write one property.
    pub fn set(&mut self, property: Property, value: f64) {
        let slot = match property {
            Property::Left => &mut self.left,
            Property::Top => &mut self.top,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Z => &mut self.z,
            Property::Rotation => &mut self.rotation,
            Property::RotationX => &mut self.rotation_x,
            Property::RotationY => &mut self.rotation_y,
            Property::Scale => &mut self.scale,
            Property::ScaleX => &mut self.scale_x,
            Property::ScaleY => &mut self.scale_y,
            Property::Width => &mut self.width,
            Property::ZIndex => &mut self.z_index,
        };
        *slot = value;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::with_width(0.0)
    }
}

/// A card in the deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub transform: Transform,
    pub face_up: bool,
    /// Removed from the undrawn pool.
    pub drawn: bool,
    /// Hidden cards stay in the deck but are not rendered.
    pub hidden: bool,
    /// Resting vertical translate recorded when hover is armed.
    pub rest_y: Option<f64>,
}

impl Card {
    /// Create a face-down, undrawn card.
    #[must_use]
    pub fn new(id: CardId, width: f64) -> Self {
        Self {
            id,
            transform: Transform::with_width(width),
            face_up: false,
            drawn: false,
            hidden: false,
            rest_y: None,
        }
    }
}
