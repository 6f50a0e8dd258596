use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, DenseVecStorage, VecStorage};

use crate::map::entities::EntityKind;

/// Continuous map position, cell `(x, y)` spans `[x, x + 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub color: RGB,
    /// Billboard size relative to a wall slice at the same distance.
    pub scale: f32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

/// What a floor entity is and its trigger state.
#[derive(Clone, Debug)]
pub struct Feature {
    pub kind: EntityKind,
}

impl Component for Feature {
    type Storage = VecStorage<Self>;
}

/// Short flash after a trigger point (trap sprung, chest opened).
#[derive(Clone, Debug)]
pub struct Animation {
    pub remaining: f32,
}

impl Component for Animation {
    type Storage = DenseVecStorage<Self>;
}
