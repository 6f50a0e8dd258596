use serde::{Deserialize, Serialize};

use crate::map::TileGrid;

use super::input::InputState;

pub const MOVE_SPEED: f32 = 2.1;
pub const TURN_SPEED: f32 = 2.5;
pub const DRAG_SENSITIVITY: f32 = 0.003;
pub const MAX_HEALTH: i32 = 100;

/// The explorer in first person. Position is continuous; `angle` is in
/// radians with 0 along +x.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
}

impl Player {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            health: MAX_HEALTH,
        }
    }

    /// Applies trap damage; returns `true` when health ran out.
    pub fn hurt(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).clamp(0, MAX_HEALTH);
        self.health == 0
    }

    /// Turns, then moves with each axis checked on its own so the player
    /// slides along walls instead of sticking to them.
    pub fn step(&mut self, grid: &TileGrid, input: &mut InputState, dt: f32) {
        self.angle += input.turn() * TURN_SPEED * dt + input.take_drag() * DRAG_SENSITIVITY;

        let forward = input.forward();
        let strafe = input.strafe();
        if forward == 0.0 && strafe == 0.0 {
            return;
        }
        let (sin, cos) = self.angle.sin_cos();
        let dx = cos * forward - sin * strafe;
        let dy = sin * forward + cos * strafe;
        let nx = self.x + dx * MOVE_SPEED * dt;
        let ny = self.y + dy * MOVE_SPEED * dt;
        if !grid.blocks_movement_at(nx, self.y) {
            self.x = nx;
        }
        if !grid.blocks_movement_at(self.x, ny) {
            self.y = ny;
        }
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}
