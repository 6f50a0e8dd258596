use crate::{
    data::types::Element,
    map::entities::{Loot, ObstacleKind},
};

/// Per-frame snapshot of the player handed to the systems.
#[derive(Clone, Debug, Default)]
pub struct PlayerContext {
    pub x: f32,
    pub y: f32,
    pub previous: (f32, f32),
    pub dt: f32,
    pub party_types: Vec<Element>,
}

impl PlayerContext {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn previous_distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.previous.0 - x;
        let dy = self.previous.1 - y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    TrapSprung {
        damage: i32,
    },
    ChestOpened {
        loot: Loot,
    },
    ObstacleCleared {
        kind: ObstacleKind,
        by: Element,
        cell: (i32, i32),
    },
    ObstacleBlocked {
        kind: ObstacleKind,
        requires: Element,
    },
}

#[derive(Default)]
pub struct InteractionLog {
    pub entries: Vec<Interaction>,
}

impl InteractionLog {
    pub fn push(&mut self, entry: Interaction) {
        self.entries.push(entry);
    }
}
