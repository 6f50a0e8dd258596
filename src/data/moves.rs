use serde::{Deserialize, Serialize};

use super::types::Element;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
}

/// Static move record as served by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveData {
    pub name: &'static str,
    pub power: u32,
    pub accuracy: u32,
    pub pp: u32,
    pub element: Element,
    pub category: MoveCategory,
}

impl MoveData {
    const fn new(
        name: &'static str,
        power: u32,
        accuracy: u32,
        pp: u32,
        element: Element,
        category: MoveCategory,
    ) -> Self {
        Self {
            name,
            power,
            accuracy,
            pp,
            element,
            category,
        }
    }
}

use Element::*;
use MoveCategory::*;

pub const MOVES: &[MoveData] = &[
    MoveData::new("tackle", 40, 100, 35, Normal, Physical),
    MoveData::new("scratch", 40, 100, 35, Normal, Physical),
    MoveData::new("quick-attack", 40, 100, 30, Normal, Physical),
    MoveData::new("headbutt", 70, 100, 15, Normal, Physical),
    MoveData::new("hyper-fang", 80, 90, 15, Normal, Physical),
    MoveData::new("body-slam", 85, 100, 15, Normal, Physical),
    MoveData::new("ember", 40, 100, 25, Fire, Special),
    MoveData::new("flame-wheel", 60, 100, 25, Fire, Physical),
    MoveData::new("flamethrower", 90, 100, 15, Fire, Special),
    MoveData::new("water-gun", 40, 100, 25, Water, Special),
    MoveData::new("bubble-beam", 65, 100, 20, Water, Special),
    MoveData::new("surf", 90, 100, 15, Water, Special),
    MoveData::new("vine-whip", 45, 100, 25, Grass, Physical),
    MoveData::new("razor-leaf", 55, 95, 25, Grass, Physical),
    MoveData::new("solar-beam", 120, 100, 10, Grass, Special),
    MoveData::new("thunder-shock", 40, 100, 30, Electric, Special),
    MoveData::new("thunderbolt", 90, 100, 15, Electric, Special),
    MoveData::new("ice-shard", 40, 100, 30, Ice, Physical),
    MoveData::new("ice-beam", 90, 100, 10, Ice, Special),
    MoveData::new("low-kick", 50, 90, 20, Fighting, Physical),
    MoveData::new("karate-chop", 50, 100, 25, Fighting, Physical),
    MoveData::new("poison-sting", 15, 100, 35, Poison, Physical),
    MoveData::new("sludge", 65, 100, 20, Poison, Special),
    MoveData::new("mud-slap", 20, 100, 10, Ground, Special),
    MoveData::new("dig", 80, 100, 10, Ground, Physical),
    MoveData::new("gust", 40, 100, 35, Flying, Special),
    MoveData::new("wing-attack", 60, 100, 35, Flying, Physical),
    MoveData::new("confusion", 50, 100, 25, Psychic, Special),
    MoveData::new("psybeam", 65, 100, 20, Psychic, Special),
    MoveData::new("bug-bite", 60, 100, 20, Bug, Physical),
    MoveData::new("rock-throw", 50, 90, 15, Rock, Physical),
    MoveData::new("rock-slide", 75, 90, 10, Rock, Physical),
    MoveData::new("lick", 30, 100, 30, Ghost, Physical),
    MoveData::new("shadow-ball", 80, 100, 15, Ghost, Special),
];

/// Used when every known move is out of PP or none could be resolved.
pub const STRUGGLE: MoveData = MoveData::new("struggle", 50, 100, 1, Normal, Physical);

pub fn find(name: &str) -> Option<&'static MoveData> {
    MOVES.iter().find(|data| data.name == name)
}
