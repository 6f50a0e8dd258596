use super::types::Element;

pub type SpeciesId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvolutionLink {
    pub into: SpeciesId,
    pub min_level: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    pub id: SpeciesId,
    pub name: &'static str,
    pub types: &'static [Element],
    pub base: BaseStats,
    pub capture_rate: u32,
    pub color: (u8, u8, u8),
    pub learnset: &'static [(&'static str, u32)],
    pub evolves_to: Option<EvolutionLink>,
}

impl Species {
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn front_sprite(&self) -> String {
        format!("sprites/front/{}.png", self.name)
    }

    pub fn back_sprite(&self) -> String {
        format!("sprites/back/{}.png", self.name)
    }
}

const fn stats(hp: u32, attack: u32, defense: u32, sp_attack: u32, sp_defense: u32, speed: u32) -> BaseStats {
    BaseStats {
        hp,
        attack,
        defense,
        sp_attack,
        sp_defense,
        speed,
    }
}

const fn evolves(into: SpeciesId, min_level: u32) -> Option<EvolutionLink> {
    Some(EvolutionLink {
        into,
        min_level: Some(min_level),
    })
}

use Element::*;

pub const STARTERS: [SpeciesId; 3] = [1, 4, 7];

/// Species handed out when an encounter lookup fails.
pub const FALLBACK_SPECIES: SpeciesId = 10;

pub const SPECIES: &[Species] = &[
    Species {
        id: 1,
        name: "sproutle",
        types: &[Grass],
        base: stats(45, 49, 49, 65, 65, 45),
        capture_rate: 45,
        color: (120, 200, 110),
        learnset: &[("tackle", 1), ("vine-whip", 7), ("razor-leaf", 20), ("solar-beam", 46)],
        evolves_to: evolves(2, 16),
    },
    Species {
        id: 2,
        name: "bramblix",
        types: &[Grass, Poison],
        base: stats(60, 62, 63, 80, 80, 60),
        capture_rate: 45,
        color: (90, 170, 110),
        learnset: &[("tackle", 1), ("vine-whip", 1), ("poison-sting", 13), ("razor-leaf", 20), ("sludge", 30)],
        evolves_to: evolves(3, 32),
    },
    Species {
        id: 3,
        name: "thornvale",
        types: &[Grass, Poison],
        base: stats(80, 82, 83, 100, 100, 80),
        capture_rate: 45,
        color: (70, 140, 90),
        learnset: &[("vine-whip", 1), ("razor-leaf", 1), ("sludge", 30), ("solar-beam", 40)],
        evolves_to: None,
    },
    Species {
        id: 4,
        name: "cindrel",
        types: &[Fire],
        base: stats(39, 52, 43, 60, 50, 65),
        capture_rate: 45,
        color: (250, 130, 70),
        learnset: &[("scratch", 1), ("ember", 9), ("flame-wheel", 22), ("flamethrower", 38)],
        evolves_to: evolves(5, 16),
    },
    Species {
        id: 5,
        name: "pyrrox",
        types: &[Fire],
        base: stats(58, 64, 58, 80, 65, 80),
        capture_rate: 45,
        color: (230, 90, 60),
        learnset: &[("scratch", 1), ("ember", 1), ("flame-wheel", 22), ("flamethrower", 34)],
        evolves_to: evolves(6, 36),
    },
    Species {
        id: 6,
        name: "blazion",
        types: &[Fire, Flying],
        base: stats(78, 84, 78, 109, 85, 100),
        capture_rate: 45,
        color: (240, 70, 40),
        learnset: &[("ember", 1), ("wing-attack", 1), ("flamethrower", 34), ("rock-slide", 40)],
        evolves_to: None,
    },
    Species {
        id: 7,
        name: "driplet",
        types: &[Water],
        base: stats(44, 48, 65, 50, 64, 43),
        capture_rate: 45,
        color: (90, 160, 240),
        learnset: &[("tackle", 1), ("water-gun", 8), ("bubble-beam", 24), ("surf", 42)],
        evolves_to: evolves(8, 16),
    },
    Species {
        id: 8,
        name: "torrentis",
        types: &[Water],
        base: stats(59, 63, 80, 65, 80, 58),
        capture_rate: 45,
        color: (70, 130, 220),
        learnset: &[("tackle", 1), ("water-gun", 1), ("bubble-beam", 24), ("ice-beam", 36)],
        evolves_to: evolves(9, 36),
    },
    Species {
        id: 9,
        name: "maelstrom",
        types: &[Water],
        base: stats(79, 83, 100, 85, 105, 78),
        capture_rate: 45,
        color: (50, 100, 200),
        learnset: &[("water-gun", 1), ("bubble-beam", 1), ("surf", 36), ("ice-beam", 42)],
        evolves_to: None,
    },
    Species {
        id: 10,
        name: "nibbit",
        types: &[Normal],
        base: stats(30, 56, 35, 25, 35, 72),
        capture_rate: 255,
        color: (170, 130, 200),
        learnset: &[("tackle", 1), ("quick-attack", 4), ("hyper-fang", 14), ("dig", 28)],
        evolves_to: evolves(11, 20),
    },
    Species {
        id: 11,
        name: "gnawler",
        types: &[Normal],
        base: stats(55, 81, 60, 50, 70, 97),
        capture_rate: 127,
        color: (150, 110, 80),
        learnset: &[("tackle", 1), ("quick-attack", 1), ("hyper-fang", 14), ("body-slam", 30)],
        evolves_to: None,
    },
    Species {
        id: 12,
        name: "flitwing",
        types: &[Normal, Flying],
        base: stats(40, 45, 40, 35, 35, 56),
        capture_rate: 255,
        color: (200, 170, 120),
        learnset: &[("tackle", 1), ("gust", 5), ("quick-attack", 9), ("wing-attack", 21)],
        evolves_to: evolves(13, 18),
    },
    Species {
        id: 13,
        name: "galehawk",
        types: &[Normal, Flying],
        base: stats(63, 60, 55, 50, 50, 71),
        capture_rate: 120,
        color: (180, 140, 90),
        learnset: &[("gust", 1), ("quick-attack", 1), ("wing-attack", 21), ("body-slam", 36)],
        evolves_to: None,
    },
    Species {
        id: 14,
        name: "zapmouse",
        types: &[Electric],
        base: stats(35, 55, 40, 50, 50, 90),
        capture_rate: 190,
        color: (250, 220, 60),
        learnset: &[("quick-attack", 1), ("thunder-shock", 1), ("headbutt", 18), ("thunderbolt", 26)],
        evolves_to: Some(EvolutionLink {
            into: 15,
            min_level: None,
        }),
    },
    Species {
        id: 15,
        name: "voltaur",
        types: &[Electric],
        base: stats(60, 90, 55, 90, 80, 110),
        capture_rate: 75,
        color: (240, 180, 40),
        learnset: &[("thunder-shock", 1), ("quick-attack", 1), ("body-slam", 30), ("thunderbolt", 26)],
        evolves_to: None,
    },
    Species {
        id: 16,
        name: "pebblor",
        types: &[Rock, Ground],
        base: stats(40, 80, 100, 30, 30, 20),
        capture_rate: 255,
        color: (150, 140, 120),
        learnset: &[("tackle", 1), ("rock-throw", 6), ("mud-slap", 11), ("rock-slide", 26)],
        evolves_to: evolves(17, 25),
    },
    Species {
        id: 17,
        name: "bouldron",
        types: &[Rock, Ground],
        base: stats(55, 95, 115, 45, 45, 35),
        capture_rate: 120,
        color: (120, 110, 100),
        learnset: &[("rock-throw", 1), ("mud-slap", 1), ("rock-slide", 26), ("dig", 34)],
        evolves_to: None,
    },
    Species {
        id: 18,
        name: "wispurr",
        types: &[Ghost, Poison],
        base: stats(30, 35, 30, 100, 35, 80),
        capture_rate: 190,
        color: (150, 100, 220),
        learnset: &[("lick", 1), ("poison-sting", 8), ("confusion", 16), ("shadow-ball", 30)],
        evolves_to: None,
    },
    Species {
        id: 19,
        name: "glacyn",
        types: &[Ice],
        base: stats(50, 45, 50, 75, 70, 60),
        capture_rate: 150,
        color: (170, 230, 250),
        learnset: &[("tackle", 1), ("ice-shard", 6), ("bubble-beam", 18), ("ice-beam", 32)],
        evolves_to: None,
    },
    Species {
        id: 20,
        name: "mindle",
        types: &[Psychic],
        base: stats(55, 40, 45, 90, 80, 70),
        capture_rate: 100,
        color: (240, 130, 190),
        learnset: &[("confusion", 1), ("headbutt", 10), ("psybeam", 20), ("low-kick", 24)],
        evolves_to: None,
    },
    Species {
        id: 21,
        name: "beetlor",
        types: &[Bug, Fighting],
        base: stats(65, 90, 80, 40, 60, 65),
        capture_rate: 60,
        color: (110, 150, 60),
        learnset: &[("tackle", 1), ("bug-bite", 8), ("karate-chop", 16), ("low-kick", 28)],
        evolves_to: None,
    },
];

pub fn find(id: SpeciesId) -> Option<&'static Species> {
    SPECIES.iter().find(|species| species.id == id)
}

pub fn find_by_name(name: &str) -> Option<&'static Species> {
    SPECIES.iter().find(|species| species.name == name)
}
