use bracket_geometry::prelude::Point;

use crate::data::types::Element;

pub const TRAP_DAMAGE: i32 = 10;
pub const MAX_CHEST_TIER: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecorKind {
    Rock,
    Stalactite,
    Stalagmite,
}

pub const DECOR_KINDS: [DecorKind; 3] = [DecorKind::Rock, DecorKind::Stalactite, DecorKind::Stalagmite];

impl DecorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorKind::Rock => "rock",
            DecorKind::Stalactite => "stalactite",
            DecorKind::Stalagmite => "stalagmite",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    Vines,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Vines => "vines",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NpcRole {
    Guide,
    Shop,
}

impl NpcRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NpcRole::Guide => "Guide",
            NpcRole::Shop => "Shopkeeper",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Loot {
    pub money: u32,
    pub capture_devices: u32,
    pub potions: u32,
}

impl Loot {
    pub fn for_tier(tier: u32) -> Self {
        Self {
            money: 50 * (tier + 1),
            capture_devices: 1 + tier,
            potions: if tier > 1 { 1 } else { 0 },
        }
    }
}

/// Chest quality for a floor: one step every five floors, capped.
pub fn chest_tier(floor: u32) -> u32 {
    (floor / 5).min(MAX_CHEST_TIER)
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Decor { kind: DecorKind },
    Trap { damage: i32, triggered: bool },
    Chest { tier: u32, loot: Loot, opened: bool },
    Ladder,
    Obstacle {
        kind: ObstacleKind,
        requires: Element,
        cleared: bool,
    },
    Npc { role: NpcRole },
}

impl EntityKind {
    /// Sprite reference handed to the renderer. Armed traps and cleared
    /// obstacles have none.
    pub fn sprite(&self) -> Option<&'static str> {
        match self {
            EntityKind::Decor { kind } => Some(kind.as_str()),
            EntityKind::Trap { triggered: true, .. } => Some("spikes"),
            EntityKind::Trap { .. } => None,
            EntityKind::Chest { opened: true, .. } => Some("chest-open"),
            EntityKind::Chest { tier, .. } => Some(match tier {
                0 | 1 => "chest",
                2 => "chest-silver",
                _ => "chest-big",
            }),
            EntityKind::Ladder => Some("ladder"),
            EntityKind::Obstacle { cleared: true, .. } => None,
            EntityKind::Obstacle { kind, .. } => Some(kind.as_str()),
            EntityKind::Npc { role: NpcRole::Guide } => Some("guide"),
            EntityKind::Npc { role: NpcRole::Shop } => Some("shopkeeper"),
        }
    }

    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            EntityKind::Decor {
                kind: DecorKind::Rock,
            } => (120, 110, 100),
            EntityKind::Decor { .. } => (150, 140, 170),
            EntityKind::Trap { .. } => (200, 60, 60),
            EntityKind::Chest { opened: true, .. } => (110, 80, 50),
            EntityKind::Chest { tier, .. } => match tier {
                0 | 1 => (190, 130, 60),
                2 => (200, 200, 215),
                _ => (240, 200, 60),
            },
            EntityKind::Ladder => (170, 120, 70),
            EntityKind::Obstacle { .. } => (60, 160, 60),
            EntityKind::Npc {
                role: NpcRole::Guide,
            } => (230, 230, 240),
            EntityKind::Npc { role: NpcRole::Shop } => (90, 150, 240),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Decor { kind } => kind.as_str(),
            EntityKind::Trap { .. } => "trap",
            EntityKind::Chest { .. } => "chest",
            EntityKind::Ladder => "ladder",
            EntityKind::Obstacle { kind, .. } => kind.as_str(),
            EntityKind::Npc { role } => role.as_str(),
        }
    }
}

/// Something standing on a floor, positioned in continuous map space.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorEntity {
    pub x: f32,
    pub y: f32,
    pub kind: EntityKind,
}

impl FloorEntity {
    /// Centres the entity in `cell`.
    pub fn at_cell(cell: Point, kind: EntityKind) -> Self {
        Self {
            x: cell.x as f32 + 0.5,
            y: cell.y as f32 + 0.5,
            kind,
        }
    }

    pub fn cell(&self) -> Point {
        Point::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Loot { money: 50, capture_devices: 1, potions: 0 })]
    #[case(1, Loot { money: 100, capture_devices: 2, potions: 0 })]
    #[case(2, Loot { money: 150, capture_devices: 3, potions: 1 })]
    #[case(3, Loot { money: 200, capture_devices: 4, potions: 1 })]
    fn loot_scales_with_tier(#[case] tier: u32, #[case] expected: Loot) {
        assert_eq!(Loot::for_tier(tier), expected);
    }

    #[test]
    fn chest_tier_caps_at_three() {
        assert_eq!(chest_tier(4), 0);
        assert_eq!(chest_tier(10), 2);
        assert_eq!(chest_tier(99), MAX_CHEST_TIER);
    }

    #[test]
    fn armed_traps_are_invisible() {
        let armed = EntityKind::Trap {
            damage: TRAP_DAMAGE,
            triggered: false,
        };
        assert_eq!(armed.sprite(), None);
        let sprung = EntityKind::Trap {
            damage: TRAP_DAMAGE,
            triggered: true,
        };
        assert!(sprung.sprite().is_some());
    }

    #[test]
    fn entity_cell_floors_position() {
        let ladder = FloorEntity::at_cell(Point::new(3, 7), EntityKind::Ladder);
        assert_eq!((ladder.x, ladder.y), (3.5, 7.5));
        assert_eq!(ladder.cell(), Point::new(3, 7));
    }
}
