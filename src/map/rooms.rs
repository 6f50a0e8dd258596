use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;

use crate::data::types::Element;

use super::{
    Biome, Cell, FloorLayout, TileGrid,
    entities::{
        DECOR_KINDS, EntityKind, FloorEntity, Loot, ObstacleKind, TRAP_DAMAGE, chest_tier,
    },
};

pub const ROOMS_WIDTH: i32 = 32;
pub const ROOMS_HEIGHT: i32 = 32;

const MIN_ROOMS: i32 = 6;
const EXTRA_ROOMS: i32 = 3;
const MIN_ROOM_SIZE: i32 = 3;
const MAX_ROOM_SIZE: i32 = 6;
const DECOR_CHANCE: f32 = 0.05;
const OBSTACLE_CHANCE: f32 = 0.3;
const TRAP_COUNT: usize = 3;
const TRAP_ATTEMPTS: usize = 12;

fn random_room(rng: &mut RandomNumberGenerator) -> Rect {
    let w = rng.range(MIN_ROOM_SIZE, MAX_ROOM_SIZE + 1);
    let h = rng.range(MIN_ROOM_SIZE, MAX_ROOM_SIZE + 1);
    let x = 1 + rng.range(0, ROOMS_WIDTH - w - 2);
    let y = 1 + rng.range(0, ROOMS_HEIGHT - h - 2);
    Rect::with_size(x, y, w, h)
}

fn pick_room<'a>(rooms: &'a [Rect], rng: &mut RandomNumberGenerator) -> &'a Rect {
    &rooms[rng.range(0, rooms.len() as i32) as usize]
}

/// Rooms joined left to right by L-shaped corridors, with a ladder in the
/// rightmost room.
pub fn generate(floor: u32, rng: &mut RandomNumberGenerator) -> FloorLayout {
    let mut grid = TileGrid::filled(ROOMS_WIDTH, ROOMS_HEIGHT, Cell::Wall);
    let count = MIN_ROOMS + rng.range(0, EXTRA_ROOMS);
    let mut rooms: Vec<Rect> = (0..count).map(|_| random_room(rng)).collect();
    for room in &rooms {
        room.for_each(|point| grid.set(point, Cell::Floor));
    }
    rooms.sort_by_key(|room| room.center().x);
    for pair in rooms.windows(2) {
        grid.carve_corridor(pair[0].center(), pair[1].center());
    }

    let start = rooms[0].center();
    let mut exit = rooms[rooms.len() - 1].center();
    if exit == start {
        exit = grid
            .farthest_from(start)
            .map(|(point, _)| point)
            .unwrap_or(exit);
    }

    let mut entities = Vec::new();
    let chest = rooms[1 + rng.range(0, rooms.len() as i32 - 1) as usize].center();

    if rng.rand::<f32>() < OBSTACLE_CHANCE {
        let room = pick_room(&rooms, rng);
        let cell = Point::new(
            room.x1 + rng.range(0, room.width()),
            room.y1 + rng.range(0, room.height()),
        );
        if cell != start && cell != exit && cell != chest {
            grid.set(cell, Cell::Wall);
            entities.push(FloorEntity::at_cell(
                cell,
                EntityKind::Obstacle {
                    kind: ObstacleKind::Vines,
                    requires: Element::Fire,
                    cleared: false,
                },
            ));
        }
    }

    for y in 1..ROOMS_HEIGHT - 1 {
        for x in 1..ROOMS_WIDTH - 1 {
            let cell = Point::new(x, y);
            if grid.get(cell) != Cell::Floor || cell == start || cell == exit {
                continue;
            }
            if rng.rand::<f32>() < DECOR_CHANCE {
                let kind = DECOR_KINDS[rng.range(0, DECOR_KINDS.len() as i32) as usize];
                entities.push(FloorEntity::at_cell(cell, EntityKind::Decor { kind }));
            }
        }
    }

    for _ in 0..TRAP_COUNT {
        for _ in 0..TRAP_ATTEMPTS {
            let room = pick_room(&rooms, rng);
            let cell = Point::new(
                room.x1 + 1 + rng.range(0, room.width() - 2),
                room.y1 + 1 + rng.range(0, room.height() - 2),
            );
            if cell == start || cell == exit || grid.get(cell) != Cell::Floor {
                continue;
            }
            entities.push(FloorEntity::at_cell(
                cell,
                EntityKind::Trap {
                    damage: TRAP_DAMAGE,
                    triggered: false,
                },
            ));
            break;
        }
    }

    let tier = chest_tier(floor);
    entities.push(FloorEntity::at_cell(
        chest,
        EntityKind::Chest {
            tier,
            loot: Loot::for_tier(tier),
            opened: false,
        },
    ));

    grid.set(exit, Cell::Exit);
    entities.push(FloorEntity::at_cell(exit, EntityKind::Ladder));

    if !grid.reachable(start, exit) {
        debug!("floor {floor}: exit cut off, carving a direct corridor");
        grid.carve_corridor(start, exit);
        entities.retain(|entity| match entity.kind {
            EntityKind::Obstacle { .. } => grid.get(entity.cell()) == Cell::Wall,
            _ => true,
        });
    }

    FloorLayout {
        floor,
        biome: Biome::Rooms,
        grid,
        entities,
        start,
        spawn: (start.x as f32 + 0.5, start.y as f32 + 0.5),
        exit: Some(exit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn border_is_solid(grid: &TileGrid) -> bool {
        grid.points()
            .filter(|p| p.x == 0 || p.y == 0 || p.x == grid.width - 1 || p.y == grid.height - 1)
            .all(|p| grid.get(p) == Cell::Wall)
    }

    #[test]
    fn exit_is_reachable_for_many_seeds() {
        for seed in 0..150 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let layout = generate(1 + (seed as u32 % 20), &mut rng);
            let exit = layout.exit.expect("dungeon floors have an exit");
            assert_eq!(layout.grid.get(layout.start), Cell::Floor, "seed {seed}");
            assert_eq!(layout.grid.get(exit), Cell::Exit, "seed {seed}");
            assert!(layout.grid.reachable(layout.start, exit), "seed {seed}");
            assert!(border_is_solid(&layout.grid), "seed {seed}");
            assert_eq!(
                layout
                    .entities
                    .iter()
                    .filter(|e| e.kind == EntityKind::Ladder)
                    .map(|e| e.cell())
                    .collect::<Vec<_>>(),
                vec![exit]
            );
        }
    }

    #[test]
    fn placements_stay_off_start_and_exit() {
        for seed in 0..100 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let layout = generate(3, &mut rng);
            let exit = layout.exit.expect("exit");
            for entity in &layout.entities {
                match entity.kind {
                    EntityKind::Obstacle { requires, .. } => {
                        assert_eq!(requires, Element::Fire);
                        assert_ne!(entity.cell(), layout.start);
                        assert_ne!(entity.cell(), exit);
                        assert_eq!(layout.grid.get(entity.cell()), Cell::Wall);
                    }
                    EntityKind::Trap { damage, triggered } => {
                        assert_eq!(damage, TRAP_DAMAGE);
                        assert!(!triggered);
                        assert_ne!(entity.cell(), layout.start);
                    }
                    EntityKind::Decor { .. } => {
                        assert_eq!(layout.grid.get(entity.cell()), Cell::Floor);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn chest_loot_follows_depth_tier() {
        let mut rng = RandomNumberGenerator::seeded(21);
        let layout = generate(12, &mut rng);
        let chests: Vec<_> = layout
            .entities
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Chest { tier, loot, .. } => Some((*tier, *loot)),
                _ => None,
            })
            .collect();
        assert_eq!(chests, vec![(2, Loot::for_tier(2))]);
    }

    #[test]
    fn same_seed_same_floor() {
        let a = generate(2, &mut RandomNumberGenerator::seeded(77));
        let b = generate(2, &mut RandomNumberGenerator::seeded(77));
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.entities, b.entities);
        assert_eq!(a.start, b.start);
    }
}
