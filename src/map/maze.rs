use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;
use smallvec::SmallVec;

use super::{
    Biome, Cell, FloorLayout, TileGrid,
    entities::{EntityKind, FloorEntity, Loot, chest_tier},
};

/// Odd so that every carved junction sits on odd coordinates.
pub const MAZE_SIZE: i32 = 31;
pub const MAZE_START: Point = Point { x: 1, y: 1 };

const JUMPS: [Point; 4] = [
    Point { x: 2, y: 0 },
    Point { x: -2, y: 0 },
    Point { x: 0, y: 2 },
    Point { x: 0, y: -2 },
];

fn inside(point: Point) -> bool {
    point.x > 0 && point.y > 0 && point.x < MAZE_SIZE - 1 && point.y < MAZE_SIZE - 1
}

/// Depth-first tunnelling with an explicit stack of open junctions.
pub fn carve(rng: &mut RandomNumberGenerator) -> TileGrid {
    let mut grid = TileGrid::filled(MAZE_SIZE, MAZE_SIZE, Cell::Wall);
    grid.set(MAZE_START, Cell::Floor);
    let mut stack = vec![MAZE_START];
    while let Some(&current) = stack.last() {
        let options: SmallVec<[Point; 4]> = JUMPS
            .iter()
            .map(|jump| Point::new(current.x + jump.x, current.y + jump.y))
            .filter(|next| inside(*next) && grid.get(*next) == Cell::Wall)
            .collect();
        if options.is_empty() {
            stack.pop();
            continue;
        }
        let next = options[rng.range(0, options.len() as i32) as usize];
        let between = Point::new((current.x + next.x) / 2, (current.y + next.y) / 2);
        grid.set(between, Cell::Floor);
        grid.set(next, Cell::Floor);
        stack.push(next);
    }
    grid
}

fn dead_ends(grid: &TileGrid) -> Vec<Point> {
    grid.points()
        .filter(|p| grid.get(*p) == Cell::Floor)
        .filter(|p| {
            let open = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                .iter()
                .filter(|(dx, dy)| !grid.blocks_movement(Point::new(p.x + dx, p.y + dy)))
                .count();
            open == 1
        })
        .collect()
}

/// A perfect maze with the ladder at its deepest point and a chest in one of
/// the other dead ends.
pub fn generate(floor: u32, rng: &mut RandomNumberGenerator) -> FloorLayout {
    let mut grid = carve(rng);
    let (exit, depth) = grid
        .farthest_from(MAZE_START)
        .unwrap_or((MAZE_START, 0));
    grid.set(exit, Cell::Exit);
    debug!("maze floor {floor}: exit {exit:?} at depth {depth}");

    let mut entities = vec![FloorEntity::at_cell(exit, EntityKind::Ladder)];
    let pockets: Vec<Point> = dead_ends(&grid)
        .into_iter()
        .filter(|p| *p != MAZE_START)
        .collect();
    if !pockets.is_empty() {
        let cell = pockets[rng.range(0, pockets.len() as i32) as usize];
        let tier = chest_tier(floor);
        entities.push(FloorEntity::at_cell(
            cell,
            EntityKind::Chest {
                tier,
                loot: Loot::for_tier(tier),
                opened: false,
            },
        ));
    }

    FloorLayout {
        floor,
        biome: Biome::Maze,
        grid,
        entities,
        start: MAZE_START,
        spawn: (MAZE_START.x as f32 + 0.5, MAZE_START.y as f32 + 0.5),
        exit: Some(exit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_junction_is_carved() {
        let mut rng = RandomNumberGenerator::seeded(12);
        let grid = carve(&mut rng);
        for y in (1..MAZE_SIZE - 1).step_by(2) {
            for x in (1..MAZE_SIZE - 1).step_by(2) {
                assert_eq!(grid.get(Point::new(x, y)), Cell::Floor);
            }
        }
    }

    #[test]
    fn exit_is_reachable_and_deepest_for_many_seeds() {
        for seed in 0..100 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let layout = generate(7, &mut rng);
            let exit = layout.exit.expect("maze exit");
            assert_eq!(layout.grid.get(layout.start), Cell::Floor);
            assert!(layout.grid.reachable(layout.start, exit), "seed {seed}");
            let depths = layout.grid.bfs_depths(layout.start);
            let deepest = depths.iter().flatten().copied().max();
            assert_eq!(depths[(exit.y * MAZE_SIZE + exit.x) as usize], deepest);
        }
    }

    #[test]
    fn perfect_maze_has_one_route() {
        // A spanning tree over the junctions: cells = 2 * junctions - 1.
        let mut rng = RandomNumberGenerator::seeded(4);
        let grid = carve(&mut rng);
        let junctions = ((MAZE_SIZE - 1) / 2).pow(2) as usize;
        assert_eq!(grid.count(Cell::Floor), 2 * junctions - 1);
    }
}
