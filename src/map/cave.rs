use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;

use super::{
    Biome, Cell, FloorLayout, TileGrid,
    entities::{EntityKind, FloorEntity},
};

pub const CAVE_WIDTH: i32 = 40;
pub const CAVE_HEIGHT: i32 = 30;
pub const CAVE_START: Point = Point { x: 1, y: 1 };

const INITIAL_WALL_CHANCE: f32 = 0.45;
const SMOOTHING_PASSES: usize = 4;
const WALL_NEIGHBOUR_THRESHOLD: usize = 5;

fn on_border(grid: &TileGrid, point: Point) -> bool {
    point.x == 0 || point.y == 0 || point.x == grid.width - 1 || point.y == grid.height - 1
}

fn wall_neighbours(grid: &TileGrid, point: Point) -> usize {
    let mut walls = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if grid.get(Point::new(point.x + dx, point.y + dy)) == Cell::Wall {
                walls += 1;
            }
        }
    }
    walls
}

/// One majority pass. Reads the old grid only, so cell order does not
/// matter.
fn smooth(grid: &TileGrid) -> TileGrid {
    let mut next = grid.clone();
    for point in grid.points() {
        let cell = if wall_neighbours(grid, point) >= WALL_NEIGHBOUR_THRESHOLD {
            Cell::Wall
        } else {
            Cell::Floor
        };
        next.set(point, cell);
    }
    next
}

/// Noise, smoothing and the starting pocket. No exit or blockers yet.
pub fn carve(rng: &mut RandomNumberGenerator) -> TileGrid {
    let mut grid = TileGrid::filled(CAVE_WIDTH, CAVE_HEIGHT, Cell::Floor);
    let points: Vec<Point> = grid.points().collect();
    for &point in &points {
        if on_border(&grid, point) || rng.rand::<f32>() < INITIAL_WALL_CHANCE {
            grid.set(point, Cell::Wall);
        }
    }
    for _ in 0..SMOOTHING_PASSES {
        grid = smooth(&grid);
    }
    for &point in &points {
        if on_border(&grid, point) {
            grid.set(point, Cell::Wall);
        }
    }
    for y in CAVE_START.y..=CAVE_START.y + 1 {
        for x in CAVE_START.x..=CAVE_START.x + 1 {
            grid.set(Point::new(x, y), Cell::Floor);
        }
    }
    grid
}

fn random_open_cell(grid: &TileGrid, exit: Point, rng: &mut RandomNumberGenerator) -> Option<Point> {
    let open: Vec<Point> = grid
        .points()
        .filter(|p| grid.get(*p) == Cell::Floor && *p != CAVE_START && *p != exit)
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(open[rng.range(0, open.len() as i32) as usize])
}

/// Puts `cell` on `point` unless that would sit on the start or exit or cut
/// them apart. Returns whether it stayed.
fn place_blocker(grid: &mut TileGrid, point: Point, cell: Cell, exit: Point) -> bool {
    if point == CAVE_START || point == exit || grid.get(point) != Cell::Floor {
        return false;
    }
    grid.set(point, cell);
    if grid.reachable(CAVE_START, exit) {
        return true;
    }
    grid.set(point, Cell::Floor);
    false
}

/// Cellular-automata cave with the ladder on the deepest reachable cell.
pub fn generate(floor: u32, rng: &mut RandomNumberGenerator) -> FloorLayout {
    let mut grid = carve(rng);
    let (exit, depth) = grid
        .farthest_from(CAVE_START)
        .unwrap_or((Point::new(CAVE_START.x + 1, CAVE_START.y + 1), 2));
    grid.set(exit, Cell::Exit);
    debug!("cave floor {floor}: exit {exit:?} at depth {depth}");

    let clusters = rng.range(3, 6);
    let mut boulders = 0;
    for _ in 0..clusters {
        let w = rng.range(1, 4);
        let h = rng.range(1, 4);
        let Some(origin) = random_open_cell(&grid, exit, rng) else {
            break;
        };
        for dy in 0..h {
            for dx in 0..w {
                let point = Point::new(origin.x + dx, origin.y + dy);
                if place_blocker(&mut grid, point, Cell::Boulder, exit) {
                    boulders += 1;
                }
            }
        }
    }

    let hazard_count = rng.range(8, 13);
    let mut hazards = 0;
    for _ in 0..hazard_count {
        if let Some(point) = random_open_cell(&grid, exit, rng) {
            if place_blocker(&mut grid, point, Cell::Hazard, exit) {
                hazards += 1;
            }
        }
    }
    debug!("cave floor {floor}: {boulders} boulder cells, {hazards} hazards");

    FloorLayout {
        floor,
        biome: Biome::Cave,
        grid,
        entities: vec![FloorEntity::at_cell(exit, EntityKind::Ladder)],
        start: CAVE_START,
        spawn: (CAVE_START.x as f32 + 0.5, CAVE_START.y as f32 + 0.5),
        exit: Some(exit),
    }
}
