pub mod cave;
pub mod entities;
pub mod maze;
pub mod rooms;

use std::collections::VecDeque;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg, field_of_view};
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;
use smallvec::SmallVec;

use self::entities::{EntityKind, FloorEntity, NpcRole};

pub const HOME_SIZE: i32 = 12;
pub const DISCOVERY_RADIUS: i32 = 6;
/// Every `CAVE_INTERVAL`th floor is a cave.
pub const CAVE_INTERVAL: u32 = 4;
/// Floors on this interval that are not caves are mazes.
pub const MAZE_INTERVAL: u32 = 7;

const CARDINALS: [Point; 4] = [
    Point { x: 1, y: 0 },
    Point { x: -1, y: 0 },
    Point { x: 0, y: 1 },
    Point { x: 0, y: -1 },
];

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Floor = 0,
    Wall = 1,
    Exit = 2,
    Boulder = 3,
    Hazard = 4,
}

impl Cell {
    /// Stops rays and sight lines.
    pub fn is_solid(self) -> bool {
        matches!(self, Cell::Wall | Cell::Boulder)
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, Cell::Wall | Cell::Boulder | Cell::Hazard)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cell::Floor => "floor",
            Cell::Wall => "wall",
            Cell::Exit => "exit",
            Cell::Boulder => "boulder",
            Cell::Hazard => "hazard",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Biome {
    Home,
    Rooms,
    Cave,
    Maze,
}

impl Biome {
    pub fn for_floor(floor: u32) -> Self {
        if floor > 0 && floor % CAVE_INTERVAL == 0 {
            Biome::Cave
        } else if floor > 0 && floor % MAZE_INTERVAL == 0 {
            Biome::Maze
        } else {
            Biome::Rooms
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Home => "Home",
            Biome::Rooms => "Catacombs",
            Biome::Cave => "Caverns",
            Biome::Maze => "Labyrinth",
        }
    }
}

/// Row-major grid of cells plus the discovery mask drawn by the minimap.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
    revealed: Vec<bool>,
}

impl TileGrid {
    pub fn filled(width: i32, height: i32, cell: Cell) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![cell; size],
            revealed: vec![false; size],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    /// Out of bounds reads as wall.
    pub fn get(&self, point: Point) -> Cell {
        self.idx(point)
            .and_then(|idx| self.cells.get(idx).copied())
            .unwrap_or(Cell::Wall)
    }

    pub fn set(&mut self, point: Point, cell: Cell) {
        if let Some(idx) = self.idx(point) {
            self.cells[idx] = cell;
        }
    }

    pub fn is_solid(&self, point: Point) -> bool {
        self.get(point).is_solid()
    }

    pub fn blocks_movement(&self, point: Point) -> bool {
        self.get(point).blocks_movement()
    }

    /// Cell under a continuous map position.
    pub fn cell_at(&self, x: f32, y: f32) -> Cell {
        self.get(Point::new(x.floor() as i32, y.floor() as i32))
    }

    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y).is_solid()
    }

    pub fn blocks_movement_at(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y).blocks_movement()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Carves an L-shaped corridor: along x first, then along y.
    pub fn carve_corridor(&mut self, from: Point, to: Point) {
        let mut cursor = from;
        while cursor.x != to.x {
            self.set(cursor, Cell::Floor);
            cursor.x += if to.x > cursor.x { 1 } else { -1 };
        }
        while cursor.y != to.y {
            self.set(cursor, Cell::Floor);
            cursor.y += if to.y > cursor.y { 1 } else { -1 };
        }
        if self.get(to) != Cell::Exit {
            self.set(to, Cell::Floor);
        }
    }

    /// Breadth-first search over cells that do not block movement. Returns
    /// the step count per cell (`None` when unreached) and the visit order.
    fn bfs(&self, start: Point) -> (Vec<Option<u32>>, Vec<Point>) {
        let mut depths = vec![None; self.cells.len()];
        let mut order = Vec::new();
        let Some(start_idx) = self.idx(start) else {
            return (depths, order);
        };
        if self.blocks_movement(start) {
            return (depths, order);
        }
        depths[start_idx] = Some(0);
        let mut queue = VecDeque::from([(start, 0u32)]);
        while let Some((point, depth)) = queue.pop_front() {
            order.push(point);
            for dir in CARDINALS {
                let next = Point::new(point.x + dir.x, point.y + dir.y);
                let Some(next_idx) = self.idx(next) else {
                    continue;
                };
                if depths[next_idx].is_some() || self.blocks_movement(next) {
                    continue;
                }
                depths[next_idx] = Some(depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
        (depths, order)
    }

    pub fn bfs_depths(&self, start: Point) -> Vec<Option<u32>> {
        self.bfs(start).0
    }

    pub fn reachable(&self, from: Point, to: Point) -> bool {
        self.idx(to)
            .and_then(|idx| self.bfs_depths(from).get(idx).copied().flatten())
            .is_some()
    }

    /// Deepest reachable cell from `start`. On ties the cell the search
    /// reached first wins.
    pub fn farthest_from(&self, start: Point) -> Option<(Point, u32)> {
        let (depths, order) = self.bfs(start);
        let mut best: Option<(Point, u32)> = None;
        for point in order {
            let depth = self.idx(point).and_then(|idx| depths[idx])?;
            if best.is_none_or(|(_, deepest)| depth > deepest) {
                best = Some((point, depth));
            }
        }
        best
    }

    pub fn is_revealed(&self, point: Point) -> bool {
        self.idx(point)
            .and_then(|idx| self.revealed.get(idx).copied())
            .unwrap_or(false)
    }

    pub fn reveal(&mut self, point: Point) {
        if let Some(idx) = self.idx(point) {
            self.revealed[idx] = true;
        }
    }

    /// Marks everything visible from `origin` within `radius` as discovered.
    pub fn reveal_from(&mut self, origin: Point, radius: i32) {
        let visible = field_of_view(origin, radius, &*self);
        for point in visible {
            self.reveal(point);
        }
        self.reveal(origin);
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|seen| **seen).count()
    }
}

impl BaseMap for TileGrid {
    fn is_opaque(&self, idx: usize) -> bool {
        self.cells.get(idx).is_none_or(|cell| cell.is_solid())
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dir in CARDINALS {
            let dest = Point::new(point.x + dir.x, point.y + dir.y);
            if let Some(dest_idx) = self.idx(dest) {
                if !self.blocks_movement(dest) {
                    exits.push((dest_idx, 1.0));
                }
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for TileGrid {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

/// One generated floor: the grid, what stands on it, and where the player
/// starts and leaves.
#[derive(Clone, Debug)]
pub struct FloorLayout {
    pub floor: u32,
    pub biome: Biome,
    pub grid: TileGrid,
    pub entities: Vec<FloorEntity>,
    pub start: Point,
    pub spawn: (f32, f32),
    /// Every dungeon floor has one; the home base does not.
    pub exit: Option<Point>,
}

impl FloorLayout {
    pub fn reveal_around(&mut self, x: f32, y: f32) {
        let origin = Point::new(x.floor() as i32, y.floor() as i32);
        self.grid.reveal_from(origin, DISCOVERY_RADIUS);
    }
}

/// Builds the dungeon floor `floor`, choosing the biome from the depth.
pub fn generate(floor: u32, rng: &mut RandomNumberGenerator) -> FloorLayout {
    let biome = Biome::for_floor(floor);
    let mut layout = match biome {
        Biome::Cave => cave::generate(floor, rng),
        Biome::Maze => maze::generate(floor, rng),
        Biome::Home | Biome::Rooms => rooms::generate(floor, rng),
    };
    let (x, y) = layout.spawn;
    layout.reveal_around(x, y);
    debug!(
        "floor {} ({}): {}x{}, {} entities, start {:?}, exit {:?}",
        floor,
        biome.as_str(),
        layout.grid.width,
        layout.grid.height,
        layout.entities.len(),
        layout.start,
        layout.exit
    );
    layout
}

/// The safe room between runs: an open square with the guide and the shop.
pub fn home_layout() -> FloorLayout {
    let mut grid = TileGrid::filled(HOME_SIZE, HOME_SIZE, Cell::Wall);
    for y in 1..HOME_SIZE - 1 {
        for x in 1..HOME_SIZE - 1 {
            grid.set(Point::new(x, y), Cell::Floor);
        }
    }
    let entities = vec![
        FloorEntity {
            x: 4.5,
            y: 3.5,
            kind: EntityKind::Npc {
                role: NpcRole::Guide,
            },
        },
        FloorEntity {
            x: 7.5,
            y: 3.5,
            kind: EntityKind::Npc {
                role: NpcRole::Shop,
            },
        },
    ];
    let mut layout = FloorLayout {
        floor: 0,
        biome: Biome::Home,
        grid,
        entities,
        start: Point::new(6, 8),
        spawn: (6.0, 8.0),
        exit: None,
    };
    layout.reveal_around(6.0, 8.0);
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: i32, height: i32) -> TileGrid {
        let mut grid = TileGrid::filled(width, height, Cell::Wall);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.set(Point::new(x, y), Cell::Floor);
            }
        }
        grid
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let grid = open_grid(5, 5);
        assert_eq!(grid.get(Point::new(-1, 2)), Cell::Wall);
        assert!(grid.is_solid_at(2.5, 9.0));
        assert!(!grid.is_solid_at(2.5, 2.5));
    }

    #[test]
    fn hazards_block_movement_but_not_sight() {
        assert!(Cell::Hazard.blocks_movement());
        assert!(!Cell::Hazard.is_solid());
        assert!(Cell::Boulder.is_solid());
        assert!(!Cell::Exit.blocks_movement());
    }

    #[test]
    fn bfs_counts_steps_and_respects_blockers() {
        let mut grid = open_grid(7, 3);
        let depths = grid.bfs_depths(Point::new(1, 1));
        assert_eq!(depths[(1 * 7 + 5) as usize], Some(4));
        grid.set(Point::new(3, 1), Cell::Hazard);
        assert!(!grid.reachable(Point::new(1, 1), Point::new(5, 1)));
    }

    #[test]
    fn farthest_prefers_first_reached_on_ties() {
        let grid = open_grid(4, 4);
        // (2,1) and (1,2) both sit at depth 1 from (1,1); (2,2) is depth 2.
        assert_eq!(
            grid.farthest_from(Point::new(1, 1)),
            Some((Point::new(2, 2), 2))
        );
        let wide = open_grid(5, 3);
        assert_eq!(
            wide.farthest_from(Point::new(2, 1)),
            Some((Point::new(3, 1), 1))
        );
    }

    #[test]
    fn corridor_carves_horizontal_then_vertical() {
        let mut grid = TileGrid::filled(8, 8, Cell::Wall);
        grid.carve_corridor(Point::new(1, 1), Point::new(5, 4));
        assert_eq!(grid.get(Point::new(5, 1)), Cell::Floor);
        assert_eq!(grid.get(Point::new(5, 4)), Cell::Floor);
        assert_eq!(grid.get(Point::new(1, 4)), Cell::Wall);
        assert!(grid.reachable(Point::new(1, 1), Point::new(5, 4)));
    }

    #[test]
    fn home_has_guide_and_shop() {
        let home = home_layout();
        assert_eq!(home.biome, Biome::Home);
        assert_eq!(home.grid.width, HOME_SIZE);
        assert_eq!(home.spawn, (6.0, 8.0));
        assert!(home.exit.is_none());
        let roles: Vec<_> = home
            .entities
            .iter()
            .filter_map(|e| match e.kind {
                EntityKind::Npc { role } => Some((role, e.x, e.y)),
                _ => None,
            })
            .collect();
        assert_eq!(
            roles,
            vec![(NpcRole::Guide, 4.5, 3.5), (NpcRole::Shop, 7.5, 3.5)]
        );
        assert!(home.grid.is_revealed(Point::new(6, 8)));
    }

    #[test]
    fn biome_follows_floor_interval() {
        assert_eq!(Biome::for_floor(1), Biome::Rooms);
        assert_eq!(Biome::for_floor(4), Biome::Cave);
        assert_eq!(Biome::for_floor(7), Biome::Maze);
        assert_eq!(Biome::for_floor(8), Biome::Cave);
        assert_eq!(Biome::for_floor(9), Biome::Rooms);
        assert_eq!(Biome::for_floor(28), Biome::Cave);
    }

    #[test]
    fn generated_floors_reveal_the_start() {
        let mut rng = RandomNumberGenerator::seeded(5);
        for floor in 1..=8 {
            let layout = generate(floor, &mut rng);
            assert_eq!(layout.biome, Biome::for_floor(floor));
            assert!(layout.grid.is_revealed(layout.start));
            assert!(layout.grid.revealed_count() > 1);
        }
    }

    #[test]
    fn discovery_reveals_visible_cells_only() {
        let mut grid = open_grid(12, 12);
        for y in 0..12 {
            grid.set(Point::new(6, y), Cell::Wall);
        }
        grid.reveal_from(Point::new(2, 5), 8);
        assert!(grid.is_revealed(Point::new(3, 5)));
        assert!(grid.is_revealed(Point::new(6, 5)), "walls are seen");
        assert!(!grid.is_revealed(Point::new(9, 5)), "nothing behind the wall");
    }
}
