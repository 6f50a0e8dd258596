use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;

use crate::map::{Cell, TileGrid};

use super::{Camera, surfaces::Framebuffer};

pub const MINIMAP_SIZE: usize = 120;
const PLAYER_RADIUS: f32 = 2.5;
const FACING_LENGTH: f32 = 2.0;

pub fn cell_color(cell: Cell) -> RGB {
    match cell {
        Cell::Wall => RGB::from_u8(36, 58, 98),
        Cell::Boulder => RGB::from_u8(96, 84, 70),
        Cell::Hazard => RGB::from_u8(150, 40, 40),
        Cell::Exit => RGB::from_u8(220, 190, 70),
        Cell::Floor => RGB::from_u8(10, 21, 38),
    }
}

fn player_color() -> RGB {
    RGB::from_u8(119, 187, 255)
}

/// Top-down overview scaled to fill the surface. With `discovery_fog` only
/// revealed cells are drawn.
pub fn draw_minimap(fb: &mut Framebuffer, grid: &TileGrid, camera: &Camera, discovery_fog: bool) {
    fb.clear(RGB::from_u8(0, 0, 0));
    if grid.width <= 0 || grid.height <= 0 {
        return;
    }
    let sx = fb.width as f32 / grid.width as f32;
    let sy = fb.height as f32 / grid.height as f32;

    for y in 0..grid.height {
        for x in 0..grid.width {
            let point = Point::new(x, y);
            if discovery_fog && !grid.is_revealed(point) {
                continue;
            }
            let x0 = (x as f32 * sx).floor() as i32;
            let y0 = (y as f32 * sy).floor() as i32;
            let x1 = ((x + 1) as f32 * sx).floor() as i32;
            let y1 = ((y + 1) as f32 * sy).floor() as i32;
            fb.fill_rect(x0, y0, x1 - x0, y1 - y0, cell_color(grid.get(point)));
        }
    }

    let px = camera.x * sx;
    let py = camera.y * sy;
    let reach = PLAYER_RADIUS.ceil() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx * dx + dy * dy) as f32 <= PLAYER_RADIUS * PLAYER_RADIUS {
                fb.set(px as i32 + dx, py as i32 + dy, player_color());
            }
        }
    }

    let tip_x = (camera.x + camera.angle.cos() * FACING_LENGTH) * sx;
    let tip_y = (camera.y + camera.angle.sin() * FACING_LENGTH) * sy;
    let steps = ((tip_x - px).abs().max((tip_y - py).abs()).ceil() as i32).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        fb.set(
            (px + (tip_x - px) * t) as i32,
            (py + (tip_y - py) * t) as i32,
            player_color(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_wall() -> TileGrid {
        let mut grid = TileGrid::filled(12, 12, Cell::Floor);
        grid.set(Point::new(0, 0), Cell::Wall);
        grid.set(Point::new(11, 11), Cell::Exit);
        grid
    }

    #[test]
    fn fog_hides_undiscovered_cells() {
        let mut grid = grid_with_wall();
        let camera = Camera {
            x: 6.0,
            y: 6.0,
            angle: 0.0,
        };
        let mut fb = Framebuffer::new(MINIMAP_SIZE, MINIMAP_SIZE);
        draw_minimap(&mut fb, &grid, &camera, true);
        assert_eq!(fb.get(2, 2), Some(RGB::from_u8(0, 0, 0)));

        grid.reveal(Point::new(0, 0));
        draw_minimap(&mut fb, &grid, &camera, true);
        assert_eq!(fb.get(2, 2), Some(cell_color(Cell::Wall)));
        assert_eq!(fb.get(115, 115), Some(RGB::from_u8(0, 0, 0)));

        draw_minimap(&mut fb, &grid, &camera, false);
        assert_eq!(fb.get(115, 115), Some(cell_color(Cell::Exit)));
    }

    #[test]
    fn player_dot_and_facing_line() {
        let grid = grid_with_wall();
        let camera = Camera {
            x: 6.0,
            y: 6.0,
            angle: 0.0,
        };
        let mut fb = Framebuffer::new(MINIMAP_SIZE, MINIMAP_SIZE);
        draw_minimap(&mut fb, &grid, &camera, false);
        // Ten pixels per cell: dot at (60, 60), line reaching (80, 60).
        assert_eq!(fb.get(60, 60), Some(player_color()));
        assert_eq!(fb.get(79, 60), Some(player_color()));
        assert_eq!(fb.get(60, 75), Some(cell_color(Cell::Floor)));
    }
}
