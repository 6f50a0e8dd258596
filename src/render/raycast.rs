use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;

use crate::map::{Cell, TileGrid};

use super::{
    Camera, RenderOptions,
    surfaces::{Framebuffer, fog, mix, shade},
    texture::TextureAtlas,
};

pub const MAX_RAY_STEPS: usize = 128;
const Y_SIDE_SHADE: f32 = 0.75;
const FLOOR_BLOCK: usize = 2;

/// Which grid line the ray crossed to enter the hit cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitSide {
    /// Crossed a vertical (x) grid line.
    X,
    /// Crossed a horizontal (y) grid line.
    Y,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Euclidean distance along the ray.
    pub distance: f32,
    pub cell: Point,
    pub side: HitSide,
    /// Where along the face the ray landed, in `[0, 1)`.
    pub fraction: f32,
}

/// Grid traversal (DDA) from `(x, y)` along `angle` until a solid cell,
/// `max_depth`, or the step cap.
pub fn cast_ray(grid: &TileGrid, x: f32, y: f32, angle: f32, max_depth: f32) -> Option<RayHit> {
    let dir_x = angle.cos();
    let dir_y = angle.sin();
    let mut map_x = x.floor() as i32;
    let mut map_y = y.floor() as i32;
    let delta_x = if dir_x == 0.0 { f32::INFINITY } else { (1.0 / dir_x).abs() };
    let delta_y = if dir_y == 0.0 { f32::INFINITY } else { (1.0 / dir_y).abs() };

    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - x) * delta_x)
    };
    let (step_y, mut side_y) = if dir_y < 0.0 {
        (-1, (y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - y) * delta_y)
    };

    for _ in 0..MAX_RAY_STEPS {
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            HitSide::X
        } else {
            side_y += delta_y;
            map_y += step_y;
            HitSide::Y
        };
        let distance = match side {
            HitSide::X => side_x - delta_x,
            HitSide::Y => side_y - delta_y,
        };
        if distance > max_depth {
            return None;
        }
        let cell = Point::new(map_x, map_y);
        if grid.is_solid(cell) {
            let along = match side {
                HitSide::X => y + distance * dir_y,
                HitSide::Y => x + distance * dir_x,
            };
            return Some(RayHit {
                distance,
                cell,
                side,
                fraction: along - along.floor(),
            });
        }
    }
    None
}

/// On-screen height of a one-unit wall `distance` away.
pub fn slice_height(screen_height: usize, distance: f32) -> f32 {
    let h = screen_height as f32;
    (h / (distance.max(1e-4) * 0.5)).min(h)
}

fn wall_tint(cell: Cell) -> RGB {
    match cell {
        Cell::Boulder => RGB::from_u8(120, 105, 90),
        _ => RGB::from_u8(50, 100, 185),
    }
}

/// Flat-mode wall colour, fading toward the fog floor colour with depth.
fn flat_wall(fog_amount: f32) -> RGB {
    let keep = 1.0 - fog_amount.clamp(0.0, 1.0);
    RGB::from_u8(
        (40.0 * keep + 10.0) as u8,
        (90.0 * keep + 10.0) as u8,
        (160.0 * keep + 25.0) as u8,
    )
}

/// Casts one ray per column and draws the wall slices. Returns the
/// fisheye-corrected depth per column (`INFINITY` where nothing was hit).
pub fn draw_walls(
    fb: &mut Framebuffer,
    grid: &TileGrid,
    camera: &Camera,
    options: &RenderOptions,
    atlas: &TextureAtlas,
) -> Vec<f32> {
    let width = fb.width;
    let height = fb.height;
    let mut depth = vec![f32::INFINITY; width];
    let step = options.fov / width as f32;

    for (col, column_depth) in depth.iter_mut().enumerate() {
        let ray = camera.angle - options.fov / 2.0 + step * col as f32;
        let Some(hit) = cast_ray(grid, camera.x, camera.y, ray, options.max_depth) else {
            continue;
        };
        let distance = hit.distance * (ray - camera.angle).cos();
        *column_depth = distance;

        let slice = slice_height(height, distance);
        let top = (height as f32 - slice) / 2.0;
        let fog_amount = distance / options.max_depth;
        let y0 = top.max(0.0) as i32;
        let y1 = (top + slice).min(height as f32) as i32;

        if !options.textured {
            let mut color = flat_wall(fog_amount);
            if grid.get(hit.cell) == Cell::Boulder {
                color = fog(wall_tint(Cell::Boulder), fog_amount);
            }
            for py in y0..y1 {
                fb.set(col as i32, py, color);
            }
            continue;
        }

        let tint = wall_tint(grid.get(hit.cell));
        let tile = TextureAtlas::tile_for(hit.cell.x, hit.cell.y);
        for py in y0..y1 {
            let v = (py as f32 - top) / slice;
            let intensity = atlas.sample(tile, hit.fraction, v);
            let mut color = shade(tint, 0.55 + 0.45 * intensity);
            if hit.side == HitSide::Y {
                color = shade(color, Y_SIDE_SHADE);
            }
            fb.set(col as i32, py, fog(color, fog_amount));
        }
    }
    depth
}

/// Sky and ground gradients for flat mode.
pub fn draw_flat_backdrop(fb: &mut Framebuffer) {
    let half = fb.height / 2;
    let sky_top = RGB::from_u8(12, 21, 40);
    let sky_bottom = RGB::from_u8(10, 16, 32);
    let ground_top = RGB::from_u8(10, 15, 27);
    let ground_bottom = RGB::from_u8(10, 14, 22);
    for y in 0..fb.height {
        let color = if y < half {
            mix(sky_top, sky_bottom, y as f32 / half.max(1) as f32)
        } else {
            mix(ground_top, ground_bottom, (y - half) as f32 / half.max(1) as f32)
        };
        fb.fill_rect(0, y as i32, fb.width as i32, 1, color);
    }
}

fn floor_tint(cell: Cell) -> RGB {
    match cell {
        Cell::Hazard => RGB::from_u8(150, 45, 40),
        Cell::Exit => RGB::from_u8(120, 100, 50),
        _ => RGB::from_u8(45, 55, 75),
    }
}

/// Perspective floor and mirrored ceiling. Each row interpolates between the
/// left and right frustum edge rays at that row's distance, sampled in
/// `FLOOR_BLOCK`-pixel blocks.
pub fn draw_textured_backdrop(
    fb: &mut Framebuffer,
    grid: &TileGrid,
    camera: &Camera,
    options: &RenderOptions,
    atlas: &TextureAtlas,
) {
    let width = fb.width;
    let height = fb.height;
    let half = height as f32 / 2.0;
    let edge = (options.fov / 2.0).cos().max(1e-4);
    let left = camera.angle - options.fov / 2.0;
    let right = camera.angle + options.fov / 2.0;
    let (lx, ly) = (left.cos() / edge, left.sin() / edge);
    let (rx, ry) = (right.cos() / edge, right.sin() / edge);
    let ceiling_tint = RGB::from_u8(30, 40, 62);

    let first_row = height / 2 + 1;
    for y in (first_row..height).step_by(FLOOR_BLOCK) {
        let p = y as f32 - half;
        // Matches `slice_height`: a wall base sits `H / d` below the horizon.
        let row_distance = (height as f32 / p.max(1e-4)).min(options.max_depth);
        let fog_amount = row_distance / options.max_depth;
        let mirror = height as i32 - 1 - y as i32;

        for x in (0..width).step_by(FLOOR_BLOCK) {
            let t = (x as f32 + 0.5) / width as f32;
            let wx = camera.x + row_distance * (lx + (rx - lx) * t);
            let wy = camera.y + row_distance * (ly + (ry - ly) * t);
            let cx = wx.floor() as i32;
            let cy = wy.floor() as i32;
            let (u, v) = (wx - wx.floor(), wy - wy.floor());

            let floor_tile = TextureAtlas::tile_for(cx * 7, cy * 11);
            let ground = shade(
                floor_tint(grid.get(Point::new(cx, cy))),
                0.6 + 0.4 * atlas.sample(floor_tile, u, v),
            );
            let roof_tile = TextureAtlas::tile_for(cx * 13, cy * 5);
            let roof = shade(ceiling_tint, 0.6 + 0.4 * atlas.sample(roof_tile, u, v));

            let block = FLOOR_BLOCK as i32;
            fb.fill_rect(x as i32, y as i32, block, block, fog(ground, fog_amount));
            fb.fill_rect(x as i32, mirror - block + 1, block, block, fog(roof, fog_amount));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn corridor() -> TileGrid {
        // 10 wide, open along row 1.
        let mut grid = TileGrid::filled(10, 3, Cell::Wall);
        for x in 1..9 {
            grid.set(Point::new(x, 1), Cell::Floor);
        }
        grid
    }

    #[test]
    fn ray_hits_the_far_wall_face() {
        let grid = corridor();
        let hit = cast_ray(&grid, 1.5, 1.5, 0.0, 20.0).expect("wall ahead");
        assert_eq!(hit.cell, Point::new(9, 1));
        assert_eq!(hit.side, HitSide::X);
        assert_relative_eq!(hit.distance, 7.5, epsilon = 1e-4);
        assert_relative_eq!(hit.fraction, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn looking_sideways_hits_a_y_face() {
        let grid = corridor();
        let hit = cast_ray(&grid, 3.5, 1.5, FRAC_PI_2, 20.0).expect("wall below");
        assert_eq!(hit.cell, Point::new(3, 2));
        assert_eq!(hit.side, HitSide::Y);
        assert_relative_eq!(hit.distance, 0.5, epsilon = 1e-4);

        let back = cast_ray(&grid, 3.5, 1.5, PI, 20.0).expect("wall behind");
        assert_eq!(back.cell, Point::new(0, 1));
    }

    #[test]
    fn max_depth_stops_the_ray() {
        let grid = corridor();
        assert!(cast_ray(&grid, 1.5, 1.5, 0.0, 5.0).is_none());
    }

    #[test]
    fn slices_cap_at_screen_height() {
        assert_relative_eq!(slice_height(100, 4.0), 50.0);
        assert_relative_eq!(slice_height(100, 0.1), 100.0);
    }
}
