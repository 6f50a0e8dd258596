use std::f32::consts::{PI, TAU};

use bracket_terminal::prelude::RGB;

use crate::map::TileGrid;

use super::{
    Camera, RenderOptions, SpriteInstance,
    raycast::slice_height,
    surfaces::{Framebuffer, fog, mix},
};

const LOS_STEP: f32 = 0.05;
const FLASH_MIX: f32 = 0.5;

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// How far in front of its own cell an embedded sprite (vines filling a wall
/// cell) is depth-tested, so it draws over that cell's face.
const EMBEDDED_DEPTH_BIAS: f32 = 0.75;

fn cell_of(x: f32, y: f32) -> (i32, i32) {
    (x.floor() as i32, y.floor() as i32)
}

/// Marches from `from` toward `to` in fixed steps; any solid cell on the way
/// blocks the view. The target's own cell never blocks.
pub fn has_line_of_sight(grid: &TileGrid, from: (f32, f32), to: (f32, f32)) -> bool {
    let target = cell_of(to.0, to.1);
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance <= f32::EPSILON {
        return true;
    }
    let (sx, sy) = (dx / distance * LOS_STEP, dy / distance * LOS_STEP);
    let (mut x, mut y) = from;
    let mut travelled = 0.0;
    while travelled < distance {
        x += sx;
        y += sy;
        travelled += LOS_STEP;
        if travelled >= distance || cell_of(x, y) == target {
            break;
        }
        if grid.is_solid_at(x, y) {
            return false;
        }
    }
    true
}

/// A sprite that survived culling, ready to draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projected {
    pub index: usize,
    pub distance: f32,
    /// Signed angle from the view direction.
    pub offset: f32,
}

/// Culls sprites outside the field of view or behind walls and orders the
/// rest far to near.
pub fn project(
    grid: &TileGrid,
    camera: &Camera,
    options: &RenderOptions,
    sprites: &[SpriteInstance],
) -> Vec<Projected> {
    let mut visible: Vec<Projected> = sprites
        .iter()
        .enumerate()
        .filter_map(|(index, sprite)| {
            let dx = sprite.x - camera.x;
            let dy = sprite.y - camera.y;
            let distance = (dx * dx + dy * dy).sqrt();
            let offset = normalize_angle(dy.atan2(dx) - camera.angle);
            if offset.abs() > options.fov / 2.0 || distance > options.max_depth {
                return None;
            }
            if !has_line_of_sight(grid, (camera.x, camera.y), (sprite.x, sprite.y)) {
                return None;
            }
            Some(Projected {
                index,
                distance,
                offset,
            })
        })
        .collect();
    visible.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    visible
}

/// Rough silhouettes keyed by sprite reference, over a unit square with `v`
/// growing downward.
fn covers(sprite: &str, u: f32, v: f32) -> bool {
    match sprite {
        "ladder" => u < 0.2 || u > 0.8 || (v * 6.0).fract() < 0.2,
        "chest" | "chest-silver" | "chest-big" | "chest-open" => v > 0.45 && u > 0.1 && u < 0.9,
        "spikes" => v > 1.0 - (1.0 - ((u * 4.0).fract() - 0.5).abs() * 2.0) * 0.6,
        "vines" => ((u * 5.0 + v * 3.0).sin() + (v * 9.0).cos()) > -0.4,
        "stalactite" => v < 1.0 - (u - 0.5).abs() * 2.0,
        "stalagmite" => v > (u - 0.5).abs() * 2.0,
        _ => {
            let du = (u - 0.5) * 2.0;
            let dv = (v - 0.55) * 2.2;
            du * du + dv * dv <= 1.0
        }
    }
}

/// Draws billboards, testing every column against the wall depth buffer.
/// Sprites stand on the floor: the bottom edge matches the base of a wall
/// slice at the same distance.
pub fn draw_sprites(
    fb: &mut Framebuffer,
    depth: &[f32],
    grid: &TileGrid,
    camera: &Camera,
    options: &RenderOptions,
    sprites: &[SpriteInstance],
) {
    let width = fb.width as f32;
    let height = fb.height as f32;
    for projected in project(grid, camera, options, sprites) {
        let sprite = &sprites[projected.index];
        let perpendicular = projected.distance * projected.offset.cos();
        let base = slice_height(fb.height, perpendicular);
        let size = base * sprite.scale;
        let bottom = height / 2.0 + base / 2.0;
        let top = bottom - size;
        let centre = (projected.offset + options.fov / 2.0) / options.fov * width;
        let left = centre - size / 2.0;

        let depth_test = if grid.is_solid_at(sprite.x, sprite.y) {
            perpendicular - EMBEDDED_DEPTH_BIAS
        } else {
            perpendicular
        };

        let fog_amount = projected.distance / options.max_depth;
        let mut color = sprite.color;
        if sprite.flashing {
            color = mix(color, RGB::from_u8(255, 255, 255), FLASH_MIX);
        }
        let color = fog(color, fog_amount);

        let x0 = left.floor().max(0.0) as i32;
        let x1 = (left + size).ceil().min(width) as i32;
        let y0 = top.floor().max(0.0) as i32;
        let y1 = bottom.ceil().min(height) as i32;
        for px in x0..x1 {
            let behind_wall = depth
                .get(px as usize)
                .is_some_and(|wall| *wall < depth_test);
            if behind_wall {
                continue;
            }
            let u = (px as f32 + 0.5 - left) / size;
            for py in y0..y1 {
                let v = (py as f32 + 0.5 - top) / size;
                if (0.0..=1.0).contains(&v) && covers(sprite.sprite, u, v) {
                    fb.set(px, py, color);
                }
            }
        }
    }
}
