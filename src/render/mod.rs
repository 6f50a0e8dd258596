pub mod minimap;
pub mod panels;
pub mod raycast;
pub mod sprites;
pub mod surfaces;
pub mod texture;

use std::f32::consts::FRAC_PI_3;

use bracket_terminal::prelude::{BTerm, RGB};

use crate::map::TileGrid;

use self::{
    minimap::{MINIMAP_SIZE, draw_minimap},
    raycast::{draw_flat_backdrop, draw_textured_backdrop, draw_walls},
    sprites::draw_sprites,
    surfaces::{Framebuffer, blit},
    texture::TextureAtlas,
};

pub const DEFAULT_MAX_DEPTH: f32 = 20.0;

/// Where the view is drawn from. Mirrors the player's position and facing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub fov: f32,
    pub max_depth: f32,
    pub textured: bool,
    pub discovery_fog: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_3,
            max_depth: DEFAULT_MAX_DEPTH,
            textured: true,
            discovery_fog: true,
        }
    }
}

/// A billboard handed over by the entity world for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteInstance {
    pub x: f32,
    pub y: f32,
    pub sprite: &'static str,
    pub color: RGB,
    pub scale: f32,
    pub flashing: bool,
}

/// Backdrop, walls, then sprites against the wall depth buffer.
pub fn render_frame(
    fb: &mut Framebuffer,
    grid: &TileGrid,
    sprites: &[SpriteInstance],
    camera: &Camera,
    options: &RenderOptions,
    atlas: &TextureAtlas,
) {
    fb.clear(RGB::from_u8(0, 0, 0));
    if options.textured {
        draw_textured_backdrop(fb, grid, camera, options, atlas);
    } else {
        draw_flat_backdrop(fb);
    }
    let depth = draw_walls(fb, grid, camera, options, atlas);
    draw_sprites(fb, &depth, grid, camera, options, sprites);
}

/// Owns the view surfaces and the texture atlas between frames.
pub struct Renderer {
    pub options: RenderOptions,
    view: Framebuffer,
    minimap: Framebuffer,
    atlas: TextureAtlas,
}

impl Renderer {
    /// `cols × rows` console cells; the view surface has twice as many pixel
    /// rows.
    pub fn new(cols: usize, rows: usize, options: RenderOptions, seed: u64) -> Self {
        Self {
            options,
            view: Framebuffer::new(cols, rows * 2),
            minimap: Framebuffer::new(MINIMAP_SIZE, MINIMAP_SIZE),
            atlas: TextureAtlas::generate(seed),
        }
    }

    pub fn draw_view(
        &mut self,
        ctx: &mut BTerm,
        grid: &TileGrid,
        sprites: &[SpriteInstance],
        camera: &Camera,
        origin: (i32, i32),
    ) {
        render_frame(&mut self.view, grid, sprites, camera, &self.options, &self.atlas);
        let cols = self.view.width as i32;
        let rows = (self.view.height / 2) as i32;
        blit(ctx, &self.view, origin.0, origin.1, cols, rows);
    }

    /// The minimap surface squeezed into `cols × rows` cells.
    pub fn draw_minimap(
        &mut self,
        ctx: &mut BTerm,
        grid: &TileGrid,
        camera: &Camera,
        origin: (i32, i32),
        size: (i32, i32),
    ) {
        draw_minimap(&mut self.minimap, grid, camera, self.options.discovery_fog);
        blit(ctx, &self.minimap, origin.0, origin.1, size.0, size.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Cell;
    use bracket_geometry::prelude::Point;

    fn boxed_room() -> TileGrid {
        let mut grid = TileGrid::filled(8, 8, Cell::Floor);
        for point in grid.points().collect::<Vec<_>>() {
            if point.x == 0 || point.y == 0 || point.x == 7 || point.y == 7 {
                grid.set(point, Cell::Wall);
            }
        }
        grid
    }

    #[test]
    fn enclosed_room_fills_every_column() {
        let grid = boxed_room();
        let camera = Camera {
            x: 4.0,
            y: 4.0,
            angle: 0.3,
        };
        for textured in [true, false] {
            let options = RenderOptions {
                textured,
                ..RenderOptions::default()
            };
            let atlas = TextureAtlas::generate(5);
            let mut fb = Framebuffer::new(48, 32);
            render_frame(&mut fb, &grid, &[], &camera, &options, &atlas);
            let black = RGB::from_u8(0, 0, 0);
            for x in 0..48 {
                // The horizon row is always wall in a closed room.
                assert_ne!(fb.get(x, 16), Some(black), "column {x}");
            }
        }
    }

    #[test]
    fn near_walls_render_taller_than_far_walls() {
        let grid = boxed_room();
        let options = RenderOptions {
            textured: false,
            ..RenderOptions::default()
        };
        let atlas = TextureAtlas::generate(5);
        let centre_depth = |camera: Camera| {
            let mut fb = Framebuffer::new(16, 64);
            let mut lone = grid.clone();
            lone.set(Point::new(6, 4), Cell::Floor);
            let depth = draw_walls(&mut fb, &lone, &camera, &options, &atlas);
            depth[8]
        };
        let near = centre_depth(Camera {
            x: 5.5,
            y: 4.5,
            angle: 0.0,
        });
        let far = centre_depth(Camera {
            x: 1.5,
            y: 4.5,
            angle: 0.0,
        });
        assert!(near < far);
        assert!(raycast::slice_height(64, near) > raycast::slice_height(64, far));
    }
}
