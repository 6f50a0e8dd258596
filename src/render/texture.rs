use bracket_noise::prelude::{FastNoise, FractalType, NoiseType};

pub const TEXTURE_SIZE: usize = 16;
pub const ATLAS_TILES: usize = 8;
const BRICK_HEIGHT: usize = 4;
const BRICK_WIDTH: usize = 8;
const MORTAR: f32 = 0.2;

/// Spatial hash picking an atlas tile for a map cell.
pub fn tile_hash(x: i32, y: i32) -> u32 {
    (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) as u32
}

/// Procedural greyscale tiles standing in for the wall/floor atlas. Values
/// are intensities in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    tiles: Vec<[f32; TEXTURE_SIZE * TEXTURE_SIZE]>,
}

impl TextureAtlas {
    pub fn generate(seed: u64) -> Self {
        let mut noise = FastNoise::seeded(seed);
        noise.set_noise_type(NoiseType::SimplexFractal);
        noise.set_fractal_type(FractalType::FBM);
        noise.set_fractal_octaves(3);
        noise.set_frequency(0.35);

        let tiles = (0..ATLAS_TILES)
            .map(|tile| {
                let mut pixels = [0.0; TEXTURE_SIZE * TEXTURE_SIZE];
                let offset = (tile * TEXTURE_SIZE * 3) as f32;
                for y in 0..TEXTURE_SIZE {
                    for x in 0..TEXTURE_SIZE {
                        let n = noise.get_noise(x as f32 + offset, y as f32 + offset);
                        let mut value = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
                        // Odd tiles get a staggered brick course.
                        if tile % 2 == 1 {
                            let stagger = if (y / BRICK_HEIGHT) % 2 == 0 { 0 } else { BRICK_WIDTH / 2 };
                            if y % BRICK_HEIGHT == 0 || (x + stagger) % BRICK_WIDTH == 0 {
                                value = MORTAR;
                            }
                        }
                        pixels[y * TEXTURE_SIZE + x] = value;
                    }
                }
                pixels
            })
            .collect();
        Self { tiles }
    }

    /// `u`/`v` wrap into the tile.
    pub fn sample(&self, tile: usize, u: f32, v: f32) -> f32 {
        let Some(pixels) = self.tiles.get(tile % self.tiles.len().max(1)) else {
            return 1.0;
        };
        let tx = (u.rem_euclid(1.0) * TEXTURE_SIZE as f32) as usize % TEXTURE_SIZE;
        let ty = (v.rem_euclid(1.0) * TEXTURE_SIZE as f32) as usize % TEXTURE_SIZE;
        pixels[ty * TEXTURE_SIZE + tx]
    }

    pub fn tile_for(x: i32, y: i32) -> usize {
        tile_hash(x, y) as usize % ATLAS_TILES
    }
}
