use bracket_terminal::prelude::{BTerm, RGB, to_cp437};

/// In-memory pixel surface the raycaster draws into.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<RGB>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![RGB::from_u8(0, 0, 0); width * height],
        }
    }

    pub fn clear(&mut self, color: RGB) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = color);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<RGB> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Writes a pixel; anything off the surface is dropped.
    pub fn set(&mut self, x: i32, y: i32, color: RGB) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = color;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: RGB) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels[py as usize * self.width + px as usize] = color;
            }
        }
    }
}

pub fn shade(color: RGB, factor: f32) -> RGB {
    RGB::from_f32(color.r * factor, color.g * factor, color.b * factor)
}

/// Linear blend toward black by `amount` in `[0, 1]`.
pub fn fog(color: RGB, amount: f32) -> RGB {
    shade(color, 1.0 - amount.clamp(0.0, 1.0))
}

pub fn mix(a: RGB, b: RGB, t: f32) -> RGB {
    let t = t.clamp(0.0, 1.0);
    RGB::from_f32(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
    )
}

/// Copies a framebuffer onto `cols × rows` console cells at `(x, y)`. Every
/// cell shows two stacked pixels with the upper half block glyph, sampling
/// nearest-neighbour when the sizes differ.
pub fn blit(ctx: &mut BTerm, fb: &Framebuffer, x: i32, y: i32, cols: i32, rows: i32) {
    if cols <= 0 || rows <= 0 || fb.width == 0 || fb.height == 0 {
        return;
    }
    let glyph = to_cp437('▀');
    let black = RGB::from_u8(0, 0, 0);
    for row in 0..rows {
        for col in 0..cols {
            let px = col as usize * fb.width / cols as usize;
            let top = (row * 2) as usize * fb.height / (rows * 2) as usize;
            let bottom = (row * 2 + 1) as usize * fb.height / (rows * 2) as usize;
            let upper = fb.get(px, top).unwrap_or(black);
            let lower = fb.get(px, bottom).unwrap_or(black);
            ctx.set(x + col, y + row, upper, lower, glyph);
        }
    }
}
