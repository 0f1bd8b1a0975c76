// Decorative particle field drawn behind the UI.
//
// Purely cosmetic: it never reads application state. Particles only land on
// blank cells after the widgets have rendered, so text is never covered.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Cells moved per step, exclusive upper bound in each direction.
const MAX_SPEED: f32 = 2.0;

const GLYPH: &str = "·";

const PALETTE: [Color; 5] = [
    Color::Rgb(0xff, 0x6b, 0x6b),
    Color::Rgb(0x4e, 0xcd, 0xc4),
    Color::Rgb(0x45, 0xb7, 0xd1),
    Color::Rgb(0x96, 0xce, 0xb4),
    Color::Rgb(0xff, 0xea, 0xa7),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Color,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: u16,
    height: u16,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(count: usize, width: u16, height: u16) -> Self {
        Self::with_rng(count, width, height, StdRng::from_os_rng())
    }

    /// Deterministic field for tests.
    pub fn seeded(count: usize, width: u16, height: u16, seed: u64) -> Self {
        Self::with_rng(count, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, width: u16, height: u16, mut rng: StdRng) -> Self {
        let particles = (0..count)
            .map(|_| spawn(&mut rng, width, height))
            .collect();
        ParticleField {
            particles,
            width,
            height,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Advance every particle one step, bouncing off the edges.
    pub fn step(&mut self) {
        let max_x = f32::from(self.width.saturating_sub(1));
        let max_y = f32::from(self.height.saturating_sub(1));
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x < 0.0 || p.x > max_x {
                p.vx = -p.vx;
                p.x = p.x.clamp(0.0, max_x);
            }
            if p.y < 0.0 || p.y > max_y {
                p.vy = -p.vy;
                p.y = p.y.clamp(0.0, max_y);
            }
        }
    }

    /// Rescale positions to a new area so the field keeps its spread.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        if self.width == 0 || self.height == 0 {
            // Nothing meaningful to scale from.
            for p in &mut self.particles {
                *p = spawn(&mut self.rng, width, height);
            }
        } else {
            let sx = f32::from(width) / f32::from(self.width);
            let sy = f32::from(height) / f32::from(self.height);
            let max_x = f32::from(width.saturating_sub(1));
            let max_y = f32::from(height.saturating_sub(1));
            for p in &mut self.particles {
                p.x = (p.x * sx).clamp(0.0, max_x);
                p.y = (p.y * sy).clamp(0.0, max_y);
            }
        }
        self.width = width;
        self.height = height;
    }

    /// Draw into the blank cells of `buf` within `area`.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        for p in &self.particles {
            let x = area.x + p.x.round() as u16;
            let y = area.y + p.y.round() as u16;
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            if let Some(cell) = buf.cell_mut((x, y)) {
                if cell.symbol() == " " {
                    cell.set_symbol(GLYPH).set_fg(p.color);
                }
            }
        }
    }
}

fn spawn(rng: &mut StdRng, width: u16, height: u16) -> Particle {
    let x = if width > 0 { rng.random_range(0.0..f32::from(width)) } else { 0.0 };
    let y = if height > 0 { rng.random_range(0.0..f32::from(height)) } else { 0.0 };
    Particle {
        x: x.min(f32::from(width.saturating_sub(1))),
        y: y.min(f32::from(height.saturating_sub(1))),
        vx: rng.random_range(-MAX_SPEED..MAX_SPEED),
        vy: rng.random_range(-MAX_SPEED..MAX_SPEED),
        color: PALETTE[rng.random_range(0..PALETTE.len())],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
