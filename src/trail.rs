// Cursor trail: soft cyan brush-stroke dots laid down between the previous
// and current pointer positions, fading out over 1.2 seconds.
// Software-drawn with additive blending on top of the particle logo.
// Randomness here only jitters what is drawn; it never touches sampling.

use crate::config::DeviceClass;
use crate::types::{FrameBuffer, PointerState};

// ----------------------------- tiny RNG (no external crate) -----------------------------

/// Deterministic xorshift32 RNG for lightweight randomness.
#[derive(Clone)]
struct Rng32 { state: u32 }

impl Rng32 {
    fn from_seed(seed: u32) -> Self { Self { state: seed | 1 } }
    #[inline] fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
    #[inline] fn next_f32(&mut self) -> f32 {
        // Uniform [0,1)
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }
    #[inline] fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

// ----------------------------- additive drawing helpers --------------------------------

/// Additive blend one RGB triplet at (x,y) with saturation to 255.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, r: u8, g: u8, b: u8) {
    if x < 0 || y < 0 { return; }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height { return; }

    let idx = y * fb.width + x;
    let old = fb.pixels[idx];

    let nr = (((old >> 16) & 0xFF) as u16 + r as u16).min(255) as u32;
    let ng = (((old >> 8) & 0xFF) as u16 + g as u16).min(255) as u32;
    let nb = ((old & 0xFF) as u16 + b as u16).min(255) as u32;

    fb.pixels[idx] = (nr << 16) | (ng << 8) | nb;
}

/// Soft round glow: strong in the middle, fading towards `radius`
/// (the radial-gradient look of a brush dab).
fn draw_glow(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, rgb: (u8, u8, u8), strength: f32) {
    if radius <= 0.0 || strength <= 0.0 { return; }
    let r2 = radius * radius;
    let sigma = radius * 0.5;
    let denom = 2.0 * sigma * sigma;

    let (x0, x1) = ((cx - radius).floor() as i32, (cx + radius).ceil() as i32);
    let (y0, y1) = ((cy - radius).floor() as i32, (cy + radius).ceil() as i32);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 { continue; }

            let w = (-d2 / denom).exp() * strength;
            let scale = |c: u8| (c as f32 * w).round().clamp(0.0, 255.0) as u8;
            add_rgb_saturating(fb, x, y, scale(rgb.0), scale(rgb.1), scale(rgb.2));
        }
    }
}

// ----------------------------- brush particles -----------------------------------------

const TRAIL_RGB: (u8, u8, u8) = (0, 212, 255);
const LIFETIME: f32 = 1.2;
const JITTER: f32 = 20.0;
const MIN_SIZE: f32 = 4.0;

/// Density and size limits per device class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailParams {
    pub max_density: usize,
    pub distance_divisor: f32,
    pub base_size: f32,
    pub max_size: f32,
}

impl TrailParams {
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Constrained => Self { max_density: 3, distance_divisor: 15.0, base_size: 4.0, max_size: 12.0 },
            _ => Self { max_density: 6, distance_divisor: 10.0, base_size: 6.0, max_size: 18.0 },
        }
    }

    /// Dabs laid down for a pointer jump of `distance` pixels.
    pub fn dab_count(&self, distance: f32) -> usize {
        ((distance / self.distance_divisor).floor() as usize).clamp(1, self.max_density)
    }
}

/// One dab. Diameter in pixels, opacity at peak.
pub struct Dab {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub life: f32,
}

impl Dab {
    #[inline] fn alive(&self) -> bool { self.life > 0.0 }

    /// Fade envelope over the lifetime: quick rise, slow fall.
    fn envelope(&self) -> f32 {
        let t = 1.0 - (self.life / LIFETIME).clamp(0.0, 1.0);
        if t < 0.2 { t / 0.2 } else { 1.0 - (t - 0.2) / 0.8 }
    }
}

pub struct BrushTrail {
    rng: Rng32,
    params: TrailParams,
    dabs: Vec<Dab>,
    max_dabs: usize,
    /// Last position seen; `None` right after the pointer left.
    last: Option<(f32, f32)>,
}

impl BrushTrail {
    pub fn new(params: TrailParams, max_dabs: usize) -> Self {
        Self {
            rng: Rng32::from_seed(0x00D4_FFu32),
            params,
            dabs: Vec::with_capacity(max_dabs),
            max_dabs,
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.dabs.len()
    }

    /// Follow the pointer. The first sample after a leave only records the
    /// position, so no streak is drawn from wherever the pointer was before.
    pub fn track(&mut self, pointer: &PointerState) {
        if !pointer.is_active() {
            self.last = None;
            return;
        }
        let to = pointer.current;
        let Some(from) = self.last.replace(to) else { return };
        if from == to {
            return;
        }
        self.spawn_between(from, to);
    }

    fn spawn_between(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let distance = (dx * dx + dy * dy).sqrt();
        let count = self.params.dab_count(distance);
        let speed_damp = 1.0 - (distance / 100.0).min(1.0) * 0.3;
        let max_size = self.params.max_size * speed_damp;

        for i in 0..count {
            if self.dabs.len() >= self.max_dabs { break; }
            let progress = i as f32 / count as f32;
            let bell = (progress * std::f32::consts::PI).sin();
            let x = from.0 + dx * progress + self.rng.range(-0.5, 0.5) * JITTER;
            let y = from.1 + dy * progress + self.rng.range(-0.5, 0.5) * JITTER;
            let size = (self.params.base_size + (max_size - self.params.base_size) * bell)
                * self.rng.range(0.7, 1.3);

            self.dabs.push(Dab {
                x,
                y,
                size: size.max(MIN_SIZE),
                opacity: 0.2 + 0.6 * bell,
                life: LIFETIME,
            });
        }
    }

    /// Age dabs by `dt` seconds and draw the survivors additively.
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, dt: f32) {
        let mut i = 0;
        while i < self.dabs.len() {
            let d = &mut self.dabs[i];
            d.life -= dt;
            if d.alive() {
                let strength = (d.opacity * d.envelope()).clamp(0.0, 1.0);
                draw_glow(fb, d.x, d.y, d.size * 0.5, TRAIL_RGB, strength);
                i += 1;
            } else {
                // Remove dead dab (swap-remove, O(1))
                self.dabs.swap_remove(i);
            }
        }
    }
}
