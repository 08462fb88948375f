// Particle field: one particle per sample point, pushed away by the pointer
// and sprung back to where it was sampled.
// The update is fixed per frame (no dt): the effect runs on the render
// loop's cadence.

use crate::config::Tuning;
use crate::render::DrawCommand;
use crate::sampler::{PARTICLE_COLOR, Sampled};
use crate::types::PointerState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Sampled origin; never changes.
    pub base: (f32, f32),
    pub pos: (f32, f32),
    pub vel: (f32, f32),
    /// Opacity derived from the source pixel.
    pub alpha: f32,
}

impl Particle {
    /// At rest on a whole pixel next to its base.
    pub fn at_rest(base: (f32, f32), alpha: f32) -> Self {
        Self { base, pos: (base.0.floor(), base.1.floor()), vel: (0.0, 0.0), alpha }
    }
}

/// The four constants the update uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub radius: f32,
    pub force: f32,
    pub spring: f32,
    pub damping: f32,
}

impl From<&Tuning> for FieldParams {
    fn from(t: &Tuning) -> Self {
        Self { radius: t.interaction_radius, force: t.force, spring: t.spring, damping: t.damping }
    }
}

/// Exclusively owns one generation of particles.
pub struct ParticleField {
    particles: Vec<Particle>,
    params: FieldParams,
    particle_radius: f32,
    color: u32,
}

impl ParticleField {
    pub fn new(particles: Vec<Particle>, params: FieldParams, particle_radius: f32) -> Self {
        Self { particles, params, particle_radius, color: PARTICLE_COLOR }
    }

    /// Build a generation from sampler output.
    pub fn from_samples(sampled: &Sampled, tuning: &Tuning) -> Self {
        let particles = sampled
            .points
            .iter()
            .map(|p| Particle::at_rest((p.x, p.y), sampled.profile.visual_alpha(p.alpha)))
            .collect();
        Self::new(particles, FieldParams::from(tuning), sampled.profile.particle_radius)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance every particle by one frame:
    /// 1. repulsion (linear falloff inside R, skipped at distance 0),
    /// 2. spring toward base, 3. damping, 4. integrate.
    pub fn step(&mut self, pointer: &PointerState) {
        let FieldParams { radius, force, spring, damping } = self.params;
        let radius_sq = radius * radius;
        let interact = pointer.is_active() && radius > 0.0;
        let (mx, my) = pointer.current;

        for p in &mut self.particles {
            if interact {
                let dx = mx - p.pos.0;
                let dy = my - p.pos.1;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq < radius_sq && dist_sq > 0.0 {
                    let dist = dist_sq.sqrt();
                    let push = (radius - dist) / radius * force;
                    p.vel.0 -= dx / dist * push;
                    p.vel.1 -= dy / dist * push;
                }
            }

            p.vel.0 += (p.base.0 - p.pos.0) * spring;
            p.vel.1 += (p.base.1 - p.pos.1) * spring;

            p.vel.0 *= damping;
            p.vel.1 *= damping;

            p.pos.0 += p.vel.0;
            p.pos.1 += p.vel.1;
        }
    }

    /// One filled circle per particle at its current position.
    pub fn draw_commands(&self) -> impl Iterator<Item = DrawCommand> + '_ {
        self.particles.iter().map(|p| DrawCommand {
            x: p.pos.0,
            y: p.pos.1,
            radius: self.particle_radius,
            color: self.color,
            alpha: p.alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FieldParams {
        FieldParams { radius: 60.0, force: 2.5, spring: 0.15, damping: 0.85 }
    }

    fn distance_from_base(p: &Particle) -> f32 {
        (p.pos.0 - p.base.0).hypot(p.pos.1 - p.base.1)
    }

    fn single(pos: (f32, f32), base: (f32, f32)) -> ParticleField {
        let p = Particle { base, pos, vel: (0.0, 0.0), alpha: 1.0 };
        ParticleField::new(vec![p], params(), 3.5)
    }

    #[test]
    fn returns_home_within_200_steps() {
        let mut field = single((100.0, 0.0), (0.0, 0.0));
        let idle = PointerState::default();
        let mut reached = None;
        for i in 0..200 {
            field.step(&idle);
            if distance_from_base(&field.particles()[0]) < 1.0 {
                reached = Some(i);
                break;
            }
        }
        assert!(reached.is_some(), "still {} px away", distance_from_base(&field.particles()[0]));
    }

    #[test]
    fn undisturbed_peaks_shrink() {
        // The spring is underdamped, so the distance rings; each window's peak
        // must still be lower than the previous one until it settles.
        let mut field = single((0.0, 100.0), (0.0, 0.0));
        let idle = PointerState::default();
        let mut last_peak = f32::MAX;
        for _ in 0..6 {
            let mut peak = 0.0f32;
            for _ in 0..20 {
                field.step(&idle);
                peak = peak.max(distance_from_base(&field.particles()[0]));
            }
            assert!(peak < last_peak || peak < 1e-3, "{peak} >= {last_peak}");
            last_peak = peak;
        }
    }

    #[test]
    fn pointer_pushes_particle_away() {
        let mut field = single((100.0, 100.0), (100.0, 100.0));
        let mut pointer = PointerState::default();
        pointer.move_to(90.0, 100.0);
        field.step(&pointer);
        let p = field.particles()[0];
        assert!(p.pos.0 > 100.0, "{p:?}");
        assert!((p.pos.1 - 100.0).abs() < 1e-6);
    }

    #[test]
    fn pointer_outside_radius_or_inactive_does_nothing() {
        let mut far = single((100.0, 100.0), (100.0, 100.0));
        let mut pointer = PointerState::default();
        pointer.move_to(100.0, 160.0); // exactly R away: no force
        far.step(&pointer);
        assert_eq!(far.particles()[0].pos, (100.0, 100.0));

        let mut idle = single((100.0, 100.0), (100.0, 100.0));
        idle.step(&PointerState::default());
        assert_eq!(idle.particles()[0].pos, (100.0, 100.0));
    }

    #[test]
    fn pointer_on_top_of_particle_is_not_nan() {
        let mut field = single((50.0, 50.0), (50.0, 50.0));
        let mut pointer = PointerState::default();
        pointer.move_to(50.0, 50.0);
        for _ in 0..5 {
            field.step(&pointer);
        }
        let p = field.particles()[0];
        assert!(p.pos.0.is_finite() && p.pos.1.is_finite());
        assert!(p.vel.0.is_finite() && p.vel.1.is_finite());
        assert_eq!(p.pos, (50.0, 50.0));
    }

    #[test]
    fn empty_field_step_is_noop() {
        let mut field = ParticleField::new(Vec::new(), params(), 2.0);
        let mut pointer = PointerState::default();
        pointer.move_to(1.0, 1.0);
        field.step(&pointer);
        assert_eq!(field.len(), 0);
        assert_eq!(field.draw_commands().count(), 0);
    }

    #[test]
    fn at_rest_snaps_to_whole_pixels() {
        let p = Particle::at_rest((10.6, 3.2), 0.9);
        assert_eq!(p.pos, (10.0, 3.0));
        assert_eq!(p.vel, (0.0, 0.0));
    }
}
