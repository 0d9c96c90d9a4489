//! Point-particle cloud with per-frame jitter and reflective bounds.
//!
//! Motion is not an integration: each frame every position component gets an
//! independent uniform displacement, and any component that lands at or past
//! the unit cube wall has its sign flipped. One generator lives for the
//! cloud's whole lifetime so successive frames draw independent values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One simulated point, laid out exactly as the GPU vertex record.
///
/// `velocity` is spawned zero and never integrated; it rides along in the
/// record so the vertex stride matches the attribute layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    /// World-space position, kept inside the unit cube.
    pub position: [f32; 3],
    /// RGB color in [0, 1], fixed at spawn.
    pub color: [f32; 3],
    /// Unused by the jitter step.
    pub velocity: [f32; 3],
}

/// The full cloud plus the generator that drives it.
pub struct ParticleCloud {
    particles: Vec<Particle>,
    jitter: f32,
    rng: StdRng,
}

impl ParticleCloud {
    /// Spawn `count` particles with positions uniform in [-1, 1) per axis
    /// and colors uniform in [0, 1), seeded from the OS.
    #[must_use]
    pub fn spawn(count: usize, jitter: f32) -> Self {
        Self::spawn_with_rng(count, jitter, StdRng::from_os_rng())
    }

    /// Like [`ParticleCloud::spawn`] but fully reproducible.
    #[must_use]
    pub fn spawn_seeded(count: usize, jitter: f32, seed: u64) -> Self {
        Self::spawn_with_rng(count, jitter, StdRng::seed_from_u64(seed))
    }

    /// Wrap externally prepared particles with a seeded generator. Lets a
    /// caller pin both the starting positions and the jitter sequence.
    #[must_use]
    pub fn from_particles(
        particles: Vec<Particle>,
        jitter: f32,
        seed: u64,
    ) -> Self {
        Self {
            particles,
            jitter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn spawn_with_rng(count: usize, jitter: f32, mut rng: StdRng) -> Self {
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let mut position = [0.0f32; 3];
            for axis in &mut position {
                *axis = rng.random_range(-1.0..1.0);
            }
            let mut color = [0.0f32; 3];
            for channel in &mut color {
                *channel = rng.random();
            }
            particles.push(Particle {
                position,
                color,
                velocity: [0.0; 3],
            });
        }
        Self {
            particles,
            jitter,
            rng,
        }
    }

    /// Displace every position component by an independent uniform draw from
    /// `[-jitter, jitter)`, then flip the sign of any component that reached
    /// or crossed a unit cube wall.
    pub fn advance(&mut self) {
        if self.jitter == 0.0 {
            return;
        }
        for particle in &mut self.particles {
            for axis in &mut particle.position {
                *axis += self.rng.random_range(-self.jitter..self.jitter);
                *axis = reflect(*axis);
            }
        }
    }

    /// Current particle records, in spawn order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles in the cloud.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when the cloud holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Reflective bound: a value at or past ±1 flips sign, everything else
/// passes through. Negation, not a clamp, so a particle that overshoots the
/// wall reappears mirrored through the origin.
fn reflect(value: f32) -> f32 {
    if value >= 1.0 || value <= -1.0 {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_positions_lie_in_unit_cube() {
        let cloud = ParticleCloud::spawn_seeded(2_000, 0.01, 7);
        for particle in cloud.particles() {
            for axis in particle.position {
                assert!((-1.0..1.0).contains(&axis));
            }
            for channel in particle.color {
                assert!((0.0..1.0).contains(&channel));
            }
            assert_eq!(particle.velocity, [0.0; 3]);
        }
    }

    #[test]
    fn advance_moves_each_axis_by_at_most_jitter() {
        let mut cloud = ParticleCloud::spawn_seeded(500, 0.01, 11);
        let before: Vec<Particle> = cloud.particles().to_vec();
        cloud.advance();
        for (old, new) in before.iter().zip(cloud.particles()) {
            for axis in 0..3 {
                let delta = new.position[axis] - old.position[axis];
                // Reflection flips the sign; skip the rare wall hit.
                if new.position[axis].signum() == old.position[axis].signum()
                {
                    assert!(delta.abs() <= 0.01 + f32::EPSILON);
                }
            }
            assert_eq!(old.color, new.color);
        }
    }

    #[test]
    fn reflect_negates_rather_than_clamps() {
        assert_eq!(reflect(1.0), -1.0);
        assert_eq!(reflect(-1.0), 1.0);
        assert_eq!(reflect(1.007), -1.007);
        assert_eq!(reflect(-1.2), 1.2);
        assert_eq!(reflect(0.5), 0.5);
        assert_eq!(reflect(-0.999), -0.999);
    }

    #[test]
    fn seeded_clouds_evolve_identically() {
        let mut a = ParticleCloud::spawn_seeded(64, 0.01, 42);
        let mut b = ParticleCloud::spawn_seeded(64, 0.01, 42);
        for _ in 0..5 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn jitter_varies_across_frames() {
        // A generator recreated per frame would hand every frame the same
        // displacement sequence. The persistent generator must not.
        let mut cloud = ParticleCloud::from_particles(
            vec![Particle {
                position: [0.0; 3],
                color: [1.0, 1.0, 1.0],
                velocity: [0.0; 3],
            }],
            0.01,
            3,
        );
        cloud.advance();
        let first = cloud.particles()[0].position;
        cloud.advance();
        let second = cloud.particles()[0].position;
        let frame1 = first;
        let frame2 = [
            second[0] - first[0],
            second[1] - first[1],
            second[2] - first[2],
        ];
        assert_ne!(frame1, frame2);
    }

    #[test]
    fn zero_jitter_is_a_no_op() {
        let mut cloud = ParticleCloud::spawn_seeded(16, 0.0, 9);
        let before: Vec<Particle> = cloud.particles().to_vec();
        cloud.advance();
        assert_eq!(before.as_slice(), cloud.particles());
    }

    #[test]
    fn empty_cloud_advances_without_panic() {
        let mut cloud = ParticleCloud::spawn_seeded(0, 0.01, 1);
        cloud.advance();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
    }

    #[test]
    fn particle_record_is_tightly_packed() {
        assert_eq!(size_of::<Particle>(), 36);
        assert_eq!(std::mem::offset_of!(Particle, color), 12);
        assert_eq!(std::mem::offset_of!(Particle, velocity), 24);
    }
}
