//! Fixed-capacity particle pools with in-place recycling
//!
//! A [`ParticlePool`] owns a constant number of slots. Every tick each slot is
//! aged and advanced by its [`Emitter`]; a slot whose particle expires (by age
//! or by an emitter-specific rule such as crossing an inner radius) is
//! overwritten with a freshly sampled particle. The pool never grows or
//! shrinks, so per-frame cost is bounded for the lifetime of the scene.
//!
//! Particle positions are always derived from parametric coordinates and the
//! owner's current centre, never integrated from a velocity.

use crate::physics::error::{SceneError, ensure_capacity};
use crate::physics::math::{Scalar, Vector};
use bevy::color::Srgba;
use rand::Rng;

/// Outcome of advancing a single particle by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Alive,
    Expired,
}

/// A short-lived visual point owned by a pool slot.
///
/// `C` holds the emitter-specific parametric coordinates (spherical angles,
/// spiral distance, cloud offset, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<C> {
    pub coords: C,
    /// Cached world position, recomputed from `coords` every tick
    pub position: Vector,
    pub color: Srgba,
    pub opacity: Scalar,
    /// Render radius
    pub size: Scalar,
    /// Ticks since this slot was last (re)spawned, always in `0..=lifetime`
    pub age: Scalar,
    pub lifetime: Scalar,
}

impl<C> Particle<C> {
    pub fn new(coords: C, color: Srgba, opacity: Scalar, size: Scalar, lifetime: Scalar) -> Self {
        Self {
            coords,
            position: Vector::ZERO,
            color,
            opacity,
            size,
            age: 0.0,
            lifetime,
        }
    }

    /// Fraction of the lifetime already consumed, in `[0, 1]`.
    #[inline]
    pub fn life_fraction(&self) -> Scalar {
        if self.lifetime.is_finite() && self.lifetime > 0.0 {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Sampling distribution and motion rule for the particles of one pool.
pub trait Emitter {
    type Coords: Clone + core::fmt::Debug;

    /// Samples a brand new particle. Out-of-range parameters must be clamped.
    fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle<Self::Coords>;

    /// Advances the parametric coordinates of one particle by `dt` ticks.
    ///
    /// Age has already been incremented by the pool. Returning
    /// [`Fate::Expired`] recycles the slot regardless of age.
    fn advance(&self, particle: &mut Particle<Self::Coords>, dt: Scalar) -> Fate;

    /// Offset of the particle from the owner's centre.
    fn offset(&self, particle: &Particle<Self::Coords>) -> Vector;

    /// Adjusts a particle created at pool construction, e.g. to stagger ages.
    fn prewarm<R: Rng + ?Sized>(&self, _particle: &mut Particle<Self::Coords>, _rng: &mut R) {}
}

#[derive(Debug, Clone)]
pub struct ParticlePool<E: Emitter> {
    emitter: E,
    slots: Vec<Particle<E::Coords>>,
    respawns: u64,
}

impl<E: Emitter> ParticlePool<E> {
    /// Creates a pool of exactly `capacity` particles centred on `origin`.
    pub fn new<R: Rng + ?Sized>(
        emitter: E,
        capacity: usize,
        origin: Vector,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let capacity = ensure_capacity("particle pool", capacity)?;

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let mut particle = emitter.spawn(rng);
            emitter.prewarm(&mut particle, rng);
            particle.position = origin + emitter.offset(&particle);
            slots.push(particle);
        }

        Ok(Self {
            emitter,
            slots,
            respawns: 0,
        })
    }

    /// Ages and advances every slot, recycling the expired ones in place.
    ///
    /// Returns the number of slots that were respawned during this tick.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, origin: Vector, rng: &mut R) -> usize {
        let mut respawned = 0;

        for particle in &mut self.slots {
            particle.age = (particle.age + dt).clamp(0.0, particle.lifetime);

            let fate = self.emitter.advance(particle, dt);
            if fate == Fate::Expired || particle.age >= particle.lifetime {
                *particle = self.emitter.spawn(rng);
                respawned += 1;
            }

            particle.position = origin + self.emitter.offset(particle);
        }

        self.respawns += respawned as u64;
        respawned
    }

    /// Recomputes derived positions without advancing time.
    pub fn recenter(&mut self, origin: Vector) {
        for particle in &mut self.slots {
            particle.position = origin + self.emitter.offset(particle);
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live particles. Always equal to [`Self::capacity`].
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of slot recycles since construction.
    #[inline]
    pub fn respawns(&self) -> u64 {
        self.respawns
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle<E::Coords>> {
        self.slots.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Particle<E::Coords>> {
        self.slots.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SharedRng;

    /// Particles that march along +x and die of old age
    #[derive(Debug, Clone)]
    struct LinearEmitter {
        lifetime: (Scalar, Scalar),
    }

    impl Emitter for LinearEmitter {
        type Coords = Scalar;

        fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle<Scalar> {
            let lifetime = rng.random_range(self.lifetime.0..=self.lifetime.1);
            Particle::new(0.0, Srgba::WHITE, 1.0, 1.0, lifetime)
        }

        fn advance(&self, particle: &mut Particle<Scalar>, dt: Scalar) -> Fate {
            particle.coords += dt;
            Fate::Alive
        }

        fn offset(&self, particle: &Particle<Scalar>) -> Vector {
            Vector::new(particle.coords, 0.0, 0.0)
        }
    }

    /// Particles that expire as soon as they have moved past a threshold
    #[derive(Debug, Clone)]
    struct ThresholdEmitter;

    impl Emitter for ThresholdEmitter {
        type Coords = Scalar;

        fn spawn<R: Rng + ?Sized>(&self, _rng: &mut R) -> Particle<Scalar> {
            Particle::new(10.0, Srgba::WHITE, 1.0, 1.0, Scalar::INFINITY)
        }

        fn advance(&self, particle: &mut Particle<Scalar>, dt: Scalar) -> Fate {
            particle.coords -= dt;
            if particle.coords < 2.0 {
                Fate::Expired
            } else {
                Fate::Alive
            }
        }

        fn offset(&self, particle: &Particle<Scalar>) -> Vector {
            Vector::new(particle.coords, 0.0, 0.0)
        }
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut rng = SharedRng::from_seed(1);
        let result = ParticlePool::new(
            LinearEmitter {
                lifetime: (1.0, 2.0),
            },
            0,
            Vector::ZERO,
            &mut *rng,
        );
        assert!(matches!(result, Err(SceneError::EmptyPool { .. })));
    }

    #[test]
    fn test_population_conserved_over_many_ticks() {
        let mut rng = SharedRng::from_seed(42);
        let mut pool = ParticlePool::new(
            LinearEmitter {
                lifetime: (50.0, 200.0),
            },
            100,
            Vector::ZERO,
            &mut *rng,
        )
        .unwrap();

        assert_eq!(pool.len(), 100);
        for _ in 0..10_000 {
            pool.update(1.0, Vector::ZERO, &mut *rng);
            assert_eq!(pool.len(), 100);
        }
        assert_eq!(pool.capacity(), 100);
        assert!(pool.respawns() > 0);
    }

    #[test]
    fn test_age_never_exceeds_lifetime() {
        let mut rng = SharedRng::from_seed(3);
        let mut pool = ParticlePool::new(
            LinearEmitter {
                lifetime: (5.0, 10.0),
            },
            20,
            Vector::ZERO,
            &mut *rng,
        )
        .unwrap();

        for _ in 0..500 {
            pool.update(0.7, Vector::ZERO, &mut *rng);
            for particle in pool.iter() {
                assert!(particle.age >= 0.0);
                assert!(particle.age <= particle.lifetime);
            }
        }
    }

    #[test]
    fn test_particle_retired_exactly_at_lifetime() {
        let mut rng = SharedRng::from_seed(9);
        let mut pool = ParticlePool::new(
            LinearEmitter {
                lifetime: (3.0, 3.0),
            },
            1,
            Vector::ZERO,
            &mut *rng,
        )
        .unwrap();

        assert_eq!(pool.update(1.0, Vector::ZERO, &mut *rng), 0);
        assert_eq!(pool.update(1.0, Vector::ZERO, &mut *rng), 0);
        // Third tick brings age to 3 == lifetime: recycled into a fresh particle
        assert_eq!(pool.update(1.0, Vector::ZERO, &mut *rng), 1);
        let particle = pool.get(0).unwrap();
        assert_eq!(particle.age, 0.0);
        assert_eq!(particle.coords, 0.0);
    }

    #[test]
    fn test_emitter_expiry_recycles_slot() {
        let mut rng = SharedRng::from_seed(5);
        let mut pool = ParticlePool::new(ThresholdEmitter, 4, Vector::ZERO, &mut *rng).unwrap();

        let mut respawned = 0;
        for _ in 0..9 {
            respawned += pool.update(1.0, Vector::ZERO, &mut *rng);
        }
        assert_eq!(respawned, 4);
        assert_eq!(pool.respawns(), 4);
        assert!(pool.iter().all(|p| p.coords == 10.0));
    }

    #[test]
    fn test_positions_follow_origin() {
        let mut rng = SharedRng::from_seed(5);
        let mut pool = ParticlePool::new(
            LinearEmitter {
                lifetime: (100.0, 100.0),
            },
            3,
            Vector::ZERO,
            &mut *rng,
        )
        .unwrap();

        let origin = Vector::new(5.0, -2.0, 1.0);
        pool.update(2.0, origin, &mut *rng);
        for particle in pool.iter() {
            assert_eq!(particle.position, origin + Vector::new(2.0, 0.0, 0.0));
        }

        let moved = Vector::new(-1.0, 0.0, 0.0);
        pool.recenter(moved);
        for particle in pool.iter() {
            assert_eq!(particle.position, moved + Vector::new(2.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_life_fraction() {
        let mut particle = Particle::new((), Srgba::WHITE, 1.0, 1.0, 10.0);
        particle.age = 2.5;
        assert_eq!(particle.life_fraction(), 0.25);

        let immortal = Particle::new((), Srgba::WHITE, 1.0, 1.0, Scalar::INFINITY);
        assert_eq!(immortal.life_fraction(), 0.0);
    }
}
