use super::{Celestial, RenderElement, shade, with_opacity};
use crate::physics::error::{SceneError, ensure_positive, ensure_range};
use crate::physics::math::{Scalar, Vector, random_unit_vector, sample_range};
use crate::physics::particles::{Emitter, Fate, Particle, ParticlePool};
use bevy::color::Srgba;
use core::f64::consts::PI;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NebulaParams {
    pub particle_count: usize,
    /// Maximum drift per tick as a fraction of the cloud size
    pub drift_rate: Scalar,
    pub lifetime_min: Scalar,
    pub lifetime_max: Scalar,
    pub opacity_min: Scalar,
    pub opacity_max: Scalar,
    /// Particle radius range as a fraction of `size / 30`
    pub particle_scale_min: Scalar,
    pub particle_scale_max: Scalar,
}

impl Default for NebulaParams {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            drift_rate: 0.0005,
            lifetime_min: 200.0,
            lifetime_max: 600.0,
            opacity_min: 0.1,
            opacity_max: 0.9,
            particle_scale_min: 0.1,
            particle_scale_max: 0.3,
        }
    }
}

/// Offset from the nebula centre at spawn time plus a constant drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudCoords {
    pub offset: Vector,
    pub drift: Vector,
    /// Peak opacity reached halfway through the particle's life
    pub base_opacity: Scalar,
}

#[derive(Debug, Clone)]
pub struct NebulaEmitter {
    size: Scalar,
    color: Srgba,
    params: NebulaParams,
}

impl NebulaEmitter {
    pub fn new(size: Scalar, color: Srgba, params: NebulaParams) -> Result<Self, SceneError> {
        let size = ensure_positive("nebula size", size)?;
        ensure_positive("nebula lifetime", params.lifetime_min)?;
        ensure_range("nebula lifetime", params.lifetime_min, params.lifetime_max)?;
        ensure_range("nebula opacity", params.opacity_min, params.opacity_max)?;
        ensure_positive("nebula particle scale", params.particle_scale_min)?;
        ensure_range("nebula particle scale", params.particle_scale_min, params.particle_scale_max)?;
        ensure_range("nebula drift", 0.0, params.drift_rate)?;

        Ok(Self {
            size,
            color,
            params,
        })
    }

    pub fn size(&self) -> Scalar {
        self.size
    }

    fn fade(particle: &mut Particle<CloudCoords>) {
        let envelope = libm::sin(PI * particle.life_fraction());
        particle.opacity = (particle.coords.base_opacity * envelope).clamp(0.0, 1.0);
    }
}

impl Emitter for NebulaEmitter {
    type Coords = CloudCoords;

    fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle<CloudCoords> {
        let distance = sample_range(rng, 0.0, self.size);
        let drift_speed = sample_range(rng, 0.0, self.params.drift_rate * self.size);

        let coords = CloudCoords {
            offset: random_unit_vector(rng) * distance,
            drift: random_unit_vector(rng) * drift_speed,
            base_opacity: sample_range(rng, self.params.opacity_min, self.params.opacity_max)
                .clamp(0.0, 1.0),
        };
        let scale = sample_range(
            rng,
            self.params.particle_scale_min,
            self.params.particle_scale_max,
        );
        let lifetime = sample_range(rng, self.params.lifetime_min, self.params.lifetime_max);

        // Fades in from zero
        Particle::new(coords, self.color, 0.0, self.size / 30.0 * scale, lifetime)
    }

    fn advance(&self, particle: &mut Particle<CloudCoords>, _dt: Scalar) -> Fate {
        Self::fade(particle);
        Fate::Alive
    }

    fn offset(&self, particle: &Particle<CloudCoords>) -> Vector {
        particle.coords.offset + particle.coords.drift * particle.age
    }

    fn prewarm<R: Rng + ?Sized>(&self, particle: &mut Particle<CloudCoords>, rng: &mut R) {
        particle.age = sample_range(rng, 0.0, particle.lifetime * 0.99);
        Self::fade(particle);
    }
}

/// A glowing cloud of slowly drifting, fading points.
#[derive(Debug, Clone)]
pub struct Nebula {
    name: String,
    position: Vector,
    cloud: ParticlePool<NebulaEmitter>,
}

impl Nebula {
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        position: Vector,
        size: Scalar,
        color: Srgba,
        params: NebulaParams,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let count = params.particle_count;
        let emitter = NebulaEmitter::new(size, color, params)?;
        let cloud = ParticlePool::new(emitter, count, position, rng)?;

        Ok(Self {
            name: name.into(),
            position,
            cloud,
        })
    }

    pub fn cloud(&self) -> &ParticlePool<NebulaEmitter> {
        &self.cloud
    }
}

impl Celestial for Nebula {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, rng: &mut R) {
        self.cloud.update(dt, self.position, rng);
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn element_count(&self) -> usize {
        self.cloud.capacity()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.extend(self.cloud.iter().map(|particle| {
            let color = shade(particle.color, particle.opacity);
            RenderElement::sphere(particle.position, particle.size, with_opacity(color, particle.opacity))
        }));
    }
}
