use super::{Celestial, RenderElement, with_opacity};
use crate::physics::error::{SceneError, ensure_positive, ensure_range};
use crate::physics::math::{Scalar, Vector, normalize_angle, sample_range, spherical_to_cartesian};
use crate::physics::particles::{Emitter, Fate, Particle, ParticlePool};
use bevy::color::Srgba;
use core::f64::consts::PI;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Corona tuning, with shell radii and particle size expressed as multiples
/// of the star radius.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CoronaParams {
    pub particle_count: usize,
    pub shell_inner: Scalar,
    pub shell_outer: Scalar,
    /// Maximum absolute angular drift per tick, for both angles
    pub drift_rate: Scalar,
    pub lifetime_min: Scalar,
    pub lifetime_max: Scalar,
    pub opacity_min: Scalar,
    pub opacity_max: Scalar,
    pub particle_size: Scalar,
}

impl Default for CoronaParams {
    fn default() -> Self {
        Self {
            particle_count: 100,
            shell_inner: 1.05,
            shell_outer: 1.5,
            drift_rate: 0.01,
            lifetime_min: 50.0,
            lifetime_max: 200.0,
            opacity_min: 0.3,
            opacity_max: 0.7,
            particle_size: 0.05,
        }
    }
}

/// Angular coordinates of a corona particle on its shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellCoords {
    pub theta: Scalar,
    pub phi: Scalar,
    pub radius: Scalar,
    pub theta_rate: Scalar,
    pub phi_rate: Scalar,
}

/// Samples corona particles uniformly in angle on a shell just outside the
/// star's surface.
#[derive(Debug, Clone)]
pub struct CoronaEmitter {
    star_radius: Scalar,
    color: Srgba,
    params: CoronaParams,
}

impl CoronaEmitter {
    pub fn new(star_radius: Scalar, color: Srgba, params: CoronaParams) -> Result<Self, SceneError> {
        let star_radius = ensure_positive("star radius", star_radius)?;
        ensure_positive("corona inner shell", params.shell_inner)?;
        ensure_range("corona shell", params.shell_inner, params.shell_outer)?;
        ensure_positive("corona lifetime", params.lifetime_min)?;
        ensure_range("corona lifetime", params.lifetime_min, params.lifetime_max)?;
        ensure_range("corona opacity", params.opacity_min, params.opacity_max)?;
        ensure_range("corona drift", 0.0, params.drift_rate)?;

        Ok(Self {
            star_radius,
            color,
            params,
        })
    }

    pub fn params(&self) -> &CoronaParams {
        &self.params
    }

    pub fn shell(&self) -> (Scalar, Scalar) {
        (
            self.star_radius * self.params.shell_inner,
            self.star_radius * self.params.shell_outer,
        )
    }
}

impl Emitter for CoronaEmitter {
    type Coords = ShellCoords;

    fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle<ShellCoords> {
        let (inner, outer) = self.shell();
        let drift = self.params.drift_rate;

        let coords = ShellCoords {
            theta: rng.random_range(0.0..=PI),
            phi: rng.random_range(0.0..2.0 * PI),
            radius: sample_range(rng, inner, outer),
            theta_rate: sample_range(rng, -drift, drift),
            phi_rate: sample_range(rng, -drift, drift),
        };
        let opacity = sample_range(rng, self.params.opacity_min, self.params.opacity_max);
        let lifetime = sample_range(rng, self.params.lifetime_min, self.params.lifetime_max);

        Particle::new(
            coords,
            self.color,
            opacity.clamp(0.0, 1.0),
            self.star_radius * self.params.particle_size,
            lifetime,
        )
    }

    fn advance(&self, particle: &mut Particle<ShellCoords>, dt: Scalar) -> Fate {
        let coords = &mut particle.coords;
        coords.theta = normalize_angle(coords.theta + coords.theta_rate * dt);
        coords.phi = normalize_angle(coords.phi + coords.phi_rate * dt);
        Fate::Alive
    }

    fn offset(&self, particle: &Particle<ShellCoords>) -> Vector {
        let coords = &particle.coords;
        spherical_to_cartesian(coords.radius, coords.theta, coords.phi)
    }
}

/// A fixed star with a continuously churning particle corona.
#[derive(Debug, Clone)]
pub struct Star {
    name: String,
    position: Vector,
    radius: Scalar,
    color: Srgba,
    corona: ParticlePool<CoronaEmitter>,
}

impl Star {
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        position: Vector,
        radius: Scalar,
        color: Srgba,
        corona: CoronaParams,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let count = corona.particle_count;
        let emitter = CoronaEmitter::new(radius, color, corona)?;
        let corona = ParticlePool::new(emitter, count, position, rng)?;

        Ok(Self {
            name: name.into(),
            position,
            radius,
            color,
            corona,
        })
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }

    pub fn color(&self) -> Srgba {
        self.color
    }

    pub fn corona(&self) -> &ParticlePool<CoronaEmitter> {
        &self.corona
    }
}

impl Celestial for Star {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, rng: &mut R) {
        self.corona.update(dt, self.position, rng);
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn element_count(&self) -> usize {
        1 + self.corona.capacity()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.push(RenderElement::sphere(self.position, self.radius, self.color));
        out.extend(self.corona.iter().map(|particle| {
            RenderElement::sphere(
                particle.position,
                particle.size,
                with_opacity(particle.color, particle.opacity),
            )
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SharedRng;

    fn test_star(rng: &mut SharedRng) -> Star {
        Star::new(
            "Sol",
            Vector::new(1.0, 2.0, 3.0),
            10.0,
            Srgba::new(1.0, 1.0, 0.0, 1.0),
            CoronaParams::default(),
            &mut **rng,
        )
        .unwrap()
    }

    #[test]
    fn test_corona_particles_stay_on_shell() {
        let mut rng = SharedRng::from_seed(11);
        let mut star = test_star(&mut rng);

        for _ in 0..1_000 {
            star.update(1.0, &mut *rng);
            for particle in star.corona().iter() {
                let distance = (particle.position - star.position()).length();
                assert!(
                    (10.5 - 1e-9..=15.0 + 1e-9).contains(&distance),
                    "corona particle left its shell: {distance}"
                );
                assert!((0.3..=0.7).contains(&particle.opacity));
            }
        }
    }

    #[test]
    fn test_corona_population_and_churn() {
        let mut rng = SharedRng::from_seed(12);
        let mut star = test_star(&mut rng);

        for _ in 0..10_000 {
            star.update(1.0, &mut *rng);
        }

        assert_eq!(star.corona().len(), 100);
        // Each slot lives at most 200 ticks, so every slot churned many times
        assert!(star.corona().respawns() >= 100 * (10_000 / 200));
    }

    #[test]
    fn test_element_count_constant() {
        let mut rng = SharedRng::from_seed(13);
        let mut star = test_star(&mut rng);
        let mut elements = Vec::new();

        for _ in 0..300 {
            star.update(1.0, &mut *rng);
            elements.clear();
            star.collect_elements(&mut elements);
            assert_eq!(elements.len(), star.element_count());
            assert_eq!(elements.len(), 101);
        }
    }

    #[test]
    fn test_invalid_corona_rejected() {
        let mut rng = SharedRng::from_seed(14);
        let color = Srgba::WHITE;

        let empty = CoronaParams {
            particle_count: 0,
            ..CoronaParams::default()
        };
        assert!(matches!(
            Star::new("a", Vector::ZERO, 1.0, color, empty, &mut *rng),
            Err(SceneError::EmptyPool { .. })
        ));

        assert!(matches!(
            Star::new("b", Vector::ZERO, 0.0, color, CoronaParams::default(), &mut *rng),
            Err(SceneError::NonPositiveRadius { .. })
        ));

        let inverted = CoronaParams {
            lifetime_min: 300.0,
            lifetime_max: 100.0,
            ..CoronaParams::default()
        };
        assert!(matches!(
            Star::new("c", Vector::ZERO, 1.0, color, inverted, &mut *rng),
            Err(SceneError::InvalidRange { .. })
        ));
    }
}
