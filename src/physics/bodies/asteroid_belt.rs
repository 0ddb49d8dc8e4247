use super::{Celestial, RenderElement};
use crate::physics::error::{SceneError, ensure_capacity, ensure_positive, ensure_range};
use crate::physics::math::{Scalar, Vector, sample_range};
use crate::physics::orbit::{KeplerModel, OrbitingBody};
use bevy::color::Srgba;
use core::f64::consts::PI;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Belt layout. Radii and sizes are in astronomical units.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AsteroidBeltParams {
    pub count: usize,
    pub inner_radius: Scalar,
    pub outer_radius: Scalar,
    /// Half-height of the belt as a fraction of the inner radius
    pub thickness: Scalar,
    pub size_min: Scalar,
    pub size_max: Scalar,
    /// Stylistic damping constant for the Keplerian speed
    pub orbit_k: Scalar,
}

impl Default for AsteroidBeltParams {
    fn default() -> Self {
        Self {
            count: 200,
            inner_radius: 2.2,
            outer_radius: 3.2,
            thickness: 0.1,
            size_min: 0.01,
            size_max: 0.05,
            orbit_k: 1.0 / (0.7 * 0.7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Asteroid {
    pub orbit: OrbitingBody,
    pub size: Scalar,
    pub color: Srgba,
}

/// Independent asteroids sharing an orbit centre. There is no interaction
/// between members.
#[derive(Debug, Clone)]
pub struct AsteroidBelt {
    name: String,
    center: Vector,
    asteroids: Vec<Asteroid>,
}

impl AsteroidBelt {
    pub fn new(
        name: impl Into<String>,
        center: Vector,
        asteroids: Vec<Asteroid>,
    ) -> Result<Self, SceneError> {
        ensure_capacity("asteroid belt", asteroids.len())?;
        Ok(Self {
            name: name.into(),
            center,
            asteroids,
        })
    }

    /// Scatters `params.count` asteroids between the inner and outer radius,
    /// each with its own phase, elevation and Keplerian speed. `au` is the
    /// length of one astronomical unit in scene units.
    pub fn generate<R: Rng + ?Sized>(
        name: impl Into<String>,
        center: Vector,
        params: &AsteroidBeltParams,
        au: Scalar,
        kepler: &KeplerModel,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        ensure_positive("asteroid belt inner radius", params.inner_radius)?;
        ensure_range("asteroid belt radius", params.inner_radius, params.outer_radius)?;
        ensure_positive("asteroid size", params.size_min)?;
        ensure_range("asteroid size", params.size_min, params.size_max)?;
        ensure_range("asteroid belt thickness", 0.0, params.thickness)?;
        ensure_positive("asteroid orbit k", params.orbit_k)?;

        let au = ensure_positive("astronomical unit", au)?;
        let (inner, outer) = (params.inner_radius * au, params.outer_radius * au);
        let half_height = params.thickness * inner;
        let asteroids = (0..params.count)
            .map(|_| {
                let phase = rng.random_range(0.0..2.0 * PI);
                let distance = sample_range(rng, inner, outer);
                let elevation = sample_range(rng, -half_height, half_height);
                let speed = kepler.angular_speed(distance, params.orbit_k);
                let orbit = OrbitingBody::with_elevation(center, distance, phase, speed, elevation)?;

                let value = rng.random_range(0.6..=0.9);
                Ok(Asteroid {
                    orbit,
                    size: sample_range(rng, params.size_min, params.size_max) * au,
                    color: Srgba::new(value, value * 0.9, value * 0.7, 1.0),
                })
            })
            .collect::<Result<Vec<_>, SceneError>>()?;

        Self::new(name, center, asteroids)
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }
}

impl Celestial for AsteroidBelt {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, _rng: &mut R) {
        for asteroid in &mut self.asteroids {
            asteroid.orbit.advance(dt);
        }
    }

    fn position(&self) -> Vector {
        self.center
    }

    fn element_count(&self) -> usize {
        self.asteroids.len()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.extend(self.asteroids.iter().map(|asteroid| {
            RenderElement::sphere(asteroid.orbit.position(), asteroid.size, asteroid.color)
                .with_emissive(false)
        }));
    }
}
