use super::{Celestial, RenderElement};
use crate::physics::error::{SceneError, ensure_capacity, ensure_positive, ensure_range};
use crate::physics::math::{Scalar, Vector, random_unit_vector, sample_range};
use bevy::color::Srgba;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Background star layout. Distances are in astronomical units.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StarfieldParams {
    pub count: usize,
    pub radius: Scalar,
    pub size_min: Scalar,
    pub size_max: Scalar,
    pub brightness_min: Scalar,
    pub brightness_max: Scalar,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 3000,
            radius: 100.0,
            size_min: 0.01,
            size_max: 0.05,
            brightness_min: 0.3,
            brightness_max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FieldStar {
    position: Vector,
    size: Scalar,
    color: Srgba,
}

/// Static points on a distant sphere. Nothing moves.
#[derive(Debug, Clone)]
pub struct Starfield {
    name: String,
    center: Vector,
    stars: Vec<FieldStar>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(
        name: impl Into<String>,
        center: Vector,
        params: &StarfieldParams,
        au: Scalar,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let count = ensure_capacity("starfield", params.count)?;
        let radius = ensure_positive("starfield radius", params.radius * au)?;
        ensure_positive("starfield star size", params.size_min)?;
        ensure_range("starfield star size", params.size_min, params.size_max)?;
        ensure_range("starfield brightness", params.brightness_min, params.brightness_max)?;

        let stars = (0..count)
            .map(|_| {
                let brightness = sample_range(rng, params.brightness_min, params.brightness_max)
                    .clamp(0.0, 1.0) as f32;
                let blue = brightness * rng.random_range(0.8..=1.0);

                FieldStar {
                    position: center + random_unit_vector(rng) * radius,
                    size: sample_range(rng, params.size_min, params.size_max) * au,
                    color: Srgba::new(brightness, brightness, blue, 1.0),
                }
            })
            .collect();

        Ok(Self {
            name: name.into(),
            center,
            stars,
        })
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

impl Celestial for Starfield {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, _dt: Scalar, _rng: &mut R) {}

    fn position(&self) -> Vector {
        self.center
    }

    fn element_count(&self) -> usize {
        self.stars.len()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.extend(
            self.stars
                .iter()
                .map(|star| RenderElement::sphere(star.position, star.size, star.color)),
        );
    }
}
