//! Camera-distance level of detail for planet surface stripes

use crate::physics::bodies::{Celestial, CelestialBody};
use crate::physics::math::{Scalar, Vector};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct LodPolicy {
    /// Camera distance beyond which detail is hidden
    pub threshold: Scalar,
    /// Half-width of the band around the threshold in which the previous
    /// state is kept. Zero gives a plain threshold test.
    pub hysteresis: Scalar,
}

impl Default for LodPolicy {
    fn default() -> Self {
        Self {
            threshold: 1496.0,
            hysteresis: 0.0,
        }
    }
}

impl LodPolicy {
    pub fn new(threshold: Scalar, hysteresis: Scalar) -> Self {
        Self {
            threshold,
            hysteresis: hysteresis.max(0.0),
        }
    }

    /// Whether detail should be visible at `distance`, given its current state.
    pub fn detail_visible(&self, distance: Scalar, current: bool) -> bool {
        if self.hysteresis <= 0.0 {
            return distance <= self.threshold;
        }

        if distance > self.threshold + self.hysteresis {
            false
        } else if distance < self.threshold - self.hysteresis {
            true
        } else {
            current
        }
    }

    /// Re-evaluates every planet against the camera position.
    ///
    /// Returns the number of planets whose detail visibility changed.
    pub fn apply(&self, camera: Vector, bodies: &mut [CelestialBody]) -> usize {
        bodies
            .iter_mut()
            .filter_map(CelestialBody::as_planet_mut)
            .filter(|planet| planet.has_detail())
            .map(|planet| {
                let distance = camera.distance(planet.position());
                let visible = self.detail_visible(distance, planet.detail_visible());
                planet.set_detail_visible(visible)
            })
            .filter(|&changed| changed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bodies::{Planet, SurfaceKind};
    use crate::physics::orbit::OrbitingBody;
    use bevy::color::Srgba;

    fn gas_planet_at_origin() -> CelestialBody {
        // Zero speed so the planet stays at (10, 0, 0)
        let orbit = OrbitingBody::new(Vector::ZERO, 10.0, 0.0, 0.0).unwrap();
        Planet::new("Saturn", SurfaceKind::Gas, 1.0, Srgba::WHITE, orbit, 5)
            .unwrap()
            .into()
    }

    fn stripes_visible(body: &mut CelestialBody) -> bool {
        body.as_planet_mut().unwrap().detail_visible()
    }

    #[test]
    fn test_threshold_scenario() {
        let policy = LodPolicy::new(100.0, 0.0);
        let mut bodies = vec![gas_planet_at_origin()];
        let planet = Vector::new(10.0, 0.0, 0.0);

        assert_eq!(policy.apply(planet + Vector::Z * 101.0, &mut bodies), 1);
        assert!(!stripes_visible(&mut bodies[0]));

        assert_eq!(policy.apply(planet + Vector::Z * 99.0, &mut bodies), 1);
        assert!(stripes_visible(&mut bodies[0]));
    }

    #[test]
    fn test_reevaluation_is_idempotent() {
        let policy = LodPolicy::new(100.0, 0.0);
        let mut bodies = vec![gas_planet_at_origin()];
        let camera = Vector::new(500.0, 0.0, 0.0);

        assert_eq!(policy.apply(camera, &mut bodies), 1);
        assert_eq!(policy.apply(camera, &mut bodies), 0);
        assert!(!stripes_visible(&mut bodies[0]));
    }

    #[test]
    fn test_hysteresis_band_keeps_state() {
        let policy = LodPolicy::new(100.0, 5.0);

        assert!(policy.detail_visible(102.0, true));
        assert!(!policy.detail_visible(102.0, false));
        assert!(!policy.detail_visible(106.0, true));
        assert!(policy.detail_visible(94.0, false));
        assert!(policy.detail_visible(98.0, true));
    }

    #[test]
    fn test_rocky_planets_untouched() {
        let policy = LodPolicy::new(1.0, 0.0);
        let orbit = OrbitingBody::new(Vector::ZERO, 10.0, 0.0, 0.0).unwrap();
        let rocky = Planet::new("Mars", SurfaceKind::Rocky, 1.0, Srgba::WHITE, orbit, 0).unwrap();
        let mut bodies = vec![CelestialBody::from(rocky)];

        assert_eq!(policy.apply(Vector::splat(1e6), &mut bodies), 0);
    }
}
