//! The scene loop: owns every body and advances them together
//!
//! A [`SceneLoop`] is the single writer of simulation state. It is ticked at a
//! fixed rate by its driver and skips all updates while paused; readers only
//! look at the bodies between ticks.

use crate::physics::bodies::{Celestial, CelestialBody, Planet, RenderElement};
use crate::physics::lod::LodPolicy;
use crate::physics::math::{Scalar, Vector};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct SceneLoop {
    bodies: Vec<CelestialBody>,
    running: bool,
    time_scale: Scalar,
    max_time_scale: Scalar,
    lod: LodPolicy,
    ticks: u64,
    simulated_time: Scalar,
}

impl SceneLoop {
    pub fn new(bodies: Vec<CelestialBody>, lod: LodPolicy, max_time_scale: Scalar) -> Self {
        Self {
            bodies,
            running: true,
            time_scale: 1.0,
            max_time_scale: max_time_scale.max(0.0),
            lod,
            ticks: 0,
            simulated_time: 0.0,
        }
    }

    /// Advances every body by one tick scaled by the current time scale.
    ///
    /// Returns `false` without touching any body when paused.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.running {
            return false;
        }

        let dt = self.time_scale;
        for body in &mut self.bodies {
            body.update(dt, rng);
        }

        self.ticks += 1;
        self.simulated_time += dt;
        true
    }

    /// Flips the running flag and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Adds `delta` to the time scale, clamped to `[0, max_time_scale]`.
    pub fn adjust_speed(&mut self, delta: Scalar) -> Scalar {
        if delta.is_finite() {
            self.time_scale = (self.time_scale + delta).clamp(0.0, self.max_time_scale);
        }
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: Scalar) -> Scalar {
        if time_scale.is_finite() {
            self.time_scale = time_scale.clamp(0.0, self.max_time_scale);
        }
        self.time_scale
    }

    /// Runs the level-of-detail policy for a camera position.
    pub fn apply_lod(&mut self, camera: Vector) -> usize {
        self.lod.apply(camera, &mut self.bodies)
    }

    /// Total render elements across all bodies; constant for a given scene.
    pub fn element_count(&self) -> usize {
        self.bodies.iter().map(Celestial::element_count).sum()
    }

    /// Appends the elements of every body, in body order.
    pub fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        for body in &self.bodies {
            body.collect_elements(out);
        }
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn planets(&self) -> impl Iterator<Item = &Planet> {
        self.bodies.iter().filter_map(CelestialBody::as_planet)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_scale(&self) -> Scalar {
        self.time_scale
    }

    pub fn max_time_scale(&self) -> Scalar {
        self.max_time_scale
    }

    pub fn lod(&self) -> &LodPolicy {
        &self.lod
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn simulated_time(&self) -> Scalar {
        self.simulated_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bodies::SurfaceKind;
    use crate::physics::orbit::OrbitingBody;
    use crate::resources::SharedRng;
    use bevy::color::Srgba;
    use core::f64::consts::PI;

    fn single_planet_scene() -> SceneLoop {
        let orbit = OrbitingBody::new(Vector::ZERO, 10.0, 0.0, PI / 10.0).unwrap();
        let planet = Planet::new("Terra", SurfaceKind::Rocky, 1.0, Srgba::WHITE, orbit, 0).unwrap();
        SceneLoop::new(vec![planet.into()], LodPolicy::default(), 10.0)
    }

    #[test]
    fn test_paused_scene_does_not_advance() {
        let mut rng = SharedRng::from_seed(71);
        let mut scene = single_planet_scene();
        let start = scene.bodies()[0].position();

        assert!(!scene.toggle_pause());
        for _ in 0..10 {
            assert!(!scene.tick(&mut *rng));
        }
        assert_eq!(scene.bodies()[0].position(), start);
        assert_eq!(scene.ticks(), 0);

        assert!(scene.toggle_pause());
        assert!(scene.tick(&mut *rng));
        assert_ne!(scene.bodies()[0].position(), start);
    }

    #[test]
    fn test_time_scale_clamped() {
        let mut scene = single_planet_scene();

        assert_eq!(scene.adjust_speed(-5.0), 0.0);
        assert_eq!(scene.adjust_speed(100.0), 10.0);
        assert_eq!(scene.adjust_speed(Scalar::NAN), 10.0);
        assert_eq!(scene.set_time_scale(2.0), 2.0);
    }

    #[test]
    fn test_time_scale_multiplies_dt() {
        let mut rng = SharedRng::from_seed(72);
        let mut scene = single_planet_scene();
        scene.set_time_scale(2.0);

        for _ in 0..5 {
            scene.tick(&mut *rng);
        }

        let position = scene.bodies()[0].position();
        assert!((position.x + 10.0).abs() < 1e-9);
        assert_eq!(scene.simulated_time(), 10.0);
    }

    #[test]
    fn test_zero_speed_still_counts_ticks() {
        let mut rng = SharedRng::from_seed(73);
        let mut scene = single_planet_scene();
        scene.set_time_scale(0.0);
        let start = scene.bodies()[0].position();

        assert!(scene.tick(&mut *rng));
        assert_eq!(scene.ticks(), 1);
        assert_eq!(scene.bodies()[0].position(), start);
    }
}
