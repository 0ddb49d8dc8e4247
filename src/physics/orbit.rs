//! Circular orbital kinematics
//!
//! Orbits are not integrated from forces. A body carries a phase angle that
//! advances at a constant angular speed, and its Cartesian position is
//! derived from that phase every tick.

use crate::physics::error::{SceneError, ensure_finite, ensure_positive};
use crate::physics::math::{Scalar, Vector, normalize_angle, polar_to_cartesian};
use serde::{Deserialize, Serialize};

/// Angular speed of a circular orbit from a simplified Keplerian relation.
///
/// `speed = sqrt(G * central_mass / (orbit_radius * scale_factor * k))`
///
/// `k` is a stylistic damping constant. The result decreases monotonically
/// with radius, so outer bodies move slower than inner ones.
pub fn keplerian_angular_speed(
    gravitational_constant: Scalar,
    central_mass: Scalar,
    orbit_radius: Scalar,
    scale_factor: Scalar,
    k: Scalar,
) -> Scalar {
    let denominator = orbit_radius * scale_factor * k;
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    libm::sqrt((gravitational_constant * central_mass / denominator).max(0.0))
}

/// Constants feeding [`keplerian_angular_speed`].
///
/// `kepler_constant` is a global damping factor multiplied into every body's
/// own `k`, so that real-world G and masses give watchable speeds at scene
/// scale.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct KeplerModel {
    pub gravitational_constant: Scalar,
    pub central_mass: Scalar,
    /// Metres per scene unit
    pub distance_scale: Scalar,
    pub kepler_constant: Scalar,
}

impl Default for KeplerModel {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.674_30e-11,
            central_mass: 1.989e30,
            distance_scale: 1e9,
            kepler_constant: 2.5e12,
        }
    }
}

impl KeplerModel {
    /// Angular speed in radians per tick for an orbit of `orbit_radius` scene units.
    pub fn angular_speed(&self, orbit_radius: Scalar, k: Scalar) -> Scalar {
        keplerian_angular_speed(
            self.gravitational_constant,
            self.central_mass,
            orbit_radius,
            self.distance_scale,
            k * self.kepler_constant,
        )
    }

    /// Rejects constants for which every orbit would stand still.
    pub fn validate(&self) -> Result<(), SceneError> {
        ensure_positive("gravitational constant", self.gravitational_constant)?;
        ensure_positive("central mass", self.central_mass)?;
        ensure_positive("distance scale", self.distance_scale)?;
        ensure_positive("kepler constant", self.kepler_constant)?;
        Ok(())
    }

    /// Same model around a different central mass.
    pub fn with_central_mass(self, central_mass: Scalar) -> Self {
        Self {
            central_mass,
            ..self
        }
    }
}

/// A point moving on a horizontal circle around a parent position.
///
/// The parent is held by value: orbit centres do not own their orbiters, and
/// a moving parent is followed through [`OrbitingBody::set_center`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingBody {
    center: Vector,
    radius: Scalar,
    phase: Scalar,
    angular_speed: Scalar,
    /// Vertical displacement of the orbital plane above the parent
    elevation: Scalar,
    position: Vector,
}

impl OrbitingBody {
    pub fn new(
        center: Vector,
        radius: Scalar,
        phase: Scalar,
        angular_speed: Scalar,
    ) -> Result<Self, SceneError> {
        Self::with_elevation(center, radius, phase, angular_speed, 0.0)
    }

    pub fn with_elevation(
        center: Vector,
        radius: Scalar,
        phase: Scalar,
        angular_speed: Scalar,
        elevation: Scalar,
    ) -> Result<Self, SceneError> {
        let radius = ensure_positive("orbit radius", radius)?;
        let phase = ensure_finite("orbit phase", phase)?;
        let angular_speed = ensure_finite("angular speed", angular_speed)?;
        let elevation = ensure_finite("orbit elevation", elevation)?;
        if !center.is_finite() {
            return Err(SceneError::NonFiniteParameter {
                what: "orbit center",
            });
        }

        let mut body = Self {
            center,
            radius,
            phase: normalize_angle(phase),
            angular_speed,
            elevation,
            position: Vector::ZERO,
        };
        body.refresh();
        Ok(body)
    }

    /// Advances the phase by `angular_speed * dt` and recomputes the position.
    pub fn advance(&mut self, dt: Scalar) {
        self.phase = normalize_angle(self.phase + self.angular_speed * dt);
        self.refresh();
    }

    /// Moves the orbit centre, keeping the current phase.
    pub fn set_center(&mut self, center: Vector) {
        self.center = center;
        self.refresh();
    }

    #[inline]
    fn refresh(&mut self) {
        self.position = self.center + polar_to_cartesian(self.radius, self.phase, self.elevation);
    }

    #[inline]
    pub fn position(&self) -> Vector {
        self.position
    }

    /// Parent position the orbit is defined around.
    #[inline]
    pub fn center(&self) -> Vector {
        self.center
    }

    /// Centre of the orbital circle: the parent lifted by the elevation.
    #[inline]
    pub fn orbit_center(&self) -> Vector {
        self.center + Vector::Y * self.elevation
    }

    #[inline]
    pub fn radius(&self) -> Scalar {
        self.radius
    }

    #[inline]
    pub fn phase(&self) -> Scalar {
        self.phase
    }

    #[inline]
    pub fn angular_speed(&self) -> Scalar {
        self.angular_speed
    }

    #[inline]
    pub fn elevation(&self) -> Scalar {
        self.elevation
    }
}
