use super::{Celestial, RenderElement, with_opacity};
use crate::physics::error::{SceneError, ensure_capacity, ensure_positive, ensure_range};
use crate::physics::math::{Scalar, Vector, normalize_angle, polar_to_cartesian, sample_range};
use crate::physics::orbit::KeplerModel;
use crate::physics::particles::{Emitter, Fate, Particle, ParticlePool};
use bevy::color::Srgba;
use core::f64::consts::PI;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Accretion disk and infall tuning. Distances are multiples of the core radius.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BlackHoleParams {
    pub ring_count: usize,
    pub disk_inner: Scalar,
    pub disk_outer: Scalar,
    /// Total disk thickness; also bounds the height of infalling particles
    pub disk_thickness: Scalar,
    pub ring_k: Scalar,
    pub particle_count: usize,
    pub particle_k: Scalar,
    /// Radial drift per radian of angular travel
    pub inflow_factor: Scalar,
    /// Particles are recycled once they fall inside this radius
    pub event_horizon: Scalar,
    pub respawn_min: Scalar,
    pub respawn_max: Scalar,
    pub particle_size: Scalar,
    pub particle_color: [f32; 3],
}

impl Default for BlackHoleParams {
    fn default() -> Self {
        Self {
            ring_count: 20,
            disk_inner: 2.0,
            disk_outer: 5.0,
            disk_thickness: 0.5,
            ring_k: 25.0,
            particle_count: 50,
            particle_k: 1.0,
            inflow_factor: 1.0,
            event_horizon: 1.5,
            respawn_min: 5.0,
            respawn_max: 15.0,
            particle_size: 0.05,
            particle_color: [1.0, 0.3, 0.1],
        }
    }
}

/// One concentric ring of the accretion disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AccretionRing {
    pub radius: Scalar,
    pub angular_speed: Scalar,
    pub angle: Scalar,
    pub thickness: Scalar,
    pub color: Srgba,
}

/// Spiral coordinates of an infalling particle around the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralCoords {
    pub angle: Scalar,
    pub distance: Scalar,
    pub height: Scalar,
    pub angular_speed: Scalar,
    /// Distance lost per tick
    pub inflow: Scalar,
}

/// Spawns particles in the outer capture band and lets them spiral in until
/// they cross the event horizon proxy.
#[derive(Debug, Clone)]
pub struct InfallEmitter {
    core_radius: Scalar,
    kepler: KeplerModel,
    params: BlackHoleParams,
    color: Srgba,
}

impl InfallEmitter {
    pub fn new(core_radius: Scalar, kepler: KeplerModel, params: BlackHoleParams) -> Result<Self, SceneError> {
        let core_radius = ensure_positive("black hole core radius", core_radius)?;
        ensure_positive("black hole mass", kepler.central_mass)?;
        ensure_positive("infall inflow factor", params.inflow_factor)?;
        ensure_positive("infall particle k", params.particle_k)?;
        ensure_positive("event horizon", params.event_horizon)?;
        ensure_range("infall respawn band", params.respawn_min, params.respawn_max)?;
        if params.respawn_min <= params.event_horizon {
            return Err(SceneError::InvalidRange {
                what: "infall respawn band above event horizon",
                min: params.event_horizon,
                max: params.respawn_min,
            });
        }
        kepler.validate()?;

        // Slowest particles start at the outer edge; they must still fall in
        let outer_speed = kepler.angular_speed(core_radius * params.respawn_max, params.particle_k);
        ensure_positive("infall speed at respawn band", outer_speed * params.inflow_factor)?;

        let color = super::srgb(params.particle_color);

        Ok(Self {
            core_radius,
            kepler,
            params,
            color,
        })
    }

    /// Distance below which a particle is recycled.
    pub fn horizon(&self) -> Scalar {
        self.core_radius * self.params.event_horizon
    }

    /// Distance band new particles are placed in.
    pub fn respawn_band(&self) -> (Scalar, Scalar) {
        (
            self.core_radius * self.params.respawn_min,
            self.core_radius * self.params.respawn_max,
        )
    }
}

impl Emitter for InfallEmitter {
    type Coords = SpiralCoords;

    fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle<SpiralCoords> {
        let (min, max) = self.respawn_band();
        let distance = sample_range(rng, min, max);
        let half_height = self.core_radius * self.params.disk_thickness;
        let angular_speed = self.kepler.angular_speed(distance, self.params.particle_k);

        let coords = SpiralCoords {
            angle: rng.random_range(0.0..2.0 * PI),
            distance,
            height: sample_range(rng, -half_height, half_height),
            angular_speed,
            inflow: angular_speed * self.params.inflow_factor * self.core_radius,
        };

        Particle::new(
            coords,
            self.color,
            1.0,
            self.core_radius * self.params.particle_size,
            Scalar::INFINITY,
        )
    }

    fn advance(&self, particle: &mut Particle<SpiralCoords>, dt: Scalar) -> Fate {
        let coords = &mut particle.coords;
        coords.angle = normalize_angle(coords.angle + coords.angular_speed * dt);
        coords.distance -= coords.inflow * dt;

        if coords.distance < self.horizon() {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }

    fn offset(&self, particle: &Particle<SpiralCoords>) -> Vector {
        let coords = &particle.coords;
        polar_to_cartesian(coords.distance, coords.angle, coords.height)
    }
}

/// A black hole core with a differentially rotating accretion disk and a pool
/// of particles falling into it.
#[derive(Debug, Clone)]
pub struct BlackHole {
    name: String,
    position: Vector,
    core_radius: Scalar,
    mass: Scalar,
    rings: Vec<AccretionRing>,
    infall: ParticlePool<InfallEmitter>,
}

impl BlackHole {
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        position: Vector,
        core_radius: Scalar,
        mass: Scalar,
        kepler: &KeplerModel,
        params: BlackHoleParams,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let core_radius = ensure_positive("black hole core radius", core_radius)?;
        let mass = ensure_positive("black hole mass", mass)?;
        let ring_count = ensure_capacity("accretion disk", params.ring_count)?;
        ensure_positive("accretion disk inner radius", params.disk_inner)?;
        ensure_range("accretion disk", params.disk_inner, params.disk_outer)?;
        ensure_positive("accretion ring k", params.ring_k)?;

        let kepler = kepler.with_central_mass(mass);
        let rings = Self::build_disk(core_radius, &kepler, &params, ring_count);

        let particle_count = params.particle_count;
        let emitter = InfallEmitter::new(core_radius, kepler, params)?;
        let infall = ParticlePool::new(emitter, particle_count, position, rng)?;

        Ok(Self {
            name: name.into(),
            position,
            core_radius,
            mass,
            rings,
            infall,
        })
    }

    fn build_disk(
        core_radius: Scalar,
        kepler: &KeplerModel,
        params: &BlackHoleParams,
        ring_count: usize,
    ) -> Vec<AccretionRing> {
        let inner = core_radius * params.disk_inner;
        let outer = core_radius * params.disk_outer;
        let thickness = core_radius * params.disk_thickness / ring_count as Scalar;

        (0..ring_count)
            .map(|i| {
                let fraction = i as Scalar / ring_count as Scalar;
                let radius = inner + (outer - inner) * fraction;
                // Hotter, more opaque inner rings fading outward
                let color = Srgba::new(1.0, (0.5 - fraction / 2.0) as f32, 0.1, 1.0);

                AccretionRing {
                    radius,
                    angular_speed: kepler.angular_speed(radius, params.ring_k),
                    angle: 0.0,
                    thickness,
                    color: with_opacity(color, 0.7 - fraction * 0.5),
                }
            })
            .collect()
    }

    pub fn core_radius(&self) -> Scalar {
        self.core_radius
    }

    pub fn mass(&self) -> Scalar {
        self.mass
    }

    pub fn rings(&self) -> &[AccretionRing] {
        &self.rings
    }

    pub fn infall(&self) -> &ParticlePool<InfallEmitter> {
        &self.infall
    }
}

impl Celestial for BlackHole {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, rng: &mut R) {
        for ring in &mut self.rings {
            ring.angle = normalize_angle(ring.angle + ring.angular_speed * dt);
        }
        self.infall.update(dt, self.position, rng);
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn element_count(&self) -> usize {
        1 + self.rings.len() + self.infall.capacity()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.push(
            RenderElement::sphere(self.position, self.core_radius, Srgba::BLACK).with_emissive(false),
        );
        out.extend(self.rings.iter().map(|ring| {
            RenderElement::ring(self.position, ring.radius, ring.thickness, ring.color)
                .with_spin(ring.angle)
        }));
        out.extend(self.infall.iter().map(|particle| {
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

    const CORE_RADIUS: Scalar = 119.68;

    fn black_hole(rng: &mut SharedRng) -> BlackHole {
        BlackHole::new(
            "Gargantua",
            Vector::new(-2244.0, 0.0, -2992.0),
            CORE_RADIUS,
            8e30,
            &KeplerModel::default(),
            BlackHoleParams::default(),
            &mut **rng,
        )
        .unwrap()
    }

    #[test]
    fn test_inner_rings_rotate_faster() {
        let mut rng = SharedRng::from_seed(31);
        let hole = black_hole(&mut rng);

        assert_eq!(hole.rings().len(), 20);
        for pair in hole.rings().windows(2) {
            assert!(pair[0].radius < pair[1].radius);
            assert!(pair[0].angular_speed > pair[1].angular_speed);
        }
    }

    #[test]
    fn test_ring_speed_scales_with_sqrt_mass() {
        let mut rng = SharedRng::from_seed(32);
        let kepler = KeplerModel::default();
        let light = BlackHole::new("a", Vector::ZERO, 1.0, 1e30, &kepler, BlackHoleParams::default(), &mut *rng).unwrap();
        let heavy = BlackHole::new("b", Vector::ZERO, 1.0, 4e30, &kepler, BlackHoleParams::default(), &mut *rng).unwrap();

        let ratio = heavy.rings()[0].angular_speed / light.rings()[0].angular_speed;
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_infall_distance_decreases_then_respawns_in_band() {
        let mut rng = SharedRng::from_seed(33);
        let mut hole = black_hole(&mut rng);
        let horizon = 1.5 * CORE_RADIUS;
        let (band_min, band_max) = (5.0 * CORE_RADIUS, 15.0 * CORE_RADIUS);

        let mut previous: Vec<Scalar> = hole.infall().iter().map(|p| p.coords.distance).collect();
        let mut respawns_seen = 0;

        for _ in 0..5_000 {
            hole.update(1.0, &mut *rng);

            for (particle, before) in hole.infall().iter().zip(previous.iter_mut()) {
                let distance = particle.coords.distance;
                assert!(distance >= horizon, "particle inside horizon: {distance}");

                if distance < *before {
                    // Still falling
                } else {
                    // Recycled: must land in the outer capture band
                    assert!((band_min..=band_max).contains(&distance));
                    respawns_seen += 1;
                }
                *before = distance;
            }
        }

        assert!(respawns_seen > 0);
        assert_eq!(hole.infall().len(), 50);
    }

    #[test]
    fn test_infall_height_bounded() {
        let mut rng = SharedRng::from_seed(34);
        let mut hole = black_hole(&mut rng);

        for _ in 0..2_000 {
            hole.update(1.0, &mut *rng);
            for particle in hole.infall().iter() {
                let offset = particle.position - hole.position();
                assert!(offset.y.abs() <= 0.5 * CORE_RADIUS + 1e-9);
            }
        }
    }

    #[test]
    fn test_respawn_band_must_clear_horizon() {
        let mut rng = SharedRng::from_seed(35);
        let params = BlackHoleParams {
            respawn_min: 1.0,
            ..BlackHoleParams::default()
        };
        let result = BlackHole::new("x", Vector::ZERO, 1.0, 1e30, &KeplerModel::default(), params, &mut *rng);
        assert!(matches!(result, Err(SceneError::InvalidRange { .. })));
    }

    #[test]
    fn test_infall_rejects_motionless_model() {
        let frozen = KeplerModel {
            gravitational_constant: 0.0,
            ..KeplerModel::default()
        };
        let result = InfallEmitter::new(1.0, frozen.with_central_mass(8e30), BlackHoleParams::default());
        assert!(matches!(result, Err(SceneError::NonPositiveRadius { .. })));

        // Denominator overflows, leaving no speed at the outer edge
        let vanishing = KeplerModel {
            kepler_constant: Scalar::MAX,
            ..KeplerModel::default()
        };
        let result = InfallEmitter::new(1.0, vanishing.with_central_mass(8e30), BlackHoleParams::default());
        assert!(matches!(
            result,
            Err(SceneError::NonPositiveRadius { what: "infall speed at respawn band", .. })
        ));

        let mut rng = SharedRng::from_seed(37);
        let emitter = InfallEmitter::new(
            CORE_RADIUS,
            KeplerModel::default().with_central_mass(8e30),
            BlackHoleParams::default(),
        )
        .unwrap();
        let particle = emitter.spawn(&mut *rng);
        assert!(particle.coords.inflow > 0.0);
    }

    #[test]
    fn test_element_count() {
        let mut rng = SharedRng::from_seed(36);
        let hole = black_hole(&mut rng);
        let mut elements = Vec::new();
        hole.collect_elements(&mut elements);

        assert_eq!(elements.len(), 1 + 20 + 50);
        assert_eq!(elements.len(), hole.element_count());
    }
}
