//! Builds the reference scene from configuration

use crate::config::{PlanetFamilyConfig, SimulationConfig};
use crate::physics::bodies::{
    AsteroidBelt, BlackHole, CelestialBody, Nebula, Planet, Pulsar, Star, Starfield, SurfaceKind,
    planet::random_surface_color, srgb,
};
use crate::physics::error::{SceneError, ensure_positive};
use crate::physics::lod::LodPolicy;
use crate::physics::math::{Scalar, Vector};
use crate::physics::orbit::{KeplerModel, OrbitingBody};
use crate::physics::scene::SceneLoop;
use core::f64::consts::PI;
use rand::Rng;

/// Constructs every body named in `config`, in drawing order: starfield,
/// star, rocky planets, asteroid belt, gas planets, nebulae, black hole,
/// pulsar.
pub fn build_scene<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SceneLoop, SceneError> {
    let physics = &config.physics;
    physics.validate()?;
    let scene = &config.scene;
    let kepler = physics.kepler_model();
    let au = physics.au;
    let at = |position: [Scalar; 3]| Vector::from_array(position) * au;

    let mut bodies: Vec<CelestialBody> = Vec::new();

    bodies.push(Starfield::generate("Starfield", Vector::ZERO, &scene.starfield, au, rng)?.into());

    let sun = Vector::ZERO;
    bodies.push(
        Star::new(
            scene.star.name.clone(),
            sun,
            physics.au(scene.star.radius),
            srgb(scene.star.color),
            scene.star.corona.clone(),
            rng,
        )?
        .into(),
    );

    push_planets(&mut bodies, &scene.rocky_planets, SurfaceKind::Rocky, sun, au, &kepler, rng)?;

    bodies.push(
        AsteroidBelt::generate("Asteroid Belt", sun, &scene.asteroid_belt, au, &kepler, rng)?
            .into(),
    );

    push_planets(&mut bodies, &scene.gas_planets, SurfaceKind::Gas, sun, au, &kepler, rng)?;

    for nebula in &scene.nebulae {
        bodies.push(
            Nebula::new(
                nebula.name.clone(),
                at(nebula.position),
                physics.au(nebula.size),
                srgb(nebula.color),
                nebula.params.clone(),
                rng,
            )?
            .into(),
        );
    }

    let black_hole = &scene.black_hole;
    if black_hole.enabled {
        bodies.push(
            BlackHole::new(
                black_hole.name.clone(),
                at(black_hole.position),
                physics.au(black_hole.radius),
                black_hole.mass,
                &kepler,
                black_hole.disk.clone(),
                rng,
            )?
            .into(),
        );
    }

    let pulsar = &scene.pulsar;
    if pulsar.enabled {
        bodies.push(
            Pulsar::new(
                pulsar.name.clone(),
                at(pulsar.position),
                physics.au(pulsar.radius),
                pulsar.beams.clone(),
            )?
            .into(),
        );
    }

    let lod = LodPolicy::new(
        physics.au(config.rendering.lod_distance_au),
        physics.au(config.rendering.lod_hysteresis_au),
    );
    let mut scene_loop = SceneLoop::new(bodies, lod, physics.max_time_scale);
    scene_loop.set_time_scale(physics.time_scale);
    scene_loop.set_running(!physics.start_paused);

    Ok(scene_loop)
}

fn push_planets<R: Rng + ?Sized>(
    bodies: &mut Vec<CelestialBody>,
    family: &PlanetFamilyConfig,
    surface: SurfaceKind,
    parent: Vector,
    au: Scalar,
    kepler: &KeplerModel,
    rng: &mut R,
) -> Result<(), SceneError> {
    if family.stripes_min > family.stripes_max {
        return Err(SceneError::InvalidRange {
            what: "planet stripe count",
            min: family.stripes_min as Scalar,
            max: family.stripes_max as Scalar,
        });
    }

    ensure_positive("planet orbit k", family.orbit_k)?;

    for i in 0..family.count {
        let step = i as Scalar;
        let orbit_radius = (family.orbit_base + family.orbit_step * step) * au;
        let radius = (family.radius_base + family.radius_step * step) * au;
        let speed = kepler.angular_speed(orbit_radius, family.orbit_k);
        let phase = rng.random_range(0.0..2.0 * PI);
        let orbit = OrbitingBody::new(parent, orbit_radius, phase, speed)?;

        let stripes = match surface {
            SurfaceKind::Rocky => 0,
            SurfaceKind::Gas => rng.random_range(family.stripes_min..=family.stripes_max),
        };
        let color = random_surface_color(surface, rng);
        let name = format!("{} {}", family.name_prefix, i + 1);

        bodies.push(Planet::new(name, surface, radius, color, orbit, stripes)?.into());
    }

    Ok(())
}
