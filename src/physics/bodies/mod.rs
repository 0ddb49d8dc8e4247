//! Celestial body variants and the render elements they expose
//!
//! Each variant owns its own kinematic state and sub-structures and knows how
//! to advance itself by one tick. Rendering is external: a body only reports
//! a flat, constant-length list of [`RenderElement`]s (position, axis, colour,
//! opacity and visibility) that a backend can draw.

use crate::physics::math::{Scalar, Vector};
use bevy::color::Srgba;
use rand::Rng;

pub mod asteroid_belt;
pub mod black_hole;
pub mod nebula;
pub mod planet;
pub mod pulsar;
pub mod star;
pub mod starfield;

pub use asteroid_belt::{Asteroid, AsteroidBelt, AsteroidBeltParams};
pub use black_hole::{AccretionRing, BlackHole, BlackHoleParams, InfallEmitter, SpiralCoords};
pub use nebula::{CloudCoords, Nebula, NebulaEmitter, NebulaParams};
pub use planet::{Planet, Stripe, SurfaceKind};
pub use pulsar::{PulseState, Pulsar, PulsarParams, pulse_brightness};
pub use star::{CoronaEmitter, CoronaParams, ShellCoords, Star};
pub use starfield::{Starfield, StarfieldParams};

/// Primitive a render backend should use for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    /// Thin torus lying in the plane perpendicular to `axis`
    Ring,
    /// Cone with its base at `position` and its tip at `position + axis`
    Cone,
}

/// Everything a backend needs to draw one element of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderElement {
    pub shape: Shape,
    pub position: Vector,
    /// Orientation; unit length except for cones, where it carries the length
    pub axis: Vector,
    /// Rotation about `axis`, in radians
    pub spin: Scalar,
    pub radius: Scalar,
    pub thickness: Scalar,
    /// Colour with opacity in the alpha channel
    pub color: Srgba,
    pub emissive: bool,
    pub visible: bool,
}

impl RenderElement {
    pub fn sphere(position: Vector, radius: Scalar, color: Srgba) -> Self {
        Self {
            shape: Shape::Sphere,
            position,
            axis: Vector::Y,
            spin: 0.0,
            radius,
            thickness: 0.0,
            color,
            emissive: true,
            visible: true,
        }
    }

    pub fn ring(center: Vector, radius: Scalar, thickness: Scalar, color: Srgba) -> Self {
        Self {
            shape: Shape::Ring,
            position: center,
            axis: Vector::Y,
            spin: 0.0,
            radius,
            thickness,
            color,
            emissive: true,
            visible: true,
        }
    }

    pub fn cone(base: Vector, axis: Vector, radius: Scalar, color: Srgba) -> Self {
        Self {
            shape: Shape::Cone,
            position: base,
            axis,
            spin: 0.0,
            radius,
            thickness: 0.0,
            color,
            emissive: true,
            visible: true,
        }
    }

    pub fn with_spin(mut self, spin: Scalar) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_emissive(mut self, emissive: bool) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Scales the RGB channels of a colour, clamping into `[0, 1]`.
pub fn shade(color: Srgba, factor: Scalar) -> Srgba {
    let factor = factor as f32;
    Srgba::new(
        (color.red * factor).clamp(0.0, 1.0),
        (color.green * factor).clamp(0.0, 1.0),
        (color.blue * factor).clamp(0.0, 1.0),
        color.alpha,
    )
}

/// Returns the colour with its alpha replaced by a clamped opacity.
pub fn with_opacity(color: Srgba, opacity: Scalar) -> Srgba {
    Srgba {
        alpha: crate::physics::math::clamp_unit(opacity) as f32,
        ..color
    }
}

pub fn srgb(rgb: [f32; 3]) -> Srgba {
    Srgba::new(
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
        1.0,
    )
}

/// Per-tick behaviour shared by every body variant.
pub trait Celestial {
    fn name(&self) -> &str;

    /// Advances the body by `dt` ticks.
    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, rng: &mut R);

    /// Current centre of the body.
    fn position(&self) -> Vector;

    /// Number of render elements; constant for the lifetime of the body.
    fn element_count(&self) -> usize;

    /// Appends exactly [`Celestial::element_count`] elements to `out`.
    fn collect_elements(&self, out: &mut Vec<RenderElement>);
}

#[derive(Debug, Clone)]
pub enum CelestialBody {
    Star(Star),
    Planet(Planet),
    AsteroidBelt(AsteroidBelt),
    BlackHole(BlackHole),
    Pulsar(Pulsar),
    Nebula(Nebula),
    Starfield(Starfield),
}

macro_rules! dispatch {
    ($self:expr, $body:ident => $expr:expr) => {
        match $self {
            CelestialBody::Star($body) => $expr,
            CelestialBody::Planet($body) => $expr,
            CelestialBody::AsteroidBelt($body) => $expr,
            CelestialBody::BlackHole($body) => $expr,
            CelestialBody::Pulsar($body) => $expr,
            CelestialBody::Nebula($body) => $expr,
            CelestialBody::Starfield($body) => $expr,
        }
    };
}

impl Celestial for CelestialBody {
    fn name(&self) -> &str {
        dispatch!(self, body => body.name())
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, rng: &mut R) {
        dispatch!(self, body => body.update(dt, rng))
    }

    fn position(&self) -> Vector {
        dispatch!(self, body => body.position())
    }

    fn element_count(&self) -> usize {
        dispatch!(self, body => body.element_count())
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        dispatch!(self, body => body.collect_elements(out))
    }
}

impl CelestialBody {
    pub fn kind(&self) -> &'static str {
        match self {
            CelestialBody::Star(_) => "star",
            CelestialBody::Planet(_) => "planet",
            CelestialBody::AsteroidBelt(_) => "asteroid belt",
            CelestialBody::BlackHole(_) => "black hole",
            CelestialBody::Pulsar(_) => "pulsar",
            CelestialBody::Nebula(_) => "nebula",
            CelestialBody::Starfield(_) => "starfield",
        }
    }

    pub fn as_planet(&self) -> Option<&Planet> {
        match self {
            CelestialBody::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    pub fn as_planet_mut(&mut self) -> Option<&mut Planet> {
        match self {
            CelestialBody::Planet(planet) => Some(planet),
            _ => None,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for CelestialBody {
                fn from(body: $variant) -> Self {
                    CelestialBody::$variant(body)
                }
            }
        )*
    };
}

impl_from_variant!(Star, Planet, AsteroidBelt, BlackHole, Pulsar, Nebula, Starfield);
