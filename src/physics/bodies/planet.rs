use super::{Celestial, RenderElement, shade, with_opacity};
use crate::physics::error::{SceneError, ensure_positive};
use crate::physics::math::{Scalar, Vector};
use crate::physics::orbit::OrbitingBody;
use bevy::color::Srgba;
use rand::Rng;
use serde::{Deserialize, Serialize};

const STRIPE_SHADE: Scalar = 0.8;
const ORBIT_GUIDE_OPACITY: Scalar = 0.2;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Rocky,
    Gas,
}

/// A latitude band drawn on a gas giant, tracked relative to the planet centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Stripe {
    pub y_offset: Scalar,
    pub radius: Scalar,
    pub color: Srgba,
    pub position: Vector,
}

#[derive(Debug, Clone)]
pub struct Planet {
    name: String,
    radius: Scalar,
    surface: SurfaceKind,
    color: Srgba,
    orbit: OrbitingBody,
    stripes: Vec<Stripe>,
    detail_visible: bool,
}

impl Planet {
    /// Builds a planet on the given orbit.
    ///
    /// Gas giants get `stripe_count` evenly spaced bands from pole to pole;
    /// rocky planets ignore `stripe_count`.
    pub fn new(
        name: impl Into<String>,
        surface: SurfaceKind,
        radius: Scalar,
        color: Srgba,
        orbit: OrbitingBody,
        stripe_count: usize,
    ) -> Result<Self, SceneError> {
        let radius = ensure_positive("planet radius", radius)?;

        let stripes = match surface {
            SurfaceKind::Rocky => Vec::new(),
            SurfaceKind::Gas => {
                if stripe_count < 2 {
                    return Err(SceneError::InvalidRange {
                        what: "gas planet stripe count",
                        min: stripe_count as Scalar,
                        max: 2.0,
                    });
                }
                Self::stripes_for(radius, color, stripe_count, orbit.position())
            }
        };

        Ok(Self {
            name: name.into(),
            radius,
            surface,
            color,
            orbit,
            stripes,
            detail_visible: true,
        })
    }

    fn stripes_for(radius: Scalar, color: Srgba, count: usize, center: Vector) -> Vec<Stripe> {
        let stripe_color = shade(color, STRIPE_SHADE);

        (0..count)
            .map(|i| {
                let y_offset = -radius + 2.0 * radius * i as Scalar / (count - 1) as Scalar;
                // Ring radius follows the sphere's cross-section, closing at the poles
                let band_radius = if y_offset.abs() < radius {
                    libm::sqrt(radius * radius - y_offset * y_offset)
                } else {
                    0.0
                };

                Stripe {
                    y_offset,
                    radius: band_radius,
                    color: stripe_color,
                    position: center + Vector::Y * y_offset,
                }
            })
            .collect()
    }

    /// Shows or hides the high-detail stripes. Returns whether anything changed.
    pub fn set_detail_visible(&mut self, visible: bool) -> bool {
        let changed = self.detail_visible != visible;
        self.detail_visible = visible;
        changed
    }

    pub fn detail_visible(&self) -> bool {
        self.detail_visible
    }

    pub fn has_detail(&self) -> bool {
        !self.stripes.is_empty()
    }

    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }

    pub fn color(&self) -> Srgba {
        self.color
    }

    pub fn orbit(&self) -> &OrbitingBody {
        &self.orbit
    }

    pub fn stripes(&self) -> &[Stripe] {
        &self.stripes
    }
}

impl Celestial for Planet {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, _rng: &mut R) {
        self.orbit.advance(dt);

        let center = self.orbit.position();
        for stripe in &mut self.stripes {
            stripe.position = center + Vector::Y * stripe.y_offset;
        }
    }

    fn position(&self) -> Vector {
        self.orbit.position()
    }

    fn element_count(&self) -> usize {
        2 + self.stripes.len()
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        out.push(RenderElement::sphere(self.position(), self.radius, self.color).with_emissive(false));
        out.push(RenderElement::ring(
            self.orbit.orbit_center(),
            self.orbit.radius(),
            self.radius / 20.0,
            with_opacity(Srgba::WHITE, ORBIT_GUIDE_OPACITY),
        ));
        out.extend(self.stripes.iter().map(|stripe| {
            RenderElement::ring(stripe.position, stripe.radius, self.radius / 10.0, stripe.color)
                .with_emissive(false)
                .with_visibility(self.detail_visible)
        }));
    }
}

/// Random surface colour in the ranges used for each planet family.
pub fn random_surface_color<R: Rng + ?Sized>(surface: SurfaceKind, rng: &mut R) -> Srgba {
    match surface {
        SurfaceKind::Rocky => Srgba::new(
            rng.random_range(0.5..=0.8),
            rng.random_range(0.5..=0.7),
            rng.random_range(0.3..=0.6),
            1.0,
        ),
        SurfaceKind::Gas => Srgba::new(
            rng.random_range(0.6..=0.9),
            rng.random_range(0.6..=0.9),
            rng.random_range(0.7..=1.0),
            1.0,
        ),
    }
}
