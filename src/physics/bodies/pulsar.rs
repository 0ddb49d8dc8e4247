use super::{Celestial, RenderElement};
use crate::physics::error::{SceneError, ensure_finite, ensure_positive};
use crate::physics::math::{Scalar, Vector, normalize_angle};
use bevy::color::Srgba;
use core::f64::consts::PI;
use rand::Rng;
use serde::{Deserialize, Serialize};

const BEAM_OPACITY: f32 = 0.6;

/// Beam geometry and pulse timing. Beam sizes are multiples of the core radius.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PulsarParams {
    /// Beam rotation in radians per tick
    pub rotation_speed: Scalar,
    /// Ticks per pulse
    pub pulse_period: Scalar,
    pub beam_length: Scalar,
    pub beam_radius: Scalar,
}

impl Default for PulsarParams {
    fn default() -> Self {
        Self {
            rotation_speed: 0.1,
            pulse_period: 30.0,
            beam_length: 10.0,
            beam_radius: 2.0,
        }
    }
}

/// Where the pulse timer is in its cycle after the latest tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseState {
    #[default]
    Accumulating,
    /// The timer reached the period on the latest tick and was reset
    Triggered,
}

/// Brightness of the core for a timer position inside one period.
///
/// Rises from 0.5 to 1.0 over the first half of the period and falls back
/// over the second half.
pub fn pulse_brightness(timer: Scalar, period: Scalar) -> Scalar {
    if period <= 0.0 {
        return 0.5;
    }
    0.5 + 0.5 * libm::sin(PI * timer / period)
}

/// A rotating neutron star sweeping two opposed beams around the Z axis while
/// its brightness pulses.
#[derive(Debug, Clone)]
pub struct Pulsar {
    name: String,
    position: Vector,
    radius: Scalar,
    params: PulsarParams,
    beam_angle: Scalar,
    pulse_timer: Scalar,
    state: PulseState,
    pulses: u64,
    brightness: Scalar,
}

impl Pulsar {
    pub fn new(
        name: impl Into<String>,
        position: Vector,
        radius: Scalar,
        params: PulsarParams,
    ) -> Result<Self, SceneError> {
        let radius = ensure_positive("pulsar radius", radius)?;
        ensure_finite("pulsar rotation speed", params.rotation_speed)?;
        if params.pulse_period <= 0.0 || !params.pulse_period.is_finite() {
            return Err(SceneError::NonPositivePeriod {
                value: params.pulse_period,
            });
        }
        ensure_positive("pulsar beam length", params.beam_length)?;
        ensure_positive("pulsar beam radius", params.beam_radius)?;

        Ok(Self {
            name: name.into(),
            position,
            radius,
            params,
            beam_angle: 0.0,
            pulse_timer: 0.0,
            state: PulseState::Accumulating,
            pulses: 0,
            brightness: 0.5,
        })
    }

    /// Unit direction of the first beam; the second points the opposite way.
    pub fn beam_direction(&self) -> Vector {
        Vector::new(libm::sin(self.beam_angle), libm::cos(self.beam_angle), 0.0)
    }

    pub fn beam_angle(&self) -> Scalar {
        self.beam_angle
    }

    pub fn pulse_timer(&self) -> Scalar {
        self.pulse_timer
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    /// Completed pulse cycles since construction.
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    pub fn brightness(&self) -> Scalar {
        self.brightness
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }

    fn beam_color(&self) -> Srgba {
        let b = self.brightness as f32;
        Srgba::new(b * b, b * b, b, BEAM_OPACITY)
    }
}

impl Celestial for Pulsar {
    fn name(&self) -> &str {
        &self.name
    }

    fn update<R: Rng + ?Sized>(&mut self, dt: Scalar, _rng: &mut R) {
        self.beam_angle = normalize_angle(self.beam_angle + self.params.rotation_speed * dt);

        self.pulse_timer += dt;
        if self.pulse_timer >= self.params.pulse_period {
            self.pulse_timer = 0.0;
            self.pulses += 1;
            self.state = PulseState::Triggered;
        } else {
            self.state = PulseState::Accumulating;
        }

        self.brightness = pulse_brightness(self.pulse_timer, self.params.pulse_period);
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn element_count(&self) -> usize {
        3
    }

    fn collect_elements(&self, out: &mut Vec<RenderElement>) {
        let b = self.brightness as f32;
        let beam = self.beam_direction() * self.radius * self.params.beam_length;
        let beam_radius = self.radius * self.params.beam_radius;

        out.push(RenderElement::sphere(self.position, self.radius, Srgba::new(b, b, b, 1.0)));
        out.push(RenderElement::cone(self.position, beam, beam_radius, self.beam_color()));
        out.push(RenderElement::cone(self.position, -beam, beam_radius, self.beam_color()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SharedRng;

    fn pulsar() -> Pulsar {
        Pulsar::new("PSR", Vector::new(10.0, 0.0, 0.0), 2.0, PulsarParams::default()).unwrap()
    }

    #[test]
    fn test_brightness_stays_in_band() {
        let mut rng = SharedRng::from_seed(41);
        let mut pulsar = pulsar();

        for _ in 0..500 {
            pulsar.update(0.7, &mut *rng);
            assert!((0.5..=1.0).contains(&pulsar.brightness()));
            assert!(pulsar.pulse_timer() < 30.0);
        }
    }

    #[test]
    fn test_pulse_triggers_once_per_period() {
        let mut rng = SharedRng::from_seed(42);
        let mut pulsar = pulsar();
        let mut triggers = 0;

        for tick in 1..=90 {
            pulsar.update(1.0, &mut *rng);
            if pulsar.state() == PulseState::Triggered {
                triggers += 1;
                assert_eq!(tick % 30, 0);
                assert_eq!(pulsar.pulse_timer(), 0.0);
            }
        }

        assert_eq!(triggers, 3);
        assert_eq!(pulsar.pulses(), 3);
    }

    #[test]
    fn test_brightness_across_rollover() {
        let mut rng = SharedRng::from_seed(44);
        let mut pulsar = pulsar();

        for _ in 0..29 {
            pulsar.update(1.0, &mut *rng);
        }
        let before = pulsar.brightness();
        assert!((before - pulse_brightness(29.0, 30.0)).abs() < 1e-12);

        pulsar.update(1.0, &mut *rng);
        assert_eq!(pulsar.state(), PulseState::Triggered);
        assert!((pulsar.brightness() - 0.5).abs() < 1e-12);
        assert!((before - pulsar.brightness() - 0.5 * libm::sin(PI / 30.0)).abs() < 1e-12);
    }

    #[test]
    fn test_brightness_peaks_mid_period() {
        assert!((pulse_brightness(15.0, 30.0) - 1.0).abs() < 1e-12);
        assert!((pulse_brightness(0.0, 30.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_beams_are_opposed_and_rotate() {
        let mut rng = SharedRng::from_seed(43);
        let mut pulsar = pulsar();
        let mut elements = Vec::new();

        pulsar.update(1.0, &mut *rng);
        pulsar.collect_elements(&mut elements);

        assert_eq!(elements.len(), pulsar.element_count());
        let (first, second) = (elements[1], elements[2]);
        assert_eq!(first.shape, super::super::Shape::Cone);
        assert!((first.axis + second.axis).length() < 1e-12);
        assert!((first.axis.length() - 20.0).abs() < 1e-9);
        assert!((pulsar.beam_angle() - 0.1).abs() < 1e-12);
        assert_eq!(first.axis.z, 0.0);
    }

    #[test]
    fn test_invalid_period_rejected() {
        let params = PulsarParams {
            pulse_period: 0.0,
            ..PulsarParams::default()
        };
        assert!(matches!(
            Pulsar::new("p", Vector::ZERO, 1.0, params),
            Err(SceneError::NonPositivePeriod { .. })
        ));
    }
}
