use core::f64::consts::{PI, TAU};
use rand::Rng;

/// Scalar type for simulation calculations (f64 for precision over long runs)
pub type Scalar = f64;

/// 3D vector type for positions, axes and offsets
pub type Vector = bevy::math::DVec3;

/// Wraps an angle into `[0, 2π)` so phases never grow without bound.
#[inline]
pub fn normalize_angle(angle: Scalar) -> Scalar {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Point on a sphere of radius `r` from polar angle `theta` and azimuth `phi`.
#[inline]
pub fn spherical_to_cartesian(r: Scalar, theta: Scalar, phi: Scalar) -> Vector {
    Vector::new(
        r * libm::sin(theta) * libm::cos(phi),
        r * libm::sin(theta) * libm::sin(phi),
        r * libm::cos(theta),
    )
}

/// Point on a horizontal circle of radius `r` at `angle`, lifted by `height`.
#[inline]
pub fn polar_to_cartesian(r: Scalar, angle: Scalar, height: Scalar) -> Vector {
    Vector::new(r * libm::cos(angle), height, r * libm::sin(angle))
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    let theta = rng.random_range(0.0..=2.0 * PI);
    let phi = libm::acos(rng.random_range(-1.0..=1.0));

    Vector::new(
        libm::sin(phi) * libm::cos(theta),
        libm::sin(phi) * libm::sin(theta),
        libm::cos(phi),
    )
}

/// Samples from `min..=max`, tolerating a degenerate range where `min == max`.
#[inline]
pub fn sample_range<R: Rng + ?Sized>(rng: &mut R, min: Scalar, max: Scalar) -> Scalar {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

#[inline]
pub fn clamp_unit(value: Scalar) -> Scalar {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
