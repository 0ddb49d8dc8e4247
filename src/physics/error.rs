//! Construction-time errors for scene bodies
//!
//! The per-tick update path never fails. Everything that can go wrong is a
//! malformed parameter handed to a constructor, and is rejected there.

use crate::physics::math::Scalar;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A radius (body, orbit, ring or shell) or another strictly positive
    /// parameter was zero, negative or not finite
    NonPositiveRadius { what: &'static str, value: Scalar },
    /// A particle pool or element collection was given zero capacity
    EmptyPool { what: &'static str },
    /// A sampling range had `min > max` or negative bounds where disallowed
    InvalidRange {
        what: &'static str,
        min: Scalar,
        max: Scalar,
    },
    /// A periodic timer was given a non-positive period
    NonPositivePeriod { value: Scalar },
    /// Any other parameter that must be finite was NaN or infinite
    NonFiniteParameter { what: &'static str },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::NonPositiveRadius { what, value } => {
                write!(f, "{what} must be positive and finite, got {value}")
            }
            SceneError::EmptyPool { what } => write!(f, "{what} must have a non-zero capacity"),
            SceneError::InvalidRange { what, min, max } => {
                write!(f, "{what} range is invalid: [{min}, {max}]")
            }
            SceneError::NonPositivePeriod { value } => {
                write!(f, "pulse period must be positive, got {value}")
            }
            SceneError::NonFiniteParameter { what } => write!(f, "{what} must be finite"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Rejects radii that are zero, negative, NaN or infinite.
pub fn ensure_positive(what: &'static str, value: Scalar) -> Result<Scalar, SceneError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SceneError::NonPositiveRadius { what, value })
    }
}

/// Rejects ranges that are inverted or contain non-finite bounds.
pub fn ensure_range(what: &'static str, min: Scalar, max: Scalar) -> Result<(), SceneError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(SceneError::InvalidRange { what, min, max })
    }
}

pub fn ensure_finite(what: &'static str, value: Scalar) -> Result<Scalar, SceneError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SceneError::NonFiniteParameter { what })
    }
}

pub fn ensure_capacity(what: &'static str, capacity: usize) -> Result<usize, SceneError> {
    if capacity == 0 {
        Err(SceneError::EmptyPool { what })
    } else {
        Ok(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("radius", 2.0), Ok(2.0));
        assert!(ensure_positive("radius", 0.0).is_err());
        assert!(ensure_positive("radius", -1.0).is_err());
        assert!(ensure_positive("radius", Scalar::NAN).is_err());
        assert!(ensure_positive("radius", Scalar::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_range() {
        assert!(ensure_range("lifetime", 50.0, 200.0).is_ok());
        assert!(ensure_range("lifetime", 5.0, 5.0).is_ok());
        assert_eq!(
            ensure_range("lifetime", 3.0, 1.0),
            Err(SceneError::InvalidRange {
                what: "lifetime",
                min: 3.0,
                max: 1.0
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = SceneError::EmptyPool { what: "corona" };
        assert_eq!(err.to_string(), "corona must have a non-zero capacity");

        let err = ensure_positive("core radius", -2.0).unwrap_err();
        assert_eq!(err.to_string(), "core radius must be positive and finite, got -2");
    }
}
