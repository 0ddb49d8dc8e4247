//! Orrery prelude module
//!
//! Re-exports the types most plugins and systems need.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports - Math
pub use crate::physics::math::{Scalar, Vector};

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - States
pub use crate::states::AppState;

// Internal re-exports - Resources
pub use crate::resources::{ActiveScene, SharedRng};

// Internal re-exports - Events
pub use crate::events::{PanDirection, SceneReady, SimulationCommand};

// Internal re-exports - Physics
pub use crate::physics::bodies::{Celestial, CelestialBody, RenderElement, Shape};
pub use crate::physics::scene::SceneLoop;
