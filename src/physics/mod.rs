//! Engine-agnostic simulation core
//!
//! Everything in here is plain data advanced by explicit `update` calls. The
//! Bevy plugins drive a [`scene::SceneLoop`] and read its render elements, but
//! nothing in this module touches the ECS.

pub mod bodies;
pub mod error;
pub mod lod;
pub mod math;
pub mod orbit;
pub mod particles;
pub mod scenario;
pub mod scene;
