//! Orrery library
//!
//! The simulation core lives in [`physics`] and has no ECS dependencies; the
//! [`plugins`] wire it into a Bevy application. Everything is public so the
//! binary, benches and integration tests share one implementation.

pub mod cli;
pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod states;

// Test utilities are public for integration tests
pub mod test_utils;
