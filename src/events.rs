//! Centralized event definitions
//!
//! Keyboard input is translated into [`SimulationCommand`]s by the controls
//! plugin and consumed by the simulation and camera plugins in `Update`,
//! never while a tick is running.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanDirection {
    Forward,
    Back,
    Left,
    Right,
}

// Unified simulation command pattern
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum SimulationCommand {
    TogglePause,
    Pan(PanDirection),
    /// Change of the time scale, clamped by the scene
    AdjustSpeed(f64),
    Restart,
    Quit,
}

/// Written whenever the active scene has been built or rebuilt, so render
/// entities can be recreated to match its element list.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneReady;
