//! Test utilities for plugin testing

use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};

use crate::prelude::*;

/// Creates a minimal test app with core Bevy plugins needed for testing
pub fn create_test_app() -> App {
    let mut app = App::new();

    // Add minimal plugins needed for testing
    app.add_plugins((
        MinimalPlugins,
        bevy::asset::AssetPlugin::default(),
        bevy::input::InputPlugin,
        bevy::state::app::StatesPlugin,
        bevy::transform::TransformPlugin,
    ));

    // Initialize assets needed by the visualization plugin
    app.init_asset::<bevy::render::mesh::Mesh>();
    app.init_asset::<bevy::pbr::StandardMaterial>();

    app
}

/// Default configuration with a fixed seed, so app tests are reproducible
pub fn seeded_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.physics.initial_seed = Some(seed);
    config
}

/// Helper to simulate a key press through the keyboard event stream
pub fn press_key(app: &mut App, key_code: KeyCode, logical_key: Key) {
    app.world_mut().send_event(KeyboardInput {
        key_code,
        logical_key,
        state: ButtonState::Pressed,
        text: None,
        repeat: false,
        window: Entity::PLACEHOLDER,
    });
}
