//! Simulation plugin - Self-contained plugin pattern
//!
//! Owns the [`ActiveScene`] resource: builds it at startup, ticks it on the
//! fixed schedule while the app is running and applies pause, speed, restart
//! and quit commands between ticks.

use crate::physics::scenario::build_scene;
use crate::prelude::*;

mod actions;

use actions::{
    handle_adjust_speed_event, handle_quit_event, handle_restart_simulation_event,
    handle_toggle_pause_simulation_event,
};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Commands,
}

#[derive(Default)]
pub struct SimulationPlugin;

impl SimulationPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = match app.world().get_resource::<SimulationConfig>() {
            Some(config) => config.clone(),
            None => SimulationConfig::load_from_user_config(),
        };

        match config.to_toml() {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        app.insert_resource(SharedRng::from_optional_seed(config.physics.initial_seed));
        // An invalid physics section also fails scene setup, which exits
        match config.physics.validate() {
            Ok(()) => {
                app.insert_resource(Time::<Fixed>::from_hz(config.physics.tick_rate_hz));
            }
            Err(e) => error!("Invalid physics configuration: {e}"),
        }
        app.insert_state(AppState::from_running(!config.physics.start_paused));
        app.insert_resource(config);

        app.add_event::<SimulationCommand>();
        app.add_event::<SceneReady>();

        app.configure_sets(
            Update,
            (SimulationSet::Input, SimulationSet::Commands).chain(),
        );

        app.add_systems(Startup, setup_scene);
        app.add_systems(
            FixedUpdate,
            tick_scene.run_if(in_state(AppState::Running)),
        );
        app.add_systems(
            Update,
            (
                handle_toggle_pause_simulation_event,
                handle_adjust_speed_event,
                handle_restart_simulation_event,
                handle_quit_event,
            )
                .in_set(SimulationSet::Commands),
        );
    }
}

/// Builds the configured scene, or exits with an error when the
/// configuration violates a construction invariant.
fn setup_scene(
    mut commands: Commands,
    mut rng: ResMut<SharedRng>,
    config: Res<SimulationConfig>,
    mut ready: EventWriter<SceneReady>,
    mut exit: EventWriter<AppExit>,
) {
    match build_scene(&config, &mut **rng) {
        Ok(scene) => {
            info!(
                "Scene built: {} bodies, {} render elements",
                scene.bodies().len(),
                scene.element_count()
            );
            commands.insert_resource(ActiveScene::new(scene));
            ready.write(SceneReady);
        }
        Err(e) => {
            error!("Cannot build scene: {e}");
            exit.write(AppExit::error());
        }
    }
}

fn tick_scene(scene: Option<ResMut<ActiveScene>>, mut rng: ResMut<SharedRng>) {
    if let Some(mut scene) = scene {
        scene.tick(&mut **rng);
    }
}
