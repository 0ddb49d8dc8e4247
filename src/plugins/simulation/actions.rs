//! Action handlers for simulation commands
//!
//! This module contains handlers for SimulationCommand events including
//! pause/resume, speed changes, restart and quit.

use crate::physics::scenario::build_scene;
use crate::prelude::*;

pub fn handle_toggle_pause_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    scene: Option<ResMut<ActiveScene>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(mut scene) = scene else {
        return;
    };

    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::TogglePause) {
            continue;
        }
        let running = scene.toggle_pause();
        next_state.set(AppState::from_running(running));
        info!("Simulation {}", if running { "resumed" } else { "paused" });
    }
}

pub fn handle_adjust_speed_event(
    mut commands_reader: EventReader<SimulationCommand>,
    scene: Option<ResMut<ActiveScene>>,
) {
    let Some(mut scene) = scene else {
        return;
    };

    for command in commands_reader.read() {
        let SimulationCommand::AdjustSpeed(delta) = *command else {
            continue;
        };
        let time_scale = scene.adjust_speed(delta);
        info!("Time scale set to {time_scale:.2}x");
    }
}

pub fn handle_restart_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut commands: Commands,
    mut rng: ResMut<SharedRng>,
    config: Res<SimulationConfig>,
    mut next_state: ResMut<NextState<AppState>>,
    mut ready: EventWriter<SceneReady>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::Restart) {
            continue;
        }

        *rng = SharedRng::from_optional_seed(config.physics.initial_seed);

        match build_scene(&config, &mut **rng) {
            Ok(scene) => {
                info!("Scene restarted with {} render elements", scene.element_count());
                next_state.set(AppState::from_running(scene.is_running()));
                commands.insert_resource(ActiveScene::new(scene));
                ready.write(SceneReady);
            }
            Err(e) => {
                // The previous scene keeps running
                error!("Cannot rebuild scene: {e}");
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn handle_quit_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut exit: EventWriter<AppExit>,
) {
    for command in commands_reader.read() {
        if matches!(command, SimulationCommand::Quit) {
            info!("Quitting");
            exit.write(AppExit::Success);
        }
    }
}

// Browsers own the page lifecycle
#[cfg(target_arch = "wasm32")]
pub fn handle_quit_event(mut commands_reader: EventReader<SimulationCommand>) {
    commands_reader.clear();
}
