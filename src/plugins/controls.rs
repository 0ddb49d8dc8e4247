//! Controls plugin - Self-contained plugin pattern
//!
//! Translates keyboard input into [`SimulationCommand`] events and shows the
//! key bindings on screen. Mouse orbit and zoom are handled by the pan-orbit
//! camera itself.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_controls_hint);
        app.add_systems(
            Update,
            keyboard_input_handler.in_set(SimulationSet::Input),
        );
    }
}

/// Text node listing the key bindings.
#[derive(Component, Copy, Clone, Default, PartialEq, Debug)]
pub struct ControlsHint;

/// Key bindings as shown to the user.
pub fn controls_hint_text() -> String {
    let mut text = String::from(
        "WASD move, mouse drag view, space pause/resume\n+/- speed, N restart",
    );
    #[cfg(not(target_arch = "wasm32"))]
    text.push_str(", Esc quit");
    text
}

fn spawn_controls_hint(mut commands: Commands, config: Res<SimulationConfig>) {
    if !config.controls.show_hint {
        return;
    }

    commands.spawn((
        Name::new("Controls Hint"),
        ControlsHint,
        Text::new(controls_hint_text()),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            ..default()
        },
    ));
}

fn keyboard_input_handler(
    mut keyboard_events: EventReader<KeyboardInput>,
    mut commands: EventWriter<SimulationCommand>,
    config: Res<SimulationConfig>,
) {
    let speed_step = config.controls.speed_step;

    for event in keyboard_events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }

        let command = match &event.logical_key {
            Key::Character(c) => match c.to_lowercase().as_str() {
                "w" => Some(SimulationCommand::Pan(PanDirection::Forward)),
                "s" => Some(SimulationCommand::Pan(PanDirection::Back)),
                "a" => Some(SimulationCommand::Pan(PanDirection::Left)),
                "d" => Some(SimulationCommand::Pan(PanDirection::Right)),
                "n" => Some(SimulationCommand::Restart),
                "=" | "+" => Some(SimulationCommand::AdjustSpeed(speed_step)),
                "-" | "_" => Some(SimulationCommand::AdjustSpeed(-speed_step)),
                _ => None,
            },
            Key::Space => Some(SimulationCommand::TogglePause),
            #[cfg(not(target_arch = "wasm32"))]
            Key::Escape => Some(SimulationCommand::Quit),
            _ => None,
        };

        if let Some(command) = command {
            commands.write(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, press_key};
    use bevy::ecs::event::Events;

    fn controls_app() -> App {
        let mut app = create_test_app();
        app.insert_resource(SimulationConfig::default());
        app.add_event::<SimulationCommand>();
        app.add_plugins(ControlsPlugin);
        app
    }

    fn written_commands(app: &mut App) -> Vec<SimulationCommand> {
        app.world_mut()
            .resource_mut::<Events<SimulationCommand>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_keys_map_to_commands() {
        let mut app = controls_app();

        press_key(&mut app, KeyCode::KeyW, Key::Character("w".into()));
        press_key(&mut app, KeyCode::KeyA, Key::Character("A".into()));
        press_key(&mut app, KeyCode::Space, Key::Space);
        press_key(&mut app, KeyCode::Equal, Key::Character("=".into()));
        press_key(&mut app, KeyCode::Minus, Key::Character("-".into()));
        press_key(&mut app, KeyCode::KeyN, Key::Character("n".into()));
        app.update();

        assert_eq!(
            written_commands(&mut app),
            vec![
                SimulationCommand::Pan(PanDirection::Forward),
                SimulationCommand::Pan(PanDirection::Left),
                SimulationCommand::TogglePause,
                SimulationCommand::AdjustSpeed(0.25),
                SimulationCommand::AdjustSpeed(-0.25),
                SimulationCommand::Restart,
            ]
        );
    }

    #[test]
    fn test_releases_and_unmapped_keys_ignored() {
        let mut app = controls_app();

        press_key(&mut app, KeyCode::KeyQ, Key::Character("q".into()));
        app.world_mut().send_event(KeyboardInput {
            key_code: KeyCode::Space,
            logical_key: Key::Space,
            state: ButtonState::Released,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
        app.update();

        assert!(written_commands(&mut app).is_empty());
    }

    #[test]
    fn test_controls_hint_spawned() {
        let mut app = controls_app();
        app.update();

        let hints: Vec<String> = app
            .world_mut()
            .query_filtered::<&Text, With<ControlsHint>>()
            .iter(app.world())
            .map(|text| text.0.clone())
            .collect();
        assert_eq!(hints.len(), 1);
        assert!(hints[0].starts_with("WASD move, mouse drag view, space pause/resume"));
    }

    #[test]
    fn test_controls_hint_can_be_hidden() {
        let mut app = create_test_app();
        let mut config = SimulationConfig::default();
        config.controls.show_hint = false;
        app.insert_resource(config);
        app.add_event::<SimulationCommand>();
        app.add_plugins(ControlsPlugin);
        app.update();

        let hints = app
            .world_mut()
            .query::<&ControlsHint>()
            .iter(app.world())
            .count();
        assert_eq!(hints, 0);
    }
}
