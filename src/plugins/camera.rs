//! Camera plugin - Self-contained plugin pattern
//!
//! Spawns the pan-orbit camera looking at the central star and moves its
//! focus in response to pan commands.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use bevy::core_pipeline::bloom::Bloom;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy_panorbit_camera::PanOrbitCamera;
use bevy_panorbit_camera::TouchControls;
use bevy_panorbit_camera::TrackpadBehavior;

/// Initial pitch: looking down at the orbital plane at atan(1/2)
const INITIAL_PITCH: f32 = 0.463_647_6;

/// Plugin that handles camera setup and control
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);
        app.add_systems(Update, pan_camera.after(SimulationSet::Input));
    }
}

/// Spawns the main camera at the configured distance from the origin
fn spawn_camera(mut commands: Commands, config: Res<SimulationConfig>) {
    let radius = config.physics.au(config.rendering.camera_distance_au) as f32;

    commands.spawn((
        Name::new("Main Camera"),
        Camera {
            hdr: true,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Camera3d::default(),
        Tonemapping::AcesFitted,
        Bloom {
            intensity: config.rendering.bloom_intensity,
            ..Bloom::NATURAL
        },
        Msaa::Sample4,
        PanOrbitCamera {
            allow_upside_down: true,
            focus: Vec3::ZERO,
            pitch: Some(INITIAL_PITCH),
            yaw: Some(0.0),
            pan_smoothness: 0.0,
            radius: Some(radius),
            touch_enabled: true,
            touch_controls: TouchControls::OneFingerOrbit,
            trackpad_behavior: TrackpadBehavior::blender_default(),
            trackpad_pinch_to_zoom_enabled: true,
            ..default()
        },
    ));
}

/// World-space offset for one pan step, relative to the camera's orientation.
pub fn pan_offset(transform: &Transform, direction: PanDirection, step: f32) -> Vec3 {
    let axis = match direction {
        PanDirection::Forward => transform.forward(),
        PanDirection::Back => transform.back(),
        PanDirection::Left => transform.left(),
        PanDirection::Right => transform.right(),
    };
    *axis * step
}

fn pan_camera(
    mut commands_reader: EventReader<SimulationCommand>,
    mut cameras: Query<(&mut PanOrbitCamera, &Transform)>,
    config: Res<SimulationConfig>,
) {
    let Ok((mut camera, transform)) = cameras.single_mut() else {
        commands_reader.clear();
        return;
    };
    let step = config.physics.au(config.controls.pan_speed_au) as f32;

    for command in commands_reader.read() {
        let SimulationCommand::Pan(direction) = *command else {
            continue;
        };
        camera.target_focus += pan_offset(transform, direction, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_offsets_follow_camera_axes() {
        let transform = Transform::from_xyz(0.0, 0.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y);

        let forward = pan_offset(&transform, PanDirection::Forward, 2.0);
        assert!((forward - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);

        let back = pan_offset(&transform, PanDirection::Back, 2.0);
        assert!((back + forward).length() < 1e-5);

        let right = pan_offset(&transform, PanDirection::Right, 1.0);
        assert!((right - Vec3::X).length() < 1e-5);

        let left = pan_offset(&transform, PanDirection::Left, 1.0);
        assert!((left + Vec3::X).length() < 1e-5);
    }
}
