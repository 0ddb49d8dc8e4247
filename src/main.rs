use bevy::ecs::schedule::{LogLevel, ScheduleBuildSettings};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCameraPlugin;
use clap::Parser;
use orrery::cli::{self, Args};
use orrery::plugins::camera::CameraPlugin;
use orrery::plugins::controls::ControlsPlugin;
use orrery::plugins::simulation::SimulationPlugin;
use orrery::plugins::visualization::VisualizationPlugin;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.dump_config {
        return match config.to_toml() {
            Ok(toml_string) => {
                println!("{toml_string}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize configuration: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(path) = &args.save_config {
        return match cli::save_config(&config, path) {
            Ok(()) => {
                println!("Configuration written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(ticks) = args.headless {
        return match cli::run_headless(&config, ticks) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                level: if args.verbose { Level::DEBUG } else { Level::INFO },
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Orrery".into(),
                    ..default()
                }),
                ..default()
            }),
    );

    app.insert_resource(config);
    app.add_plugins((
        PanOrbitCameraPlugin,
        SimulationPlugin::new(),
        ControlsPlugin,
        CameraPlugin,
        VisualizationPlugin,
    ));

    app.edit_schedule(FixedUpdate, |schedule| {
        schedule.set_build_settings(ScheduleBuildSettings {
            ambiguity_detection: LogLevel::Warn,
            ..default()
        });
    });

    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
