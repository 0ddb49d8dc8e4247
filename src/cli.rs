//! Command line interface for Orrery

use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SimulationConfig;
use crate::physics::bodies::CelestialBody;
use crate::physics::error::SceneError;
use crate::physics::scenario::build_scene;
use crate::resources::SharedRng;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, overridden or written
    ConfigLoad(String),
    /// The configured scene violates a construction invariant
    InvalidScene(SceneError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidScene(err) => write!(f, "Invalid scene: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::InvalidScene(err) => Some(err),
            CliError::ConfigLoad(_) => None,
        }
    }
}

impl From<SceneError> for CliError {
    fn from(err: SceneError) -> Self {
        CliError::InvalidScene(err)
    }
}

/// Orrery - procedural astronomical scene
#[derive(Parser, Debug)]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Random seed for scene generation
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Scene ticks per second (overrides config file)
    #[arg(short = 't', long, value_name = "HZ")]
    pub tick_rate: Option<f64>,

    /// Initial time scale multiplier (overrides config file)
    #[arg(long, value_name = "SCALE")]
    pub time_scale: Option<f64>,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Run this many ticks without a window, print a summary and exit
    #[arg(long, value_name = "TICKS")]
    pub headless: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// Loads configuration from file or defaults, applies command-line overrides
/// and validates the physics section
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load_from_file(config_path).map_err(CliError::ConfigLoad)?
    } else {
        SimulationConfig::try_load_from_user_config()
            .map_err(|e| CliError::ConfigLoad(e.to_string()))?
    };

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.physics.initial_seed = Some(seed);
    }

    if let Some(tick_rate) = args.tick_rate {
        if !(tick_rate.is_finite() && tick_rate > 0.0) {
            return Err(CliError::ConfigLoad(format!(
                "tick rate must be a positive number of ticks per second, got {tick_rate}"
            )));
        }
        println!("Overriding tick rate to: {tick_rate} Hz");
        config.physics.tick_rate_hz = tick_rate;
    }

    if let Some(time_scale) = args.time_scale {
        if !(time_scale.is_finite() && time_scale >= 0.0) {
            return Err(CliError::ConfigLoad(format!(
                "time scale must be a non-negative number, got {time_scale}"
            )));
        }
        println!("Overriding time scale to: {time_scale}");
        config.physics.time_scale = time_scale;
    }

    if args.paused {
        config.physics.start_paused = true;
    }

    config.physics.validate()?;
    Ok(config)
}

/// Writes the effective configuration for `--save-config`.
pub fn save_config(config: &SimulationConfig, path: &Path) -> Result<(), CliError> {
    config
        .save(path)
        .map_err(|e| CliError::ConfigLoad(format!("cannot write {}: {e}", path.display())))
}

/// Totals reported after a headless run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessSummary {
    pub ticks: u64,
    pub simulated_time: f64,
    pub bodies: usize,
    pub elements: usize,
    pub pulsar_pulses: u64,
    pub corona_respawns: u64,
    pub infall_respawns: u64,
    pub nebula_respawns: u64,
}

impl fmt::Display for HeadlessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:            {}", self.ticks)?;
        writeln!(f, "simulated time:   {:.1}", self.simulated_time)?;
        writeln!(f, "bodies:           {}", self.bodies)?;
        writeln!(f, "render elements:  {}", self.elements)?;
        writeln!(f, "pulsar pulses:    {}", self.pulsar_pulses)?;
        writeln!(f, "corona respawns:  {}", self.corona_respawns)?;
        writeln!(f, "infall respawns:  {}", self.infall_respawns)?;
        write!(f, "nebula respawns:  {}", self.nebula_respawns)
    }
}

/// Builds the configured scene and ticks it `ticks` times without rendering.
///
/// A scene configured to start paused is resumed first so the run does work.
pub fn run_headless(config: &SimulationConfig, ticks: u64) -> Result<HeadlessSummary, CliError> {
    let mut rng = SharedRng::from_optional_seed(config.physics.initial_seed);
    let mut scene = build_scene(config, &mut *rng)?;
    scene.set_running(true);

    for _ in 0..ticks {
        scene.tick(&mut *rng);
    }

    let mut summary = HeadlessSummary {
        ticks: scene.ticks(),
        simulated_time: scene.simulated_time(),
        bodies: scene.bodies().len(),
        elements: scene.element_count(),
        ..Default::default()
    };
    for body in scene.bodies() {
        match body {
            CelestialBody::Pulsar(pulsar) => summary.pulsar_pulses += pulsar.pulses(),
            CelestialBody::Star(star) => summary.corona_respawns += star.corona().respawns(),
            CelestialBody::BlackHole(hole) => summary.infall_respawns += hole.infall().respawns(),
            CelestialBody::Nebula(nebula) => summary.nebula_respawns += nebula.cloud().respawns(),
            _ => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("orrery").chain(argv.iter().copied()))
    }

    #[test]
    fn test_overrides_applied() {
        let args = args(&[
            "--config",
            "/nonexistent/orrery.toml",
            "--seed",
            "12",
            "--tick-rate",
            "60",
            "--time-scale",
            "2.5",
            "--paused",
        ]);
        let config = load_and_apply_config(&args).unwrap();

        assert_eq!(config.physics.initial_seed, Some(12));
        assert_eq!(config.physics.tick_rate_hz, 60.0);
        assert_eq!(config.physics.time_scale, 2.5);
        assert!(config.physics.start_paused);
    }

    #[test]
    fn test_invalid_tick_rate_rejected() {
        let args = args(&["--config", "/nonexistent/orrery.toml", "--tick-rate", "0"]);
        assert!(matches!(
            load_and_apply_config(&args),
            Err(CliError::ConfigLoad(_))
        ));
    }

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("orrery-{name}-{}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_invalid_tick_rate_in_config_file_rejected() {
        let path = write_config_file("zero-tick", "[physics]\ntick_rate_hz = 0.0\n");
        let result = load_and_apply_config(&args(&["--config", path.to_str().unwrap()]));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(CliError::InvalidScene(SceneError::NonPositiveRadius { what: "tick rate", .. }))
        ));
    }

    #[test]
    fn test_excessive_tick_rate_override_rejected() {
        let args = args(&["--config", "/nonexistent/orrery.toml", "--tick-rate", "1e12"]);
        assert!(matches!(
            load_and_apply_config(&args),
            Err(CliError::InvalidScene(SceneError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn test_zero_gravity_in_config_file_rejected() {
        let path = write_config_file("zero-gravity", "[physics]\ngravitational_constant = 0.0\n");
        let result = load_and_apply_config(&args(&["--config", path.to_str().unwrap()]));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CliError::InvalidScene(_))));
    }

    #[test]
    fn test_malformed_config_file_rejected() {
        let path = write_config_file("malformed", "[physics\ntick_rate_hz = ");
        let result = load_and_apply_config(&args(&["--config", path.to_str().unwrap()]));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CliError::ConfigLoad(_))));
    }

    #[test]
    fn test_headless_run_reports_activity() {
        let mut config = SimulationConfig::default();
        config.physics.initial_seed = Some(5);
        config.physics.start_paused = true;

        let summary = run_headless(&config, 300).unwrap();
        assert_eq!(summary.ticks, 300);
        assert_eq!(summary.pulsar_pulses, 10);
        assert!(summary.corona_respawns > 0);
        assert!(summary.elements > 0);
    }

    #[test]
    fn test_headless_reports_invalid_scene() {
        let mut config = SimulationConfig::default();
        config.scene.pulsar.beams.pulse_period = -1.0;

        let result = run_headless(&config, 1);
        assert!(matches!(result, Err(CliError::InvalidScene(SceneError::NonPositivePeriod { .. }))));
    }
}
