use crate::physics::bodies::{
    AsteroidBeltParams, BlackHoleParams, CoronaParams, NebulaParams, PulsarParams, StarfieldParams,
};
use crate::physics::error::{SceneError, ensure_positive, ensure_range};
use crate::physics::math::Scalar;
use crate::physics::orbit::KeplerModel;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "ORRERY";

/// Fastest fixed tick accepted; the tick period must stay well above a nanosecond
pub const MAX_TICK_RATE_HZ: Scalar = 1_000.0;

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub scene: SceneConfig,
    pub rendering: RenderingConfig,
    pub controls: ControlsConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Seed for every random choice; a fresh OS seed is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_seed: Option<u64>,
    pub tick_rate_hz: Scalar,
    /// Scene units per astronomical unit
    pub au: Scalar,
    pub gravitational_constant: Scalar,
    pub central_mass: Scalar,
    /// Metres per scene unit in the orbital speed relation
    pub distance_scale: Scalar,
    pub kepler_constant: Scalar,
    pub time_scale: Scalar,
    pub max_time_scale: Scalar,
    pub start_paused: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let kepler = KeplerModel::default();
        Self {
            initial_seed: None,
            tick_rate_hz: 30.0,
            au: 149.6,
            gravitational_constant: kepler.gravitational_constant,
            central_mass: kepler.central_mass,
            distance_scale: kepler.distance_scale,
            kepler_constant: kepler.kepler_constant,
            time_scale: 1.0,
            max_time_scale: 10.0,
            start_paused: false,
        }
    }
}

impl PhysicsConfig {
    pub fn kepler_model(&self) -> KeplerModel {
        KeplerModel {
            gravitational_constant: self.gravitational_constant,
            central_mass: self.central_mass,
            distance_scale: self.distance_scale,
            kepler_constant: self.kepler_constant,
        }
    }

    /// Checks the values the fixed clock and every orbit are derived from.
    pub fn validate(&self) -> Result<(), SceneError> {
        let tick_rate = ensure_positive("tick rate", self.tick_rate_hz)?;
        if tick_rate > MAX_TICK_RATE_HZ {
            return Err(SceneError::InvalidRange {
                what: "tick rate",
                min: tick_rate,
                max: MAX_TICK_RATE_HZ,
            });
        }
        ensure_positive("astronomical unit", self.au)?;
        ensure_range("max time scale", 0.0, self.max_time_scale)?;
        ensure_range("time scale", 0.0, self.time_scale)?;
        self.kepler_model().validate()
    }

    /// Converts astronomical units into scene units.
    #[inline]
    pub fn au(&self, value: Scalar) -> Scalar {
        value * self.au
    }
}

/// Every body of the reference scene. Distances are in astronomical units.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub star: StarConfig,
    pub rocky_planets: PlanetFamilyConfig,
    pub gas_planets: PlanetFamilyConfig,
    pub asteroid_belt: AsteroidBeltParams,
    pub nebulae: Vec<NebulaConfig>,
    pub black_hole: BlackHoleConfig,
    pub pulsar: PulsarConfig,
    pub starfield: StarfieldParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star: StarConfig::default(),
            rocky_planets: PlanetFamilyConfig {
                name_prefix: "Rocky".into(),
                count: 4,
                orbit_base: 0.4,
                orbit_step: 0.3,
                radius_base: 0.03,
                radius_step: 0.01,
                orbit_k: 1.5,
                stripes_min: 0,
                stripes_max: 0,
            },
            gas_planets: PlanetFamilyConfig {
                name_prefix: "Gas Giant".into(),
                count: 4,
                orbit_base: 5.0,
                orbit_step: 4.0,
                radius_base: 0.11,
                radius_step: 0.03,
                orbit_k: 2.0,
                stripes_min: 3,
                stripes_max: 7,
            },
            asteroid_belt: AsteroidBeltParams::default(),
            nebulae: vec![
                NebulaConfig {
                    name: "Blue Nebula".into(),
                    position: [30.0, 5.0, -10.0],
                    size: 5.0,
                    color: [0.2, 0.5, 1.0],
                    params: NebulaParams::default(),
                },
                NebulaConfig {
                    name: "Red Nebula".into(),
                    position: [-25.0, -8.0, 15.0],
                    size: 8.0,
                    color: [1.0, 0.2, 0.5],
                    params: NebulaParams::default(),
                },
            ],
            black_hole: BlackHoleConfig::default(),
            pulsar: PulsarConfig::default(),
            starfield: StarfieldParams::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StarConfig {
    pub name: String,
    pub radius: Scalar,
    pub color: [f32; 3],
    pub corona: CoronaParams,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            name: "Sun".into(),
            radius: 0.5,
            color: [1.0, 1.0, 0.0],
            corona: CoronaParams::default(),
        }
    }
}

/// A family of planets on evenly stepped orbits around the central star.
///
/// Planet `i` orbits at `orbit_base + i * orbit_step` with radius
/// `radius_base + i * radius_step`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PlanetFamilyConfig {
    pub name_prefix: String,
    pub count: usize,
    pub orbit_base: Scalar,
    pub orbit_step: Scalar,
    pub radius_base: Scalar,
    pub radius_step: Scalar,
    pub orbit_k: Scalar,
    /// Gas giants draw a stripe count from this inclusive range
    pub stripes_min: usize,
    pub stripes_max: usize,
}

impl Default for PlanetFamilyConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Planet".into(),
            count: 0,
            orbit_base: 1.0,
            orbit_step: 1.0,
            radius_base: 0.05,
            radius_step: 0.0,
            orbit_k: 1.0,
            stripes_min: 0,
            stripes_max: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NebulaConfig {
    pub name: String,
    pub position: [Scalar; 3],
    pub size: Scalar,
    pub color: [f32; 3],
    pub params: NebulaParams,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            name: "Nebula".into(),
            position: [0.0, 0.0, 50.0],
            size: 5.0,
            color: [1.0, 1.0, 1.0],
            params: NebulaParams::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BlackHoleConfig {
    pub enabled: bool,
    pub name: String,
    pub position: [Scalar; 3],
    pub radius: Scalar,
    pub mass: Scalar,
    pub disk: BlackHoleParams,
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Black Hole".into(),
            position: [-15.0, 0.0, -20.0],
            radius: 0.8,
            mass: 8e30,
            disk: BlackHoleParams::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PulsarConfig {
    pub enabled: bool,
    pub name: String,
    pub position: [Scalar; 3],
    pub radius: Scalar,
    pub beams: PulsarParams,
}

impl Default for PulsarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Pulsar".into(),
            position: [20.0, 3.0, 25.0],
            radius: 0.2,
            beams: PulsarParams::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RenderingConfig {
    pub bloom_intensity: f32,
    pub star_light_intensity: f32,
    /// Camera distance beyond which planet stripes are hidden, in AU
    pub lod_distance_au: Scalar,
    pub lod_hysteresis_au: Scalar,
    /// Initial camera distance from the origin, in AU
    pub camera_distance_au: Scalar,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            bloom_intensity: 0.3,
            star_light_intensity: 1e9,
            lod_distance_au: 10.0,
            lod_hysteresis_au: 0.0,
            camera_distance_au: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Camera pan per key press, in AU
    pub pan_speed_au: Scalar,
    /// Time scale change per speed key press
    pub speed_step: Scalar,
    /// Show the key bindings in a corner of the window
    pub show_hint: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            pan_speed_au: 0.5,
            speed_step: 0.25,
            show_hint: true,
        }
    }
}

impl SimulationConfig {
    /// Platform-specific location of the user configuration file.
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "orrery")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Merges defaults, the user configuration file and `ORRERY__` environment
    /// variables.
    pub fn try_load_from_user_config() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = Self::user_config_path() {
            debug!("Looking for user configuration at {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Like [`Self::try_load_from_user_config`], falling back to defaults on
    /// any failure.
    pub fn load_from_user_config() -> Self {
        Self::try_load_from_user_config().unwrap_or_else(|e| {
            warn!("Failed to load user configuration: {e}. Using defaults.");
            Self::default()
        })
    }

    /// Load configuration from a file. A missing file yields the defaults;
    /// a file that exists but cannot be read or parsed is an error.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| format!("cannot parse {}: {e}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Config file {} not found. Using defaults.", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(format!("cannot read {}: {e}", path.display())),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
