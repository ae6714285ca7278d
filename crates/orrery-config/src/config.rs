//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Kepler equation solver settings.
    pub solver: SolverConfig,
    /// Stepping loop settings.
    pub simulation: SimulationConfig,
    /// Random system generator settings.
    pub generator: GeneratorConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Newton iteration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest accepted residual of Kepler's equation.
    pub tolerance: f64,
    /// Newton steps before a solve is reported as failed.
    pub max_iterations: u32,
}

/// Fixed-timestep loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation step in seconds.
    pub fixed_dt: f64,
    /// Longest frame the loop catches up on, in seconds.
    pub max_frame_time: f64,
    /// Time scale applied to every generated body.
    pub time_scale: f64,
    /// Stepping threads (0 = one per CPU).
    pub worker_threads: usize,
    /// Simulated seconds the demo runs for.
    pub duration_seconds: f64,
}

/// Ranges for the random system generator. Each range is `[min, max]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// RNG seed, so generated systems are reproducible.
    pub seed: u64,
    pub planet_count: [u32; 2],
    pub moon_count: [u32; 2],
    pub planet_axis_range: [f64; 2],
    pub moon_axis_range: [f64; 2],
    /// Gravitational parameter μ of every parent body.
    pub gravitational_parameter: f64,
    pub eccentricity_range: [f64; 2],
    /// Degrees.
    pub inclination_range: [f64; 2],
    /// Degrees.
    pub longitude_range: [f64; 2],
    /// Degrees.
    pub argument_range: [f64; 2],
    /// Degrees.
    pub declination_range: [f64; 2],
    /// Seconds.
    pub rotation_period_range: [f64; 2],
    /// Semi-major axis change of every planet, in length units per second.
    pub planet_decay: f64,
    /// Apsidal precession of every planet, in degrees per second.
    pub planet_precession: f64,
    /// Comets on open orbits that despawn when their pass ends.
    pub comets: CometConfig,
}

/// Comet generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CometConfig {
    pub count: u32,
    pub eccentricity_range: [f64; 2],
    pub periapsis_range: [f64; 2],
    /// Seconds for one pass across the limits.
    pub period_range: [f64; 2],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files. Defaults to `logs/` next to the config.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 200,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_time: 0.25,
            time_scale: 1.0,
            worker_threads: 0,
            duration_seconds: 10.0,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            planet_count: [3, 10],
            moon_count: [1, 10],
            planet_axis_range: [1.0, 100.0],
            moon_axis_range: [0.5, 2.0],
            gravitational_parameter: 0.1,
            eccentricity_range: [0.1, 0.4],
            inclination_range: [-10.0, 10.0],
            longitude_range: [-180.0, 180.0],
            argument_range: [-180.0, 180.0],
            declination_range: [-10.0, 10.0],
            rotation_period_range: [10.0, 50.0],
            planet_decay: 0.0,
            planet_precession: 0.0,
            comets: CometConfig::default(),
        }
    }
}

impl Default for CometConfig {
    fn default() -> Self {
        Self {
            count: 3,
            eccentricity_range: [1.0, 5.0],
            periapsis_range: [1.0, 5.0],
            period_range: [5.0, 15.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for Orrery, if the OS exposes one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("orrery"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default orrery config to {}", config_path.display());
            return Ok(config);
        }

        let config = Self::read(&config_path)?;
        log::info!("Loaded orrery config from {}", config_path.display());
        Ok(config)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ConfigError::Write { path, source }
        };
        std::fs::create_dir_all(config_dir).map_err(write_error(config_dir))?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let config_path = config_dir.join(CONFIG_FILE);
        std::fs::write(&config_path, serialized).map_err(write_error(&config_path))
    }

    /// Re-reads the file. Returns `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Orrery config changed on disk");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
