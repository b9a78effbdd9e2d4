// Configuration loading and parsing (simulation.toml).

use matchup_core::{SimError, SimulationConfig, DEFAULT_NUM_TRIALS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub simulation: SimulationSettings,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// simulation.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire simulation.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SimulationFile {
    simulation: SimulationSettings,
    data_paths: DataPaths,
}

/// Largest seed a TOML file can hold (TOML integers are signed 64-bit).
pub const MAX_SEED: u64 = i64::MAX as u64;

/// The `[simulation]` table. Model parameters (spread, tournament flag,
/// strict validation) are flattened into the same table.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_num_trials")]
    pub num_trials: u64,
    #[serde(flatten)]
    pub model: SimulationConfig,
    /// Fixed seed for reproducible runs. Drawn at startup when absent,
    /// within `0..=MAX_SEED`.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Worker threads for the parallel sweep; 0 uses rayon's default.
    #[serde(default)]
    pub threads: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            num_trials: DEFAULT_NUM_TRIALS,
            model: SimulationConfig::default(),
            seed: None,
            parallel: default_parallel(),
            threads: 0,
        }
    }
}

fn default_num_trials() -> u64 {
    DEFAULT_NUM_TRIALS
}

fn default_parallel() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Advanced school stats export (Pace, ORtg, ORB%, TOV%).
    pub adv_stats: String,
    /// School ratings export (DRtg, SOS).
    pub ratings: String,
    pub output: String,
    /// Grouping rows above the real header in each stats export.
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
}

fn default_skip_rows() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/simulation.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("simulation.toml");
    let text = read_file(&path)?;
    let file: SimulationFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        simulation: file.simulation,
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the crate root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let sim = &config.simulation;

    if sim.num_trials == 0 {
        return Err(ConfigError::ValidationError {
            field: "simulation.num_trials".into(),
            message: "must be greater than 0".into(),
        });
    }

    if let Err(SimError::InvalidConfiguration { field, message }) = sim.model.validate() {
        return Err(ConfigError::ValidationError {
            field: format!("simulation.{field}"),
            message,
        });
    }

    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data_paths.adv_stats", &paths.adv_stats),
        ("data_paths.ratings", &paths.ratings),
        ("data_paths.output", &paths.output),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
