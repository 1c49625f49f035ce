//! Game tuning and session options.
//!
//! Config file: `--config <path>`, else `<config_dir>/rogsh/config.toml`.
//! Every key is optional; missing keys take the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Starting vitals for a new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    pub hp: i32,
    pub max_hp: i32,
    pub energy: u32,
    pub max_energy: u32,
    pub disk_usage: u32,
    pub max_disk_usage: u32,
    pub threat_level: f64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            hp: 50,
            max_hp: 50,
            energy: 40,
            max_energy: 40,
            disk_usage: 30,
            max_disk_usage: 100,
            threat_level: 7.0,
        }
    }
}

/// Passive effects applied after every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    pub energy_regen: u32,
    pub threat_decay: f64,
    /// Threat at or above this ends the game.
    pub critical_threat: f64,
    /// Probability that each fork_sprite replicates on a turn.
    pub fork_spawn_chance: f64,
    /// Fixed seed for process spawning; random when absent.
    pub rng_seed: Option<u64>,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            energy_regen: 2,
            threat_decay: 0.5,
            critical_threat: 20.0,
            fork_spawn_chance: 0.15,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Ctrl+C saves before quitting.
    pub save_on_interrupt: bool,
    /// Leave the game once the last zone is cleared.
    pub exit_after_final_zone: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_on_interrupt: true,
            exit_after_final_zone: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub vitals: VitalsConfig,
    pub turn: TurnConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    /// `<config_dir>/rogsh/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rogsh").join("config.toml"))
    }

    pub fn from_toml(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&source, path)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_take_defaults() {
        let config = GameConfig::from_toml(
            "[turn]\ncritical_threat = 12.0\n\n[session]\nsave_on_interrupt = false\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.turn.critical_threat, 12.0);
        assert_eq!(config.turn.energy_regen, 2);
        assert!(!config.session.save_on_interrupt);
        assert_eq!(config.vitals, VitalsConfig::default());
    }

    #[test]
    fn empty_file_is_default() {
        let config = GameConfig::from_toml("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn bad_types_are_reported() {
        let err = GameConfig::from_toml("[vitals]\nhp = \"lots\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[turn]\nrng_seed = 42").unwrap();
        let config = GameConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.turn.rng_seed, Some(42));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
