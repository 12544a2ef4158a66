//! Tunables for the play simulation, stored as RON.

use std::error::Error;
use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{fmt, io};

use dirs::config_dir;
use log::{info, warn};
use math::Fixed;
use nanoserde::{DeRon, DeRonErr, SerRon};

use crate::doom_def::{CLIPRADIUS, MAXMOVE, MAXRADIUS, SLIDE_ITERATIONS, STEPHEIGHT, USERANGE};

const LOG_TAG: &str = "SimConfig";
const BASE_DIR: &str = "playsim";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(DeRonErr),
    /// A tunable outside the range the engine can run with
    Invalid(&'static str),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(_) | ConfigError::Invalid(_) => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "{}: {}", LOG_TAG, e),
            ConfigError::Parse(e) => write!(f, "{}: {}", LOG_TAG, e),
            ConfigError::Invalid(field) => write!(f, "{}: {} is out of range", LOG_TAG, field),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<DeRonErr> for ConfigError {
    fn from(e: DeRonErr) -> Self {
        ConfigError::Parse(e)
    }
}

/// Distances are whole map units
#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct SimConfig {
    /// Highest step a walker may climb, and deepest ledge it may walk off
    pub step_height: i32,
    /// Largest thing radius, pads blockmap thing queries
    pub max_radius: i32,
    /// Least radius a slide is resolved with
    pub clip_radius: i32,
    pub slide_iterations: u32,
    /// Momentum cap per move step
    pub max_move: i32,
    pub use_range: i32,
    /// Consult the reject matrix before tracing sight. Off as the matrix in
    /// many maps is wrong.
    pub use_reject: bool,
    pub crush_damage: i32,
    /// Crushing only hurts when `level_time & crush_tick_mask == 0`
    pub crush_tick_mask: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_height: STEPHEIGHT,
            max_radius: MAXRADIUS,
            clip_radius: CLIPRADIUS,
            slide_iterations: SLIDE_ITERATIONS,
            max_move: MAXMOVE,
            use_range: USERANGE,
            use_reject: false,
            crush_damage: 10,
            crush_tick_mask: 3,
        }
    }
}

impl SimConfig {
    /// `<config_dir>/playsim/sim.ron`
    pub fn user_path() -> Option<PathBuf> {
        let mut dir = config_dir()?;
        dir.push(BASE_DIR);
        dir.push("sim.ron");
        Some(dir)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config = Self::deserialize_ron(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Movement splits momentum by `max_move`, so it must be positive. The
    /// distances may be zero but never negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_move <= 0 {
            return Err(ConfigError::Invalid("max_move"));
        }
        if self.step_height < 0 {
            return Err(ConfigError::Invalid("step_height"));
        }
        if self.max_radius < 0 {
            return Err(ConfigError::Invalid("max_radius"));
        }
        if self.clip_radius < 0 {
            return Err(ConfigError::Invalid("clip_radius"));
        }
        if self.use_range < 0 {
            return Err(ConfigError::Invalid("use_range"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let config = Self::from_ron(&buf)?;
        info!(target: LOG_TAG, "Loaded {:?}", path);
        Ok(config)
    }

    /// Load the user file, falling back to defaults if it is missing or bad
    pub fn load_user() -> Self {
        let Some(path) = Self::user_path() else {
            warn!(target: LOG_TAG, "No user config dir, using defaults");
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(target: LOG_TAG, "Could not read {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                create_dir_all(parent)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(self.serialize_ron().as_bytes())?;
        info!(target: LOG_TAG, "Saved config to {:?}", path);
        Ok(())
    }

    #[inline]
    pub fn step_height(&self) -> Fixed {
        Fixed::from_int(self.step_height)
    }

    #[inline]
    pub fn max_radius(&self) -> Fixed {
        Fixed::from_int(self.max_radius)
    }

    #[inline]
    pub fn clip_radius(&self) -> Fixed {
        Fixed::from_int(self.clip_radius)
    }

    #[inline]
    pub fn max_move(&self) -> Fixed {
        Fixed::from_int(self.max_move)
    }

    #[inline]
    pub fn use_range(&self) -> Fixed {
        Fixed::from_int(self.use_range)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SimConfig};
    use math::Fixed;

    #[test]
    fn defaults_are_historical() {
        let c = SimConfig::default();
        assert_eq!(c.step_height(), Fixed::from_int(24));
        assert_eq!(c.max_radius, 32);
        assert_eq!(c.slide_iterations, 8);
        assert!(!c.use_reject);
    }

    #[test]
    fn ron_round_trip() {
        let c = SimConfig {
            step_height: 16,
            use_reject: true,
            ..Default::default()
        };
        let text = nanoserde::SerRon::serialize_ron(&c);
        let back = SimConfig::from_ron(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn bad_ron_is_an_error() {
        assert!(matches!(
            SimConfig::from_ron("(step_height: )"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn move_cap_must_be_positive() {
        for max_move in [0, -1, i32::MIN] {
            let c = SimConfig {
                max_move,
                ..Default::default()
            };
            let text = nanoserde::SerRon::serialize_ron(&c);
            assert!(matches!(
                SimConfig::from_ron(&text),
                Err(ConfigError::Invalid("max_move"))
            ));
        }
        let c = SimConfig {
            max_move: 1,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn negative_distances_are_rejected() {
        let c = SimConfig {
            step_height: -24,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid("step_height"))));
        let c = SimConfig {
            use_range: -1,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid("use_range"))));
    }

    #[test]
    fn write_then_load() {
        let mut path = std::env::temp_dir();
        path.push(format!("playsim-test-{}", std::process::id()));
        path.push("sim.ron");
        let c = SimConfig {
            crush_damage: 3,
            ..Default::default()
        };
        c.write(&path).unwrap();
        assert_eq!(SimConfig::load(&path).unwrap(), c);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
