use bevy::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ecs::core::error::ConfigError;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "WORLD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapDefinition {
    pub id: i32,
    pub layers: Vec<i32>,
    pub default_layer: i32,
}

impl Default for MapDefinition {
    fn default() -> Self {
        Self {
            id: 1,
            layers: vec![1],
            default_layer: 1,
        }
    }
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub tick_hz: f64,
    /// Fixed seed for combat rolls. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    pub catalog_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub maps: Vec<MapDefinition>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tick_hz: 10.0,
            rng_seed: None,
            catalog_path: None,
            store_path: None,
            maps: vec![MapDefinition::default()],
        }
    }
}

impl WorldConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Reads the file named by `WORLD_CONFIG`, or returns defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
