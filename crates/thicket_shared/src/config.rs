//! # Simulation Configuration
//!
//! Tunables for the simulation core, loaded once at session start from TOML.
//! Every field has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! tick_rate = 60
//! tile_size = 64.0
//! chunk_size = 4
//! world_size_chunks = 16
//! entity_push_force = 200.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_DRAG_COEFFICIENT, DEFAULT_ENTITY_PUSH_FORCE,
    DEFAULT_RIVER_MOVE_SPEED_MULTIPLIER, DEFAULT_RIVER_PUSH_FORCE, DEFAULT_TILE_SIZE,
    DEFAULT_WALL_SCAN_PADDING, DEFAULT_WORLD_SIZE_CHUNKS, MAX_CHUNK_SIZE, MAX_WORLD_SIZE_CHUNKS,
    TICK_RATE,
};
use crate::tiles::TileType;

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values parsed but make no physical sense.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Simulation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation steps per second.
    pub tick_rate: u32,
    /// Width/height of one tile in world units.
    pub tile_size: f32,
    /// Width/height of one chunk, in tiles.
    pub chunk_size: u32,
    /// Width/height of the world, in chunks.
    pub world_size_chunks: u32,
    /// Scale of the soft-collision repulsion impulse.
    pub entity_push_force: f32,
    /// Multiplier on the proportional friction (drag) term.
    pub drag_coefficient: f32,
    /// Speed per second added along a river's flow.
    pub river_push_force: f32,
    /// Move speed multiplier used instead of the tile's while in a river.
    pub river_move_speed_multiplier: f32,
    /// Distance around the entity position scanned for wall tiles.
    pub wall_scan_padding: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            tile_size: DEFAULT_TILE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            world_size_chunks: DEFAULT_WORLD_SIZE_CHUNKS,
            entity_push_force: DEFAULT_ENTITY_PUSH_FORCE,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            river_push_force: DEFAULT_RIVER_PUSH_FORCE,
            river_move_speed_multiplier: DEFAULT_RIVER_MOVE_SPEED_MULTIPLIER,
            wall_scan_padding: DEFAULT_WALL_SCAN_PADDING,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be at least 1".into()));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.chunk_size == 0 || self.world_size_chunks == 0 {
            return Err(ConfigError::Invalid(
                "chunk_size and world_size_chunks must be at least 1".into(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE || self.world_size_chunks > MAX_WORLD_SIZE_CHUNKS {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be at most {MAX_CHUNK_SIZE} and world_size_chunks at most \
                 {MAX_WORLD_SIZE_CHUNKS}, got {} and {}",
                self.chunk_size, self.world_size_chunks
            )));
        }
        let non_negative = [
            ("entity_push_force", self.entity_push_force),
            ("drag_coefficient", self.drag_coefficient),
            ("river_push_force", self.river_push_force),
            ("river_move_speed_multiplier", self.river_move_speed_multiplier),
            ("wall_scan_padding", self.wall_scan_padding),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        // Drag may stop an entity within a tick but never flip its velocity
        let drag = TileType::max_friction() * self.dt() * self.drag_coefficient;
        if drag >= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "drag_coefficient {} is too strong for tick_rate {}: one tick of drag \
                 would remove {drag:.2} of the velocity",
                self.drag_coefficient, self.tick_rate
            )));
        }
        Ok(())
    }

    /// Seconds per tick.
    #[inline]
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Width of one chunk in world units.
    #[inline]
    #[must_use]
    pub fn chunk_units(&self) -> f32 {
        self.chunk_size as f32 * self.tile_size
    }

    /// Width of the world in tiles.
    ///
    /// Cannot overflow for a validated config.
    #[inline]
    #[must_use]
    pub fn world_size_tiles(&self) -> u32 {
        self.world_size_chunks * self.chunk_size
    }

    /// Width of the world in world units.
    #[inline]
    #[must_use]
    pub fn world_units(&self) -> f32 {
        self.world_size_tiles() as f32 * self.tile_size
    }
}
