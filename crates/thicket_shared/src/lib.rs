//! # Thicket Shared
//!
//! Types that the simulation core shares with the rest of the client:
//!
//! - [`Point`] - 2D vector math with the world's angle convention
//! - [`SimulationConfig`] - tunables loaded from TOML at session start
//! - [`TileType`], [`Tile`], [`TileSource`] - the tile layer interface
//!
//! ## Angle Convention
//!
//! Angles are measured clockwise from the positive Y axis. The unit vector
//! for angle `θ` is `(sin θ, cos θ)`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod math;
pub mod tiles;

pub use config::{ConfigError, SimulationConfig};
pub use constants::{DEFAULT_CHUNK_SIZE, DEFAULT_TILE_SIZE, DEFAULT_WORLD_SIZE_CHUNKS, TICK_RATE};
pub use math::Point;
pub use tiles::{Tile, TileMap, TileSource, TileType};
