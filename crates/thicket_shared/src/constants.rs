//! # Simulation Constants
//!
//! Defaults for [`SimulationConfig`](crate::SimulationConfig). The live
//! values always come from the loaded config; these only seed it.

// =============================================================================
// TIMING
// =============================================================================

/// Tick rate (simulation steps per second)
pub const TICK_RATE: u32 = 60;

// =============================================================================
// WORLD LAYOUT
// =============================================================================

/// Width/height of one tile in world units
pub const DEFAULT_TILE_SIZE: f32 = 64.0;

/// Width/height of one chunk, in tiles
pub const DEFAULT_CHUNK_SIZE: u32 = 4;

/// Width/height of the world, in chunks
pub const DEFAULT_WORLD_SIZE_CHUNKS: u32 = 16;

/// Largest accepted chunk size, in tiles
pub const MAX_CHUNK_SIZE: u32 = 256;

/// Largest accepted world size, in chunks (the grid holds its square)
pub const MAX_WORLD_SIZE_CHUNKS: u32 = 512;

// =============================================================================
// PHYSICS TUNING
// =============================================================================

/// Scale of the soft-collision repulsion impulse
pub const DEFAULT_ENTITY_PUSH_FORCE: f32 = 200.0;

/// Multiplier on the proportional (drag) friction term
pub const DEFAULT_DRAG_COEFFICIENT: f32 = 2.0;

/// Speed added per second along a river's flow direction
pub const DEFAULT_RIVER_PUSH_FORCE: f32 = 240.0;

/// Move speed multiplier replacing the tile's own while inside a river
pub const DEFAULT_RIVER_MOVE_SPEED_MULTIPLIER: f32 = 0.6;

/// Distance around an entity's position scanned for wall tiles
pub const DEFAULT_WALL_SCAN_PADDING: f32 = 32.0;
