//! # Tile Layer Interface
//!
//! The tile map itself is produced by the world generator, outside the
//! simulation core. The physics integrator only needs two queries:
//!
//! - [`TileSource::tile`] - what the ground is at a tile coordinate
//! - [`TileSource::river_flow_direction`] - which way water flows there
//!
//! Both take tile coordinates and clamp instead of failing, since entities
//! sitting exactly on the world edge routinely produce indices one past it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Ground type of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileType {
    /// Grass
    #[default]
    Grass = 0,
    /// Dirt
    Dirt = 1,
    /// Water (rivers and lakes)
    Water = 2,
    /// Sludge
    Sludge = 3,
    /// Rock
    Rock = 4,
    /// Sand
    Sand = 5,
    /// Snow
    Snow = 6,
    /// Ice
    Ice = 7,
    /// Permafrost
    Permafrost = 8,
}

impl TileType {
    /// Every tile type.
    pub const ALL: [Self; 9] = [
        Self::Grass,
        Self::Dirt,
        Self::Water,
        Self::Sludge,
        Self::Rock,
        Self::Sand,
        Self::Snow,
        Self::Ice,
        Self::Permafrost,
    ];

    /// Highest friction of any ground type.
    #[must_use]
    pub fn max_friction() -> f32 {
        Self::ALL.iter().map(|t| t.friction()).fold(0.0, f32::max)
    }

    /// Friction coefficient of the ground.
    ///
    /// Scales both how quickly acceleration turns into speed and how quickly
    /// speed decays.
    #[inline]
    #[must_use]
    pub const fn friction(self) -> f32 {
        match self {
            Self::Grass | Self::Dirt | Self::Rock | Self::Sand => 0.65,
            Self::Water => 1.0,
            Self::Sludge | Self::Snow => 0.9,
            Self::Ice => 0.2,
            Self::Permafrost => 0.3,
        }
    }

    /// Move speed multiplier of the ground.
    #[inline]
    #[must_use]
    pub const fn move_speed_multiplier(self) -> f32 {
        match self {
            Self::Grass | Self::Dirt | Self::Rock | Self::Sand | Self::Permafrost => 1.0,
            Self::Water | Self::Sludge => 0.6,
            Self::Snow => 0.65,
            Self::Ice => 1.5,
        }
    }
}

/// A single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Ground type.
    pub tile_type: TileType,
    /// Whether the tile is a solid wall entities collide with.
    pub is_wall: bool,
}

impl Tile {
    /// Creates a floor tile.
    #[inline]
    #[must_use]
    pub const fn floor(tile_type: TileType) -> Self {
        Self {
            tile_type,
            is_wall: false,
        }
    }

    /// Creates a wall tile.
    #[inline]
    #[must_use]
    pub const fn wall(tile_type: TileType) -> Self {
        Self {
            tile_type,
            is_wall: true,
        }
    }
}

/// Read access to the tile layer.
pub trait TileSource {
    /// Returns the tile at the given tile coordinates, clamped to the map.
    fn tile(&self, tile_x: i32, tile_y: i32) -> Tile;

    /// Returns the river flow direction at the given tile, if it is part of
    /// a river.
    fn river_flow_direction(&self, tile_x: i32, tile_y: i32) -> Option<f32>;
}

/// In-memory tile map.
#[derive(Clone, Debug)]
pub struct TileMap {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Tiles indexed `[y * width + x]`.
    tiles: Vec<Tile>,
    /// Flow direction for river tiles.
    river_flow: HashMap<(i32, i32), f32>,
}

impl TileMap {
    /// Creates a map where every tile is `fill`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: Tile) -> Self {
        assert!(width > 0 && height > 0, "Tile map dimensions must be non-zero");
        Self {
            width,
            height,
            tiles: vec![fill; (width * height) as usize],
            river_flow: HashMap::new(),
        }
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Clamps tile coordinates into the map.
    #[inline]
    fn clamp(&self, tile_x: i32, tile_y: i32) -> (i32, i32) {
        (
            tile_x.clamp(0, self.width as i32 - 1),
            tile_y.clamp(0, self.height as i32 - 1),
        )
    }

    #[inline]
    fn index(&self, tile_x: i32, tile_y: i32) -> usize {
        let (x, y) = self.clamp(tile_x, tile_y);
        y as usize * self.width as usize + x as usize
    }

    /// Replaces a tile. Out-of-range coordinates are clamped.
    pub fn set_tile(&mut self, tile_x: i32, tile_y: i32, tile: Tile) {
        let index = self.index(tile_x, tile_y);
        self.tiles[index] = tile;
    }

    /// Marks a tile as part of a river flowing in `direction`.
    ///
    /// The tile is turned into water.
    pub fn set_river_flow(&mut self, tile_x: i32, tile_y: i32, direction: f32) {
        let key = self.clamp(tile_x, tile_y);
        self.set_tile(key.0, key.1, Tile::floor(TileType::Water));
        self.river_flow.insert(key, direction);
    }
}

impl TileSource for TileMap {
    fn tile(&self, tile_x: i32, tile_y: i32) -> Tile {
        self.tiles[self.index(tile_x, tile_y)]
    }

    fn river_flow_direction(&self, tile_x: i32, tile_y: i32) -> Option<f32> {
        self.river_flow.get(&self.clamp(tile_x, tile_y)).copied()
    }
}
