//! # Chunk Grid
//!
//! Uniform square partition of the world used as the collision broad phase.
//!
//! ```text
//! world: world_size_chunks x world_size_chunks chunks
//! chunk: chunk_size x chunk_size tiles, chunk_units world units wide
//!
//! +-------+-------+-------+
//! | (0,2) | (1,2) | (2,2) |
//! +-------+-------+-------+
//! | (0,1) |  ( o )| (2,1) |   entity o straddles (0,1) and (1,1)
//! +-------+-------+-------+
//! | (0,0) | (1,0) | (2,0) |
//! +-------+-------+-------+
//! ```
//!
//! An entity is registered in exactly the chunks its hitbox bounds overlap.
//! Each chunk keeps three lists: every entity, the ones with physics, and the
//! non-decorative ones.

use thicket_core::EntityId;
use thicket_shared::SimulationConfig;

use crate::hitbox::Bounds;
use crate::transform::TransformComponent;

/// Chunk coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Capabilities that decide which chunk lists an entity appears in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MembershipFlags {
    /// The entity owns a physics component.
    pub has_physics: bool,
    /// The entity is purely decorative.
    pub is_decorative: bool,
}

/// One cell of the grid.
#[derive(Clone, Debug, Default)]
pub struct Chunk {
    coord: ChunkCoord,
    entities: Vec<EntityId>,
    physics_entities: Vec<EntityId>,
    non_decorative_entities: Vec<EntityId>,
}

impl Chunk {
    /// Coordinate of this chunk.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Every entity overlapping the chunk.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Entities with physics overlapping the chunk.
    #[inline]
    #[must_use]
    pub fn physics_entities(&self) -> &[EntityId] {
        &self.physics_entities
    }

    /// Non-decorative entities overlapping the chunk.
    #[inline]
    #[must_use]
    pub fn non_decorative_entities(&self) -> &[EntityId] {
        &self.non_decorative_entities
    }

    fn insert(&mut self, entity: EntityId, flags: MembershipFlags) {
        self.entities.push(entity);
        self.insert_subsets(entity, flags);
    }

    fn insert_subsets(&mut self, entity: EntityId, flags: MembershipFlags) {
        if flags.has_physics {
            self.physics_entities.push(entity);
        }
        if !flags.is_decorative {
            self.non_decorative_entities.push(entity);
        }
    }

    fn remove(&mut self, entity: EntityId) {
        remove_from(&mut self.entities, entity);
        self.remove_subsets(entity);
    }

    fn remove_subsets(&mut self, entity: EntityId) {
        remove_from(&mut self.physics_entities, entity);
        remove_from(&mut self.non_decorative_entities, entity);
    }
}

#[inline]
fn remove_from(list: &mut Vec<EntityId>, entity: EntityId) {
    if let Some(index) = list.iter().position(|&e| e == entity) {
        list.swap_remove(index);
    }
}

/// The world's chunk grid.
#[derive(Clone, Debug)]
pub struct ChunkGrid {
    /// Chunks per side.
    size: u32,
    /// Width of a chunk in world units.
    chunk_units: f32,
    /// Chunks indexed `[y * size + x]`.
    chunks: Vec<Chunk>,
}

impl ChunkGrid {
    /// Creates an empty grid of `size x size` chunks.
    #[must_use]
    pub fn new(size: u32, chunk_units: f32) -> Self {
        let chunks = (0..size as i32)
            .flat_map(|y| (0..size as i32).map(move |x| ChunkCoord::new(x, y)))
            .map(|coord| Chunk {
                coord,
                ..Chunk::default()
            })
            .collect();
        Self {
            size,
            chunk_units,
            chunks,
        }
    }

    /// Creates an empty grid sized from the configuration.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.world_size_chunks, config.chunk_units())
    }

    /// Chunks per side.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Width of a chunk in world units.
    #[inline]
    #[must_use]
    pub const fn chunk_units(&self) -> f32 {
        self.chunk_units
    }

    /// Total number of chunks.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Every chunk, row-major.
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk containing a world position, clamped into the grid.
    #[must_use]
    pub fn chunk_at(&self, x: f32, y: f32) -> ChunkCoord {
        ChunkCoord::new(self.cell(x), self.cell(y))
    }

    /// Chunk by coordinate.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.index(coord).map(|i| &self.chunks[i])
    }

    /// Coordinates of every chunk overlapping `bounds`, row-major.
    pub fn chunks_in_range(&self, bounds: &Bounds) -> impl Iterator<Item = ChunkCoord> {
        let min = self.chunk_at(bounds.min_x, bounds.min_y);
        let max = self.chunk_at(bounds.max_x, bounds.max_y);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y)))
    }

    /// Non-decorative entities in the chunks overlapping `bounds`, each
    /// reported once.
    #[must_use]
    pub fn non_decorative_in_range(&self, bounds: &Bounds) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .chunks_in_range(bounds)
            .filter_map(|coord| self.chunk(coord))
            .flat_map(|chunk| chunk.non_decorative_entities.iter().copied())
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Chunks a transform should be registered in: the union over its
    /// hitboxes' bounds. Sorted, no duplicates.
    #[must_use]
    pub fn compute_chunks(&self, transform: &TransformComponent) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = transform
            .hitboxes()
            .iter()
            .flat_map(|hitbox| self.chunks_in_range(&hitbox.bounds()))
            .collect();
        coords.sort_unstable();
        coords.dedup();
        coords
    }

    /// Brings an entity's registrations in line with its current hitbox
    /// bounds, touching only the chunks that changed.
    pub fn recompute_membership(
        &mut self,
        entity: EntityId,
        transform: &mut TransformComponent,
        flags: MembershipFlags,
    ) {
        let current = self.compute_chunks(transform);
        let previous = transform.take_chunks();

        for coord in previous.iter().filter(|&c| !current.contains(c)) {
            if let Some(i) = self.index(*coord) {
                self.chunks[i].remove(entity);
            }
        }
        for coord in current.iter().filter(|&c| !previous.contains(c)) {
            if let Some(i) = self.index(*coord) {
                self.chunks[i].insert(entity, flags);
            }
        }

        transform.set_chunks(current);
    }

    /// Re-files an entity in the subset lists of every chunk it is in,
    /// after it gained or lost physics or decoration.
    pub fn set_entity_flags(
        &mut self,
        entity: EntityId,
        transform: &TransformComponent,
        flags: MembershipFlags,
    ) {
        for coord in transform.chunks() {
            if let Some(i) = self.index(*coord) {
                let chunk = &mut self.chunks[i];
                chunk.remove_subsets(entity);
                chunk.insert_subsets(entity, flags);
            }
        }
    }

    /// Removes an entity from every chunk it is registered in.
    pub fn remove_entity(&mut self, entity: EntityId, transform: &mut TransformComponent) {
        for coord in transform.take_chunks() {
            if let Some(i) = self.index(coord) {
                self.chunks[i].remove(entity);
            }
        }
    }

    #[inline]
    fn cell(&self, value: f32) -> i32 {
        // NaN casts to 0
        ((value / self.chunk_units).floor() as i32).clamp(0, self.size as i32 - 1)
    }

    #[inline]
    fn index(&self, coord: ChunkCoord) -> Option<usize> {
        let size = self.size as i32;
        if coord.x < 0 || coord.y < 0 || coord.x >= size || coord.y >= size {
            return None;
        }
        Some((coord.y * size + coord.x) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hitbox::HitboxData;
    use thicket_shared::Point;

    const UNITS: f32 = 256.0;

    fn transform_at(x: f32, y: f32, radius: f32) -> TransformComponent {
        let mut transform = TransformComponent::new(Point::new(x, y), 0.0);
        transform
            .add_hitbox(HitboxData::circle(1, Point::ZERO, radius))
            .unwrap();
        transform
    }

    #[test]
    fn test_chunk_at_clamps() {
        let grid = ChunkGrid::new(4, UNITS);
        assert_eq!(grid.chunk_at(10.0, 300.0), ChunkCoord::new(0, 1));
        assert_eq!(grid.chunk_at(-50.0, 99_999.0), ChunkCoord::new(0, 3));
        assert_eq!(grid.chunk_at(f32::NAN, 0.0), ChunkCoord::new(0, 0));
    }

    #[test]
    fn test_straddling_entity_in_two_chunks() {
        let mut grid = ChunkGrid::new(4, UNITS);
        let entity = EntityId::new(1);
        let mut transform = transform_at(256.0, 100.0, 20.0);

        grid.recompute_membership(entity, &mut transform, MembershipFlags::default());
        assert_eq!(
            transform.chunks(),
            &[ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]
        );
        assert_eq!(grid.chunk(ChunkCoord::new(1, 0)).unwrap().entities(), &[entity]);
    }

    #[test]
    fn test_membership_diff_on_move() {
        let mut grid = ChunkGrid::new(4, UNITS);
        let entity = EntityId::new(1);
        let mut transform = transform_at(100.0, 100.0, 10.0);
        grid.recompute_membership(entity, &mut transform, MembershipFlags::default());

        transform.set_position(Point::new(600.0, 100.0));
        grid.recompute_membership(entity, &mut transform, MembershipFlags::default());

        assert!(grid.chunk(ChunkCoord::new(0, 0)).unwrap().entities().is_empty());
        assert_eq!(grid.chunk(ChunkCoord::new(2, 0)).unwrap().entities(), &[entity]);
        assert_eq!(transform.chunks(), &[ChunkCoord::new(2, 0)]);
    }

    #[test]
    fn test_subset_lists_follow_flags() {
        let mut grid = ChunkGrid::new(4, UNITS);
        let entity = EntityId::new(3);
        let mut transform = transform_at(100.0, 100.0, 10.0);
        let coord = ChunkCoord::new(0, 0);

        grid.recompute_membership(
            entity,
            &mut transform,
            MembershipFlags {
                has_physics: false,
                is_decorative: true,
            },
        );
        let chunk = grid.chunk(coord).unwrap();
        assert!(chunk.physics_entities().is_empty());
        assert!(chunk.non_decorative_entities().is_empty());

        grid.set_entity_flags(
            entity,
            &transform,
            MembershipFlags {
                has_physics: true,
                is_decorative: false,
            },
        );
        let chunk = grid.chunk(coord).unwrap();
        assert_eq!(chunk.physics_entities(), &[entity]);
        assert_eq!(chunk.non_decorative_entities(), &[entity]);
        assert_eq!(grid.non_decorative_in_range(&transform.bounds()), vec![entity]);

        grid.remove_entity(entity, &mut transform);
        assert!(grid.chunk(coord).unwrap().entities().is_empty());
        assert!(transform.chunks().is_empty());
    }

    #[test]
    fn test_entity_without_hitboxes_has_no_chunks() {
        let mut grid = ChunkGrid::new(4, UNITS);
        let mut transform = TransformComponent::new(Point::new(50.0, 50.0), 0.0);
        grid.recompute_membership(EntityId::new(1), &mut transform, MembershipFlags::default());

        assert!(transform.chunks().is_empty());
        assert!(grid.chunks().iter().all(|c| c.entities().is_empty()));
    }
}
