//! # Collision Detection and Response
//!
//! ## Phases
//!
//! ```text
//! for chunk:
//!   for a in chunk.physics_entities:        <- only movers initiate
//!     for b in chunk.entities:
//!       pair = (min(a,b), max(a,b))
//!       cached? skip                        <- straddlers meet in many chunks
//!       bounds overlap? narrow phase : none
//!       cache[pair] = hitbox index pairs | none
//! ```
//!
//! Resolution then walks the colliding pairs in detection order. For every
//! hitbox pair both push descriptors are computed before either entity is
//! moved, so the result does not depend on which side is resolved first.
//!
//! ## Responses
//!
//! - **Hard**: translate out along the push direction and keep only the
//!   velocity tangent to the contact.
//! - **Soft**: add a repulsion impulse to external velocity, growing
//!   super-linearly with penetration and scaled by the mass ratio.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use thicket_core::{Component, ComponentStore, EntityId};
use thicket_shared::{Point, SimulationConfig};

use crate::chunks::ChunkGrid;
use crate::geometry::{hitboxes_intersect, PushInfo};
use crate::hitbox::Hitbox;
use crate::physics::PhysicsComponent;
use crate::transform::TransformComponent;

/// Exponent applied to penetration depth in the soft response.
pub const SOFT_PUSH_EXPONENT: f32 = 1.1;

// ============================================================================
// RESPONSES
// ============================================================================

/// Removes penetration immediately.
///
/// Both velocities lose their component along the push normal.
pub fn apply_hard_collision(
    transform: &mut TransformComponent,
    physics: &mut PhysicsComponent,
    push: PushInfo,
) {
    if push.amount_in <= 0.0 {
        return;
    }
    transform.translate(Point::from_vector_form(push.amount_in, push.direction));

    let tangent = Point::from_vector_form(1.0, push.direction + FRAC_PI_2);
    physics.self_velocity = tangent * physics.self_velocity.dot(tangent);
    physics.external_velocity = tangent * physics.external_velocity.dot(tangent);
}

/// Adds a repulsion impulse to the pushed entity's external velocity.
///
/// Massless entities cannot be pushed and are skipped with a warning.
pub fn apply_soft_collision(
    pushed: &TransformComponent,
    physics: &mut PhysicsComponent,
    pushing_mass: f32,
    push: PushInfo,
    config: &SimulationConfig,
) {
    if push.amount_in <= 0.0 {
        return;
    }
    let total_mass = pushed.total_mass();
    if total_mass <= 0.0 {
        tracing::warn!("Soft collision against an entity with zero total mass, skipping");
        return;
    }

    let force = config.entity_push_force
        * config.dt()
        * push.amount_in.powf(SOFT_PUSH_EXPONENT)
        * pushing_mass
        / total_mass;
    physics.external_velocity += Point::from_vector_form(force, push.direction);
}

// ============================================================================
// OBSERVERS AND EVENTS
// ============================================================================

/// Capability: react to collisions of the owning entity.
pub trait CollisionObserver: Component {
    /// Called once per colliding hitbox pair, after the physical response.
    fn on_collision(
        &mut self,
        entity: EntityId,
        colliding_entity: EntityId,
        pushed: &Hitbox,
        pushing: &Hitbox,
    );
}

/// Record of one entity being pushed by another during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Tick the collision happened in.
    pub tick: u64,
    /// The pushed entity.
    pub entity: EntityId,
    /// The pushing entity.
    pub colliding_entity: EntityId,
    /// Local id of the pushed hitbox.
    pub hitbox: u32,
    /// Local id of the pushing hitbox.
    pub colliding_hitbox: u32,
    /// Layer bit of the pushing hitbox.
    pub colliding_bit: u16,
    /// Push applied to the pushed entity.
    pub push: PushInfo,
}

// ============================================================================
// PAIR CACHE
// ============================================================================

/// Colliding hitboxes of one entity pair, as parallel index lists.
///
/// Indices refer to the hitbox lists of the lower-id and higher-id entity
/// respectively and stay valid for the tick they were recorded in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairCollision {
    /// Hitbox indices in the lower-id entity.
    pub min_entity_hitboxes: Vec<usize>,
    /// Hitbox indices in the higher-id entity.
    pub max_entity_hitboxes: Vec<usize>,
}

impl PairCollision {
    /// Number of colliding hitbox pairs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.min_entity_hitboxes.len()
    }

    /// True if no hitboxes collide.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_entity_hitboxes.is_empty()
    }

    /// Iterates over `(min_hitbox, max_hitbox)` index pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.min_entity_hitboxes
            .iter()
            .copied()
            .zip(self.max_entity_hitboxes.iter().copied())
    }
}

/// Per-tick memo of every entity pair already tested.
///
/// Keyed by the lower entity id, then the higher one. `None` records a pair
/// that was tested and found not colliding.
#[derive(Debug, Default)]
pub struct CollisionPairCache {
    pairs: HashMap<EntityId, HashMap<EntityId, Option<PairCollision>>>,
    /// Colliding pairs in detection order.
    colliding: Vec<(EntityId, EntityId)>,
    tested_pairs: u64,
    narrow_phase_tests: u64,
}

impl CollisionPairCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every pair.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.colliding.clear();
        self.tested_pairs = 0;
        self.narrow_phase_tests = 0;
    }

    /// True if the pair was already tested, in either order.
    #[must_use]
    pub fn contains(&self, a: EntityId, b: EntityId) -> bool {
        let (min, max) = EntityId::ordered(a, b);
        self.pairs.get(&min).is_some_and(|inner| inner.contains_key(&max))
    }

    /// Result for a pair, in either order. Outer `None` means untested.
    #[must_use]
    pub fn get(&self, a: EntityId, b: EntityId) -> Option<Option<&PairCollision>> {
        let (min, max) = EntityId::ordered(a, b);
        self.pairs
            .get(&min)
            .and_then(|inner| inner.get(&max))
            .map(Option::as_ref)
    }

    /// Records the result for an ordered pair.
    fn insert(&mut self, min: EntityId, max: EntityId, result: Option<PairCollision>) {
        if result.is_some() {
            self.colliding.push((min, max));
        }
        self.tested_pairs += 1;
        self.pairs.entry(min).or_default().insert(max, result);
    }

    /// Colliding pairs as `(min, max)` in detection order.
    #[inline]
    #[must_use]
    pub fn colliding_pairs(&self) -> &[(EntityId, EntityId)] {
        &self.colliding
    }

    /// Colliding pairs with their hitbox index lists, in detection order.
    pub fn collisions(&self) -> impl Iterator<Item = (EntityId, EntityId, &PairCollision)> + '_ {
        self.colliding.iter().filter_map(|&(min, max)| {
            self.pairs
                .get(&min)
                .and_then(|inner| inner.get(&max))
                .and_then(Option::as_ref)
                .map(|collision| (min, max, collision))
        })
    }

    /// Pairs tested since the last clear.
    #[inline]
    #[must_use]
    pub const fn tested_pairs(&self) -> u64 {
        self.tested_pairs
    }

    /// Pairs that reached the narrow phase since the last clear.
    #[inline]
    #[must_use]
    pub const fn narrow_phase_tests(&self) -> u64 {
        self.narrow_phase_tests
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// Narrow phase for two transforms, the first one being the lower id.
///
/// Hitbox pairs must pass the layer filter and overlap geometrically.
#[must_use]
pub fn narrow_phase(
    min_transform: &TransformComponent,
    max_transform: &TransformComponent,
) -> Option<PairCollision> {
    let mut collision = PairCollision::default();
    for (i, a) in min_transform.hitboxes().iter().enumerate() {
        for (j, b) in max_transform.hitboxes().iter().enumerate() {
            if a.can_collide_with(b) && hitboxes_intersect(a, b) {
                collision.min_entity_hitboxes.push(i);
                collision.max_entity_hitboxes.push(j);
            }
        }
    }
    (!collision.is_empty()).then_some(collision)
}

fn check_pair(
    a: EntityId,
    b: EntityId,
    transforms: &ComponentStore<TransformComponent>,
    cache: &mut CollisionPairCache,
) {
    if a == b || cache.contains(a, b) {
        return;
    }
    let (min, max) = EntityId::ordered(a, b);
    let (Some(min_transform), Some(max_transform)) = (transforms.get(min), transforms.get(max))
    else {
        return;
    };

    let result = if min_transform.bounds().overlaps(&max_transform.bounds()) {
        cache.narrow_phase_tests += 1;
        narrow_phase(min_transform, max_transform)
    } else {
        None
    };
    cache.insert(min, max, result);
}

/// Tests every pair sharing a chunk where at least one side has physics.
///
/// Pairs already in the cache are skipped, so running this twice without
/// clearing the cache does no new narrow-phase work.
pub fn detect_collisions(
    grid: &ChunkGrid,
    transforms: &ComponentStore<TransformComponent>,
    cache: &mut CollisionPairCache,
) {
    for chunk in grid.chunks() {
        for &entity in chunk.physics_entities() {
            for &other in chunk.entities() {
                check_pair(entity, other, transforms, cache);
            }
        }
    }
}

/// Tests one entity against everything sharing a chunk with it.
pub fn detect_local_collisions(
    entity: EntityId,
    grid: &ChunkGrid,
    transforms: &ComponentStore<TransformComponent>,
    cache: &mut CollisionPairCache,
) {
    let Some(transform) = transforms.get(entity) else {
        return;
    };
    for &coord in transform.chunks() {
        let Some(chunk) = grid.chunk(coord) else {
            continue;
        };
        for &other in chunk.entities() {
            check_pair(entity, other, transforms, cache);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::MembershipFlags;
    use crate::geometry::push_info;
    use crate::hitbox::{collision_bit, HitboxData};

    fn add(
        grid: &mut ChunkGrid,
        transforms: &mut ComponentStore<TransformComponent>,
        id: u32,
        hitboxes: &[HitboxData],
        x: f32,
        y: f32,
    ) -> EntityId {
        let entity = EntityId::new(id);
        let mut transform = TransformComponent::new(Point::new(x, y), 0.0);
        for data in hitboxes {
            transform.add_hitbox(*data).unwrap();
        }
        let flags = MembershipFlags {
            has_physics: true,
            is_decorative: false,
        };
        grid.recompute_membership(entity, &mut transform, flags);
        transforms.add(entity, transform).unwrap();
        entity
    }

    fn circle(radius: f32) -> HitboxData {
        HitboxData::circle(1, Point::ZERO, radius)
    }

    #[test]
    fn test_hard_collision_removes_penetration() {
        let mut pushed = TransformComponent::new(Point::ZERO, 0.0);
        pushed.add_hitbox(circle(10.0)).unwrap();
        let mut pusher = TransformComponent::new(Point::new(15.0, 0.0), 0.0);
        pusher.add_hitbox(circle(10.0)).unwrap();
        let mut physics = PhysicsComponent {
            self_velocity: Point::new(30.0, 5.0),
            ..PhysicsComponent::default()
        };

        let push = push_info(&pushed.hitboxes()[0], &pusher.hitboxes()[0]);
        apply_hard_collision(&mut pushed, &mut physics, push);

        let after = push_info(&pushed.hitboxes()[0], &pusher.hitboxes()[0]);
        assert!(after.amount_in.abs() < 1e-4);
        assert!(physics.self_velocity.x.abs() < 1e-4);
        assert!((physics.self_velocity.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_soft_push_grows_with_penetration() {
        let config = SimulationConfig::default();
        let mut pushed = TransformComponent::new(Point::ZERO, 0.0);
        pushed.add_hitbox(circle(10.0)).unwrap();

        let mut previous = 0.0;
        for depth in [0.5, 1.0, 2.0, 4.0, 8.0] {
            let mut physics = PhysicsComponent::default();
            let push = PushInfo {
                direction: FRAC_PI_2,
                amount_in: depth,
            };
            apply_soft_collision(&pushed, &mut physics, 1.0, push, &config);
            assert!(physics.external_velocity.x > previous);
            previous = physics.external_velocity.x;
        }
    }

    #[test]
    fn test_soft_push_skips_massless() {
        let config = SimulationConfig::default();
        let pushed = TransformComponent::new(Point::ZERO, 0.0);
        let mut physics = PhysicsComponent::default();
        let push = PushInfo {
            direction: 0.0,
            amount_in: 3.0,
        };

        apply_soft_collision(&pushed, &mut physics, 1.0, push, &config);
        assert_eq!(physics.external_velocity, Point::ZERO);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let mut grid = ChunkGrid::new(4, 256.0);
        let mut transforms = ComponentStore::new();
        add(&mut grid, &mut transforms, 1, &[circle(10.0)], 100.0, 100.0);
        add(&mut grid, &mut transforms, 2, &[circle(10.0)], 110.0, 100.0);
        add(&mut grid, &mut transforms, 3, &[circle(10.0)], 200.0, 200.0);

        let mut cache = CollisionPairCache::new();
        detect_collisions(&grid, &transforms, &mut cache);
        let first = cache.narrow_phase_tests();
        let colliding = cache.colliding_pairs().to_vec();
        assert_eq!(first, 1);
        assert_eq!(colliding, vec![(EntityId::new(1), EntityId::new(2))]);

        detect_collisions(&grid, &transforms, &mut cache);
        assert_eq!(cache.narrow_phase_tests(), first);
        assert_eq!(cache.colliding_pairs(), colliding.as_slice());
        assert_eq!(cache.get(EntityId::new(3), EntityId::new(1)), Some(None));
    }

    #[test]
    fn test_layer_filter_blocks_pair() {
        let mut grid = ChunkGrid::new(4, 256.0);
        let mut transforms = ComponentStore::new();
        let plant = circle(10.0).with_layers(collision_bit::PLANTS, collision_bit::PLANTS);
        add(&mut grid, &mut transforms, 1, &[circle(10.0)], 100.0, 100.0);
        add(&mut grid, &mut transforms, 2, &[plant], 105.0, 100.0);

        let mut cache = CollisionPairCache::new();
        detect_collisions(&grid, &transforms, &mut cache);
        assert_eq!(cache.narrow_phase_tests(), 1);
        assert!(cache.colliding_pairs().is_empty());
    }

    #[test]
    fn test_multi_hitbox_pairs_are_canonical() {
        let mut grid = ChunkGrid::new(4, 256.0);
        let mut transforms = ComponentStore::new();
        let second = HitboxData::circle(2, Point::new(40.0, 0.0), 10.0);
        add(&mut grid, &mut transforms, 9, &[circle(10.0), second], 100.0, 100.0);
        add(&mut grid, &mut transforms, 4, &[circle(10.0)], 145.0, 100.0);

        let mut cache = CollisionPairCache::new();
        detect_collisions(&grid, &transforms, &mut cache);

        let collision = cache.get(EntityId::new(9), EntityId::new(4)).unwrap().unwrap();
        // Entity 4 is the lower id, so its hitbox indices come first
        assert_eq!(collision.iter().collect::<Vec<_>>(), vec![(0, 1)]);
    }
}
