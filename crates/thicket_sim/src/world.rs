//! # Simulation World
//!
//! The single owned context of a session: configuration, tile layer, one
//! component store per [`ComponentKind`], the chunk grid and the pair cache.
//! Nothing is global; every system receives the world by `&mut`.
//!
//! ## Tick Pipeline
//!
//! ```text
//! clear pair cache
//! on_tick hooks
//! integrate physics  --> chunk membership for movers
//! detect collisions  (all pairs, read only)
//! resolve collisions (responses, observers, events)
//! chunk membership for entities moved by hard pushes
//! on_update hooks
//! ```
//!
//! Detection finishes before resolution starts, so every pair is tested
//! against the same snapshot of positions.

use thicket_core::{
    Component, ComponentKind, ComponentStore, EntityId, NetworkComponent, StoreHooks,
    TickContext,
};
use thicket_shared::{Point, SimulationConfig, TileMap, TileSource};

use crate::chunks::{ChunkGrid, MembershipFlags};
use crate::collision::{
    apply_hard_collision, apply_soft_collision, detect_collisions, detect_local_collisions,
    CollisionEvent, CollisionObserver, CollisionPairCache, PairCollision,
};
use crate::error::{SimError, SimResult};
use crate::geometry::{push_info, PushInfo};
use crate::hitbox::{Hitbox, HitboxCollisionType};
use crate::physics::{integrate, PhysicsComponent, PhysicsData, PhysicsEnv};
use crate::status::{StatusEffectComponent, StatusEffectData};
use crate::transform::{TransformComponent, TransformData};

// ============================================================================
// COMPONENT RECORDS
// ============================================================================

/// Marks an entity as purely decorative.
///
/// Decorative entities still collide but are left out of the chunks'
/// non-decorative lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoration;

impl Component for Decoration {
    const KIND: ComponentKind = ComponentKind::Decoration;
}

/// One decoded component record from the network layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentData {
    /// Transform record.
    Transform(TransformData),
    /// Physics record.
    Physics(PhysicsData),
    /// Status effect record.
    StatusEffects(StatusEffectData),
    /// Decoration marker.
    Decoration,
}

impl ComponentData {
    /// Kind of component the record describes.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Physics(_) => ComponentKind::Physics,
            Self::StatusEffects(_) => ComponentKind::StatusEffects,
            Self::Decoration => ComponentKind::Decoration,
        }
    }
}

/// Counters for the last completed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Index of the tick.
    pub tick: u64,
    /// Entities run through the integrator.
    pub integrated: usize,
    /// Entity pairs tested.
    pub tested_pairs: u64,
    /// Pairs that reached the narrow phase.
    pub narrow_phase_tests: u64,
    /// Pairs with at least one colliding hitbox pair.
    pub colliding_pairs: usize,
    /// Collision events queued.
    pub collision_events: usize,
}

// ============================================================================
// WORLD
// ============================================================================

/// The simulation state of one session.
pub struct World<T: TileSource = TileMap> {
    config: SimulationConfig,
    tiles: T,
    transforms: ComponentStore<TransformComponent>,
    physics: ComponentStore<PhysicsComponent>,
    status_effects: ComponentStore<StatusEffectComponent>,
    decorations: ComponentStore<Decoration>,
    grid: ChunkGrid,
    pair_cache: CollisionPairCache,
    local_cache: CollisionPairCache,
    events: Vec<CollisionEvent>,
    /// Entities moved during resolution, awaiting a membership refresh.
    moved: Vec<EntityId>,
    tick: u64,
    stats: TickStats,
}

impl<T: TileSource> World<T> {
    /// Creates an empty world.
    pub fn new(config: SimulationConfig, tiles: T) -> SimResult<Self> {
        config.validate()?;
        let grid = ChunkGrid::from_config(&config);

        tracing::info!(
            tick_rate = config.tick_rate,
            chunks = grid.chunk_count(),
            world_units = config.world_units(),
            "Simulation world created"
        );

        Ok(Self {
            config,
            tiles,
            transforms: ComponentStore::new(),
            physics: ComponentStore::new(),
            status_effects: ComponentStore::with_hooks(
                StoreHooks::<StatusEffectComponent>::none()
                    .with_tick()
                    .with_update(),
            ),
            decorations: ComponentStore::new(),
            grid,
            pair_cache: CollisionPairCache::new(),
            local_cache: CollisionPairCache::new(),
            events: Vec::new(),
            moved: Vec::new(),
            tick: 0,
            stats: TickStats::default(),
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Tile layer.
    #[inline]
    #[must_use]
    pub const fn tiles(&self) -> &T {
        &self.tiles
    }

    /// Tile layer, mutably.
    #[inline]
    pub fn tiles_mut(&mut self) -> &mut T {
        &mut self.tiles
    }

    /// Chunk grid.
    #[inline]
    #[must_use]
    pub const fn chunks(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Pair cache of the current tick.
    #[inline]
    #[must_use]
    pub const fn pair_cache(&self) -> &CollisionPairCache {
        &self.pair_cache
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Counters of the last completed tick.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// True if the entity owns any component.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.transforms.has(entity)
            || self.physics.has(entity)
            || self.status_effects.has(entity)
            || self.decorations.has(entity)
    }

    /// Transform of an entity.
    #[must_use]
    pub fn transform(&self, entity: EntityId) -> Option<&TransformComponent> {
        self.transforms.get(entity)
    }

    /// Physics of an entity.
    #[must_use]
    pub fn physics(&self, entity: EntityId) -> Option<&PhysicsComponent> {
        self.physics.get(entity)
    }

    /// Physics of an entity, mutably (local input).
    pub fn physics_mut(&mut self, entity: EntityId) -> Option<&mut PhysicsComponent> {
        self.physics.get_mut(entity)
    }

    /// Status effects of an entity.
    #[must_use]
    pub fn status_effects(&self, entity: EntityId) -> Option<&StatusEffectComponent> {
        self.status_effects.get(entity)
    }

    /// True if the entity is decorative.
    #[must_use]
    pub fn is_decorative(&self, entity: EntityId) -> bool {
        self.decorations.has(entity)
    }

    /// All transforms.
    #[inline]
    #[must_use]
    pub const fn transforms(&self) -> &ComponentStore<TransformComponent> {
        &self.transforms
    }

    // ------------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------------

    /// Creates an entity from its initial component records.
    pub fn add_entity(&mut self, entity: EntityId, components: &[ComponentData]) -> SimResult<()> {
        check_records(components)?;
        for data in components {
            match data {
                ComponentData::Transform(d) => {
                    self.transforms.add(entity, TransformComponent::from_initial(d))?;
                }
                ComponentData::Physics(d) => {
                    self.physics.add(entity, PhysicsComponent::from_initial(d))?;
                }
                ComponentData::StatusEffects(d) => {
                    self.status_effects
                        .add(entity, StatusEffectComponent::from_initial(d))?;
                }
                ComponentData::Decoration => self.decorations.add(entity, Decoration)?,
            }
        }
        self.sync_chunks(entity);

        tracing::trace!(entity = entity.raw(), components = components.len(), "Entity added");
        Ok(())
    }

    /// Applies later component records. Records for components the entity
    /// does not own yet attach them.
    pub fn update_entity(&mut self, entity: EntityId, components: &[ComponentData]) -> SimResult<()> {
        check_records(components)?;
        for data in components {
            match data {
                ComponentData::Transform(d) => upsert(&mut self.transforms, entity, d)?,
                ComponentData::Physics(d) => upsert(&mut self.physics, entity, d)?,
                ComponentData::StatusEffects(d) => upsert(&mut self.status_effects, entity, d)?,
                ComponentData::Decoration => {
                    if !self.decorations.has(entity) {
                        self.decorations.add(entity, Decoration)?;
                    }
                }
            }
        }
        self.sync_chunks(entity);
        Ok(())
    }

    /// Detaches one component from an entity.
    pub fn remove_component(&mut self, entity: EntityId, kind: ComponentKind) -> SimResult<()> {
        match kind {
            ComponentKind::Transform => {
                let mut transform = self.transforms.remove(entity)?;
                self.grid.remove_entity(entity, &mut transform);
            }
            ComponentKind::Physics => {
                self.physics.remove(entity)?;
            }
            ComponentKind::StatusEffects => {
                self.status_effects.remove(entity)?;
            }
            ComponentKind::Decoration => {
                self.decorations.remove(entity)?;
            }
        }
        self.sync_chunks(entity);
        Ok(())
    }

    /// Removes an entity and every component it owns.
    pub fn remove_entity(&mut self, entity: EntityId) -> SimResult<()> {
        if !self.contains(entity) {
            return Err(SimError::UnknownEntity(entity));
        }
        for kind in ComponentKind::ALL {
            let owned = match kind {
                ComponentKind::Transform => self.transforms.has(entity),
                ComponentKind::Physics => self.physics.has(entity),
                ComponentKind::StatusEffects => self.status_effects.has(entity),
                ComponentKind::Decoration => self.decorations.has(entity),
            };
            if owned {
                self.remove_component(entity, kind)?;
            }
        }

        tracing::trace!(entity = entity.raw(), "Entity removed");
        Ok(())
    }

    /// Teleports an entity (server correction).
    pub fn set_position(&mut self, entity: EntityId, position: Point) -> SimResult<()> {
        self.transforms
            .expect_component_mut(entity)?
            .set_position(position);
        self.refresh_membership(entity);
        Ok(())
    }

    fn membership_flags(&self, entity: EntityId) -> MembershipFlags {
        MembershipFlags {
            has_physics: self.physics.has(entity),
            is_decorative: self.decorations.has(entity),
        }
    }

    /// Re-registers the entity after its hitboxes or position changed.
    fn refresh_membership(&mut self, entity: EntityId) {
        let flags = self.membership_flags(entity);
        if let Some(transform) = self.transforms.get_mut(entity) {
            self.grid.recompute_membership(entity, transform, flags);
        }
    }

    /// Full refresh: geometry-driven membership plus subset lists.
    fn sync_chunks(&mut self, entity: EntityId) {
        let flags = self.membership_flags(entity);
        if let Some(transform) = self.transforms.get_mut(entity) {
            self.grid.recompute_membership(entity, transform, flags);
            self.grid.set_entity_flags(entity, transform, flags);
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances the simulation by one tick.
    ///
    /// An error leaves the world mid-tick and must end the session.
    pub fn tick(&mut self) -> SimResult<TickStats> {
        let ctx = TickContext {
            tick: self.tick,
            dt: self.config.dt(),
        };
        self.pair_cache.clear();
        self.moved.clear();
        let queued_before = self.events.len();

        self.run_tick_hooks(&ctx);
        let integrated = self.integrate_all()?;

        self.detect_collisions();
        self.resolve_collisions();
        self.flush_moved();

        self.run_update_hooks(&ctx);

        self.stats = TickStats {
            tick: self.tick,
            integrated,
            tested_pairs: self.pair_cache.tested_pairs(),
            narrow_phase_tests: self.pair_cache.narrow_phase_tests(),
            colliding_pairs: self.pair_cache.colliding_pairs().len(),
            collision_events: self.events.len() - queued_before,
        };
        self.tick += 1;

        tracing::trace!(
            tick = self.stats.tick,
            tested_pairs = self.stats.tested_pairs,
            colliding_pairs = self.stats.colliding_pairs,
            "Tick complete"
        );
        Ok(self.stats)
    }

    fn run_tick_hooks(&mut self, ctx: &TickContext) {
        self.transforms.run_tick(ctx);
        self.physics.run_tick(ctx);
        self.status_effects.run_tick(ctx);
        self.decorations.run_tick(ctx);
    }

    fn run_update_hooks(&mut self, ctx: &TickContext) {
        self.transforms.run_update(ctx);
        self.physics.run_update(ctx);
        self.status_effects.run_update(ctx);
        self.decorations.run_update(ctx);
    }

    /// Integrates every entity with physics and a transform.
    fn integrate_all(&mut self) -> SimResult<usize> {
        let entities = self.physics.entities().to_vec();
        let mut integrated = 0;

        for entity in entities {
            let flags = self.membership_flags(entity);
            let speed_multiplier = self
                .status_effects
                .get(entity)
                .map_or(1.0, StatusEffectComponent::move_speed_multiplier);
            let (Some(transform), Some(physics)) =
                (self.transforms.get_mut(entity), self.physics.get_mut(entity))
            else {
                continue;
            };

            let env = PhysicsEnv {
                config: &self.config,
                tiles: &self.tiles,
            };
            if integrate(entity, transform, physics, speed_multiplier, env)? {
                self.grid.recompute_membership(entity, transform, flags);
            }
            integrated += 1;
        }
        Ok(integrated)
    }

    /// Runs detection over the whole world into the tick's pair cache.
    ///
    /// Already-tested pairs are skipped, so calling this again before the
    /// next tick does no new narrow-phase work.
    pub fn detect_collisions(&mut self) {
        detect_collisions(&self.grid, &self.transforms, &mut self.pair_cache);
    }

    fn resolve_collisions(&mut self) {
        let pairs = collect_pairs(&self.pair_cache);
        self.resolve_pairs(&pairs, None);
    }

    /// Detects and resolves collisions for one entity only.
    ///
    /// Used for client-side prediction: the entity is pushed out of whatever
    /// it overlaps while every other entity stays put. Returns the number of
    /// colliding pairs.
    pub fn resolve_local_collisions(&mut self, entity: EntityId) -> SimResult<usize> {
        if !self.transforms.has(entity) {
            return Err(SimError::UnknownEntity(entity));
        }
        self.local_cache.clear();
        detect_local_collisions(entity, &self.grid, &self.transforms, &mut self.local_cache);

        let pairs = collect_pairs(&self.local_cache);
        self.resolve_pairs(&pairs, Some(entity));
        self.flush_moved();
        Ok(pairs.len())
    }

    fn resolve_pairs(&mut self, pairs: &[(EntityId, EntityId, PairCollision)], only: Option<EntityId>) {
        for (min, max, collision) in pairs {
            let (min, max) = (*min, *max);
            for (i, j) in collision.iter() {
                let (Some(min_hitbox), Some(max_hitbox)) =
                    (self.hitbox_at(min, i), self.hitbox_at(max, j))
                else {
                    continue;
                };

                // Both pushes come from the same positions
                let min_push = push_info(&min_hitbox, &max_hitbox);
                let max_push = push_info(&max_hitbox, &min_hitbox);

                if only.map_or(true, |e| e == min) {
                    self.respond(min, max, &min_hitbox, &max_hitbox, min_push);
                }
                if only.map_or(true, |e| e == max) {
                    self.respond(max, min, &max_hitbox, &min_hitbox, max_push);
                }
            }
        }
    }

    fn hitbox_at(&self, entity: EntityId, index: usize) -> Option<Hitbox> {
        self.transforms.get(entity)?.hitboxes().get(index).copied()
    }

    /// Applies one push to `entity`, then notifies observers.
    fn respond(
        &mut self,
        entity: EntityId,
        colliding_entity: EntityId,
        pushed: &Hitbox,
        pushing: &Hitbox,
        push: PushInfo,
    ) {
        if let (Some(transform), Some(physics)) =
            (self.transforms.get_mut(entity), self.physics.get_mut(entity))
        {
            match pushing.collision_type() {
                HitboxCollisionType::Hard => {
                    apply_hard_collision(transform, physics, push);
                    self.moved.push(entity);
                }
                HitboxCollisionType::Soft => {
                    apply_soft_collision(transform, physics, pushing.mass(), push, &self.config);
                }
            }
        }

        notify(&mut self.status_effects, entity, colliding_entity, pushed, pushing);

        self.events.push(CollisionEvent {
            tick: self.tick,
            entity,
            colliding_entity,
            hitbox: pushed.local_id(),
            colliding_hitbox: pushing.local_id(),
            colliding_bit: pushing.collision_bit(),
            push,
        });
    }

    fn flush_moved(&mut self) {
        let mut moved = std::mem::take(&mut self.moved);
        moved.sort_unstable();
        moved.dedup();
        for &entity in &moved {
            self.refresh_membership(entity);
        }
        moved.clear();
        self.moved = moved;
    }

    /// Collision events queued since the last drain.
    ///
    /// Events accumulate across ticks until drained.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Rejects corrupt records before any of them is applied.
fn check_records(components: &[ComponentData]) -> SimResult<()> {
    for data in components {
        if let ComponentData::Transform(transform) = data {
            transform.check_hitbox_ids()?;
        }
    }
    Ok(())
}

fn upsert<C: NetworkComponent>(
    store: &mut ComponentStore<C>,
    entity: EntityId,
    data: &C::Data,
) -> SimResult<()> {
    match store.get_mut(entity) {
        Some(component) => component.apply_update(data),
        None => store.add(entity, C::from_initial(data))?,
    }
    Ok(())
}

fn notify<C: CollisionObserver>(
    store: &mut ComponentStore<C>,
    entity: EntityId,
    colliding_entity: EntityId,
    pushed: &Hitbox,
    pushing: &Hitbox,
) {
    if let Some(observer) = store.get_mut(entity) {
        observer.on_collision(entity, colliding_entity, pushed, pushing);
    }
}

fn collect_pairs(cache: &CollisionPairCache) -> Vec<(EntityId, EntityId, PairCollision)> {
    cache
        .collisions()
        .map(|(min, max, collision)| (min, max, collision.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hitbox::HitboxData;
    use thicket_shared::Tile;

    fn world() -> World {
        World::new(SimulationConfig::default(), TileMap::new(64, 64, Tile::default())).unwrap()
    }

    fn body(x: f32, y: f32, radius: f32) -> Vec<ComponentData> {
        vec![
            ComponentData::Transform(TransformData {
                position: Point::new(x, y),
                rotation: 0.0,
                hitboxes: vec![HitboxData::circle(1, Point::ZERO, radius)],
            }),
            ComponentData::Physics(PhysicsData::default()),
        ]
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimulationConfig {
            tick_rate: 0,
            ..SimulationConfig::default()
        };
        let result = World::new(config, TileMap::new(4, 4, Tile::default()));
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_add_registers_chunks() {
        let mut world = world();
        let entity = EntityId::new(1);
        world.add_entity(entity, &body(100.0, 100.0, 10.0)).unwrap();

        let transform = world.transform(entity).unwrap();
        assert_eq!(transform.chunks().len(), 1);
        let chunk = world.chunks().chunk(transform.chunks()[0]).unwrap();
        assert_eq!(chunk.physics_entities(), &[entity]);
    }

    #[test]
    fn test_duplicate_component_is_error() {
        let mut world = world();
        let entity = EntityId::new(1);
        world.add_entity(entity, &body(100.0, 100.0, 10.0)).unwrap();

        let err = world
            .add_entity(entity, &[ComponentData::Decoration, ComponentData::Decoration])
            .unwrap_err();
        assert!(matches!(err, SimError::Ecs(_)));
    }

    #[test]
    fn test_repeated_hitbox_id_is_fatal() {
        let mut world = world();
        let entity = EntityId::new(7);
        let transform = |hitboxes| {
            ComponentData::Transform(TransformData {
                position: Point::new(500.0, 500.0),
                rotation: 0.0,
                hitboxes,
            })
        };
        let clashing = vec![
            HitboxData::circle(1, Point::ZERO, 10.0),
            HitboxData::circle(1, Point::new(40.0, 0.0), 5.0),
        ];

        let err = world
            .add_entity(entity, &[transform(clashing.clone()), ComponentData::Physics(PhysicsData::default())])
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicateHitbox { local_id: 1 }));
        assert!(!world.contains(entity));

        world
            .add_entity(entity, &[transform(vec![HitboxData::circle(1, Point::ZERO, 10.0)])])
            .unwrap();
        let err = world.update_entity(entity, &[transform(clashing)]).unwrap_err();
        assert!(matches!(err, SimError::DuplicateHitbox { local_id: 1 }));

        let kept = world.transform(entity).unwrap();
        assert_eq!(kept.hitboxes().len(), 1);
        assert_eq!(kept.bounds().max_x, 510.0);
    }

    #[test]
    fn test_update_gains_and_loses_physics() {
        let mut world = world();
        let entity = EntityId::new(5);
        world
            .add_entity(
                entity,
                &[ComponentData::Transform(TransformData {
                    position: Point::new(100.0, 100.0),
                    rotation: 0.0,
                    hitboxes: vec![HitboxData::circle(1, Point::ZERO, 10.0)],
                })],
            )
            .unwrap();
        let coord = world.transform(entity).unwrap().chunks()[0];
        assert!(world.chunks().chunk(coord).unwrap().physics_entities().is_empty());

        world
            .update_entity(entity, &[ComponentData::Physics(PhysicsData::default())])
            .unwrap();
        assert_eq!(world.chunks().chunk(coord).unwrap().physics_entities(), &[entity]);

        world.remove_component(entity, ComponentKind::Physics).unwrap();
        assert!(world.chunks().chunk(coord).unwrap().physics_entities().is_empty());
        assert_eq!(world.chunks().chunk(coord).unwrap().entities(), &[entity]);
    }

    #[test]
    fn test_remove_entity_clears_everything() {
        let mut world = world();
        let entity = EntityId::new(2);
        world.add_entity(entity, &body(100.0, 100.0, 10.0)).unwrap();
        world.remove_entity(entity).unwrap();

        assert!(!world.contains(entity));
        assert!(world.chunks().chunks().iter().all(|c| c.entities().is_empty()));
        assert!(matches!(
            world.remove_entity(entity),
            Err(SimError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_tick_counts() {
        let mut world = world();
        world.add_entity(EntityId::new(1), &body(100.0, 100.0, 10.0)).unwrap();
        world.add_entity(EntityId::new(2), &body(110.0, 100.0, 10.0)).unwrap();

        let stats = world.tick().unwrap();
        assert_eq!(stats.tick, 0);
        assert_eq!(stats.integrated, 2);
        assert_eq!(stats.colliding_pairs, 1);
        assert_eq!(stats.collision_events, 2);
        assert_eq!(world.tick_count(), 1);
        assert_eq!(world.drain_collision_events().len(), 2);
        assert!(world.drain_collision_events().is_empty());
    }
}
