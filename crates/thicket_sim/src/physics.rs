//! # Physics Integrator
//!
//! Advances one entity by one tick:
//!
//! 1. Turn acceleration into self velocity, scaled by ground friction and
//!    move speed; rivers add their own push.
//! 2. Decay both velocities (proportional drag, then constant ground
//!    friction that never reverses direction).
//! 3. Move by the combined velocity.
//! 4. Clamp every hitbox inside the world border.
//! 5. Push out of nearby wall tiles with the hard response.
//!
//! A non-finite position after step 3 aborts the tick.

use thicket_core::{Component, ComponentKind, EntityId, NetworkComponent};
use thicket_shared::{Point, SimulationConfig, TileSource, TileType};

use crate::collision::apply_hard_collision;
use crate::error::{SimError, SimResult};
use crate::geometry::{hitboxes_intersect, push_info};
use crate::hitbox::{Hitbox, HitboxCollisionType, HitboxData};
use crate::transform::TransformComponent;

/// Network payload for a physics component.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsData {
    /// Velocity from the entity's own movement.
    pub self_velocity: Point,
    /// Velocity imparted by collisions and the environment.
    pub external_velocity: Point,
    /// Movement input.
    pub acceleration: Point,
    /// Ignore tile and river speed modifiers.
    pub override_move_speed_multiplier: bool,
}

/// Motion state of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsComponent {
    /// Velocity from the entity's own movement.
    pub self_velocity: Point,
    /// Velocity imparted by collisions and the environment.
    pub external_velocity: Point,
    /// Movement input, applied every tick until changed.
    pub acceleration: Point,
    /// Ignore tile and river speed modifiers.
    pub override_move_speed_multiplier: bool,
}

impl Component for PhysicsComponent {
    const KIND: ComponentKind = ComponentKind::Physics;
}

impl NetworkComponent for PhysicsComponent {
    type Data = PhysicsData;

    fn from_initial(data: &PhysicsData) -> Self {
        Self {
            self_velocity: data.self_velocity,
            external_velocity: data.external_velocity,
            acceleration: data.acceleration,
            override_move_speed_multiplier: data.override_move_speed_multiplier,
        }
    }

    fn apply_update(&mut self, data: &PhysicsData) {
        *self = Self::from_initial(data);
    }
}

impl PhysicsComponent {
    /// Total velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> Point {
        self.self_velocity + self.external_velocity
    }
}

/// Environment the integrator reads.
#[derive(Clone, Copy)]
pub struct PhysicsEnv<'a> {
    /// Simulation tunables.
    pub config: &'a SimulationConfig,
    /// Tile layer.
    pub tiles: &'a dyn TileSource,
}

impl PhysicsEnv<'_> {
    fn tile_coord(&self, value: f32) -> i32 {
        (value / self.config.tile_size).floor() as i32
    }
}

// ============================================================================
// INTEGRATION
// ============================================================================

/// Runs one integration step for an entity.
///
/// `speed_multiplier` comes from status effects (1.0 when unaffected).
/// Returns `true` if the entity moved, so its chunk membership needs a
/// refresh.
pub fn integrate(
    entity: EntityId,
    transform: &mut TransformComponent,
    physics: &mut PhysicsComponent,
    speed_multiplier: f32,
    env: PhysicsEnv<'_>,
) -> SimResult<bool> {
    let dt = env.config.dt();
    let position = transform.position();
    let tile_x = env.tile_coord(position.x);
    let tile_y = env.tile_coord(position.y);
    let tile = env.tiles.tile(tile_x, tile_y);
    let friction = tile.tile_type.friction();

    let river_flow = if tile.tile_type == TileType::Water && !physics.override_move_speed_multiplier {
        env.tiles.river_flow_direction(tile_x, tile_y)
    } else {
        None
    };

    // 1. Acceleration
    if !physics.acceleration.is_zero() {
        let ground_multiplier = if physics.override_move_speed_multiplier {
            1.0
        } else if river_flow.is_some() {
            env.config.river_move_speed_multiplier
        } else {
            tile.tile_type.move_speed_multiplier()
        };
        let scale = friction * ground_multiplier * speed_multiplier * dt;
        physics.self_velocity += physics.acceleration * scale;
    }
    if let Some(direction) = river_flow {
        physics.self_velocity += Point::from_vector_form(env.config.river_push_force * dt, direction);
    }

    // 2. Friction
    apply_friction(&mut physics.self_velocity, friction, dt, env.config.drag_coefficient);
    apply_friction(&mut physics.external_velocity, friction, dt, env.config.drag_coefficient);

    // 3. Motion
    let velocity = physics.velocity();
    let mut moved = false;
    if !velocity.is_zero() {
        transform.translate(velocity * dt);
        moved = true;
    }

    let position = transform.position();
    if !position.is_finite() {
        tracing::error!(
            entity = entity.raw(),
            x = position.x,
            y = position.y,
            "Non-finite position after integration"
        );
        return Err(SimError::NonFinitePosition {
            entity,
            x: position.x,
            y: position.y,
        });
    }

    // 4. World border
    moved |= resolve_border_collisions(transform, physics, env.config.world_units());

    // 5. Walls
    moved |= resolve_wall_collisions(transform, physics, env);

    Ok(moved)
}

/// Proportional drag followed by constant friction.
///
/// The constant term is capped at the current speed so it stops the entity
/// instead of reversing it.
pub fn apply_friction(velocity: &mut Point, friction: f32, dt: f32, drag_coefficient: f32) {
    if velocity.is_zero() {
        return;
    }
    *velocity = *velocity * (1.0 - friction * dt * drag_coefficient).max(0.0);

    let speed = velocity.length();
    if speed > 0.0 {
        let slowdown = friction.min(speed);
        *velocity -= *velocity * (slowdown / speed);
    }
}

// ============================================================================
// WORLD BORDER
// ============================================================================

/// Moves every hitbox back inside `[0, world_units]` and zeroes the velocity
/// along each clamped axis. Returns `true` if anything was corrected.
pub fn resolve_border_collisions(
    transform: &mut TransformComponent,
    physics: &mut PhysicsComponent,
    world_units: f32,
) -> bool {
    let mut corrected = false;
    for index in 0..transform.hitboxes().len() {
        // Earlier corrections moved every hitbox, so read bounds fresh
        let bounds = transform.hitboxes()[index].bounds();
        let mut correction = Point::ZERO;

        if bounds.min_x < 0.0 {
            correction.x = -bounds.min_x;
        } else if bounds.max_x > world_units {
            correction.x = world_units - bounds.max_x;
        }
        if bounds.min_y < 0.0 {
            correction.y = -bounds.min_y;
        } else if bounds.max_y > world_units {
            correction.y = world_units - bounds.max_y;
        }

        if correction.x != 0.0 {
            physics.self_velocity.x = 0.0;
            physics.external_velocity.x = 0.0;
        }
        if correction.y != 0.0 {
            physics.self_velocity.y = 0.0;
            physics.external_velocity.y = 0.0;
        }
        if !correction.is_zero() {
            transform.translate(correction);
            corrected = true;
        }
    }
    corrected
}

// ============================================================================
// WALLS
// ============================================================================

/// Hard hitbox covering one tile.
#[must_use]
pub fn wall_hitbox(tile_x: i32, tile_y: i32, tile_size: f32) -> Hitbox {
    let center = Point::new(
        (tile_x as f32 + 0.5) * tile_size,
        (tile_y as f32 + 0.5) * tile_size,
    );
    let data = HitboxData::rectangle(0, Point::ZERO, tile_size, tile_size, 0.0)
        .with_collision_type(HitboxCollisionType::Hard);
    Hitbox::new(data, center, 0.0)
}

/// Pushes the entity out of every wall tile within the scan padding of its
/// position. Returns `true` if anything was corrected.
pub fn resolve_wall_collisions(
    transform: &mut TransformComponent,
    physics: &mut PhysicsComponent,
    env: PhysicsEnv<'_>,
) -> bool {
    let position = transform.position();
    let padding = env.config.wall_scan_padding;
    let last = env.config.world_size_tiles() as i32 - 1;

    let min_x = env.tile_coord(position.x - padding).clamp(0, last);
    let max_x = env.tile_coord(position.x + padding).clamp(0, last);
    let min_y = env.tile_coord(position.y - padding).clamp(0, last);
    let max_y = env.tile_coord(position.y + padding).clamp(0, last);

    let mut corrected = false;
    for tile_y in min_y..=max_y {
        for tile_x in min_x..=max_x {
            if !env.tiles.tile(tile_x, tile_y).is_wall {
                continue;
            }
            let wall = wall_hitbox(tile_x, tile_y, env.config.tile_size);

            for index in 0..transform.hitboxes().len() {
                let hitbox = transform.hitboxes()[index];
                if !hitboxes_intersect(&hitbox, &wall) {
                    continue;
                }
                apply_hard_collision(transform, physics, push_info(&hitbox, &wall));
                corrected = true;
            }
        }
    }
    corrected
}
