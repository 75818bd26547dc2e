//! # Thicket Sim
//!
//! Client-side simulation core: everything that happens to an entity between
//! two network updates.
//!
//! ## Architecture Rules
//!
//! 1. **One owned world** - All state lives in a [`World`] passed by `&mut`
//! 2. **Geometry is never stale** - Moving a transform refreshes its hitboxes
//!    and bounds before anyone can observe them
//! 3. **Detect, then resolve** - Every pair is tested against one snapshot of
//!    positions before any response is applied
//! 4. **Fatal means fatal** - A [`SimError`] ends the session
//!
//! ## Example
//!
//! ```rust,ignore
//! use thicket_sim::{ComponentData, World};
//!
//! let mut world = World::new(config, tiles)?;
//! world.add_entity(id, &[ComponentData::Transform(data)])?;
//! let stats = world.tick()?;
//! for event in world.drain_collision_events() {
//!     audio.play_impact(event.entity);
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chunks;
pub mod clock;
pub mod collision;
pub mod error;
pub mod geometry;
pub mod hitbox;
pub mod physics;
pub mod status;
pub mod transform;
pub mod world;

pub use chunks::{Chunk, ChunkCoord, ChunkGrid, MembershipFlags};
pub use clock::{TickClock, TickTiming};
pub use collision::{
    CollisionEvent, CollisionObserver, CollisionPairCache, PairCollision,
};
pub use error::{SimError, SimResult};
pub use geometry::PushInfo;
pub use hitbox::{collision_bit, Bounds, Hitbox, HitboxCollisionType, HitboxData, HitboxShape};
pub use physics::{PhysicsComponent, PhysicsData};
pub use status::{StatusEffect, StatusEffectComponent, StatusEffectData, StatusEffectKind};
pub use transform::{HitboxUpdate, TransformComponent, TransformData};
pub use world::{ComponentData, Decoration, TickStats, World};
