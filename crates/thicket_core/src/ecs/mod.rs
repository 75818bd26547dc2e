//! # Entity Component Storage
//!
//! ## Design Philosophy
//!
//! - Components are stored in dense arrays for cache efficiency
//! - Entity ids map to array slots through a hash map, slots map back to ids
//!   through a parallel array
//! - Removal swaps the last component into the hole, so store order is only
//!   insertion order until the first removal

mod component;
mod entity;
mod store;

pub use component::{Component, ComponentKind, NetworkComponent, TickContext, Tickable, Updatable};
pub use entity::EntityId;
pub use store::{ComponentStore, StoreHooks};
