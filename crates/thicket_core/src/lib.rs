//! # Thicket Core
//!
//! Dense entity-component storage for the client simulation.
//!
//! ## Architecture Rules
//!
//! 1. **Entities are ids** - An [`EntityId`] carries no data of its own
//! 2. **One store per component kind** - Each [`ComponentKind`] gets its own
//!    typed [`ComponentStore`], packed with no gaps
//! 3. **Capabilities are traits** - Per-tick and per-update behaviour is
//!    declared through [`Tickable`] and [`Updatable`], never probed for
//!
//! ## Example
//!
//! ```rust,ignore
//! use thicket_core::{ComponentStore, EntityId};
//!
//! let mut healths: ComponentStore<Health> = ComponentStore::new();
//! healths.add(EntityId::new(7), Health(100))?;
//! assert!(healths.has(EntityId::new(7)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Component, ComponentKind, ComponentStore, EntityId, NetworkComponent, StoreHooks,
    TickContext, Tickable, Updatable,
};
pub use error::{EcsError, EcsResult};
