//! # Component Store
//!
//! Dense storage for a single component kind.
//!
//! ```text
//! components:       [C(e4), C(e1), C(e9)]     <- packed, no gaps
//! index_to_entity:  [  e4 ,   e1 ,   e9 ]
//! entity_to_index:  { e1: 1, e4: 0, e9: 2 }
//! ```
//!
//! Removing `e4` moves `C(e9)` into slot 0 and repairs both maps:
//!
//! ```text
//! components:       [C(e9), C(e1)]
//! index_to_entity:  [  e9 ,   e1 ]
//! entity_to_index:  { e1: 1, e9: 0 }
//! ```
//!
//! Every operation is O(1). Order is insertion order until the first
//! removal and arbitrary afterwards.

use std::collections::HashMap;

use super::component::{Component, TickContext, Tickable, Updatable};
use super::entity::EntityId;
use crate::error::{EcsError, EcsResult};

/// Hook invoked once per entity on a simulation step.
pub type StoreHook<C> = fn(&mut C, EntityId, &TickContext);

/// The per-tick and per-update hooks a store dispatches.
///
/// Built from the component's capability traits. A missing hook means the
/// component kind is inert for that phase.
pub struct StoreHooks<C> {
    /// Runs at the start of the tick.
    pub on_tick: Option<StoreHook<C>>,
    /// Runs at the end of the tick.
    pub on_update: Option<StoreHook<C>>,
}

impl<C> StoreHooks<C> {
    /// No hooks at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            on_tick: None,
            on_update: None,
        }
    }
}

impl<C: Tickable> StoreHooks<C> {
    /// Dispatches [`Tickable::on_tick`].
    #[must_use]
    pub fn with_tick(mut self) -> Self {
        self.on_tick = Some(<C as Tickable>::on_tick);
        self
    }
}

impl<C: Updatable> StoreHooks<C> {
    /// Dispatches [`Updatable::on_update`].
    #[must_use]
    pub fn with_update(mut self) -> Self {
        self.on_update = Some(<C as Updatable>::on_update);
        self
    }
}

impl<C> Default for StoreHooks<C> {
    fn default() -> Self {
        Self::none()
    }
}

impl<C> Clone for StoreHooks<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for StoreHooks<C> {}

/// Dense storage for one component kind.
///
/// # Type Parameters
///
/// * `C` - The component type to store
pub struct ComponentStore<C: Component> {
    /// Packed component values.
    components: Vec<C>,
    /// Entity id -> slot in `components`.
    entity_to_index: HashMap<EntityId, usize>,
    /// Slot in `components` -> entity id.
    index_to_entity: Vec<EntityId>,
    /// Step hooks.
    hooks: StoreHooks<C>,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty store without hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hooks(StoreHooks::none())
    }

    /// Creates an empty store dispatching the given hooks.
    #[must_use]
    pub fn with_hooks(hooks: StoreHooks<C>) -> Self {
        Self {
            components: Vec::new(),
            entity_to_index: HashMap::new(),
            index_to_entity: Vec::new(),
            hooks,
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if no entity owns this component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Attaches a component to an entity.
    ///
    /// Never overwrites: an entity that already owns the component is a
    /// lifecycle bug in the caller.
    pub fn add(&mut self, entity: EntityId, component: C) -> EcsResult<()> {
        if self.entity_to_index.contains_key(&entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                kind: C::KIND,
            });
        }

        let index = self.components.len();
        self.components.push(component);
        self.index_to_entity.push(entity);
        self.entity_to_index.insert(entity, index);
        Ok(())
    }

    /// Detaches and returns an entity's component.
    ///
    /// The last component is swapped into the freed slot.
    pub fn remove(&mut self, entity: EntityId) -> EcsResult<C> {
        let index = self
            .entity_to_index
            .remove(&entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                kind: C::KIND,
            })?;

        let removed = self.components.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        // Removing the last slot moves nothing
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }

        Ok(removed)
    }

    /// True if the entity owns this component.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: EntityId) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Returns the entity's component, or `None` if it has none.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        let index = *self.entity_to_index.get(&entity)?;
        Some(&self.components[index])
    }

    /// Returns the entity's component mutably, or `None` if it has none.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        let index = *self.entity_to_index.get(&entity)?;
        Some(&mut self.components[index])
    }

    /// Returns the entity's component, treating absence as an error.
    pub fn expect_component(&self, entity: EntityId) -> EcsResult<&C> {
        self.get(entity).ok_or(EcsError::MissingComponent {
            entity,
            kind: C::KIND,
        })
    }

    /// Mutable variant of [`expect_component`](Self::expect_component).
    pub fn expect_component_mut(&mut self, entity: EntityId) -> EcsResult<&mut C> {
        self.get_mut(entity).ok_or(EcsError::MissingComponent {
            entity,
            kind: C::KIND,
        })
    }

    /// Slot of the entity's component in the dense array.
    #[inline]
    #[must_use]
    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    /// The packed components.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.components
    }

    /// Owning entities, parallel to [`as_slice`](Self::as_slice).
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.index_to_entity
    }

    /// Iterates over `(entity, component)` pairs in store order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.index_to_entity.iter().copied().zip(self.components.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in store order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.components.iter_mut())
    }

    /// Removes every component.
    pub fn clear(&mut self) {
        self.components.clear();
        self.index_to_entity.clear();
        self.entity_to_index.clear();
    }

    /// True if the store dispatches a per-tick hook.
    #[inline]
    #[must_use]
    pub fn is_tickable(&self) -> bool {
        self.hooks.on_tick.is_some()
    }

    /// True if the store dispatches a per-update hook.
    #[inline]
    #[must_use]
    pub fn is_updatable(&self) -> bool {
        self.hooks.on_update.is_some()
    }

    /// Invokes the per-tick hook once per stored component.
    pub fn run_tick(&mut self, ctx: &TickContext) {
        if let Some(hook) = self.hooks.on_tick {
            self.dispatch(hook, ctx);
        }
    }

    /// Invokes the per-update hook once per stored component.
    pub fn run_update(&mut self, ctx: &TickContext) {
        if let Some(hook) = self.hooks.on_update {
            self.dispatch(hook, ctx);
        }
    }

    fn dispatch(&mut self, hook: StoreHook<C>, ctx: &TickContext) {
        for (component, &entity) in self.components.iter_mut().zip(&self.index_to_entity) {
            hook(component, entity, ctx);
        }
    }
}

impl<C: Component> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}
