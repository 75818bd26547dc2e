//! # Component System
//!
//! Components are plain data attached to at most one entity each. What a
//! component *does* on a given simulation step is declared through the
//! capability traits below; a store only dispatches the hooks its component
//! type actually implements.

use std::fmt;

use super::EntityId;

/// The fixed set of component kinds the simulation knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentKind {
    /// Position, rotation and hitboxes.
    Transform = 0,
    /// Velocity and acceleration.
    Physics = 1,
    /// Timed status effects.
    StatusEffects = 2,
    /// Marks purely decorative entities (grass, debris).
    Decoration = 3,
}

impl ComponentKind {
    /// All kinds, in id order.
    pub const ALL: [Self; 4] = [
        Self::Transform,
        Self::Physics,
        Self::StatusEffects,
        Self::Decoration,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Physics => "physics",
            Self::StatusEffects => "status effects",
            Self::Decoration => "decoration",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker trait for components.
pub trait Component: 'static {
    /// Which kind of component this is.
    const KIND: ComponentKind;
}

/// Per-step context handed to component hooks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Index of the tick being simulated.
    pub tick: u64,
    /// Seconds per tick.
    pub dt: f32,
}

/// Components that run logic at the start of every tick, before physics.
pub trait Tickable: Component {
    /// Called once per tick for every entity owning the component.
    fn on_tick(&mut self, entity: EntityId, ctx: &TickContext);
}

/// Components that refresh derived state at the end of every tick, after
/// collisions have been resolved.
pub trait Updatable: Component {
    /// Called once per tick for every entity owning the component.
    fn on_update(&mut self, entity: EntityId, ctx: &TickContext);
}

/// Components whose state is driven by the network layer.
///
/// The core does not care how bytes become `Data`; it only requires that
/// applying the same data is deterministic.
pub trait NetworkComponent: Component + Sized {
    /// The decoded component record.
    type Data;

    /// Builds the component from the first record received for an entity.
    fn from_initial(data: &Self::Data) -> Self;

    /// Advances the component to a later record.
    fn apply_update(&mut self, data: &Self::Data);
}
