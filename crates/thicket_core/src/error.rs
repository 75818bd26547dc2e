//! # ECS Error Types
//!
//! Both variants are programmer errors: the caller asked for a component
//! lifecycle transition the entity cannot make.

use thiserror::Error;

use crate::ecs::{ComponentKind, EntityId};

/// Errors raised by component stores.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// The entity already owns a component of this kind.
    #[error("entity {entity} already has a {kind} component")]
    DuplicateComponent {
        /// The entity.
        entity: EntityId,
        /// The component kind.
        kind: ComponentKind,
    },

    /// The entity does not own a component of this kind.
    #[error("entity {entity} has no {kind} component")]
    MissingComponent {
        /// The entity.
        entity: EntityId,
        /// The component kind.
        kind: ComponentKind,
    },
}

/// Result type for store operations.
pub type EcsResult<T> = Result<T, EcsError>;
