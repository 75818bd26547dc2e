//! # Simulation Error Types
//!
//! Every variant here is fatal for the session: continuing would corrupt the
//! spatial index or the collision state shared by every other entity.
//! Recoverable network desyncs never surface as errors, they are logged and
//! corrected in place.

use thicket_core::{EcsError, EntityId};
use thicket_shared::ConfigError;
use thiserror::Error;

/// Errors raised by the simulation.
#[derive(Error, Debug)]
pub enum SimError {
    /// A component lifecycle transition the entity cannot make.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The simulation was created with an unusable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A hitbox was added under a local id that is already in use.
    #[error("hitbox local id {local_id} is already in use")]
    DuplicateHitbox {
        /// The clashing local id.
        local_id: u32,
    },

    /// Integration produced a NaN or infinite position.
    #[error("entity {entity} has non-finite position ({x}, {y}) after integration")]
    NonFinitePosition {
        /// The entity.
        entity: EntityId,
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// The entity owns no components at all.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
