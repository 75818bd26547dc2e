//! # Entity Identifiers
//!
//! Ids are assigned by the server and arrive through the network layer. The
//! simulation never invents them, it only uses them as keys.

use std::fmt;

/// Unique identifier for an entity.
///
/// Stable for the entity's lifetime. Ordered, because the collision pair
/// cache keys every unordered pair on `(min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Orders two ids as `(smaller, larger)`.
    #[inline]
    #[must_use]
    pub fn ordered(a: Self, b: Self) -> (Self, Self) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
