//! # Hitboxes
//!
//! A hitbox is one collision shape attached to an entity's transform. The
//! authoritative part ([`HitboxData`]) arrives from the server; the derived
//! part (world position, world rotation, bounds) is recomputed by the owning
//! transform whenever the entity moves or turns.
//!
//! ```text
//! entity position ──┐
//! entity rotation ──┼──> offset.rotated(rotation) ──> world position
//! local offset ─────┘                                  world bounds
//! ```

use thicket_shared::Point;

// ============================================================================
// COLLISION BITS
// ============================================================================

/// Collision layer bits.
///
/// Two hitboxes interact only if each one's mask contains the other's bit.
pub mod collision_bit {
    /// Everything that is not special-cased.
    pub const DEFAULT: u16 = 1 << 0;
    /// Cactus spines, inflicts bleeding on contact.
    pub const CACTUS: u16 = 1 << 1;
    /// Plants that entities walk through.
    pub const PLANTS: u16 = 1 << 2;
    /// Ice spikes, inflicts freezing on contact.
    pub const ICE_SPIKES: u16 = 1 << 3;
    /// Planter boxes.
    pub const PLANTER_BOX: u16 = 1 << 4;
    /// Mask accepting every layer.
    pub const ALL: u16 = u16::MAX;
}

// ============================================================================
// SHAPES
// ============================================================================

/// How a hitbox resolves overlap with the hitboxes that push it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HitboxCollisionType {
    /// Rigid obstacle: penetration is removed immediately.
    Hard,
    /// Gradual repulsion proportional to penetration.
    #[default]
    Soft,
}

/// Geometric shape of a hitbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitboxShape {
    /// Circle around the hitbox position.
    Circle {
        /// Radius in world units.
        radius: f32,
    },
    /// Rectangle centered on the hitbox position.
    Rectangle {
        /// Width along the local X axis.
        width: f32,
        /// Height along the local Y axis.
        height: f32,
        /// Rotation relative to the entity, clockwise radians.
        rotation: f32,
    },
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub min_y: f32,
    /// Top edge.
    pub max_y: f32,
}

impl Bounds {
    /// Degenerate box covering a single point.
    #[inline]
    #[must_use]
    pub const fn point(point: Point) -> Self {
        Self {
            min_x: point.x,
            max_x: point.x,
            min_y: point.y,
            max_y: point.y,
        }
    }

    /// True if the two boxes overlap. Touching edges count.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Smallest box containing both.
    #[inline]
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

// ============================================================================
// HITBOX
// ============================================================================

/// Authoritative description of a hitbox, as sent by the server.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitboxData {
    /// Id unique within the owning entity.
    pub local_id: u32,
    /// Offset from the entity position, before entity rotation.
    pub offset: Point,
    /// Shape.
    pub shape: HitboxShape,
    /// Mass used by soft collisions.
    pub mass: f32,
    /// Layer bit.
    pub collision_bit: u16,
    /// Layers this hitbox interacts with.
    pub collision_mask: u16,
    /// Response applied to whatever this hitbox pushes.
    pub collision_type: HitboxCollisionType,
}

impl HitboxData {
    /// Circle with unit mass on the default layer.
    #[must_use]
    pub fn circle(local_id: u32, offset: Point, radius: f32) -> Self {
        Self::with_shape(local_id, offset, HitboxShape::Circle { radius })
    }

    /// Rectangle with unit mass on the default layer.
    #[must_use]
    pub fn rectangle(local_id: u32, offset: Point, width: f32, height: f32, rotation: f32) -> Self {
        Self::with_shape(
            local_id,
            offset,
            HitboxShape::Rectangle {
                width,
                height,
                rotation,
            },
        )
    }

    fn with_shape(local_id: u32, offset: Point, shape: HitboxShape) -> Self {
        Self {
            local_id,
            offset,
            shape,
            mass: 1.0,
            collision_bit: collision_bit::DEFAULT,
            collision_mask: collision_bit::ALL,
            collision_type: HitboxCollisionType::Soft,
        }
    }

    /// Sets the mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Sets the collision type.
    #[must_use]
    pub fn with_collision_type(mut self, collision_type: HitboxCollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    /// Sets the layer bit and mask.
    #[must_use]
    pub fn with_layers(mut self, collision_bit: u16, collision_mask: u16) -> Self {
        self.collision_bit = collision_bit;
        self.collision_mask = collision_mask;
        self
    }
}

/// A hitbox with its derived world-space geometry.
///
/// Only the owning transform can move a hitbox, so the derived fields are
/// never stale when observed through a shared reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    data: HitboxData,
    position: Point,
    rotation: f32,
    bounds: Bounds,
}

impl Hitbox {
    /// Creates a hitbox placed relative to an entity.
    #[must_use]
    pub fn new(data: HitboxData, entity_position: Point, entity_rotation: f32) -> Self {
        let mut hitbox = Self {
            data,
            position: entity_position,
            rotation: 0.0,
            bounds: Bounds::point(entity_position),
        };
        hitbox.update_world(entity_position, entity_rotation);
        hitbox
    }

    /// Authoritative data.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> &HitboxData {
        &self.data
    }

    /// Local id.
    #[inline]
    #[must_use]
    pub const fn local_id(&self) -> u32 {
        self.data.local_id
    }

    /// Shape.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> HitboxShape {
        self.data.shape
    }

    /// Mass.
    #[inline]
    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.data.mass
    }

    /// Layer bit.
    #[inline]
    #[must_use]
    pub const fn collision_bit(&self) -> u16 {
        self.data.collision_bit
    }

    /// Collision type.
    #[inline]
    #[must_use]
    pub const fn collision_type(&self) -> HitboxCollisionType {
        self.data.collision_type
    }

    /// World position of the hitbox center.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// World rotation (entity rotation plus the rectangle's own rotation).
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// World bounding box.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// True if the layer filter lets the two hitboxes interact.
    #[inline]
    #[must_use]
    pub const fn can_collide_with(&self, other: &Self) -> bool {
        (self.data.collision_mask & other.data.collision_bit) != 0
            && (other.data.collision_mask & self.data.collision_bit) != 0
    }

    /// Replaces the authoritative data, keeping the world placement.
    pub(crate) fn set_data(&mut self, data: HitboxData, entity_position: Point, entity_rotation: f32) {
        self.data = data;
        self.update_world(entity_position, entity_rotation);
    }

    /// Recomputes world position, rotation and bounds.
    pub(crate) fn update_world(&mut self, entity_position: Point, entity_rotation: f32) {
        self.position = entity_position + self.data.offset.rotated(entity_rotation);

        match self.data.shape {
            HitboxShape::Circle { radius } => {
                self.rotation = entity_rotation;
                self.bounds = Bounds {
                    min_x: self.position.x - radius,
                    max_x: self.position.x + radius,
                    min_y: self.position.y - radius,
                    max_y: self.position.y + radius,
                };
            }
            HitboxShape::Rectangle {
                width,
                height,
                rotation,
            } => {
                self.rotation = entity_rotation + rotation;
                let half_width = width * 0.5;
                let half_height = height * 0.5;
                let corners = [
                    Point::new(-half_width, -half_height),
                    Point::new(half_width, -half_height),
                    Point::new(half_width, half_height),
                    Point::new(-half_width, half_height),
                ];
                let mut bounds = Bounds::point(self.position + corners[0].rotated(self.rotation));
                for corner in &corners[1..] {
                    bounds = bounds.union(Bounds::point(self.position + corner.rotated(self.rotation)));
                }
                self.bounds = bounds;
            }
        }
    }
}
