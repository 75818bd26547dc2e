//! # Transform Component
//!
//! Position, rotation and the hitbox list of an entity, plus everything
//! derived from them: per-hitbox world geometry, the combined bounds and the
//! total hitbox mass.
//!
//! Every mutator refreshes the derived state before returning, so code that
//! reads a transform never sees geometry from a previous position.
//!
//! ## Hitbox synchronization
//!
//! The server sends the full hitbox list on every update. Hitboxes are keyed
//! by local id:
//!
//! ```text
//! in list, known      -> update in place
//! in list, unknown    -> add
//! known, not in list  -> remove
//! ```
//!
//! A targeted [`TransformComponent::update_hitbox`] naming an unknown id is a
//! desync; it is logged and the hitbox is added instead. A list naming the
//! same local id twice is corrupt and is rejected whole.

use thicket_core::{Component, ComponentKind, NetworkComponent};
use thicket_shared::Point;

use crate::chunks::ChunkCoord;
use crate::error::{SimError, SimResult};
use crate::hitbox::{Bounds, Hitbox, HitboxData};

/// Network payload for a transform.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformData {
    /// World position.
    pub position: Point,
    /// Clockwise rotation in radians.
    pub rotation: f32,
    /// Full hitbox list.
    pub hitboxes: Vec<HitboxData>,
}

impl TransformData {
    /// Fails on the first hitbox local id that appears more than once.
    pub fn check_hitbox_ids(&self) -> SimResult<()> {
        check_unique_ids(&self.hitboxes)
    }
}

fn check_unique_ids(hitboxes: &[HitboxData]) -> SimResult<()> {
    for (i, data) in hitboxes.iter().enumerate() {
        if hitboxes[..i].iter().any(|d| d.local_id == data.local_id) {
            return Err(SimError::DuplicateHitbox {
                local_id: data.local_id,
            });
        }
    }
    Ok(())
}

/// Result of a targeted hitbox update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitboxUpdate {
    /// The hitbox existed and was updated.
    Updated,
    /// The id was unknown; the hitbox was added instead.
    Recovered,
}

/// Spatial state of an entity.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformComponent {
    position: Point,
    rotation: f32,
    hitboxes: Vec<Hitbox>,
    bounds: Bounds,
    total_mass: f32,
    /// Chunks the entity is registered in, owned by the chunk grid.
    chunks: Vec<ChunkCoord>,
}

impl Component for TransformComponent {
    const KIND: ComponentKind = ComponentKind::Transform;
}

impl TransformComponent {
    /// Creates a transform without hitboxes.
    #[must_use]
    pub fn new(position: Point, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            hitboxes: Vec::new(),
            bounds: Bounds::point(position),
            total_mass: 0.0,
            chunks: Vec::new(),
        }
    }

    /// World position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Clockwise rotation in radians.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Hitboxes with current world geometry.
    #[inline]
    #[must_use]
    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    /// Hitbox by local id.
    #[must_use]
    pub fn hitbox(&self, local_id: u32) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.local_id() == local_id)
    }

    /// Union of all hitbox bounds. Degenerate at the position when the
    /// entity has no hitboxes.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Sum of hitbox masses.
    #[inline]
    #[must_use]
    pub const fn total_mass(&self) -> f32 {
        self.total_mass
    }

    /// Chunks the entity is currently registered in.
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &[ChunkCoord] {
        &self.chunks
    }

    fn index_of(&self, local_id: u32) -> Option<usize> {
        self.hitboxes.iter().position(|h| h.local_id() == local_id)
    }

    pub(crate) fn set_chunks(&mut self, chunks: Vec<ChunkCoord>) {
        self.chunks = chunks;
    }

    pub(crate) fn take_chunks(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.chunks)
    }

    /// Moves the entity.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.refresh();
    }

    /// Turns the entity.
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.refresh();
    }

    /// Moves the entity by `delta`.
    pub fn translate(&mut self, delta: Point) {
        self.set_position(self.position + delta);
    }

    /// Adds a hitbox. Local ids must be unique within the entity.
    pub fn add_hitbox(&mut self, data: HitboxData) -> SimResult<()> {
        if self.hitbox(data.local_id).is_some() {
            return Err(SimError::DuplicateHitbox {
                local_id: data.local_id,
            });
        }
        self.hitboxes.push(Hitbox::new(data, self.position, self.rotation));
        self.refresh_totals();
        Ok(())
    }

    /// Updates the hitbox with the same local id, adding it if unknown.
    pub fn update_hitbox(&mut self, data: HitboxData) -> HitboxUpdate {
        let (position, rotation) = (self.position, self.rotation);
        let outcome = if let Some(index) = self.index_of(data.local_id) {
            self.hitboxes[index].set_data(data, position, rotation);
            HitboxUpdate::Updated
        } else {
            tracing::debug!(
                local_id = data.local_id,
                "Hitbox update for unknown local id, adding it"
            );
            self.hitboxes.push(Hitbox::new(data, position, rotation));
            HitboxUpdate::Recovered
        };
        self.refresh_totals();
        outcome
    }

    /// Removes a hitbox by local id.
    pub fn remove_hitbox(&mut self, local_id: u32) -> Option<Hitbox> {
        let index = self.index_of(local_id)?;
        let removed = self.hitboxes.remove(index);
        self.refresh_totals();
        Some(removed)
    }

    /// Reconciles the hitbox list with the full authoritative one.
    ///
    /// Leaves the transform untouched if `incoming` repeats a local id.
    pub fn sync_hitboxes(&mut self, incoming: &[HitboxData]) -> SimResult<()> {
        check_unique_ids(incoming)?;
        self.hitboxes
            .retain(|h| incoming.iter().any(|d| d.local_id == h.local_id()));

        let (position, rotation) = (self.position, self.rotation);
        for data in incoming {
            match self.index_of(data.local_id) {
                Some(index) => self.hitboxes[index].set_data(*data, position, rotation),
                None => self.hitboxes.push(Hitbox::new(*data, position, rotation)),
            }
        }
        self.refresh_totals();
        Ok(())
    }

    /// Recomputes every hitbox's world geometry and the totals.
    pub fn refresh(&mut self) {
        for hitbox in &mut self.hitboxes {
            hitbox.update_world(self.position, self.rotation);
        }
        self.refresh_totals();
    }

    fn refresh_totals(&mut self) {
        let mut hitboxes = self.hitboxes.iter();
        self.bounds = match hitboxes.next() {
            Some(first) => hitboxes.fold(first.bounds(), |acc, h| acc.union(h.bounds())),
            None => Bounds::point(self.position),
        };
        self.total_mass = self.hitboxes.iter().map(Hitbox::mass).sum();
    }
}

/// Records are expected to pass [`TransformData::check_hitbox_ids`], which
/// the world does before applying them. A record that fails it keeps the
/// previous hitbox list and is logged.
impl NetworkComponent for TransformComponent {
    type Data = TransformData;

    fn from_initial(data: &TransformData) -> Self {
        let mut transform = Self::new(data.position, data.rotation);
        transform.apply_hitboxes(&data.hitboxes);
        transform
    }

    fn apply_update(&mut self, data: &TransformData) {
        self.position = data.position;
        self.rotation = data.rotation;
        self.refresh();
        self.apply_hitboxes(&data.hitboxes);
    }
}

impl TransformComponent {
    fn apply_hitboxes(&mut self, incoming: &[HitboxData]) {
        if let Err(err) = self.sync_hitboxes(incoming) {
            tracing::error!(%err, "Rejected hitbox list from the network");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(local_id: u32, x: f32, radius: f32) -> HitboxData {
        HitboxData::circle(local_id, Point::new(x, 0.0), radius)
    }

    #[test]
    fn test_geometry_follows_position() {
        let mut transform = TransformComponent::new(Point::new(10.0, 10.0), 0.0);
        transform.add_hitbox(circle(1, 0.0, 5.0)).unwrap();
        transform.add_hitbox(circle(2, 20.0, 5.0)).unwrap();

        assert_eq!(transform.bounds().min_x, 5.0);
        assert_eq!(transform.bounds().max_x, 35.0);

        transform.translate(Point::new(100.0, 0.0));
        assert_eq!(transform.hitboxes()[0].position(), Point::new(110.0, 10.0));
        assert_eq!(transform.bounds().max_x, 135.0);
    }

    #[test]
    fn test_duplicate_hitbox_rejected() {
        let mut transform = TransformComponent::new(Point::ZERO, 0.0);
        transform.add_hitbox(circle(1, 0.0, 5.0)).unwrap();

        let err = transform.add_hitbox(circle(1, 3.0, 2.0)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateHitbox { local_id: 1 }));
        assert_eq!(transform.hitboxes().len(), 1);
    }

    #[test]
    fn test_update_unknown_hitbox_recovers() {
        let mut transform = TransformComponent::new(Point::ZERO, 0.0);
        transform.add_hitbox(circle(1, 0.0, 5.0)).unwrap();

        assert_eq!(
            transform.update_hitbox(circle(1, 0.0, 8.0)),
            HitboxUpdate::Updated
        );
        assert_eq!(
            transform.update_hitbox(circle(7, 0.0, 2.0)),
            HitboxUpdate::Recovered
        );
        assert_eq!(transform.hitboxes().len(), 2);
        assert_eq!(transform.bounds().max_x, 8.0);
    }

    #[test]
    fn test_sync_adds_updates_and_removes() {
        let mut transform = TransformComponent::from_initial(&TransformData {
            position: Point::ZERO,
            rotation: 0.0,
            hitboxes: vec![circle(1, 0.0, 5.0), circle(2, 10.0, 5.0)],
        });
        assert_eq!(transform.total_mass(), 2.0);

        transform.apply_update(&TransformData {
            position: Point::new(1.0, 0.0),
            rotation: 0.0,
            hitboxes: vec![circle(2, 10.0, 1.0).with_mass(3.0), circle(3, -4.0, 1.0)],
        });

        let ids: Vec<u32> = transform.hitboxes().iter().map(Hitbox::local_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(transform.total_mass(), 4.0);
        assert_eq!(transform.hitbox(2).unwrap().position(), Point::new(11.0, 0.0));
    }

    #[test]
    fn test_sync_rejects_repeated_local_id() {
        let mut transform = TransformComponent::new(Point::ZERO, 0.0);
        transform.sync_hitboxes(&[circle(1, 0.0, 5.0)]).unwrap();

        let err = transform
            .sync_hitboxes(&[circle(2, 0.0, 5.0), circle(2, 40.0, 5.0)])
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicateHitbox { local_id: 2 }));

        // The previous list survives intact
        let ids: Vec<u32> = transform.hitboxes().iter().map(Hitbox::local_id).collect();
        assert_eq!(ids, vec![1]);

        let data = TransformData {
            position: Point::ZERO,
            rotation: 0.0,
            hitboxes: vec![circle(4, 0.0, 1.0), circle(5, 0.0, 1.0), circle(4, 9.0, 1.0)],
        };
        assert!(matches!(
            data.check_hitbox_ids(),
            Err(SimError::DuplicateHitbox { local_id: 4 })
        ));
    }

    #[test]
    fn test_no_hitboxes_degenerate_bounds() {
        let mut transform = TransformComponent::new(Point::new(3.0, 4.0), 0.0);
        transform.add_hitbox(circle(1, 0.0, 5.0)).unwrap();
        transform.remove_hitbox(1).unwrap();

        assert_eq!(transform.bounds(), Bounds::point(Point::new(3.0, 4.0)));
        assert_eq!(transform.total_mass(), 0.0);
        assert!(transform.remove_hitbox(1).is_none());
    }
}
