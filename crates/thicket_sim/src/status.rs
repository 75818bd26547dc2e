//! # Status Effects
//!
//! Timed effects an entity picks up from what it touches. The component is
//! tickable (durations count down), updatable (the speed multiplier is
//! recomputed) and a collision observer (contact with cactus or ice spikes
//! inflicts an effect).
//!
//! Re-inflicting an active effect refreshes its duration rather than
//! stacking a second copy.

use thicket_core::{
    Component, ComponentKind, EntityId, NetworkComponent, TickContext, Tickable, Updatable,
};

use crate::collision::CollisionObserver;
use crate::hitbox::{collision_bit, Hitbox};

/// Kind of status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusEffectKind {
    /// Bleeding from cactus spines.
    Bleeding,
    /// Frozen by ice spikes.
    Freezing,
    /// On fire.
    Burning,
}

impl StatusEffectKind {
    /// Move speed multiplier while the effect is active.
    #[inline]
    #[must_use]
    pub const fn move_speed_multiplier(self) -> f32 {
        match self {
            Self::Bleeding | Self::Burning => 1.0,
            Self::Freezing => 0.5,
        }
    }
}

/// Ticks of bleeding inflicted by a cactus.
pub const CACTUS_BLEED_TICKS: u32 = 60;
/// Ticks of freezing inflicted by ice spikes.
pub const ICE_SPIKES_FREEZE_TICKS: u32 = 120;

/// One active effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusEffect {
    /// Kind.
    pub kind: StatusEffectKind,
    /// Ticks left before it wears off.
    pub ticks_remaining: u32,
}

/// Network payload for status effects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusEffectData {
    /// Full list of active effects.
    pub effects: Vec<StatusEffect>,
}

/// Active status effects of an entity.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffectComponent {
    effects: Vec<StatusEffect>,
    move_speed_multiplier: f32,
}

impl Default for StatusEffectComponent {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            move_speed_multiplier: 1.0,
        }
    }
}

impl Component for StatusEffectComponent {
    const KIND: ComponentKind = ComponentKind::StatusEffects;
}

impl StatusEffectComponent {
    /// No active effects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active effects.
    #[inline]
    #[must_use]
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// True if the effect is active.
    #[must_use]
    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Ticks left on an effect.
    #[must_use]
    pub fn ticks_remaining(&self, kind: StatusEffectKind) -> Option<u32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.ticks_remaining)
    }

    /// Speed multiplier as of the last update.
    #[inline]
    #[must_use]
    pub const fn move_speed_multiplier(&self) -> f32 {
        self.move_speed_multiplier
    }

    /// Inflicts an effect, extending an active one to at least `ticks`.
    pub fn apply(&mut self, kind: StatusEffectKind, ticks: u32) {
        match self.effects.iter_mut().find(|e| e.kind == kind) {
            Some(effect) => effect.ticks_remaining = effect.ticks_remaining.max(ticks),
            None => self.effects.push(StatusEffect {
                kind,
                ticks_remaining: ticks,
            }),
        }
    }

    /// Removes an effect.
    pub fn clear(&mut self, kind: StatusEffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    fn recompute_multiplier(&mut self) {
        self.move_speed_multiplier = self
            .effects
            .iter()
            .map(|e| e.kind.move_speed_multiplier())
            .product();
    }
}

impl Tickable for StatusEffectComponent {
    fn on_tick(&mut self, _entity: EntityId, _ctx: &TickContext) {
        for effect in &mut self.effects {
            effect.ticks_remaining = effect.ticks_remaining.saturating_sub(1);
        }
        self.effects.retain(|e| e.ticks_remaining > 0);
    }
}

impl Updatable for StatusEffectComponent {
    fn on_update(&mut self, _entity: EntityId, _ctx: &TickContext) {
        self.recompute_multiplier();
    }
}

impl CollisionObserver for StatusEffectComponent {
    fn on_collision(
        &mut self,
        entity: EntityId,
        colliding_entity: EntityId,
        _pushed: &Hitbox,
        pushing: &Hitbox,
    ) {
        let bit = pushing.collision_bit();
        if bit & collision_bit::CACTUS != 0 {
            tracing::trace!(%entity, %colliding_entity, "Cactus contact, bleeding");
            self.apply(StatusEffectKind::Bleeding, CACTUS_BLEED_TICKS);
        }
        if bit & collision_bit::ICE_SPIKES != 0 {
            tracing::trace!(%entity, %colliding_entity, "Ice spikes contact, freezing");
            self.apply(StatusEffectKind::Freezing, ICE_SPIKES_FREEZE_TICKS);
        }
    }
}

impl NetworkComponent for StatusEffectComponent {
    type Data = StatusEffectData;

    fn from_initial(data: &StatusEffectData) -> Self {
        let mut component = Self {
            effects: data.effects.clone(),
            move_speed_multiplier: 1.0,
        };
        component.recompute_multiplier();
        component
    }

    fn apply_update(&mut self, data: &StatusEffectData) {
        self.effects.clone_from(&data.effects);
        self.recompute_multiplier();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hitbox::HitboxData;
    use thicket_shared::Point;

    fn ctx() -> TickContext {
        TickContext { tick: 0, dt: 1.0 / 60.0 }
    }

    #[test]
    fn test_effects_expire() {
        let mut status = StatusEffectComponent::new();
        status.apply(StatusEffectKind::Burning, 2);

        status.on_tick(EntityId::new(1), &ctx());
        assert_eq!(status.ticks_remaining(StatusEffectKind::Burning), Some(1));
        status.on_tick(EntityId::new(1), &ctx());
        assert!(!status.has(StatusEffectKind::Burning));
    }

    #[test]
    fn test_reapply_refreshes() {
        let mut status = StatusEffectComponent::new();
        status.apply(StatusEffectKind::Bleeding, 10);
        status.apply(StatusEffectKind::Bleeding, 30);
        status.apply(StatusEffectKind::Bleeding, 5);

        assert_eq!(status.effects().len(), 1);
        assert_eq!(status.ticks_remaining(StatusEffectKind::Bleeding), Some(30));
    }

    #[test]
    fn test_freezing_slows_after_update() {
        let mut status = StatusEffectComponent::new();
        status.apply(StatusEffectKind::Freezing, 10);
        assert_eq!(status.move_speed_multiplier(), 1.0);

        status.on_update(EntityId::new(1), &ctx());
        assert_eq!(status.move_speed_multiplier(), 0.5);

        status.clear(StatusEffectKind::Freezing);
        status.on_update(EntityId::new(1), &ctx());
        assert_eq!(status.move_speed_multiplier(), 1.0);
    }

    #[test]
    fn test_cactus_contact_bleeds() {
        let player = Hitbox::new(HitboxData::circle(1, Point::ZERO, 10.0), Point::ZERO, 0.0);
        let cactus = Hitbox::new(
            HitboxData::circle(1, Point::ZERO, 10.0)
                .with_layers(collision_bit::CACTUS, collision_bit::ALL),
            Point::new(5.0, 0.0),
            0.0,
        );

        let mut status = StatusEffectComponent::new();
        status.on_collision(EntityId::new(1), EntityId::new(2), &player, &player);
        assert!(status.effects().is_empty());

        status.on_collision(EntityId::new(1), EntityId::new(2), &player, &cactus);
        assert_eq!(
            status.ticks_remaining(StatusEffectKind::Bleeding),
            Some(CACTUS_BLEED_TICKS)
        );
        assert!(!status.has(StatusEffectKind::Freezing));
    }
}
