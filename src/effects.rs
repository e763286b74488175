//! # Status Effects
//!
//! One-shot effects granted by consumable items.
//!
//! Consumables name their effects; the [`EffectBook`] resolves those names
//! into [`Effect`] values which wait in an entity's [`EffectQueue`] until
//! the next tick applies them. The book is a constructed value passed in
//! explicitly, never a process-wide registry.

use crate::{CombatState, HealthState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A one-shot status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Restores the given amount of health.
    Healing { amount: u32 },
    /// Permanently raises base attack speed.
    Haste { bonus: i32 },
}

impl Effect {
    /// Applies the effect to an entity's components.
    pub fn apply(self, health: &mut HealthState, combat: &mut CombatState) {
        match self {
            Effect::Healing { amount } => health.heal(amount),
            Effect::Haste { bonus } => combat.speed += bonus,
        }
    }
}

/// A registry mapping consumable effect names to effects.
#[derive(Debug, Clone, Default)]
pub struct EffectBook {
    effects: HashMap<String, Effect>,
}

impl EffectBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the book of standard effects consumable data files refer to.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::EffectBook;
    ///
    /// let book = EffectBook::standard();
    /// assert!(book.get("healing").is_some());
    /// assert!(book.get("speed").is_some());
    /// ```
    pub fn standard() -> Self {
        let mut book = Self::new();
        book.add("healing", Effect::Healing { amount: 5 });
        book.add("speed", Effect::Haste { bonus: 1 });
        book
    }

    /// Registers an effect under a name.
    pub fn add(&mut self, name: impl Into<String>, effect: Effect) {
        self.effects.insert(name.into(), effect);
    }

    /// Looks up an effect by name.
    pub fn get(&self, name: &str) -> Option<Effect> {
        self.effects.get(name).copied()
    }
}

/// Effects waiting to be applied to an entity.
///
/// Applied effects fade immediately; the queue drains on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectQueue {
    pending: Vec<Effect>,
}

impl EffectQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an effect for the next update.
    pub fn push(&mut self, effect: Effect) {
        self.pending.push(effect);
    }

    /// Applies and drains every pending effect, in queue order.
    pub fn update(&mut self, health: &mut HealthState, combat: &mut CombatState) {
        for effect in self.pending.drain(..) {
            effect.apply(health, combat);
        }
    }

    /// Returns the number of pending effects.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether no effects are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
