//! # Entity Module
//!
//! The player and enemies as plain structs of capability components.
//!
//! There is no entity hierarchy: health, combat timing, movement,
//! inventory, and effects are independent components, and `Player` and
//! `Enemy` are just the two combinations this game needs. The [`Fighter`]
//! trait is the only polymorphic seam, used by the combat resolver.

pub mod ai;

pub use ai::*;

use crate::{
    config, CombatState, Direction, EffectQueue, Fighter, Graph, HealthState, Inventory,
    MovementState, Position,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Experience progress toward the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub level: u32,
    pub amount: u32,
}

impl Experience {
    /// Starts at level 1 with no experience.
    pub fn new() -> Self {
        Self { level: 1, amount: 0 }
    }

    /// Experience needed to reach the next level.
    pub fn needed(&self) -> u32 {
        10 * self.level
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

/// The player character.
pub struct Player {
    pub health: HealthState,
    pub combat: CombatState,
    pub movement: MovementState,
    pub inventory: Inventory,
    pub effects: EffectQueue,
    pub experience: Experience,
}

impl Player {
    /// Creates a fresh player at the given position, facing North.
    pub fn new(position: Position) -> Self {
        Self {
            health: HealthState::new(config::PLAYER_MAX_HEALTH),
            combat: CombatState::new(config::PLAYER_SPEED),
            movement: MovementState::new(position, Direction::North),
            inventory: Inventory::new(),
            effects: EffectQueue::new(),
            experience: Experience::new(),
        }
    }

    /// Awards experience, resolving any level-ups.
    ///
    /// Each level-up raises max health by 2 and fully heals. Returns the
    /// number of levels gained.
    pub fn give_exp(&mut self, amount: u32) -> u32 {
        self.experience.amount += amount;

        let mut gained = 0;
        while self.experience.amount >= self.experience.needed() {
            self.experience.amount -= self.experience.needed();
            self.experience.level += 1;
            self.health.raise_max(2);
            gained += 1;
        }
        if gained > 0 {
            log::info!("player reached level {}", self.experience.level);
        }
        gained
    }

    /// Applies any pending status effects.
    pub fn update_effects(&mut self) {
        self.effects.update(&mut self.health, &mut self.combat);
    }
}

impl Fighter for Player {
    fn health(&self) -> &HealthState {
        &self.health
    }
    fn health_mut(&mut self) -> &mut HealthState {
        &mut self.health
    }
    fn combat(&self) -> &CombatState {
        &self.combat
    }
    fn combat_mut(&mut self) -> &mut CombatState {
        &mut self.combat
    }
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }
    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

/// An enemy roaming a room.
#[derive(Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub health: HealthState,
    pub combat: CombatState,
    pub movement: MovementState,
    pub inventory: Inventory,
    pub ai: EnemyAi,
}

impl Enemy {
    /// Creates an enemy at a position in its roam graph.
    ///
    /// The RNG becomes the enemy's private behavior stream; its first draw
    /// picks the initial roam destination.
    pub fn new(
        max_health: u32,
        speed: i32,
        position: Position,
        direction: Direction,
        graph: &Graph,
        rng: StdRng,
    ) -> Self {
        Self {
            id: new_entity_id(),
            health: HealthState::new(max_health),
            combat: CombatState::new(speed),
            movement: MovementState::new(position, direction),
            inventory: Inventory::new(),
            ai: EnemyAi::new(rng, graph),
        }
    }

    /// Advances the enemy's behavior by one poll.
    pub fn update_ai(&mut self, graph: &Graph, now: std::time::Instant) {
        self.ai.tick(&mut self.movement, graph, now);
    }
}

impl Fighter for Enemy {
    fn health(&self) -> &HealthState {
        &self.health
    }
    fn health_mut(&mut self) -> &mut HealthState {
        &mut self.health
    }
    fn combat(&self) -> &CombatState {
        &self.combat
    }
    fn combat_mut(&mut self) -> &mut CombatState {
        &mut self.combat
    }
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }
    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}
