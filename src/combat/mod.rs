//! # Combat Module
//!
//! Equipment-driven attack, damage, and blocking arithmetic.
//!
//! All time gating is expressed as comparisons against an explicit `now`
//! instant passed in by the caller. Nothing in here sleeps or schedules;
//! the session polls, which also makes every state transition testable
//! with synthetic clocks.

pub mod fight;

pub use fight::*;

use crate::{config, Inventory};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// An entity's health pool.
///
/// Health never drops below zero and never rises above the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    pub health: u32,
    pub max_health: u32,
}

impl HealthState {
    /// Creates a health pool at full health.
    pub fn new(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Subtracts health, clamping at zero.
    pub fn damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Adds health, clamping at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Raises the maximum and restores to full. Used on level-ups.
    pub fn raise_max(&mut self, amount: u32) {
        self.max_health += amount;
        self.health = self.max_health;
    }

    /// Returns whether the entity is out of health.
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// The stance a fighter is in at a given instant, derived from its
/// timestamps rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    /// Ready to attack.
    Idle,
    /// Waiting out the attack interval.
    Cooldown,
    /// Guard raised; protection is doubled.
    Blocking,
}

/// A fighter's attack timing and blocking state.
#[derive(Debug, Clone, Copy)]
pub struct CombatState {
    /// Base attack rate stat; equipment weight subtracts from it.
    pub speed: i32,
    last_attack: Option<Instant>,
    block_until: Option<Instant>,
}

impl CombatState {
    /// Creates a combat state that has never attacked or blocked.
    pub fn new(speed: i32) -> Self {
        Self {
            speed,
            last_attack: None,
            block_until: None,
        }
    }

    /// Seconds between attacks: `1 / (speed - equipped_weight)` when that
    /// margin is positive, otherwise a one-second floor for overloaded
    /// fighters.
    pub fn attack_interval(&self, equipped_weight: i32) -> Duration {
        let margin = self.speed - equipped_weight;
        if margin > 0 {
            Duration::from_secs_f64(1.0 / margin as f64)
        } else {
            Duration::from_secs(1)
        }
    }

    /// Returns whether an attack may land now: not blocking, and the
    /// interval has elapsed since the last attack. A first attack is
    /// always allowed.
    pub fn can_attack(&self, now: Instant, equipped_weight: i32) -> bool {
        if self.is_blocking(now) {
            return false;
        }
        match self.last_attack {
            Some(last) => now.duration_since(last) >= self.attack_interval(equipped_weight),
            None => true,
        }
    }

    /// Records an attack landing now.
    pub fn record_attack(&mut self, now: Instant) {
        self.last_attack = Some(now);
    }

    /// Returns whether the guard is up at the given instant.
    pub fn is_blocking(&self, now: Instant) -> bool {
        self.block_until.is_some_and(|until| now < until)
    }

    /// Raises the guard until `now + BLOCK_DURATION + jitter`.
    ///
    /// The jitter desynchronizes AI fighters that entered a fight on the
    /// same tick. Refused within [`config::BLOCK_DELAY`] of the last
    /// attack: a fighter cannot swing and hide in the same breath.
    pub fn start_block(&mut self, now: Instant, jitter: Duration) -> bool {
        if let Some(last) = self.last_attack {
            if now.duration_since(last) < config::BLOCK_DELAY {
                return false;
            }
        }
        self.block_until = Some(now + config::BLOCK_DURATION + jitter);
        true
    }

    /// Derives the stance at the given instant.
    pub fn stance(&self, now: Instant, equipped_weight: i32) -> Stance {
        if self.is_blocking(now) {
            Stance::Blocking
        } else if self.can_attack(now, equipped_weight) {
            Stance::Idle
        } else {
            Stance::Cooldown
        }
    }
}

/// The combat seam: anything with health, combat timing, and equipment
/// can deal and receive damage.
///
/// Implementors provide component access; the combat arithmetic itself
/// is shared through the provided methods.
pub trait Fighter {
    fn health(&self) -> &HealthState;
    fn health_mut(&mut self) -> &mut HealthState;
    fn combat(&self) -> &CombatState;
    fn combat_mut(&mut self) -> &mut CombatState;
    fn inventory(&self) -> &Inventory;
    fn inventory_mut(&mut self) -> &mut Inventory;

    /// Damage one successful attack deals: the equipped weapon's damage,
    /// or bare hands.
    fn attack_damage(&self) -> i32 {
        self.inventory()
            .weapon()
            .and_then(crate::Item::damage)
            .unwrap_or(config::UNARMED_DAMAGE)
    }

    /// Attack rate after equipment weight.
    fn effective_speed(&self) -> i32 {
        self.combat().speed - self.inventory().equipped_weight()
    }

    /// Attempts to land an attack on the target.
    ///
    /// Only takes effect when the attack interval has elapsed and the
    /// guard is down; on success, resets the attack timer.
    fn try_attack(&mut self, target: &mut dyn Fighter, now: Instant) -> bool {
        let weight = self.inventory().equipped_weight();
        if !self.combat().can_attack(now, weight) {
            return false;
        }

        let damage = self.attack_damage();
        target.receive_damage(damage, now);
        self.combat_mut().record_attack(now);
        true
    }

    /// Takes a hit, subtracting armor protection (doubled while blocking)
    /// from the amount. At least one point of chip damage always gets
    /// through.
    fn receive_damage(&mut self, amount: i32, now: Instant) {
        let mut protection = self.inventory().protection();
        if self.combat().is_blocking(now) {
            protection *= 2;
        }
        let effective = (amount - protection).max(1) as u32;
        self.health_mut().damage(effective);
    }

    /// Raises the guard; see [`CombatState::start_block`].
    fn start_block(&mut self, now: Instant, jitter: Duration) -> bool {
        self.combat_mut().start_block(now, jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArmorSlot, Item, ItemKind};

    struct TestFighter {
        health: HealthState,
        combat: CombatState,
        inventory: Inventory,
    }

    impl TestFighter {
        fn new(max_health: u32, speed: i32) -> Self {
            Self {
                health: HealthState::new(max_health),
                combat: CombatState::new(speed),
                inventory: Inventory::new(),
            }
        }
    }

    impl Fighter for TestFighter {
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

    fn weapon(damage: i32, weight: i32) -> Item {
        Item::new("weapon", weight, ItemKind::Weapon { damage })
    }

    fn armor(protection: i32, slot: ArmorSlot) -> Item {
        Item::new("armor", 1, ItemKind::Armor { protection, slot })
    }

    #[test]
    fn test_health_clamps_at_zero_and_max() {
        let mut health = HealthState::new(10);
        health.damage(25);
        assert_eq!(health.health, 0);
        assert!(health.is_dead());

        health.heal(99);
        assert_eq!(health.health, 10);
    }

    #[test]
    fn test_attack_interval_floor_for_overloaded() {
        let combat = CombatState::new(3);
        assert_eq!(combat.attack_interval(5), Duration::from_secs(1));
        assert_eq!(combat.attack_interval(3), Duration::from_secs(1));
        assert_eq!(combat.attack_interval(1), Duration::from_secs_f64(0.5));
    }

    #[test]
    fn test_attack_gating() {
        let mut attacker = TestFighter::new(10, 2); // interval = 0.5s
        let mut target = TestFighter::new(10, 5);
        let start = Instant::now();

        assert!(attacker.try_attack(&mut target, start));
        assert!(!attacker.try_attack(&mut target, start + Duration::from_millis(100)));
        assert!(attacker.try_attack(&mut target, start + Duration::from_millis(600)));
        assert_eq!(target.health.health, 8);
    }

    #[test]
    fn test_damage_floor_against_heavy_armor() {
        // Speed 5 with a damage-3 weapon against protection 10: exactly
        // one point of chip damage per hit.
        let mut attacker = TestFighter::new(10, 5);
        assert!(attacker.inventory.equip_weapon(weapon(3, 1), true));

        let mut target = TestFighter::new(10, 5);
        assert!(target.inventory.equip_armor(armor(10, ArmorSlot::Chest), true));

        let now = Instant::now();
        assert!(attacker.try_attack(&mut target, now));
        assert_eq!(target.health.health, 9);
    }

    #[test]
    fn test_unarmed_attack_deals_one() {
        let mut attacker = TestFighter::new(10, 5);
        let mut target = TestFighter::new(10, 5);

        assert!(attacker.try_attack(&mut target, Instant::now()));
        assert_eq!(target.health.health, 9);
    }

    #[test]
    fn test_blocking_doubles_protection() {
        let mut attacker = TestFighter::new(10, 5);
        assert!(attacker.inventory.equip_weapon(weapon(6, 1), true));

        let mut target = TestFighter::new(20, 5);
        assert!(target.inventory.equip_armor(armor(2, ArmorSlot::Chest), true));

        let now = Instant::now();
        // Unblocked: 6 - 2 = 4.
        assert!(attacker.try_attack(&mut target, now));
        assert_eq!(target.health.health, 16);

        // Blocked: 6 - 4 = 2.
        assert!(target.start_block(now, Duration::ZERO));
        let later = now + Duration::from_millis(500);
        assert!(attacker.try_attack(&mut target, later));
        assert_eq!(target.health.health, 14);
    }

    #[test]
    fn test_block_expires_after_duration_and_jitter() {
        let mut combat = CombatState::new(5);
        let now = Instant::now();
        let jitter = Duration::from_millis(100);

        assert!(combat.start_block(now, jitter));
        assert!(combat.is_blocking(now + config::BLOCK_DURATION));
        assert!(!combat.is_blocking(now + config::BLOCK_DURATION + jitter));
    }

    #[test]
    fn test_block_refused_right_after_attacking() {
        let mut combat = CombatState::new(5);
        let now = Instant::now();
        combat.record_attack(now);

        assert!(!combat.start_block(now + Duration::from_millis(100), Duration::ZERO));
        assert!(combat.start_block(now + config::BLOCK_DELAY, Duration::ZERO));
    }

    #[test]
    fn test_blocking_suppresses_attacks() {
        let mut fighter = TestFighter::new(10, 5);
        let mut target = TestFighter::new(10, 5);
        let now = Instant::now();

        assert!(fighter.start_block(now, Duration::ZERO));
        assert!(!fighter.try_attack(&mut target, now + Duration::from_millis(100)));
        assert_eq!(target.health.health, 10);
    }

    #[test]
    fn test_stance_derivation() {
        let mut combat = CombatState::new(2); // interval = 0.5s
        let now = Instant::now();

        assert_eq!(combat.stance(now, 0), Stance::Idle);
        combat.record_attack(now);
        assert_eq!(combat.stance(now + Duration::from_millis(100), 0), Stance::Cooldown);
        assert_eq!(combat.stance(now + Duration::from_millis(600), 0), Stance::Idle);

        combat.start_block(now + Duration::from_secs(2), Duration::ZERO);
        assert_eq!(combat.stance(now + Duration::from_secs(2), 0), Stance::Blocking);
    }
}
