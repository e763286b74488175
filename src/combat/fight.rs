//! # Fight Resolution
//!
//! A fight between the player and one enemy, polled once per tick.
//!
//! Fights open with a short warm-up during which no attack lands, then run
//! until either side is out of health. The player acts through explicit
//! attack/block intents; the enemy decides between the two with a weighted
//! coin flip at its own attack cadence, drawn from its private RNG stream.

use crate::{config, Enemy, Fighter, Player};
use std::time::{Duration, Instant};

/// How a fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightOutcome {
    PlayerWon,
    PlayerLost,
}

/// An ongoing fight between the player and one enemy.
///
/// The fight owns only its timing; both fighters live outside and are
/// passed into every operation.
#[derive(Debug, Clone, Copy)]
pub struct Fight {
    started: Instant,
    outcome: Option<FightOutcome>,
}

impl Fight {
    /// Starts a fight at the given instant.
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            outcome: None,
        }
    }

    /// Returns whether the warm-up has elapsed and attacks may land.
    pub fn warmed_up(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= config::FIGHT_WARMUP
    }

    /// Returns the outcome, if the fight has ended.
    pub fn outcome(&self) -> Option<FightOutcome> {
        self.outcome
    }

    /// Resolves a player attack intent.
    ///
    /// Gated by the warm-up, the player's own guard, and the attack
    /// interval.
    pub fn player_attack(&mut self, player: &mut Player, enemy: &mut Enemy, now: Instant) -> bool {
        if !self.warmed_up(now) || self.outcome.is_some() {
            return false;
        }
        let hit = player.try_attack(enemy, now);
        if hit {
            self.check_outcome(player, enemy);
        }
        hit
    }

    /// Resolves a player block intent.
    pub fn player_block(&mut self, player: &mut Player, jitter: Duration, now: Instant) -> bool {
        if !self.warmed_up(now) || self.outcome.is_some() {
            return false;
        }
        player.start_block(now, jitter)
    }

    /// Advances the enemy side of the fight by one poll.
    ///
    /// Each time the enemy comes off cooldown it flips a weighted coin:
    /// block with probability 0.25 when its speed beats the player's
    /// protection, 0.50 when outgunned; otherwise attack. A raised guard
    /// is simply waited out.
    pub fn tick(
        &mut self,
        player: &mut Player,
        enemy: &mut Enemy,
        now: Instant,
    ) -> Option<FightOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        if !self.warmed_up(now) {
            return None;
        }

        let weight = enemy.inventory.equipped_weight();
        if enemy.combat.can_attack(now, weight) {
            let block_chance = if enemy.combat.speed > player.inventory.protection() {
                config::BLOCK_CHANCE_STRONG
            } else {
                config::BLOCK_CHANCE_WEAK
            };

            if enemy.ai.roll(block_chance) {
                let jitter = enemy.ai.block_jitter();
                enemy.start_block(now, jitter);
            } else {
                enemy.try_attack(player, now);
            }
        }

        self.check_outcome(player, enemy);
        self.outcome
    }

    fn check_outcome(&mut self, player: &Player, enemy: &Enemy) {
        if self.outcome.is_some() {
            return;
        }
        if player.health.is_dead() {
            self.outcome = Some(FightOutcome::PlayerLost);
        } else if enemy.health.is_dead() {
            self.outcome = Some(FightOutcome::PlayerWon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Graph, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arena() -> Graph {
        Graph::grid(3, 3)
    }

    fn enemy(max_health: u32, speed: i32, seed: u64) -> Enemy {
        Enemy::new(
            max_health,
            speed,
            Position::new(1, 1),
            Direction::North,
            &arena(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_no_attacks_during_warmup() {
        let now = Instant::now();
        let mut fight = Fight::new(now);
        let mut player = Player::new(Position::origin());
        let mut foe = enemy(10, 5, 1);

        assert!(!fight.player_attack(&mut player, &mut foe, now));
        assert_eq!(fight.tick(&mut player, &mut foe, now), None);
        assert_eq!(foe.health.health, 10);
        assert_eq!(player.health.health, player.health.max_health);
    }

    #[test]
    fn test_player_attack_lands_after_warmup() {
        let now = Instant::now();
        let mut fight = Fight::new(now);
        let mut player = Player::new(Position::origin());
        let mut foe = enemy(10, 5, 1);

        let later = now + config::FIGHT_WARMUP;
        assert!(fight.player_attack(&mut player, &mut foe, later));
        assert_eq!(foe.health.health, 9);
    }

    #[test]
    fn test_fight_ends_when_enemy_dies() {
        let now = Instant::now();
        let mut fight = Fight::new(now);
        let mut player = Player::new(Position::origin());
        let mut foe = enemy(1, 5, 1);

        let later = now + config::FIGHT_WARMUP;
        assert!(fight.player_attack(&mut player, &mut foe, later));
        assert_eq!(fight.outcome(), Some(FightOutcome::PlayerWon));

        // A decided fight rejects further intents.
        assert!(!fight.player_attack(&mut player, &mut foe, later + Duration::from_secs(1)));
    }

    #[test]
    fn test_enemy_eventually_acts() {
        let now = Instant::now();
        let mut fight = Fight::new(now);
        let mut player = Player::new(Position::origin());
        let mut foe = enemy(10, 5, 42);

        // Poll well past the warm-up; the enemy must either land a hit or
        // raise its guard at some point.
        let mut acted = false;
        for i in 0..100 {
            let at = now + config::FIGHT_WARMUP + Duration::from_millis(100 * i);
            fight.tick(&mut player, &mut foe, at);
            if player.health.health < player.health.max_health || foe.combat.is_blocking(at) {
                acted = true;
                break;
            }
        }
        assert!(acted, "enemy never attacked or blocked");
    }

    #[test]
    fn test_fight_ends_when_player_dies() {
        let now = Instant::now();
        let mut fight = Fight::new(now);
        let mut player = Player::new(Position::origin());
        player.health.damage(player.health.max_health - 1);
        let mut foe = enemy(50, 8, 3);

        let mut outcome = None;
        for i in 0..400 {
            let at = now + config::FIGHT_WARMUP + Duration::from_millis(100 * i);
            outcome = fight.tick(&mut player, &mut foe, at);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(FightOutcome::PlayerLost));
    }
}
