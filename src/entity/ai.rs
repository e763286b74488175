//! # Enemy Behavior
//!
//! The roam / break / chase / fight state machine driving enemies.
//!
//! Each enemy owns a private RNG stream seeded during generation, so its
//! wanderings are reproducible for a given world seed and independent of
//! every other enemy. All timing is elapsed-instant polling against the
//! cadences in [`config`].

use crate::{config, Direction, Graph, MovementState, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

/// What an enemy is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    /// Wandering toward a self-chosen destination.
    Roaming {
        destination: Position,
        last_step: Instant,
    },
    /// Paused at a destination, turning idly, working up the will to move.
    Break { since: Instant, last_turn: Instant },
    /// Pursuing a fixed destination, usually the player's cell at aggro
    /// time.
    Chasing {
        destination: Position,
        last_step: Instant,
    },
    /// In combat; the fight resolver drives the enemy.
    Fighting,
}

/// The behavior state machine of one enemy.
#[derive(Debug)]
pub struct EnemyAi {
    pub state: AiState,
    /// A locked enemy skips behavior updates entirely. Set on every other
    /// enemy in a room while one of them engages the player.
    pub ai_locked: bool,
    rng: StdRng,
}

impl EnemyAi {
    /// Creates a roaming AI, drawing the first destination from the
    /// enemy's private stream.
    pub fn new(mut rng: StdRng, graph: &Graph) -> Self {
        let destination = Self::random_destination(&mut rng, graph);
        Self {
            state: AiState::Roaming {
                destination,
                last_step: Instant::now(),
            },
            ai_locked: false,
            rng,
        }
    }

    /// Returns whether the enemy is pursuing or fighting a target.
    pub fn has_target(&self) -> bool {
        matches!(self.state, AiState::Chasing { .. } | AiState::Fighting)
    }

    /// Starts chasing a fixed destination.
    ///
    /// The destination is not re-targeted while chasing; an enemy pursues
    /// the cell it spotted the player on.
    pub fn start_chase(&mut self, destination: Position, now: Instant) {
        self.state = AiState::Chasing {
            destination,
            last_step: now,
        };
    }

    /// Hands the enemy over to the fight resolver.
    pub fn enter_fight(&mut self) {
        self.state = AiState::Fighting;
    }

    /// Returns the enemy to roaming after a fight, with a fresh
    /// destination.
    pub fn end_fight(&mut self, graph: &Graph, now: Instant) {
        let destination = Self::random_destination(&mut self.rng, graph);
        self.state = AiState::Roaming {
            destination,
            last_step: now,
        };
    }

    /// Advances the state machine by one poll.
    pub fn tick(&mut self, movement: &mut MovementState, graph: &Graph, now: Instant) {
        if self.ai_locked {
            return;
        }

        match self.state {
            AiState::Fighting => {}
            AiState::Chasing {
                destination,
                last_step,
            } => {
                if now.duration_since(last_step) >= config::CHASE_STEP_INTERVAL {
                    movement.move_towards(graph, destination);
                    self.state = AiState::Chasing {
                        destination,
                        last_step: now,
                    };
                }
            }
            AiState::Break { since, last_turn } => {
                if now.duration_since(last_turn) >= config::BREAK_TURN_INTERVAL {
                    movement.direction = self.random_turn(movement.direction);

                    let resume_chance = (now.duration_since(since).as_secs_f64()
                        / config::BREAK_PATIENCE_SECS)
                        .clamp(0.0, 1.0);
                    if self.rng.gen_bool(resume_chance) {
                        let destination = Self::random_destination(&mut self.rng, graph);
                        self.state = AiState::Roaming {
                            destination,
                            last_step: now,
                        };
                    } else {
                        self.state = AiState::Break {
                            since,
                            last_turn: now,
                        };
                    }
                }
            }
            AiState::Roaming {
                destination,
                last_step,
            } => {
                if now.duration_since(last_step) >= config::ROAM_STEP_INTERVAL {
                    if movement.position == destination {
                        self.state = AiState::Break {
                            since: now,
                            last_turn: now,
                        };
                    } else if movement.move_towards(graph, destination) {
                        self.state = AiState::Roaming {
                            destination,
                            last_step: now,
                        };
                    } else {
                        // Nowhere to go: turn away and pick a new goal.
                        movement.direction = self.random_turn(movement.direction);
                        let destination = Self::random_destination(&mut self.rng, graph);
                        self.state = AiState::Roaming {
                            destination,
                            last_step: now,
                        };
                    }
                }
            }
        }
    }

    /// Flips the enemy's weighted coin. Used for combat decisions.
    pub fn roll(&mut self, chance: f64) -> bool {
        self.rng.gen_bool(chance.clamp(0.0, 1.0))
    }

    /// Draws this activation's random block extension.
    pub fn block_jitter(&mut self) -> Duration {
        let max = config::BLOCK_JITTER_MAX.as_secs_f64();
        Duration::from_secs_f64(self.rng.gen_range(0.0..max))
    }

    fn random_turn(&mut self, direction: Direction) -> Direction {
        *direction
            .possible_turns()
            .choose(&mut self.rng)
            .expect("possible_turns is never empty")
    }

    fn random_destination(rng: &mut StdRng, graph: &Graph) -> Position {
        let nodes: Vec<Position> = graph.positions().collect();
        *nodes
            .choose(rng)
            .expect("an enemy's roam graph is never empty")
    }
}
