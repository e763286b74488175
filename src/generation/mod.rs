//! # Generation Module
//!
//! Seeded procedural generation of levels and rooms.
//!
//! All layout randomness flows through two long-lived [`StdRng`] streams
//! derived from one seed string: **generation** (maze carving, rooms,
//! stairs, loot, enemy stats) and **ai** (the per-enemy private behavior
//! seeds). Draw order is a hard contract, not an implementation detail:
//!
//! 1. The level maze is carved, then rooms are selected, then stairs.
//! 2. Rooms are built in the level's room-list order.
//! 3. Within a room: dimensions, grid removal, doors, items, enemies.
//! 4. Per enemy: health, speed, cell, facing, weapon, armor, then one
//!    AI-stream draw to seed its private RNG.
//!
//! Re-running any of it with the same seed string yields identical worlds;
//! reordering any step changes them.

pub mod level;
pub mod room;

pub use level::*;
pub use room::*;

use crate::WarrenResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::path::Path;

/// Configuration for procedural generation.
///
/// The shipped game numbers are the defaults; everything here is a
/// deliberate tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base step budget of the maze walk
    pub maze_base_steps: u32,
    /// Extra maze steps per difficulty point
    pub maze_steps_per_difficulty: u32,
    /// Probability of turning at a decision cell
    pub turn_chance: f64,
    /// Probability of spawning a branch at a decision cell (checked only
    /// when the turn did not happen)
    pub branch_chance: f64,
    /// How many stairs a level aims for
    pub stairs_count: usize,
    /// Minimum room width/height
    pub room_min_extent: u32,
    /// Extra room extent per difficulty point
    pub room_extent_per_difficulty: u32,
    /// Lower bound on the fraction of room cells considered for removal
    pub removal_fraction_min: f64,
    /// Upper bound on the fraction of room cells considered for removal
    pub removal_fraction_max: f64,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.maze_base_steps, 8);
    /// assert!(config.removal_fraction_min < config.removal_fraction_max);
    /// ```
    pub fn new() -> Self {
        Self {
            maze_base_steps: 8,
            maze_steps_per_difficulty: 4,
            turn_chance: 0.25,
            branch_chance: 0.10,
            stairs_count: 2,
            room_min_extent: 8,
            room_extent_per_difficulty: 2,
            removal_fraction_min: 0.10,
            removal_fraction_max: 0.50,
        }
    }

    /// Creates a configuration for testing with smaller, simpler layouts.
    pub fn for_testing() -> Self {
        Self {
            maze_base_steps: 8,
            maze_steps_per_difficulty: 2,
            turn_chance: 0.25,
            branch_chance: 0.10,
            stairs_count: 2,
            room_min_extent: 6,
            room_extent_per_difficulty: 1,
            removal_fraction_min: 0.10,
            removal_fraction_max: 0.30,
        }
    }

    /// Maze step budget for a difficulty.
    pub fn maze_steps(&self, difficulty: u32) -> u32 {
        self.maze_base_steps + difficulty * self.maze_steps_per_difficulty
    }

    /// Largest room width/height for a difficulty.
    pub fn room_max_extent(&self, difficulty: u32) -> u32 {
        self.room_min_extent + difficulty * self.room_extent_per_difficulty
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The two top-level RNG streams, labeled by their consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngStream {
    /// Layout: maze, rooms, stairs, loot, enemy stats.
    Generation,
    /// Per-enemy behavior seeds.
    Ai,
}

impl RngStream {
    fn label(self) -> &'static [u8] {
        match self {
            RngStream::Generation => b"generation",
            RngStream::Ai => b"ai",
        }
    }
}

/// Derives a seeded RNG for one stream from a seed string.
///
/// The seed string and the stream label are hashed together (SHA3-256)
/// into the 32-byte `StdRng` seed, so the two streams of one seed are
/// uncorrelated but both fully determined by it.
pub fn seed_rng(seed: &str, stream: RngStream) -> StdRng {
    let mut hasher = Sha3_256::new();
    hasher.update(seed.as_bytes());
    hasher.update([0x1f]);
    hasher.update(stream.label());

    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    StdRng::from_seed(bytes)
}

/// The generation and AI streams for one session seed.
#[derive(Debug)]
pub struct RngStreams {
    pub generation: StdRng,
    pub ai: StdRng,
}

impl RngStreams {
    /// Derives both streams from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        Self {
            generation: seed_rng(seed, RngStream::Generation),
            ai: seed_rng(seed, RngStream::Ai),
        }
    }
}

/// Loads a newline-delimited seed list, skipping blank lines and trimming
/// whitespace.
pub fn load_seed_list(path: impl AsRef<Path>) -> WarrenResult<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
