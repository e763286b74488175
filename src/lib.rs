//! # Warren
//!
//! The simulation core of a top-down dungeon crawler: procedural maze
//! levels, carved rooms with loot and enemies, BFS movement over adjacency
//! graphs, time-gated combat, and a roam/break/chase enemy AI.
//!
//! ## Architecture Overview
//!
//! Warren is a pure core with no rendering or input of its own; an embedding
//! layer feeds it movement and combat intents and polls [`Dungeon::update`]
//! with the current instant. The main pieces:
//!
//! - **World**: positions, directions, and insertion-ordered adjacency graphs
//! - **Generation**: the maze-carved level and its rooms, driven by seeded RNG
//!   streams with a documented draw order
//! - **Items**: the registry, inventories, and weighted loot tables
//! - **Combat**: equipment-driven attack/damage/block arithmetic
//! - **Entities**: the player and enemies as plain structs of capability
//!   components
//! - **Dungeon**: the session state machine tying the pieces together
//!
//! ## Determinism
//!
//! Everything layout-related is drawn from two RNG streams derived from one
//! seed string. The same seed always produces the same dungeon, byte for
//! byte; see the `generation` module docs for the draw-order contract.

pub mod combat;
pub mod dungeon;
pub mod effects;
pub mod entity;
pub mod generation;
pub mod items;
pub mod world;

// Core module re-exports
pub use combat::*;
pub use dungeon::*;
pub use effects::*;
pub use entity::*;
pub use generation::*;
pub use items::*;
pub use world::*;

/// Core error type for the warren engine.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A data file is malformed or inconsistent
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A loot table references an item the registry does not know
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// A consumable references an effect the effect book does not know
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),
}

/// Result type used throughout the warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gameplay tuning constants.
pub mod config {
    use std::time::Duration;

    /// Starting player health ceiling
    pub const PLAYER_MAX_HEALTH: u32 = 15;

    /// Starting player speed
    pub const PLAYER_SPEED: i32 = 5;

    /// Damage dealt with bare hands
    pub const UNARMED_DAMAGE: i32 = 1;

    /// Minimum delay between player steps
    pub const STEP_INTERVAL: Duration = Duration::from_millis(200);

    /// Delay before attacks land in a fresh fight
    pub const FIGHT_WARMUP: Duration = Duration::from_secs(3);

    /// How long a raised guard holds, before jitter
    pub const BLOCK_DURATION: Duration = Duration::from_millis(1000);

    /// Upper bound on the random extension of a block
    pub const BLOCK_JITTER_MAX: Duration = Duration::from_millis(250);

    /// A guard cannot be raised this soon after swinging
    pub const BLOCK_DELAY: Duration = Duration::from_millis(750);

    /// Enemy step cadence while chasing
    pub const CHASE_STEP_INTERVAL: Duration = Duration::from_millis(250);

    /// Enemy step cadence while roaming
    pub const ROAM_STEP_INTERVAL: Duration = Duration::from_millis(400);

    /// Enemy turn cadence while idling on a break
    pub const BREAK_TURN_INTERVAL: Duration = Duration::from_millis(500);

    /// Seconds of break after which resuming becomes certain
    pub const BREAK_PATIENCE_SECS: f64 = 4.0;

    /// Manhattan radius within which an enemy can spot the player
    pub const AGGRO_RANGE: u32 = 3;

    /// Block chance for an AI fighter whose speed beats the foe's armor
    pub const BLOCK_CHANCE_STRONG: f64 = 0.25;

    /// Block chance for an AI fighter that is outgunned
    pub const BLOCK_CHANCE_WEAK: f64 = 0.50;
}
