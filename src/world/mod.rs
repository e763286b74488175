//! # World Module
//!
//! Spatial primitives and the adjacency graphs everything moves on.
//!
//! This module contains the foundation types of the warren core:
//! - Grid coordinates and cardinal directions
//! - Insertion-ordered undirected adjacency graphs
//! - The movement component shared by the player and enemies

pub mod graph;
pub mod movement;

pub use graph::*;
pub use movement::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate in the game world.
///
/// # Examples
///
/// ```
/// use warren::{Position, Direction};
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.next_in_direction(Direction::North), Position::new(10, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0), where every level starts.
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the position one step away in the given direction.
    pub fn next_in_direction(self, direction: Direction) -> Position {
        let (dx, dy) = direction.to_delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Returns the direction in which `self` lies, as seen from `other`.
    ///
    /// Ties where `|dx| >= |dy|` resolve along the x axis (East when
    /// `dx >= 0`, West otherwise); the remaining cases resolve along the
    /// y axis (South when `dy >= 0`, North otherwise).
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{Position, Direction};
    ///
    /// let room = Position::new(4, 4);
    /// let corridor = Position::new(4, 3);
    /// assert_eq!(corridor.direction_of(room), Direction::North);
    /// ```
    pub fn direction_of(self, other: Position) -> Direction {
        let dx = self.x - other.x;
        let dy = self.y - other.y;

        if dx.abs() >= dy.abs() {
            if dx >= 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy >= 0 {
            Direction::South
        } else {
            Direction::North
        }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns whether both coordinates are even.
    ///
    /// The maze carver only makes routing decisions on this coarse grid.
    pub fn is_decision_cell(self) -> bool {
        self.x % 2 == 0 && self.y % 2 == 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({};{})", self.x, self.y)
    }
}

/// A cardinal direction, with a cyclic ordinal 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, in ordinal order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the cyclic ordinal of the direction (0-3).
    pub fn ordinal(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Returns the direction with the given ordinal, modulo 4.
    pub fn from_ordinal(ordinal: u8) -> Direction {
        match ordinal % 4 {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            _ => Direction::West,
        }
    }

    /// Returns the opposite direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Direction;
    ///
    /// assert_eq!(Direction::North.opposite(), Direction::South);
    /// assert_eq!(Direction::East.opposite(), Direction::West);
    /// ```
    pub fn opposite(self) -> Direction {
        Direction::from_ordinal(self.ordinal() + 2)
    }

    /// Returns the two directions perpendicular to this one.
    ///
    /// The order (clockwise first) is stable and part of the generation
    /// determinism contract.
    pub fn possible_turns(self) -> [Direction; 2] {
        [
            Direction::from_ordinal(self.ordinal() + 1),
            Direction::from_ordinal(self.ordinal() + 3),
        ]
    }

    /// Converts the direction to a coordinate delta.
    ///
    /// North is negative y, matching a screen-space grid.
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}
