//! # Movement Component
//!
//! Tile-by-tile and BFS-driven movement over an adjacency graph.
//!
//! The graph is always passed explicitly: the same mover switches between
//! the level graph, a room graph, and an enemy roam graph as the session
//! changes phase, and the component never keeps a stale reference.

use crate::{Direction, Graph, Position};
use serde::{Deserialize, Serialize};

/// The position and facing of an entity moving within a graph.
///
/// All operations require the current position to be a node of the given
/// graph; violating that signals a broken graph reference and panics.
///
/// # Examples
///
/// ```
/// use warren::{Direction, Graph, MovementState, Position};
///
/// let graph = Graph::grid(3, 3);
/// let mut mover = MovementState::new(Position::origin(), Direction::North);
///
/// assert!(mover.step(&graph, Direction::East));
/// assert_eq!(mover.position, Position::new(1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementState {
    pub position: Position,
    pub direction: Direction,
}

impl MovementState {
    /// Creates a movement state at the given position and facing.
    pub fn new(position: Position, direction: Direction) -> Self {
        Self { position, direction }
    }

    /// Steps one cell in the given direction if the edge exists.
    ///
    /// The facing always updates to the requested direction, even when the
    /// step itself is blocked: an entity walking into a wall still turns
    /// toward it.
    ///
    /// # Panics
    ///
    /// Panics if the current position is not a node of `graph`.
    pub fn step(&mut self, graph: &Graph, direction: Direction) -> bool {
        assert!(
            graph.contains(self.position),
            "mover at {} is not on its graph",
            self.position
        );

        self.direction = direction;

        let next = self.position.next_in_direction(direction);
        if graph.neighbors(self.position).contains(&next) {
            self.position = next;
            return true;
        }
        false
    }

    /// Advances one step along a shortest path toward `to`.
    ///
    /// Reorients toward the stepped cell. Returns `false` without touching
    /// any state when the target is unreachable or already reached.
    ///
    /// # Panics
    ///
    /// Panics if the current position is not a node of `graph`.
    pub fn move_towards(&mut self, graph: &Graph, to: Position) -> bool {
        assert!(
            graph.contains(self.position),
            "mover at {} is not on its graph",
            self.position
        );

        match graph.first_step(self.position, to) {
            Some(next) => {
                self.direction = next.direction_of(self.position);
                self.position = next;
                true
            }
            None => false,
        }
    }

    /// Jumps directly to `to` if it is a node of `graph`, facing back
    /// toward the vacated cell.
    pub fn teleport(&mut self, graph: &Graph, to: Position) -> bool {
        if !graph.contains(to) {
            return false;
        }
        self.direction = self.position.direction_of(to);
        self.position = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Graph {
        // (0,0) - (1,0) - (2,0), with a dead end at (1,1).
        let mut graph = Graph::new();
        graph.connect(Position::new(0, 0), Position::new(1, 0));
        graph.connect(Position::new(1, 0), Position::new(2, 0));
        graph.connect(Position::new(1, 0), Position::new(1, 1));
        graph
    }

    #[test]
    fn test_step_moves_along_edge() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(mover.step(&graph, Direction::East));
        assert_eq!(mover.position, Position::new(1, 0));
        assert_eq!(mover.direction, Direction::East);
    }

    #[test]
    fn test_blocked_step_still_turns() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(!mover.step(&graph, Direction::South));
        assert_eq!(mover.position, Position::new(0, 0));
        assert_eq!(mover.direction, Direction::South);
    }

    #[test]
    fn test_move_towards_takes_one_step() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(mover.move_towards(&graph, Position::new(2, 0)));
        assert_eq!(mover.position, Position::new(1, 0));
        assert_eq!(mover.direction, Direction::East);
    }

    #[test]
    fn test_move_towards_unreachable_is_a_no_op() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(!mover.move_towards(&graph, Position::new(9, 9)));
        assert_eq!(mover.position, Position::new(0, 0));
        assert_eq!(mover.direction, Direction::North);
    }

    #[test]
    fn test_move_towards_current_position_is_a_no_op() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(1, 0), Direction::West);

        assert!(!mover.move_towards(&graph, Position::new(1, 0)));
        assert_eq!(mover.direction, Direction::West);
    }

    #[test]
    fn test_teleport_faces_vacated_cell() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(mover.teleport(&graph, Position::new(2, 0)));
        assert_eq!(mover.position, Position::new(2, 0));
        // The vacated cell is to the west of the landing cell.
        assert_eq!(mover.direction, Direction::West);
    }

    #[test]
    fn test_teleport_outside_graph_fails() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(0, 0), Direction::North);

        assert!(!mover.teleport(&graph, Position::new(9, 9)));
        assert_eq!(mover.position, Position::new(0, 0));
    }

    #[test]
    #[should_panic(expected = "not on its graph")]
    fn test_step_from_outside_graph_panics() {
        let graph = corridor();
        let mut mover = MovementState::new(Position::new(9, 9), Direction::North);
        mover.step(&graph, Direction::North);
    }
}
