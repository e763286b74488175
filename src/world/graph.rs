//! # Adjacency Graphs
//!
//! The undirected graph structure levels, rooms, and arenas are made of.
//!
//! Node iteration order and per-node neighbor order are insertion order, and
//! both are part of the seed-determinism contract: the generators sample from
//! these orders, and BFS tie-breaks between equal-length paths follow them.

use crate::{Direction, Position};
use pathfinding::prelude::{bfs, bfs_reach};
use std::collections::HashMap;

/// An undirected adjacency graph over grid positions.
///
/// Edges are always symmetric: if `a` lists `b` as a neighbor, `b` lists `a`.
///
/// # Examples
///
/// ```
/// use warren::{Graph, Position};
///
/// let mut graph = Graph::new();
/// graph.connect(Position::new(0, 0), Position::new(1, 0));
/// graph.connect(Position::new(1, 0), Position::new(1, 1));
///
/// assert!(graph.path_exists(Position::new(0, 0), Position::new(1, 1)));
/// assert_eq!(graph.degree(Position::new(1, 0)), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Position>,
    edges: HashMap<Position, Vec<Position>>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a full `width` x `height` grid graph with 4-neighbor adjacency.
    ///
    /// Cells are inserted column by column, and each cell's neighbors are
    /// listed in North, East, South, West order. Boundary cells simply have
    /// fewer edges.
    pub fn grid(width: u32, height: u32) -> Self {
        let mut graph = Graph::new();

        for x in 0..width as i32 {
            for y in 0..height as i32 {
                let cell = Position::new(x, y);
                graph.insert(cell);

                if y != 0 {
                    graph.connect(cell, cell.next_in_direction(Direction::North));
                }
                if x != width as i32 - 1 {
                    graph.connect(cell, cell.next_in_direction(Direction::East));
                }
                if y != height as i32 - 1 {
                    graph.connect(cell, cell.next_in_direction(Direction::South));
                }
                if x != 0 {
                    graph.connect(cell, cell.next_in_direction(Direction::West));
                }
            }
        }

        graph
    }

    /// Inserts a node with no edges. Does nothing if it already exists.
    pub fn insert(&mut self, position: Position) {
        if !self.edges.contains_key(&position) {
            self.nodes.push(position);
            self.edges.insert(position, Vec::new());
        }
    }

    /// Connects two positions with a symmetric edge, inserting either node
    /// if needed. Duplicate edges are ignored.
    pub fn connect(&mut self, a: Position, b: Position) {
        self.insert(a);
        self.insert(b);

        let neighbors = self.edges.get_mut(&a).expect("node was just inserted");
        if !neighbors.contains(&b) {
            neighbors.push(b);
        }
        let neighbors = self.edges.get_mut(&b).expect("node was just inserted");
        if !neighbors.contains(&a) {
            neighbors.push(a);
        }
    }

    /// Removes a node and every edge referencing it.
    pub fn remove(&mut self, position: Position) {
        if self.edges.remove(&position).is_none() {
            return;
        }
        self.nodes.retain(|node| *node != position);
        for neighbors in self.edges.values_mut() {
            neighbors.retain(|neighbor| *neighbor != position);
        }
    }

    /// Returns whether the position is a node of the graph.
    pub fn contains(&self, position: Position) -> bool {
        self.edges.contains_key(&position)
    }

    /// Returns the neighbors of a position, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the position is not a node of the graph. Asking for the
    /// neighbors of a cell that was never carved is a caller bug, not a
    /// recoverable condition.
    pub fn neighbors(&self, position: Position) -> &[Position] {
        self.edges
            .get(&position)
            .unwrap_or_else(|| panic!("position {} is not in the graph", position))
    }

    /// Returns the number of edges at a position, or 0 if it is absent.
    pub fn degree(&self, position: Position) -> usize {
        self.edges.get(&position).map_or(0, Vec::len)
    }

    /// Iterates over all nodes in insertion order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns whether a path exists between two positions.
    ///
    /// Both endpoints may be absent from the graph; the answer is then
    /// simply `false`.
    pub fn path_exists(&self, from: Position, to: Position) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if from == to {
            return true;
        }
        bfs(&from, |p| self.successors(*p), |p| *p == to).is_some()
    }

    /// Returns the first step of a shortest path from `from` to `to`.
    ///
    /// Ties between equal-length paths follow neighbor insertion order.
    /// Returns `None` when the target is unreachable or already reached.
    pub fn first_step(&self, from: Position, to: Position) -> Option<Position> {
        if !self.contains(from) || !self.contains(to) || from == to {
            return None;
        }
        let path = bfs(&from, |p| self.successors(*p), |p| *p == to)?;
        path.get(1).copied()
    }

    /// Returns whether every node is reachable from the given origin.
    pub fn is_connected_from(&self, origin: Position) -> bool {
        if !self.contains(origin) {
            return false;
        }
        bfs_reach(origin, |p| self.successors(*p)).count() == self.len()
    }

    fn successors(&self, position: Position) -> Vec<Position> {
        self.edges.get(&position).cloned().unwrap_or_default()
    }
}
