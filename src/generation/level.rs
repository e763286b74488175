//! # Level Generation
//!
//! The maze-carved level: a corridor graph with room entries and stairs.
//!
//! A level is a recursive random walk over an unbounded grid. The walk
//! only makes routing decisions on the coarse grid of even/even cells,
//! which keeps corridors at least two cells long and gives the maze its
//! blocky feel. Rooms land on junctions, stairs on dead ends.

use crate::{Direction, GenerationConfig, Graph, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// A generated level: the maze graph plus its points of interest.
///
/// Immutable after generation; descending a level discards it and
/// generates the next.
///
/// # Examples
///
/// ```
/// use warren::{GenerationConfig, Level, Position, RngStreams};
///
/// let config = GenerationConfig::new();
/// let mut streams = RngStreams::from_seed("test");
/// let level = Level::generate(1, &config, &mut streams.generation);
///
/// assert!(level.graph.contains(Position::origin()));
/// assert!(!level.stairs.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub difficulty: u32,
    pub graph: Graph,
    /// Room entry positions, in selection order. Rooms are generated in
    /// this order, which makes it part of the determinism contract.
    pub rooms: Vec<Position>,
    pub stairs: HashSet<Position>,
}

impl Level {
    /// Generates a level of the given difficulty.
    ///
    /// The walk starts at the origin facing North with a step budget of
    /// `maze_base_steps + difficulty * maze_steps_per_difficulty`.
    pub fn generate(difficulty: u32, config: &GenerationConfig, rng: &mut StdRng) -> Self {
        let mut graph = Graph::new();
        carve_maze(
            &mut graph,
            Position::origin(),
            Direction::North,
            config.maze_steps(difficulty),
            config,
            rng,
        );

        let rooms = select_rooms(&graph, difficulty, rng);
        let stairs = select_stairs(&graph, &rooms, config.stairs_count, rng);

        log::debug!(
            "generated level: difficulty {}, {} cells, {} rooms, {} stairs",
            difficulty,
            graph.len(),
            rooms.len(),
            stairs.len()
        );

        Self {
            difficulty,
            graph,
            rooms,
            stairs,
        }
    }

    /// Returns whether the position is a room entry.
    pub fn is_room(&self, position: Position) -> bool {
        self.rooms.contains(&position)
    }

    /// Returns whether the position is a stair.
    pub fn is_stair(&self, position: Position) -> bool {
        self.stairs.contains(&position)
    }

    /// The directions a room at `position` must expose as doors: one per
    /// corridor linked to it, in neighbor order.
    pub fn openings(&self, position: Position) -> Vec<Direction> {
        self.graph
            .neighbors(position)
            .iter()
            .map(|neighbor| neighbor.direction_of(position))
            .collect()
    }
}

/// Carves the maze with a recursive budgeted walk.
///
/// At decision cells: with `turn_chance` the walk turns to a perpendicular
/// direction; failing that, with `branch_chance` it spawns a second walk
/// in a perpendicular direction (budget minus one) and carries on. Both
/// probabilities are separate uniform draws, and the branch draw happens
/// only when the turn draw failed. Every traversed edge is inserted
/// symmetrically.
fn carve_maze(
    graph: &mut Graph,
    start: Position,
    direction: Direction,
    budget: u32,
    config: &GenerationConfig,
    rng: &mut StdRng,
) {
    if budget == 0 {
        return;
    }

    graph.insert(start);

    let mut continued_direction = direction;
    let mut continued_position = start.next_in_direction(direction);

    if start.is_decision_cell() {
        if rng.gen_bool(config.turn_chance) {
            continued_direction = *continued_direction
                .possible_turns()
                .choose(rng)
                .expect("possible_turns is never empty");
            continued_position = start.next_in_direction(continued_direction);
        } else if rng.gen_bool(config.branch_chance) {
            let branch_direction = *continued_direction
                .possible_turns()
                .choose(rng)
                .expect("possible_turns is never empty");
            let branch_position = start.next_in_direction(branch_direction);

            graph.connect(start, branch_position);
            carve_maze(graph, branch_position, branch_direction, budget - 1, config, rng);
        }
    }

    graph.connect(start, continued_position);
    carve_maze(
        graph,
        continued_position,
        continued_direction,
        budget - 1,
        config,
        rng,
    );
}

/// Selects room entry positions.
///
/// Junction cells (degree >= 3) are the best hosts; straight decision
/// cells (degree 2, both coordinates even) are acceptable. The selection
/// takes all of `best` first, topping up or downsampling to exactly
/// `difficulty`, or fewer when the maze simply has too few candidates.
fn select_rooms(graph: &Graph, difficulty: u32, rng: &mut StdRng) -> Vec<Position> {
    let mut best: Vec<Position> = Vec::new();
    let mut possible: Vec<Position> = Vec::new();

    for position in graph.positions() {
        if position == Position::origin() {
            continue;
        }
        let degree = graph.degree(position);
        if degree >= 3 {
            best.push(position);
        } else if degree == 2 && position.is_decision_cell() {
            possible.push(position);
        }
    }

    let wanted = difficulty as usize;

    if best.is_empty() {
        if possible.len() > wanted {
            sample(&possible, wanted, rng)
        } else {
            possible
        }
    } else if best.len() < wanted {
        if best.len() + possible.len() > wanted {
            let mut rooms = best.clone();
            rooms.extend(sample(&possible, wanted - best.len(), rng));
            rooms
        } else {
            best.extend(possible);
            best
        }
    } else if best.len() > wanted {
        sample(&best, wanted, rng)
    } else {
        best
    }
}

/// Places stairs on dead ends.
///
/// One or two dead ends all become stairs; more get downsampled to
/// `stairs_count`. A maze with no dead end at all falls back to one
/// uniformly random cell that is neither the origin nor a room, so a
/// descent point always exists.
fn select_stairs(
    graph: &Graph,
    rooms: &[Position],
    stairs_count: usize,
    rng: &mut StdRng,
) -> HashSet<Position> {
    let dead_ends: Vec<Position> = graph
        .positions()
        .filter(|position| *position != Position::origin() && graph.degree(*position) == 1)
        .collect();

    let stairs = if dead_ends.is_empty() {
        let candidates: Vec<Position> = graph
            .positions()
            .filter(|position| *position != Position::origin() && !rooms.contains(position))
            .collect();
        match candidates.choose(rng) {
            Some(position) => vec![*position],
            None => Vec::new(),
        }
    } else if dead_ends.len() <= stairs_count {
        dead_ends
    } else {
        sample(&dead_ends, stairs_count, rng)
    };

    stairs.into_iter().collect()
}

fn sample(candidates: &[Position], amount: usize, rng: &mut StdRng) -> Vec<Position> {
    candidates.choose_multiple(rng, amount).copied().collect()
}
