//! # Room Generation
//!
//! Carved rectangular rooms with doors, loot, and enemies.
//!
//! A room starts as a full grid, loses a random sample of its interior
//! cells for shape, and then gains one door per opening the parent level
//! requires. The border frame is never removed, so a door's interior
//! neighbor always exists. The RNG draw order within a room (dimensions,
//! removal, doors, items, enemies) is part of the determinism contract.

use crate::{Direction, Enemy, GenerationConfig, Graph, Item, LootTable, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// A generated room: the carved grid plus its content.
///
/// `graph` is what the player walks on, doors included. `roam_graph` is
/// the same grid without the door cells; enemies move on it, which keeps
/// them from blocking or escaping through doorways.
#[derive(Debug)]
pub struct Room {
    pub width: u32,
    pub height: u32,
    pub graph: Graph,
    pub roam_graph: Graph,
    pub doors: HashMap<Position, Direction>,
    pub items: HashMap<Position, Item>,
    pub enemies: Vec<Enemy>,
}

impl Room {
    /// Generates a room of the given difficulty.
    ///
    /// `openings` lists the directions the room must expose; the parent
    /// level derives them from the corridors linked to the room's entry.
    /// `generation_rng` drives the layout and loot; `ai_rng` contributes
    /// exactly one draw per enemy, seeding its private behavior stream.
    pub fn generate(
        difficulty: u32,
        openings: &[Direction],
        loot: &LootTable,
        config: &GenerationConfig,
        generation_rng: &mut StdRng,
        ai_rng: &mut StdRng,
    ) -> Self {
        let max_extent = config.room_max_extent(difficulty);
        let width = generation_rng.gen_range(config.room_min_extent..=max_extent);
        let height = generation_rng.gen_range(config.room_min_extent..=max_extent);

        let mut graph = Graph::grid(width, height);
        remove_interior_cells(&mut graph, width, height, config, generation_rng);

        let doors = place_doors(&mut graph, width, height, openings, generation_rng);

        let mut roam_graph = graph.clone();
        for door in doors.keys() {
            roam_graph.remove(*door);
        }

        let items = place_items(&graph, &doors, loot, generation_rng);
        let enemies = spawn_enemies(&roam_graph, difficulty, loot, generation_rng, ai_rng);

        log::debug!(
            "generated room: {}x{}, {} cells, {} doors, {} items, {} enemies",
            width,
            height,
            graph.len(),
            doors.len(),
            items.len(),
            enemies.len()
        );

        Self {
            width,
            height,
            graph,
            roam_graph,
            doors,
            items,
            enemies,
        }
    }

    /// Returns whether the position is one of the room's doors.
    pub fn is_door(&self, position: Position) -> bool {
        self.doors.contains_key(&position)
    }
}

/// Removes a random sample of strictly-interior cells.
///
/// The count is drawn uniformly from the configured fraction range of the
/// total cell count; border cells are never candidates, so the frame the
/// doors attach to stays intact.
fn remove_interior_cells(
    graph: &mut Graph,
    width: u32,
    height: u32,
    config: &GenerationConfig,
    rng: &mut StdRng,
) {
    let total = (width * height) as f64;
    let min = (total * config.removal_fraction_min) as usize;
    let max = (total * config.removal_fraction_max) as usize;
    let count = rng.gen_range(min..=max);

    let interior: Vec<Position> = graph
        .positions()
        .filter(|cell| {
            cell.x > 0 && cell.x < width as i32 - 1 && cell.y > 0 && cell.y < height as i32 - 1
        })
        .collect();

    let removals: Vec<Position> = interior.choose_multiple(rng, count).copied().collect();
    for cell in removals {
        graph.remove(cell);
    }
}

/// Places one door per required opening.
///
/// A door sits one cell outside the border at a random coordinate along
/// the matching edge, linked bidirectionally to its interior neighbor.
fn place_doors(
    graph: &mut Graph,
    width: u32,
    height: u32,
    openings: &[Direction],
    rng: &mut StdRng,
) -> HashMap<Position, Direction> {
    let mut doors = HashMap::new();

    for opening in openings {
        let position = match opening {
            Direction::North => Position::new(rng.gen_range(0..width as i32), -1),
            Direction::East => Position::new(width as i32, rng.gen_range(0..height as i32)),
            Direction::South => Position::new(rng.gen_range(0..width as i32), height as i32),
            Direction::West => Position::new(-1, rng.gen_range(0..height as i32)),
        };

        doors.insert(position, *opening);
        graph.connect(position, position.next_in_direction(opening.opposite()));
    }

    doors
}

/// Draws the loot table and scatters the drops over distinct non-door
/// cells.
fn place_items(
    graph: &Graph,
    doors: &HashMap<Position, Direction>,
    loot: &LootTable,
    rng: &mut StdRng,
) -> HashMap<Position, Item> {
    let drops = loot.draws(rng);

    let candidates: Vec<Position> = graph
        .positions()
        .filter(|cell| !doors.contains_key(cell))
        .collect();
    let cells: Vec<Position> = candidates.choose_multiple(rng, drops.len()).copied().collect();

    cells.into_iter().zip(drops).collect()
}

/// Spawns enemies onto the roam graph.
///
/// Difficulty 1 rooms are safe. Above that, `0..=difficulty/2` enemies
/// spawn, each with health and speed drawn from `[5+d, 5+2d]`, a random
/// cell and facing, one weapon and one armor draw from the loot table
/// (equipped without storing), and a private RNG seeded from the AI
/// stream.
fn spawn_enemies(
    roam_graph: &Graph,
    difficulty: u32,
    loot: &LootTable,
    generation_rng: &mut StdRng,
    ai_rng: &mut StdRng,
) -> Vec<Enemy> {
    if difficulty <= 1 {
        return Vec::new();
    }

    let count = generation_rng.gen_range(0..=difficulty / 2);
    let cells: Vec<Position> = roam_graph.positions().collect();

    let mut enemies = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let health = generation_rng.gen_range(5 + difficulty..=5 + 2 * difficulty);
        let speed = generation_rng.gen_range(5 + difficulty..=5 + 2 * difficulty) as i32;
        let cell = match cells.choose(generation_rng) {
            Some(cell) => *cell,
            None => break,
        };
        let facing = *Direction::ALL
            .choose(generation_rng)
            .expect("there are always four directions");

        let weapon = loot.weapon(generation_rng);
        let armor = loot.armor(generation_rng);

        let ai_seed = ai_rng.gen::<u64>();
        let mut enemy = Enemy::new(
            health,
            speed,
            cell,
            facing,
            roam_graph,
            StdRng::seed_from_u64(ai_seed),
        );

        if let Some(weapon) = weapon {
            enemy.inventory.equip_weapon(weapon, false);
        }
        if let Some(armor) = armor {
            enemy.inventory.equip_armor(armor, false);
        }

        enemies.push(enemy);
    }

    enemies
}
