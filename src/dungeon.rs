//! # Dungeon Session
//!
//! The state machine tying levels, rooms, entities, and fights together.
//!
//! The embedding layer feeds the session discrete movement and combat
//! intents and polls [`Dungeon::update`] once per frame with the current
//! instant. The session answers with [`DungeonEvent`]s describing what
//! changed, and exposes read-only views of the world for display.

use crate::{
    config, Direction, EffectBook, Enemy, Fight, FightOutcome, GenerationConfig, Graph, ItemKind,
    Level, LootTable, Player, Position, RngStreams, Room, WarrenError, WarrenResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Where in the dungeon the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Walking the level maze.
    Exploring,
    /// Inside a room.
    InRoom,
    /// Fighting an enemy in a room.
    Fighting,
    /// The player died; the session is over.
    GameOver,
}

/// Something the session did in response to an intent or a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DungeonEvent {
    /// The player took the stairs; a fresh level was generated.
    Descended { depth: u32 },
    /// The player entered the room at this level position.
    EnteredRoom { position: Position },
    /// The player left the current room.
    ExitedRoom,
    /// The player walked over an item and stored it.
    PickedUp { item: String },
    /// The player walked over an item but had no room for it.
    InventoryFull { item: String },
    /// An enemy spotted the player; every other enemy froze.
    EnemyAggroed,
    /// The player and an enemy are co-located; a fight began.
    FightStarted,
    /// A fight resolved.
    FightEnded { outcome: FightOutcome },
    /// A defeated enemy dropped a piece of its gear at the player's feet.
    SpoilsDropped { item: String },
    /// The player reached a new experience level.
    LeveledUp { level: u32 },
    /// The player is dead.
    PlayerDied,
}

/// A running dungeon session.
///
/// Owns the current level, its generated rooms, the player, and the RNG
/// streams that future descents keep drawing from.
pub struct Dungeon {
    config: GenerationConfig,
    streams: RngStreams,
    loot_tables: Vec<LootTable>,
    effect_book: EffectBook,
    /// Session-scoped randomness (player block jitter). Kept apart from
    /// the generation and AI streams so play never shifts layout draws.
    runtime_rng: StdRng,

    pub level: Level,
    rooms: HashMap<Position, Room>,
    pub player: Player,

    phase: Phase,
    current_room: Option<Position>,
    fighting_enemy: Option<usize>,
    fight: Option<Fight>,
    last_step: Option<Instant>,
}

impl Dungeon {
    /// Starts a session from a seed string at difficulty 1.
    ///
    /// # Errors
    ///
    /// Returns [`WarrenError::InvalidData`] when no loot tables are
    /// provided; every depth needs one to populate its rooms.
    pub fn new(
        seed: &str,
        config: GenerationConfig,
        loot_tables: Vec<LootTable>,
        effect_book: EffectBook,
    ) -> WarrenResult<Self> {
        if loot_tables.is_empty() {
            return Err(WarrenError::InvalidData(
                "a session needs at least one loot table".to_string(),
            ));
        }

        let mut streams = RngStreams::from_seed(seed);
        let runtime_rng = StdRng::seed_from_u64(streams.ai.gen::<u64>());

        let level = Level::generate(1, &config, &mut streams.generation);
        let rooms = build_rooms(&level, &loot_tables, &config, &mut streams);
        let player = Player::new(Position::origin());

        log::info!("session started: seed {seed:?}");

        Ok(Self {
            config,
            streams,
            loot_tables,
            effect_book,
            runtime_rng,
            level,
            rooms,
            player,
            phase: Phase::Exploring,
            current_room: None,
            fighting_enemy: None,
            fight: None,
            last_step: None,
        })
    }

    /// The session's current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The room the player is in, if any.
    pub fn current_room(&self) -> Option<&Room> {
        self.current_room.and_then(|position| self.rooms.get(&position))
    }

    /// The room generated for a level position, for display.
    pub fn room_at(&self, position: Position) -> Option<&Room> {
        self.rooms.get(&position)
    }

    /// The enemy the player is currently fighting, if any.
    pub fn opponent(&self) -> Option<&Enemy> {
        let index = self.fighting_enemy?;
        self.current_room()?.enemies.get(index)
    }

    /// The ongoing fight, if any.
    pub fn fight(&self) -> Option<&Fight> {
        self.fight.as_ref()
    }

    /// The graph the player currently moves on.
    pub fn active_graph(&self) -> &Graph {
        match self.current_room() {
            Some(room) => &room.graph,
            None => &self.level.graph,
        }
    }

    /// Resolves a movement intent.
    ///
    /// Steps are gated at [`config::STEP_INTERVAL`]. Walking onto stairs
    /// descends, onto a room entry enters the room, onto a door leaves it,
    /// onto an item picks it up, and onto an enemy starts a fight.
    pub fn step(&mut self, direction: Direction, now: Instant) -> Vec<DungeonEvent> {
        let mut events = Vec::new();

        if !matches!(self.phase, Phase::Exploring | Phase::InRoom) {
            return events;
        }
        if let Some(last) = self.last_step {
            if now.duration_since(last) < config::STEP_INTERVAL {
                return events;
            }
        }
        self.last_step = Some(now);

        match self.phase {
            Phase::Exploring => {
                self.player.movement.step(&self.level.graph, direction);
                let position = self.player.movement.position;

                if self.level.is_stair(position) {
                    self.descend(&mut events);
                } else if self.level.is_room(position) {
                    self.enter_room(position, &mut events);
                }
            }
            Phase::InRoom => {
                let Some(room_position) = self.current_room else {
                    return events;
                };
                if let Some(room) = self.rooms.get(&room_position) {
                    self.player.movement.step(&room.graph, direction);
                }
                let position = self.player.movement.position;

                let at_door = self
                    .rooms
                    .get(&room_position)
                    .is_some_and(|room| room.is_door(position));
                if at_door {
                    self.exit_room(&mut events);
                    return events;
                }

                if let Some(room) = self.rooms.get_mut(&room_position) {
                    if let Some(item) = room.items.remove(&position) {
                        let name = item.name.clone();
                        match self.player.inventory.add_item(item) {
                            Ok(_) => events.push(DungeonEvent::PickedUp { item: name }),
                            Err(item) => {
                                events.push(DungeonEvent::InventoryFull { item: name });
                                room.items.insert(position, item);
                            }
                        }
                    }
                }

                if let Some(index) = self.enemy_at(room_position, position) {
                    self.start_fight(index, now, &mut events);
                }
            }
            _ => {}
        }

        events
    }

    /// Resolves a player attack intent. Only meaningful during a fight.
    pub fn attack(&mut self, now: Instant) -> Vec<DungeonEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Fighting {
            return events;
        }

        let (Some(room_position), Some(index), Some(mut fight)) =
            (self.current_room, self.fighting_enemy, self.fight)
        else {
            return events;
        };
        let Some(enemy) = self
            .rooms
            .get_mut(&room_position)
            .and_then(|room| room.enemies.get_mut(index))
        else {
            return events;
        };

        fight.player_attack(&mut self.player, enemy, now);
        self.fight = Some(fight);
        if let Some(outcome) = fight.outcome() {
            self.finish_fight(outcome, now, &mut events);
        }
        events
    }

    /// Resolves a player block intent. Only meaningful during a fight.
    pub fn block(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Fighting {
            return false;
        }
        let Some(mut fight) = self.fight else {
            return false;
        };

        let max = config::BLOCK_JITTER_MAX.as_secs_f64();
        let jitter = Duration::from_secs_f64(self.runtime_rng.gen_range(0.0..max));
        let raised = fight.player_block(&mut self.player, jitter, now);
        self.fight = Some(fight);
        raised
    }

    /// Advances the session by one poll.
    ///
    /// Applies pending effects, drives enemy behavior and aggro inside a
    /// room, and advances an ongoing fight.
    pub fn update(&mut self, now: Instant) -> Vec<DungeonEvent> {
        let mut events = Vec::new();
        self.player.update_effects();

        match self.phase {
            Phase::InRoom => {
                let Some(room_position) = self.current_room else {
                    return events;
                };
                let player_position = self.player.movement.position;

                if let Some(room) = self.rooms.get_mut(&room_position) {
                    if aggro_check(room, player_position, now) {
                        events.push(DungeonEvent::EnemyAggroed);
                    }
                    for enemy in &mut room.enemies {
                        enemy.update_ai(&room.roam_graph, now);
                    }
                }

                if let Some(index) = self.enemy_at(room_position, player_position) {
                    self.start_fight(index, now, &mut events);
                }
            }
            Phase::Fighting => {
                let (Some(room_position), Some(index), Some(mut fight)) =
                    (self.current_room, self.fighting_enemy, self.fight)
                else {
                    return events;
                };
                let Some(enemy) = self
                    .rooms
                    .get_mut(&room_position)
                    .and_then(|room| room.enemies.get_mut(index))
                else {
                    return events;
                };

                let outcome = fight.tick(&mut self.player, enemy, now);
                self.fight = Some(fight);
                if let Some(outcome) = outcome {
                    self.finish_fight(outcome, now, &mut events);
                }
            }
            _ => {}
        }

        events
    }

    /// Uses the item in a miscellaneous inventory slot.
    ///
    /// Weapons and armor are equipped, consumables queue their effects,
    /// trinkets stay where they are. An item the inventory hands back (a
    /// swap with nowhere to store the displaced gear) returns to storage.
    ///
    /// # Errors
    ///
    /// Returns [`WarrenError::UnknownEffect`] when a consumable names an
    /// effect the effect book does not know.
    pub fn use_item(&mut self, slot: usize) -> WarrenResult<bool> {
        let is_trinket = self
            .player
            .inventory
            .get_item(slot)
            .is_some_and(|item| matches!(item.kind, ItemKind::Trinket));
        if is_trinket {
            return Ok(false);
        }

        let Some(item) = self.player.inventory.remove_item(slot) else {
            return Ok(false);
        };
        match item.apply(
            &mut self.player.inventory,
            &mut self.player.effects,
            &self.effect_book,
        )? {
            Ok(()) => Ok(true),
            Err(item) => {
                let _ = self.player.inventory.add_item(item);
                Ok(false)
            }
        }
    }

    fn enemy_at(&self, room_position: Position, position: Position) -> Option<usize> {
        self.rooms
            .get(&room_position)?
            .enemies
            .iter()
            .position(|enemy| enemy.movement.position == position)
    }

    fn descend(&mut self, events: &mut Vec<DungeonEvent>) {
        let difficulty = self.level.difficulty + 1;
        self.level = Level::generate(difficulty, &self.config, &mut self.streams.generation);
        self.rooms = build_rooms(&self.level, &self.loot_tables, &self.config, &mut self.streams);

        self.player.movement.position = Position::origin();
        self.current_room = None;
        self.phase = Phase::Exploring;

        log::info!("descended to difficulty {difficulty}");
        events.push(DungeonEvent::Descended { depth: difficulty });
    }

    fn enter_room(&mut self, position: Position, events: &mut Vec<DungeonEvent>) {
        let entry_direction = self.player.movement.direction;
        let Some(room) = self.rooms.get(&position) else {
            return;
        };

        // The corridor the player came from lies behind them, so the
        // matching door is the one opening opposite their travel direction.
        let door = room
            .doors
            .iter()
            .find(|(_, opening)| **opening == entry_direction.opposite())
            .map(|(door, _)| *door);
        let Some(door) = door else {
            log::warn!("room at {position} has no door facing {entry_direction:?}");
            return;
        };

        self.player.movement.position = door.next_in_direction(entry_direction);
        self.current_room = Some(position);
        self.phase = Phase::InRoom;

        events.push(DungeonEvent::EnteredRoom { position });
    }

    fn exit_room(&mut self, events: &mut Vec<DungeonEvent>) {
        let Some(room_position) = self.current_room.take() else {
            return;
        };
        // Stepping through a door continues onto the corridor on the far
        // side of the room's level entry.
        self.player.movement.position =
            room_position.next_in_direction(self.player.movement.direction);
        self.phase = Phase::Exploring;

        events.push(DungeonEvent::ExitedRoom);
    }

    fn start_fight(&mut self, index: usize, now: Instant, events: &mut Vec<DungeonEvent>) {
        let Some(room) = self
            .current_room
            .and_then(|position| self.rooms.get_mut(&position))
        else {
            return;
        };
        let Some(enemy) = room.enemies.get_mut(index) else {
            return;
        };
        enemy.ai.enter_fight();

        for (i, other) in room.enemies.iter_mut().enumerate() {
            if i != index {
                other.ai.ai_locked = true;
            }
        }

        self.fighting_enemy = Some(index);
        self.fight = Some(Fight::new(now));
        self.phase = Phase::Fighting;

        events.push(DungeonEvent::FightStarted);
    }

    fn finish_fight(&mut self, outcome: FightOutcome, now: Instant, events: &mut Vec<DungeonEvent>) {
        events.push(DungeonEvent::FightEnded { outcome });
        self.fight = None;
        let index = self.fighting_enemy.take();

        if outcome == FightOutcome::PlayerLost {
            self.phase = Phase::GameOver;
            events.push(DungeonEvent::PlayerDied);
            return;
        }

        let Some(room) = self
            .current_room
            .and_then(|position| self.rooms.get_mut(&position))
        else {
            return;
        };
        let Some(index) = index.filter(|index| *index < room.enemies.len()) else {
            return;
        };
        let enemy = room.enemies.remove(index);

        // Quick enemies drop their weapon, tanky ones a piece of armor.
        let spoils = if enemy.combat.speed >= enemy.inventory.protection() {
            enemy.inventory.weapon().cloned()
        } else {
            enemy.inventory.first_armor().cloned()
        };
        if let Some(item) = spoils {
            events.push(DungeonEvent::SpoilsDropped {
                item: item.name.clone(),
            });
            room.items.insert(self.player.movement.position, item);
        }

        for other in &mut room.enemies {
            other.ai.ai_locked = false;
            if other.ai.has_target() {
                other.ai.end_fight(&room.roam_graph, now);
            }
        }

        let exp = enemy.combat.speed.max(0) as u32 + enemy.health.max_health;
        if self.player.give_exp(exp) > 0 {
            events.push(DungeonEvent::LeveledUp {
                level: self.player.experience.level,
            });
        }

        self.phase = Phase::InRoom;
    }
}

/// Generates the rooms of a level, in room-list order.
///
/// The per-depth loot table is `min(difficulty, tables) - 1`, so depths
/// past the last table keep reusing it.
fn build_rooms(
    level: &Level,
    loot_tables: &[LootTable],
    config: &GenerationConfig,
    streams: &mut RngStreams,
) -> HashMap<Position, Room> {
    let table_index = (level.difficulty as usize).min(loot_tables.len()) - 1;
    let loot = &loot_tables[table_index];

    let mut rooms = HashMap::new();
    for position in &level.rooms {
        let openings = level.openings(*position);
        let room = Room::generate(
            level.difficulty,
            &openings,
            loot,
            config,
            &mut streams.generation,
            &mut streams.ai,
        );
        rooms.insert(*position, room);
    }
    rooms
}

/// Checks every enemy for line-of-sight aggro and applies the first hit.
///
/// An enemy acquires the player when it faces them, sits within
/// [`config::AGGRO_RANGE`], a roam-graph path exists, and it has no target
/// yet. The winner starts chasing the player's current cell; everyone else
/// freezes until the ensuing fight ends.
fn aggro_check(room: &mut Room, player_position: Position, now: Instant) -> bool {
    let aggroed = room.enemies.iter().position(|enemy| {
        let position = enemy.movement.position;
        !enemy.ai.has_target()
            && !enemy.ai.ai_locked
            && position.manhattan_distance(player_position) <= config::AGGRO_RANGE
            && player_position.direction_of(position) == enemy.movement.direction
            && room.roam_graph.path_exists(position, player_position)
    });

    let Some(index) = aggroed else {
        return false;
    };

    for (i, enemy) in room.enemies.iter_mut().enumerate() {
        if i == index {
            enemy.ai.start_chase(player_position, now);
        } else {
            enemy.ai.ai_locked = true;
        }
    }
    log::debug!("enemy {index} aggroed onto the player");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AiState, ArmorSlot, Item};

    fn loot_table() -> LootTable {
        LootTable::from_entries(
            vec![
                (Item::new("sword", 2, ItemKind::Weapon { damage: 3 }), 0.2),
                (
                    Item::new(
                        "cap",
                        1,
                        ItemKind::Armor {
                            protection: 1,
                            slot: ArmorSlot::Head,
                        },
                    ),
                    0.2,
                ),
            ],
            2,
        )
    }

    fn dungeon(seed: &str) -> Dungeon {
        Dungeon::new(
            seed,
            GenerationConfig::new(),
            vec![loot_table()],
            EffectBook::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_starts_exploring_at_origin() {
        let dungeon = dungeon("test");
        assert_eq!(dungeon.phase(), Phase::Exploring);
        assert_eq!(dungeon.level.difficulty, 1);
        assert_eq!(dungeon.player.movement.position, Position::origin());
        assert!(dungeon.current_room().is_none());
    }

    #[test]
    fn test_empty_loot_tables_are_rejected() {
        let result = Dungeon::new(
            "test",
            GenerationConfig::new(),
            Vec::new(),
            EffectBook::standard(),
        );
        assert!(matches!(result, Err(WarrenError::InvalidData(_))));
    }

    #[test]
    fn test_every_room_entry_has_a_generated_room() {
        let dungeon = dungeon("test");
        for position in &dungeon.level.rooms {
            assert!(dungeon.room_at(*position).is_some());
        }
    }

    #[test]
    fn test_steps_are_rate_limited() {
        let mut dungeon = dungeon("test");
        let graph = dungeon.level.graph.clone();
        let now = Instant::now();

        // First step moves along a plain corridor edge.
        let first = graph
            .neighbors(Position::origin())
            .iter()
            .copied()
            .find(|cell| !dungeon.level.is_stair(*cell) && !dungeon.level.is_room(*cell))
            .expect("origin always borders a plain corridor cell");
        let direction = first.direction_of(Position::origin());
        dungeon.step(direction, now);
        assert_eq!(dungeon.player.movement.position, first);

        // An immediate second step is swallowed.
        dungeon.step(direction, now + Duration::from_millis(10));
        assert_eq!(dungeon.player.movement.position, first);

        // After the interval the next step goes through.
        dungeon.step(direction.opposite(), now + config::STEP_INTERVAL);
        assert_eq!(dungeon.player.movement.position, Position::origin());
    }

    #[test]
    fn test_sessions_with_one_seed_are_identical() {
        let a = dungeon("test");
        let b = dungeon("test");
        assert_eq!(a.level, b.level);
        for position in &a.level.rooms {
            let (ra, rb) = (a.room_at(*position).unwrap(), b.room_at(*position).unwrap());
            assert_eq!(ra.graph, rb.graph);
            assert_eq!(ra.items, rb.items);
            assert_eq!(ra.enemies.len(), rb.enemies.len());
        }
    }

    #[test]
    fn test_attack_outside_fight_is_ignored() {
        let mut dungeon = dungeon("test");
        let events = dungeon.attack(Instant::now());
        assert!(events.is_empty());
        assert!(!dungeon.block(Instant::now()));
    }

    #[test]
    fn test_use_item_on_empty_slot() {
        let mut dungeon = dungeon("test");
        assert!(!dungeon.use_item(0).unwrap());
    }

    /// A hand-built room with two enemies: a spotter at (2, 2) with the
    /// given facing, and a second enemy far out of sight range at (6, 6).
    fn stocked_room(facing: Direction) -> Room {
        let graph = Graph::grid(7, 7);
        let roam_graph = graph.clone();
        let enemies = vec![
            Enemy::new(
                8,
                6,
                Position::new(2, 2),
                facing,
                &roam_graph,
                StdRng::seed_from_u64(1),
            ),
            Enemy::new(
                8,
                6,
                Position::new(6, 6),
                Direction::North,
                &roam_graph,
                StdRng::seed_from_u64(2),
            ),
        ];
        Room {
            width: 7,
            height: 7,
            graph,
            roam_graph,
            doors: HashMap::new(),
            items: HashMap::new(),
            enemies,
        }
    }

    /// A session staged mid-room, with the player two cells south of the
    /// spotter.
    fn dungeon_in_room(facing: Direction) -> Dungeon {
        let mut dungeon = dungeon("test");
        let entry = Position::new(40, 40);
        dungeon.rooms.insert(entry, stocked_room(facing));
        dungeon.current_room = Some(entry);
        dungeon.phase = Phase::InRoom;
        dungeon.player.movement.position = Position::new(2, 4);
        dungeon
    }

    #[test]
    fn test_sighting_aggroes_spotter_and_locks_the_rest() {
        let mut dungeon = dungeon_in_room(Direction::South);
        let player = dungeon.player.movement.position;

        let events = dungeon.update(Instant::now());
        assert!(events.contains(&DungeonEvent::EnemyAggroed));

        let room = dungeon.current_room().expect("staged in a room");
        // The spotter chases the cell it saw the player on.
        assert!(matches!(
            room.enemies[0].ai.state,
            AiState::Chasing { destination, .. } if destination == player
        ));
        assert!(!room.enemies[0].ai.ai_locked);
        // Everyone else freezes.
        assert!(room.enemies[1].ai.ai_locked);
        assert!(!room.enemies[1].ai.has_target());
    }

    #[test]
    fn test_enemy_facing_away_never_aggroes() {
        // The player stands south of the spotter, which looks north.
        let mut dungeon = dungeon_in_room(Direction::North);

        let events = dungeon.update(Instant::now());
        assert!(!events.contains(&DungeonEvent::EnemyAggroed));

        let room = dungeon.current_room().expect("staged in a room");
        assert!(!room.enemies[0].ai.has_target());
        assert!(!room.enemies[1].ai.ai_locked);
    }

    #[test]
    fn test_fight_end_unlocks_the_room() {
        let mut dungeon = dungeon_in_room(Direction::South);
        let entry = dungeon.current_room.expect("staged in a room");
        let now = Instant::now();

        let events = dungeon.update(now);
        assert!(events.contains(&DungeonEvent::EnemyAggroed));

        // Let the spotter catch up by hand, down to one hit of health.
        let room = dungeon.rooms.get_mut(&entry).expect("staged room exists");
        room.enemies[0].movement.position = dungeon.player.movement.position;
        room.enemies[0].health.damage(7);

        let caught = now + Duration::from_millis(10);
        let events = dungeon.update(caught);
        assert!(events.contains(&DungeonEvent::FightStarted));
        assert_eq!(dungeon.phase(), Phase::Fighting);

        // One bare-handed hit past the warm-up finishes it.
        let swing = caught + config::FIGHT_WARMUP;
        let events = dungeon.attack(swing);
        assert!(events.contains(&DungeonEvent::FightEnded {
            outcome: FightOutcome::PlayerWon,
        }));

        let room = dungeon.rooms.get(&entry).expect("staged room exists");
        assert_eq!(room.enemies.len(), 1);
        assert!(!room.enemies[0].ai.ai_locked);
        assert_eq!(dungeon.phase(), Phase::InRoom);
    }

    #[test]
    fn test_use_item_equips_a_stored_weapon() {
        let mut dungeon = dungeon("test");
        let sword = Item::new("sword", 2, ItemKind::Weapon { damage: 3 });
        let slot = dungeon.player.inventory.add_item(sword).unwrap();

        assert!(dungeon.use_item(slot).unwrap());
        assert_eq!(
            dungeon.player.inventory.weapon().map(|w| w.name.as_str()),
            Some("sword")
        );
    }
}
