//! # Warren Main Entry Point
//!
//! Loads the item registry and loot tables, generates a seeded world,
//! prints the level layout, and can run a headless simulation of the
//! session loop.

use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use warren::{
    load_loot_tables, load_seed_list, Direction, Dungeon, DungeonEvent, EffectBook,
    GenerationConfig, ItemBook, Level, Phase, Position, WarrenError, WarrenResult,
};

/// Command line arguments for the warren dungeon crawler.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "A seeded dungeon-crawl world generator and simulator")]
#[command(version)]
struct Args {
    /// Seed string for world generation
    #[arg(short, long, default_value = "warren")]
    seed: String,

    /// Take the first seed from this newline-delimited list instead
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// Directory holding items.json and loot_tables/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of 100ms simulation polls to run after generation
    #[arg(long, default_value_t = 0)]
    ticks: u32,
}

fn main() -> WarrenResult<()> {
    env_logger::init();
    let args = Args::parse();

    log::info!("warren v{}", warren::VERSION);

    let seed = match &args.seed_file {
        Some(path) => load_seed_list(path)?
            .into_iter()
            .next()
            .ok_or_else(|| WarrenError::InvalidData("seed file is empty".to_string()))?,
        None => args.seed.clone(),
    };

    let book = ItemBook::load(args.data_dir.join("items.json"))?;
    let loot_tables = load_loot_tables(args.data_dir.join("loot_tables"), &book)?;

    let mut dungeon = Dungeon::new(
        &seed,
        GenerationConfig::new(),
        loot_tables,
        EffectBook::standard(),
    )?;

    println!("seed: {seed}");
    print_level(&dungeon.level, dungeon.player.movement.position);

    if args.ticks > 0 {
        simulate(&mut dungeon, args.ticks);
        print_level(&dungeon.level, dungeon.player.movement.position);
    }

    Ok(())
}

/// Prints the level maze with its points of interest.
///
/// `#` corridor, `R` room entry, `>` stairs, `@` the player.
fn print_level(level: &Level, player: Position) {
    let xs: Vec<i32> = level.graph.positions().map(|p| p.x).collect();
    let ys: Vec<i32> = level.graph.positions().map(|p| p.y).collect();
    let (Some(&min_x), Some(&max_x)) = (xs.iter().min(), xs.iter().max()) else {
        return;
    };
    let (Some(&min_y), Some(&max_y)) = (ys.iter().min(), ys.iter().max()) else {
        return;
    };

    println!("difficulty {}:", level.difficulty);
    for y in min_y..=max_y {
        let mut line = String::new();
        for x in min_x..=max_x {
            let cell = Position::new(x, y);
            let glyph = if cell == player {
                '@'
            } else if level.is_stair(cell) {
                '>'
            } else if level.is_room(cell) {
                'R'
            } else if level.graph.contains(cell) {
                '#'
            } else {
                ' '
            };
            line.push(glyph);
        }
        println!("{line}");
    }
}

/// Runs the session headless for a number of polls.
///
/// The simulated player walks toward the nearest point of interest (a
/// stair while exploring, a door while in a room) and mashes attack in a
/// fight; events are printed as they happen.
fn simulate(dungeon: &mut Dungeon, ticks: u32) {
    let start = Instant::now();

    for tick in 0..ticks {
        let now = start + Duration::from_millis(100 * u64::from(tick));

        for event in dungeon.update(now) {
            report(&event);
        }
        if dungeon.phase() == Phase::GameOver {
            break;
        }

        if let Some(direction) = next_move(dungeon) {
            for event in dungeon.step(direction, now) {
                report(&event);
            }
        } else if dungeon.phase() == Phase::Fighting {
            for event in dungeon.attack(now) {
                report(&event);
            }
        }
    }
}

/// The direction of the simulated player's next step, if they should move.
fn next_move(dungeon: &Dungeon) -> Option<Direction> {
    let position = dungeon.player.movement.position;

    let target = match dungeon.phase() {
        Phase::Exploring => dungeon.level.stairs.iter().copied().min(),
        Phase::InRoom => dungeon.current_room()?.doors.keys().copied().min(),
        _ => None,
    }?;

    let next = dungeon.active_graph().first_step(position, target)?;
    Some(next.direction_of(position))
}

fn report(event: &DungeonEvent) {
    match event {
        DungeonEvent::Descended { depth } => println!("descended to depth {depth}"),
        DungeonEvent::EnteredRoom { position } => println!("entered room at {position}"),
        DungeonEvent::ExitedRoom => println!("left the room"),
        DungeonEvent::PickedUp { item } => println!("picked up {item}"),
        DungeonEvent::InventoryFull { item } => println!("no room for {item}"),
        DungeonEvent::EnemyAggroed => println!("an enemy spotted you"),
        DungeonEvent::FightStarted => println!("a fight broke out"),
        DungeonEvent::FightEnded { outcome } => println!("fight over: {outcome:?}"),
        DungeonEvent::SpoilsDropped { item } => println!("the enemy dropped {item}"),
        DungeonEvent::LeveledUp { level } => println!("reached level {level}"),
        DungeonEvent::PlayerDied => println!("you died"),
    }
}
