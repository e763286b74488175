//! Generation benchmarks: maze carving, room construction, and a full
//! session bootstrap.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warren::{
    ArmorSlot, Direction, Dungeon, EffectBook, GenerationConfig, Item, ItemKind, Level, LootTable,
    Room, RngStreams,
};

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
            (Item::new("coin", 1, ItemKind::Trinket), 0.2),
        ],
        3,
    )
}

fn bench_level_generation(c: &mut Criterion) {
    let config = GenerationConfig::new();
    let mut group = c.benchmark_group("level_generation");

    for difficulty in [1u32, 3, 5, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &difficulty,
            |b, &difficulty| {
                b.iter(|| {
                    let mut streams = RngStreams::from_seed("bench");
                    black_box(Level::generate(difficulty, &config, &mut streams.generation))
                })
            },
        );
    }
    group.finish();
}

fn bench_room_generation(c: &mut Criterion) {
    let config = GenerationConfig::new();
    let loot = loot_table();
    let openings = [Direction::North, Direction::East];

    c.bench_function("room_difficulty_4", |b| {
        b.iter(|| {
            let mut streams = RngStreams::from_seed("bench");
            black_box(Room::generate(
                4,
                &openings,
                &loot,
                &config,
                &mut streams.generation,
                &mut streams.ai,
            ))
        })
    });
}

fn bench_session_bootstrap(c: &mut Criterion) {
    c.bench_function("session_bootstrap", |b| {
        b.iter(|| {
            black_box(
                Dungeon::new(
                    "bench",
                    GenerationConfig::new(),
                    vec![loot_table()],
                    EffectBook::standard(),
                )
                .expect("bootstrap succeeds"),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_level_generation,
    bench_room_generation,
    bench_session_bootstrap
);
criterion_main!(benches);
