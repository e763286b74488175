//! Tests for the on-disk data formats: the item registry, loot tables,
//! and seed lists, including the files shipped under `data/`.

use std::fs;
use std::path::PathBuf;
use warren::{
    load_loot_tables, load_seed_list, Dungeon, EffectBook, GenerationConfig, ItemBook, LootTable,
    WarrenError,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

#[test]
fn test_shipped_data_files_load() {
    let book = ItemBook::load(data_dir().join("items.json")).expect("items.json parses");
    assert!(!book.is_empty());

    let tables =
        load_loot_tables(data_dir().join("loot_tables"), &book).expect("loot tables parse");
    assert_eq!(tables.len(), 3);

    // The shipped data supports a full session.
    let dungeon = Dungeon::new(
        "winding-burrow",
        GenerationConfig::new(),
        tables,
        EffectBook::standard(),
    );
    assert!(dungeon.is_ok());
}

#[test]
fn test_shipped_seed_list_loads() {
    let seeds = load_seed_list(data_dir().join("seeds.txt")).expect("seeds.txt reads");
    assert!(!seeds.is_empty());
    for seed in &seeds {
        assert_eq!(seed, seed.trim());
        assert!(!seed.is_empty());
    }
}

#[test]
fn test_empty_item_registry_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("items.json");
    fs::write(&path, "{}").expect("write fixture");

    let result = ItemBook::load(&path);
    assert!(matches!(result, Err(WarrenError::InvalidData(_))));
}

#[test]
fn test_malformed_registry_is_a_serde_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("items.json");
    fs::write(&path, r#"{ "thing": { "weight": "heavy" } }"#).expect("write fixture");

    let result = ItemBook::load(&path);
    assert!(matches!(result, Err(WarrenError::Serde(_))));
}

#[test]
fn test_missing_registry_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = ItemBook::load(dir.path().join("nope.json"));
    assert!(matches!(result, Err(WarrenError::Io(_))));
}

#[test]
fn test_loot_table_rejects_unknown_items() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("table.json");
    fs::write(&path, r#"{ "items": { "ghost blade": 0.5 }, "amount": 2 }"#).expect("write fixture");

    let book = ItemBook::new();
    let result = LootTable::load(&path, &book);
    assert!(matches!(result, Err(WarrenError::UnknownItem(name)) if name == "ghost blade"));
}

#[test]
fn test_loot_table_rejects_non_positive_weights() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("table.json");
    fs::write(
        &path,
        r#"{ "items": { "rusty sword": 0.0 }, "amount": 2 }"#,
    )
    .expect("write fixture");

    let book = ItemBook::load(data_dir().join("items.json")).expect("items.json parses");
    let result = LootTable::load(&path, &book);
    assert!(matches!(result, Err(WarrenError::InvalidData(_))));
}

#[test]
fn test_loot_tables_load_in_file_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Written out of order on purpose.
    for (file, amount) in [("b.json", 2), ("a.json", 1), ("c.json", 3)] {
        fs::write(
            dir.path().join(file),
            format!(r#"{{ "items": {{ "old coin": 0.5 }}, "amount": {amount} }}"#),
        )
        .expect("write fixture");
    }
    // A stray non-JSON file is ignored.
    fs::write(dir.path().join("notes.txt"), "not a table").expect("write fixture");

    let book = ItemBook::load(data_dir().join("items.json")).expect("items.json parses");
    let tables = load_loot_tables(dir.path(), &book).expect("tables parse");

    let amounts: Vec<usize> = tables.iter().map(LootTable::amount).collect();
    assert_eq!(amounts, vec![1, 2, 3]);
}

#[test]
fn test_seed_list_skips_blank_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("seeds.txt");
    fs::write(&path, "alpha\n\n  beta  \n\n").expect("write fixture");

    let seeds = load_seed_list(&path).expect("seed list reads");
    assert_eq!(seeds, vec!["alpha".to_string(), "beta".to_string()]);
}
