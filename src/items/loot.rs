//! # Loot Tables
//!
//! Weighted sampling of item drops used to populate rooms.
//!
//! A table's weights are drop probabilities; any probability mass the
//! entries leave unclaimed becomes an implicit empty-handed draw, so a
//! table whose weights sum to 0.6 comes up empty 40% of the time.
//!
//! Entries are kept sorted by item name so that the mapping between RNG
//! draws and items is independent of file-map iteration order, part of the
//! seed-determinism contract.

use crate::{Item, ItemBook, WarrenError, WarrenResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A weighted distribution over items, with a target draw count.
///
/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct LootTable {
    entries: Vec<(Item, f64)>,
    empty_weight: f64,
    amount: usize,
}

/// On-disk shape of a loot table file.
#[derive(Debug, Deserialize)]
struct LootTableSpec {
    items: BTreeMap<String, f64>,
    amount: usize,
}

impl LootTable {
    /// Loads a loot table from a JSON file, resolving names against the
    /// item registry.
    ///
    /// The expected shape:
    ///
    /// ```json
    /// { "items": { "rusty sword": 0.2, "old coin": 0.3 }, "amount": 3 }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, when an
    /// entry names an unregistered item, or when a weight is not positive.
    pub fn load(path: impl AsRef<Path>, book: &ItemBook) -> WarrenResult<Self> {
        let contents = std::fs::read_to_string(&path)?;
        let spec: LootTableSpec = serde_json::from_str(&contents)?;

        let mut entries = Vec::with_capacity(spec.items.len());
        for (name, weight) in spec.items {
            if weight <= 0.0 {
                return Err(WarrenError::InvalidData(format!(
                    "loot weight for '{name}' must be positive, got {weight}"
                )));
            }
            let item = book
                .get(&name)
                .ok_or_else(|| WarrenError::UnknownItem(name.clone()))?;
            entries.push((item.clone(), weight));
        }

        Ok(Self::from_entries(entries, spec.amount))
    }

    /// Builds a table directly from resolved entries.
    ///
    /// Entries are sorted by item name; weights must be positive.
    pub fn from_entries(mut entries: Vec<(Item, f64)>, amount: usize) -> Self {
        entries.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
        let total: f64 = entries.iter().map(|(_, weight)| weight).sum();
        let empty_weight = (1.0 - total).max(0.0);
        Self {
            entries,
            empty_weight,
            amount,
        }
    }

    /// The number of draws [`LootTable::draws`] performs.
    pub fn amount(&self) -> usize {
        self.amount
    }

    /// Performs one weighted draw, `None` being the empty-handed result.
    pub fn draw(&self, rng: &mut StdRng) -> Option<Item> {
        if self.entries.is_empty() {
            return None;
        }

        let mut weights: Vec<f64> = self.entries.iter().map(|(_, weight)| *weight).collect();
        if self.empty_weight > 0.0 {
            weights.push(self.empty_weight);
        }

        let index = WeightedIndex::new(&weights)
            .expect("loot weights are validated positive at construction")
            .sample(rng);
        self.entries.get(index).map(|(item, _)| item.clone())
    }

    /// Performs the table's `amount` independent draws, skipping the
    /// empty-handed ones.
    pub fn draws(&self, rng: &mut StdRng) -> Vec<Item> {
        (0..self.amount).filter_map(|_| self.draw(rng)).collect()
    }

    /// Draws one weapon from the table's weapon entries.
    ///
    /// Returns `None` when the table holds no weapons; there is no
    /// empty-handed mass on kind-filtered draws.
    pub fn weapon(&self, rng: &mut StdRng) -> Option<Item> {
        self.draw_of_kind(rng, Item::is_weapon)
    }

    /// Draws one piece of armor from the table's armor entries.
    pub fn armor(&self, rng: &mut StdRng) -> Option<Item> {
        self.draw_of_kind(rng, Item::is_armor)
    }

    fn draw_of_kind(&self, rng: &mut StdRng, matches: impl Fn(&Item) -> bool) -> Option<Item> {
        let candidates: Vec<&(Item, f64)> = self
            .entries
            .iter()
            .filter(|(item, _)| matches(item))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates.iter().map(|(_, weight)| *weight).collect();
        let index = WeightedIndex::new(&weights)
            .expect("loot weights are validated positive at construction")
            .sample(rng);
        Some(candidates[index].0.clone())
    }
}

/// Loads every `.json` loot table in a directory, sorted by file name.
///
/// The sort order decides which table serves which depth, so it has to be
/// stable across platforms.
pub fn load_loot_tables(dir: impl AsRef<Path>, book: &ItemBook) -> WarrenResult<Vec<LootTable>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for path in &paths {
        tables.push(LootTable::load(path, book)?);
    }
    log::debug!("loaded {} loot tables", tables.len());
    Ok(tables)
}
