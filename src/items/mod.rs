//! # Items Module
//!
//! The item taxonomy, the JSON item registry, inventories, and loot tables.
//!
//! Items are a closed tagged union: what an item does when used is decided
//! by its [`ItemKind`] variant, not by downcasting. Every item is owned by
//! exactly one container at a time (a room's floor map or an inventory
//! slot) and moves between them by value.

pub mod inventory;
pub mod loot;

pub use inventory::*;
pub use loot::*;

use crate::{EffectBook, EffectQueue, WarrenError, WarrenResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The body slot a piece of armor occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorSlot {
    Head,
    Chest,
    Legs,
}

impl ArmorSlot {
    /// All armor slots, in fixed order.
    pub const ALL: [ArmorSlot; 3] = [ArmorSlot::Head, ArmorSlot::Chest, ArmorSlot::Legs];

    /// Returns the slot's index into slot-ordered storage.
    pub fn index(self) -> usize {
        match self {
            ArmorSlot::Head => 0,
            ArmorSlot::Chest => 1,
            ArmorSlot::Legs => 2,
        }
    }
}

/// What an item is, and the payload that comes with that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    /// An item with no use beyond carrying it around.
    Trinket,
    /// Deals its damage on a successful attack.
    Weapon { damage: i32 },
    /// Grants protection while equipped in its slot.
    Armor { protection: i32, slot: ArmorSlot },
    /// Queues its named effects when consumed.
    Consumable { effects: Vec<String> },
}

/// An item which can sit on a room floor or in an inventory.
///
/// # Examples
///
/// ```
/// use warren::{Item, ItemKind};
///
/// let sword = Item::new("rusty sword", 2, ItemKind::Weapon { damage: 3 });
/// assert_eq!(sword.damage(), Some(3));
/// assert!(sword.is_weapon());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub weight: i32,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// Creates a new item.
    pub fn new(name: impl Into<String>, weight: i32, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            weight,
            kind,
        }
    }

    /// Returns whether the item is a weapon.
    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }

    /// Returns whether the item is a piece of armor.
    pub fn is_armor(&self) -> bool {
        matches!(self.kind, ItemKind::Armor { .. })
    }

    /// Returns the weapon damage, if the item is a weapon.
    pub fn damage(&self) -> Option<i32> {
        match self.kind {
            ItemKind::Weapon { damage } => Some(damage),
            _ => None,
        }
    }

    /// Returns the armor protection, if the item is armor.
    pub fn protection(&self) -> Option<i32> {
        match self.kind {
            ItemKind::Armor { protection, .. } => Some(protection),
            _ => None,
        }
    }

    /// Returns the armor slot, if the item is armor.
    pub fn armor_slot(&self) -> Option<ArmorSlot> {
        match self.kind {
            ItemKind::Armor { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Applies the item to an entity's equipment and effect queue.
    ///
    /// Weapons and armor are equipped (storing the displaced piece, which
    /// can fail when the inventory is full; the item is then handed back).
    /// Consumables queue their effects and are used up. Trinkets are simply
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [`WarrenError::UnknownEffect`] when a consumable names an
    /// effect the book does not know.
    pub fn apply(
        self,
        inventory: &mut Inventory,
        effects: &mut EffectQueue,
        book: &EffectBook,
    ) -> WarrenResult<Result<(), Item>> {
        match &self.kind {
            ItemKind::Weapon { .. } => {
                if inventory.equip_weapon(self.clone(), true) {
                    Ok(Ok(()))
                } else {
                    Ok(Err(self))
                }
            }
            ItemKind::Armor { .. } => {
                if inventory.equip_armor(self.clone(), true) {
                    Ok(Ok(()))
                } else {
                    Ok(Err(self))
                }
            }
            ItemKind::Consumable { effects: names } => {
                for name in names {
                    let effect = book
                        .get(name)
                        .ok_or_else(|| WarrenError::UnknownEffect(name.clone()))?;
                    effects.push(effect);
                }
                Ok(Ok(()))
            }
            ItemKind::Trinket => match inventory.add_item(self) {
                Ok(_) => Ok(Ok(())),
                Err(item) => Ok(Err(item)),
            },
        }
    }
}

/// A registry of every item definition in the game.
///
/// Loaded once from a JSON data file and passed explicitly wherever item
/// definitions are needed; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct ItemBook {
    items: HashMap<String, Item>,
}

impl ItemBook {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an item registry from a JSON file.
    ///
    /// The expected shape maps item names to their definition:
    ///
    /// ```json
    /// {
    ///     "rusty sword": { "type": "weapon", "weight": 2, "damage": 3 },
    ///     "leather cap": { "type": "armor", "weight": 1, "protection": 1, "slot": "head" }
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is not valid JSON, or
    /// defines no items at all.
    pub fn load(path: impl AsRef<Path>) -> WarrenResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let definitions: HashMap<String, ItemDefinition> = serde_json::from_str(&contents)?;

        if definitions.is_empty() {
            return Err(WarrenError::InvalidData(
                "item registry defines no items".to_string(),
            ));
        }

        let mut book = ItemBook::new();
        for (name, definition) in definitions {
            let item = Item::new(name.clone(), definition.weight, definition.kind);
            book.add(item);
        }

        log::debug!("loaded {} item definitions", book.len());
        Ok(book)
    }

    /// Adds an item definition, replacing any previous one of the same name.
    pub fn add(&mut self, item: Item) {
        self.items.insert(item.name.clone(), item);
    }

    /// Looks up an item definition by name.
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Returns the number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// On-disk shape of one registry entry; the name lives in the outer map key.
#[derive(Debug, Deserialize)]
struct ItemDefinition {
    weight: i32,
    #[serde(flatten)]
    kind: ItemKind,
}
