//! # Inventory Component
//!
//! Slot-based item storage with separate weapon and armor equipment.
//!
//! A full inventory is not an error: `add_item` hands the item back so the
//! caller can leave it where it was found.

use crate::{ArmorSlot, Item};
use serde::{Deserialize, Serialize};

/// Number of general-purpose item slots.
pub const MISC_SLOTS: usize = 8;

/// An entity's item storage and equipped gear.
///
/// # Examples
///
/// ```
/// use warren::{Inventory, Item, ItemKind};
///
/// let mut inventory = Inventory::new();
/// let slot = inventory
///     .add_item(Item::new("old coin", 1, ItemKind::Trinket))
///     .expect("fresh inventory has room");
/// assert_eq!(slot, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    misc: [Option<Item>; MISC_SLOTS],
    weapon: Option<Item>,
    armor: [Option<Item>; 3],
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an item in the first free miscellaneous slot.
    ///
    /// Returns the slot index, or hands the item back when every slot is
    /// taken.
    pub fn add_item(&mut self, item: Item) -> Result<usize, Item> {
        match self.misc.iter().position(Option::is_none) {
            Some(index) => {
                self.misc[index] = Some(item);
                Ok(index)
            }
            None => Err(item),
        }
    }

    /// Returns the item stored at the given slot, if any.
    pub fn get_item(&self, index: usize) -> Option<&Item> {
        self.misc.get(index).and_then(Option::as_ref)
    }

    /// Takes the item out of the given slot.
    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        self.misc.get_mut(index).and_then(Option::take)
    }

    /// Returns whether every miscellaneous slot is taken.
    pub fn is_full(&self) -> bool {
        self.misc.iter().all(Option::is_some)
    }

    /// Equips a weapon.
    ///
    /// With `store_current`, the displaced weapon goes back into a
    /// miscellaneous slot; the swap is refused when there is no room for
    /// it. Without, the displaced weapon is simply dropped, which is the
    /// semantics used when outfitting freshly spawned enemies.
    ///
    /// Refuses items that are not weapons.
    pub fn equip_weapon(&mut self, weapon: Item, store_current: bool) -> bool {
        if !weapon.is_weapon() {
            return false;
        }
        if store_current {
            if let Some(current) = self.weapon.take() {
                if let Err(current) = self.add_item(current) {
                    self.weapon = Some(current);
                    return false;
                }
            }
        }
        self.weapon = Some(weapon);
        true
    }

    /// Returns the equipped weapon, if any.
    pub fn weapon(&self) -> Option<&Item> {
        self.weapon.as_ref()
    }

    /// Unequips the weapon into a miscellaneous slot.
    pub fn store_weapon(&mut self) -> Option<usize> {
        let weapon = self.weapon.take()?;
        match self.add_item(weapon) {
            Ok(index) => Some(index),
            Err(weapon) => {
                self.weapon = Some(weapon);
                None
            }
        }
    }

    /// Equips a piece of armor in the slot its kind names.
    ///
    /// Same storage semantics as [`Inventory::equip_weapon`]. Refuses items
    /// that are not armor.
    pub fn equip_armor(&mut self, armor: Item, store_current: bool) -> bool {
        let slot = match armor.armor_slot() {
            Some(slot) => slot,
            None => return false,
        };
        if store_current {
            if let Some(current) = self.armor[slot.index()].take() {
                if let Err(current) = self.add_item(current) {
                    self.armor[slot.index()] = Some(current);
                    return false;
                }
            }
        }
        self.armor[slot.index()] = Some(armor);
        true
    }

    /// Returns the armor equipped in the given slot, if any.
    pub fn armor(&self, slot: ArmorSlot) -> Option<&Item> {
        self.armor[slot.index()].as_ref()
    }

    /// Unequips the armor in the given slot into a miscellaneous slot.
    pub fn store_armor(&mut self, slot: ArmorSlot) -> Option<usize> {
        let armor = self.armor[slot.index()].take()?;
        match self.add_item(armor) {
            Ok(index) => Some(index),
            Err(armor) => {
                self.armor[slot.index()] = Some(armor);
                None
            }
        }
    }

    /// Returns the first equipped armor piece, in slot order.
    pub fn first_armor(&self) -> Option<&Item> {
        self.armor.iter().find_map(Option::as_ref)
    }

    /// Total protection granted by the equipped armor.
    pub fn protection(&self) -> i32 {
        self.armor
            .iter()
            .flatten()
            .filter_map(Item::protection)
            .sum()
    }

    /// Total weight of the equipped weapon and armor.
    ///
    /// Carried but unequipped items do not slow a fighter down.
    pub fn equipped_weight(&self) -> i32 {
        let armor_weight: i32 = self.armor.iter().flatten().map(|piece| piece.weight).sum();
        self.weapon.as_ref().map_or(0, |weapon| weapon.weight) + armor_weight
    }
}
