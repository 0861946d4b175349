use bevy::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use crate::ecs::core::catalog::ItemData;

pub const EQUIP_OFFSET: usize = 42;
pub const MAX_ITEMS: usize = 73;
pub const INVENTORY_SIZE: usize = EQUIP_OFFSET;
pub const MAX_HUMAN_PARTS: usize = MAX_ITEMS - EQUIP_OFFSET;
pub const RIGHT_WEAPON_SLOT: usize = 52;

/// Catalog id of an empty cell.
pub const EMPTY_ITEM_ID: i32 = -1;
/// Unique id of a cell that has no client handle.
pub const NO_UNIQUE_ID: i32 = -1;
/// Slot of a cell that holds no item.
pub const NO_SLOT: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i32,
    pub unique_id: i32,
    pub slot: i32,
    pub quantity: i32,
    pub creator_id: i32,
    pub data: Option<Arc<ItemData>>,
}

impl Item {
    pub fn empty(unique_id: i32) -> Self {
        Self {
            id: EMPTY_ITEM_ID,
            unique_id,
            slot: NO_SLOT,
            quantity: 0,
            creator_id: -1,
            data: None,
        }
    }

    pub fn new(data: Arc<ItemData>, quantity: i32, creator_id: i32) -> Self {
        Self {
            id: data.id,
            unique_id: NO_UNIQUE_ID,
            slot: NO_SLOT,
            quantity,
            creator_id,
            data: Some(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_ITEM_ID
    }

    pub fn has_handle(&self) -> bool {
        self.unique_id != NO_UNIQUE_ID
    }

    pub fn is_stackable(&self) -> bool {
        self.data.as_ref().is_some_and(|data| data.stackable)
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            unique_id: self.unique_id,
            slot: self.slot,
            quantity: self.quantity,
            creator_id: self.creator_id,
        }
    }
}

/// Plain copy of an item's identity fields, safe to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub id: i32,
    pub unique_id: i32,
    pub slot: i32,
    pub quantity: i32,
    pub creator_id: i32,
}

/// Fixed-size item array.
///
/// Every index below `max_capacity` always holds a cell; empty cells have
/// `id == -1`. Only the first `max_managed_capacity` cells take part in
/// free-slot searches. The rest are equip slots.
///
/// Cells are only ever exchanged through [`ItemContainerComponent::swap`],
/// which keeps two rules: managed cells always carry a handle, and empty
/// cells outside the managed region never do.
#[derive(Component, Debug, Clone)]
pub struct ItemContainerComponent {
    max_capacity: usize,
    max_managed_capacity: usize,
    items: Vec<Item>,
}

impl ItemContainerComponent {
    pub fn new(max_capacity: usize, max_managed_capacity: usize) -> Self {
        let items = (0..max_capacity).map(|i| Item::empty(i as i32)).collect();
        Self {
            max_capacity,
            max_managed_capacity: max_managed_capacity.min(max_capacity),
            items,
        }
    }

    /// Container sized for a player: backpack plus equip parts.
    pub fn player_inventory() -> Self {
        Self::new(MAX_ITEMS, INVENTORY_SIZE)
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn max_managed_capacity(&self) -> usize {
        self.max_managed_capacity
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, slot: usize) -> Option<&Item> {
        self.items.get(slot)
    }

    /// Converts a client-supplied slot into an index, if in bounds.
    pub fn index_of(&self, slot: i32) -> Option<usize> {
        usize::try_from(slot).ok().filter(|&index| index < self.max_capacity)
    }

    /// Occupied cells in the managed region.
    pub fn item_count(&self) -> usize {
        self.items[..self.max_managed_capacity]
            .iter()
            .filter(|item| item.slot != NO_SLOT)
            .count()
    }

    /// Index of the occupied cell holding `unique_id`.
    pub fn find_by_unique_id(&self, unique_id: i32) -> Option<usize> {
        if unique_id == NO_UNIQUE_ID {
            return None;
        }
        self.items
            .iter()
            .position(|item| !item.is_empty() && item.unique_id == unique_id)
    }

    pub fn available_slot(&self) -> Option<usize> {
        self.items[..self.max_managed_capacity]
            .iter()
            .position(|item| item.slot == NO_SLOT)
    }

    pub fn has_available_slots(&self) -> bool {
        self.available_slot().is_some()
    }

    /// Free managed cells.
    pub fn available_slot_count(&self) -> usize {
        self.items[..self.max_managed_capacity]
            .iter()
            .filter(|item| item.slot == NO_SLOT)
            .count()
    }

    /// Places `item` at `index`, taking over the cell's handle.
    pub fn place(&mut self, index: usize, mut item: Item) -> Option<&Item> {
        let cell_handle = self.items.get(index)?.unique_id;
        item.unique_id = if cell_handle == NO_UNIQUE_ID {
            self.fresh_unique_id()
        } else {
            cell_handle
        };
        item.slot = index as i32;
        self.items[index] = item;
        self.items.get(index)
    }

    /// Adds `item` into the first free managed cell.
    pub fn add(&mut self, item: Item) -> Option<usize> {
        if item.data.is_none() {
            return None;
        }
        let index = self.available_slot()?;
        self.place(index, item);
        Some(index)
    }

    /// Exchanges two cells as one step and re-syncs their slot fields.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a >= self.max_capacity || b >= self.max_capacity {
            return;
        }
        self.items.swap(a, b);
        self.normalize(a);
        if a != b {
            self.normalize(b);
        }
    }

    /// Drops the handle of every empty cell outside the managed region.
    pub fn clear_unmanaged_handles(&mut self) {
        for item in self.items[self.max_managed_capacity..].iter_mut() {
            if item.is_empty() {
                item.unique_id = NO_UNIQUE_ID;
            }
        }
    }

    /// True when no two occupied cells share a handle.
    pub fn has_unique_handles(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.items
            .iter()
            .filter(|item| !item.is_empty())
            .all(|item| item.unique_id != NO_UNIQUE_ID && seen.insert(item.unique_id))
    }

    fn normalize(&mut self, index: usize) {
        let managed = index < self.max_managed_capacity;
        let needs_handle = {
            let item = &mut self.items[index];
            if item.is_empty() {
                item.slot = NO_SLOT;
                if !managed {
                    item.unique_id = NO_UNIQUE_ID;
                }
            } else {
                item.slot = index as i32;
            }
            managed && item.unique_id == NO_UNIQUE_ID
        };

        if needs_handle {
            let handle = self.fresh_unique_id();
            self.items[index].unique_id = handle;
        }
    }

    /// Smallest handle not carried by any cell.
    fn fresh_unique_id(&self) -> i32 {
        let mut used = vec![false; self.max_capacity + 1];
        for item in &self.items {
            if let Ok(handle) = usize::try_from(item.unique_id) {
                if handle < used.len() {
                    used[handle] = true;
                }
            }
        }
        used.iter().position(|taken| !taken).unwrap_or(self.max_capacity) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword() -> Arc<ItemData> {
        Arc::new(ItemData {
            id: 21,
            parts: 10,
            ..Default::default()
        })
    }

    #[test]
    fn new_container_has_no_holes() {
        let container = ItemContainerComponent::player_inventory();
        assert_eq!(container.items().len(), MAX_ITEMS);
        assert_eq!(container.max_managed_capacity(), EQUIP_OFFSET);
        assert!(container.items().iter().enumerate().all(|(i, item)| item.unique_id == i as i32));
        assert_eq!(container.available_slot(), Some(0));
    }

    #[test]
    fn add_takes_over_cell_handle() {
        let mut container = ItemContainerComponent::player_inventory();
        let index = container.add(Item::new(sword(), 1, -1)).unwrap();
        let item = container.get(index).unwrap();

        assert_eq!(index, 0);
        assert_eq!(item.slot, 0);
        assert_eq!(item.unique_id, 0);
        assert_eq!(container.item_count(), 1);
        assert_eq!(container.available_slot(), Some(1));
    }

    #[test]
    fn managed_region_full_means_no_slot() {
        let mut container = ItemContainerComponent::new(4, 2);
        container.add(Item::new(sword(), 1, -1)).unwrap();
        container.add(Item::new(sword(), 1, -1)).unwrap();

        assert!(!container.has_available_slots());
        assert_eq!(container.add(Item::new(sword(), 1, -1)), None);
    }

    #[test]
    fn swap_keeps_sentinels_consistent() {
        let mut container = ItemContainerComponent::player_inventory();
        container.clear_unmanaged_handles();
        container.add(Item::new(sword(), 1, -1)).unwrap();

        container.swap(0, RIGHT_WEAPON_SLOT);

        let equipped = container.get(RIGHT_WEAPON_SLOT).unwrap();
        assert_eq!(equipped.slot, RIGHT_WEAPON_SLOT as i32);
        assert_eq!(equipped.unique_id, 0);

        let left_behind = container.get(0).unwrap();
        assert!(left_behind.is_empty());
        assert_eq!(left_behind.slot, NO_SLOT);
        assert!(left_behind.has_handle());
        assert_ne!(left_behind.unique_id, 0);
        assert!(container.has_unique_handles());
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let container = ItemContainerComponent::player_inventory();
        assert_eq!(container.index_of(-1), None);
        assert_eq!(container.index_of(MAX_ITEMS as i32), None);
        assert_eq!(container.index_of(5), Some(5));
    }
}
