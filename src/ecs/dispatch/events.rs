use bevy::prelude::Entity;

use crate::ecs::plugins::player::persistence::{FriendRecord, ItemRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    InventoryInitialize,
    InventoryMove,
    InventoryEquip,
    InventoryCreateItem,
    MeleeAttack,
    FriendInitialize,
}

/// Every payload a system can be notified with.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    Inventory(InventoryEvent),
    Battle(BattleEvent),
    Friend(FriendEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    Initialize { items: Vec<ItemRecord> },
    Move { source_slot: i32, destination_slot: i32 },
    /// `part == -1` equips the item, any other value unequips it.
    Equip { unique_id: i32, part: i32 },
    CreateItem { item_id: i32, quantity: i32, creator_id: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    MeleeAttack { target: Entity, motion: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FriendEvent {
    Initialize { friends: Vec<FriendRecord> },
}

impl SystemEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SystemEvent::Inventory(InventoryEvent::Initialize { .. }) => EventKind::InventoryInitialize,
            SystemEvent::Inventory(InventoryEvent::Move { .. }) => EventKind::InventoryMove,
            SystemEvent::Inventory(InventoryEvent::Equip { .. }) => EventKind::InventoryEquip,
            SystemEvent::Inventory(InventoryEvent::CreateItem { .. }) => EventKind::InventoryCreateItem,
            SystemEvent::Battle(BattleEvent::MeleeAttack { .. }) => EventKind::MeleeAttack,
            SystemEvent::Friend(FriendEvent::Initialize { .. }) => EventKind::FriendInitialize,
        }
    }

    /// Checks the payload shape before any state is touched.
    pub fn check_arguments(&self) -> bool {
        match self {
            SystemEvent::Inventory(InventoryEvent::Initialize { .. }) => true,
            SystemEvent::Inventory(InventoryEvent::Move { source_slot, destination_slot }) => {
                *source_slot >= 0 && *destination_slot >= 0
            }
            SystemEvent::Inventory(InventoryEvent::Equip { unique_id, part }) => {
                *unique_id >= 0 && *part >= -1
            }
            SystemEvent::Inventory(InventoryEvent::CreateItem { item_id, quantity, .. }) => {
                *item_id > 0 && *quantity > 0
            }
            SystemEvent::Battle(BattleEvent::MeleeAttack { motion, .. }) => *motion >= 0,
            SystemEvent::Friend(FriendEvent::Initialize { .. }) => true,
        }
    }
}
