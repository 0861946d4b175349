/*!
# Inventory Operations

The inventory state machine, as plain functions over a container.

Each operation validates everything it needs before touching a cell, so a
rejected operation leaves the container exactly as it was. Cells only move
through [`ItemContainerComponent::swap`], one exchange at a time.
*/

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::ecs::components::Gender;
use crate::ecs::core::catalog::{GameCatalog, ItemData};
use crate::ecs::plugins::inventory::components::*;
use crate::ecs::plugins::network::components::DefineText;
use crate::ecs::plugins::player::persistence::ItemRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("slot {0} is out of range")]
    SlotOutOfRange(i32),

    #[error("source slot {0} is empty")]
    EmptySource(i32),

    #[error("slot {0} has no unique id")]
    InvalidUniqueId(i32),

    #[error("slot {0} is an equip slot")]
    EquipSlot(i32),

    #[error("no item with unique id {0}")]
    ItemNotFound(i32),

    #[error("item {0} is already equipped")]
    AlreadyEquipped(i32),

    #[error("item {0} is not equipped")]
    NotEquipped(i32),

    #[error("invalid equip part {0}")]
    InvalidPart(i32),

    #[error("wrong sex for this armor")]
    WrongGender,

    #[error("player level {level} is below the required {required}")]
    LevelTooLow { required: i32, level: i32 },

    #[error("no space available in inventory")]
    NoSpace,

    #[error("item stacking is not implemented")]
    StackingUnsupported,
}

impl InventoryError {
    /// Game-rule outcomes the player caused, as opposed to malformed requests.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            InventoryError::WrongGender
                | InventoryError::LevelTooLow { .. }
                | InventoryError::NoSpace
                | InventoryError::StackingUnsupported
        )
    }

    pub fn feedback(&self) -> Option<DefineText> {
        match self {
            InventoryError::WrongGender => Some(DefineText::WrongSex),
            InventoryError::LevelTooLow { .. } => Some(DefineText::LowLevel),
            InventoryError::NoSpace => Some(DefineText::LackSpace),
            _ => None,
        }
    }
}

/// What the equipping character brings to the item requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipRequirements {
    pub gender: Gender,
    pub level: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipChange {
    Equipped { item: ItemSnapshot, parts: i32 },
    Unequipped { item: ItemSnapshot, parts: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub requested: i32,
    pub created: Vec<ItemSnapshot>,
}

impl CreateOutcome {
    /// Units that did not fit.
    pub fn missing(&self) -> i32 {
        self.requested - self.created.len() as i32
    }
}

/// Builds a player inventory from persisted records.
///
/// Each record keeps the handle its slot already had. Empty equip slots end
/// up without a handle.
pub fn initialize_inventory(records: &[ItemRecord], catalog: &GameCatalog) -> ItemContainerComponent {
    let mut inventory = ItemContainerComponent::player_inventory();

    for record in records {
        let Some(index) = inventory.index_of(record.item_slot) else {
            warn!(item_id = record.item_id, slot = record.item_slot, "Persisted item slot is out of range");
            continue;
        };
        let Some(data) = catalog.item(record.item_id) else {
            warn!(item_id = record.item_id, slot = record.item_slot, "Persisted item is not in the catalog");
            continue;
        };
        if inventory.get(index).is_some_and(|cell| !cell.is_empty()) {
            warn!(item_id = record.item_id, slot = record.item_slot, "Two persisted items share a slot");
            continue;
        }

        inventory.place(index, Item::new(data, record.quantity, record.creator_id));
    }

    inventory.clear_unmanaged_handles();
    inventory
}

/// Swaps two backpack cells. Equip cells only change through [`equip_item`].
pub fn move_item(
    inventory: &mut ItemContainerComponent,
    source_slot: i32,
    destination_slot: i32,
) -> Result<(), InventoryError> {
    let source = inventory
        .index_of(source_slot)
        .ok_or(InventoryError::SlotOutOfRange(source_slot))?;
    let destination = inventory
        .index_of(destination_slot)
        .ok_or(InventoryError::SlotOutOfRange(destination_slot))?;
    if source >= EQUIP_OFFSET {
        return Err(InventoryError::EquipSlot(source_slot));
    }
    if destination >= EQUIP_OFFSET {
        return Err(InventoryError::EquipSlot(destination_slot));
    }

    let source_item = &inventory.items()[source];
    let destination_item = &inventory.items()[destination];

    if source_item.is_empty() {
        return Err(InventoryError::EmptySource(source_slot));
    }
    if !source_item.has_handle() {
        return Err(InventoryError::InvalidUniqueId(source_slot));
    }
    if !destination_item.has_handle() {
        return Err(InventoryError::InvalidUniqueId(destination_slot));
    }
    if source_item.id == destination_item.id && source_item.is_stackable() {
        // TODO: merge stacks once quantity limits come from the catalog.
        return Err(InventoryError::StackingUnsupported);
    }

    inventory.swap(source, destination);
    Ok(())
}

/// Equips (`part == -1`) or unequips the item holding `unique_id`.
pub fn equip_item(
    inventory: &mut ItemContainerComponent,
    owner: EquipRequirements,
    unique_id: i32,
    part: i32,
) -> Result<Vec<EquipChange>, InventoryError> {
    let index = inventory
        .find_by_unique_id(unique_id)
        .ok_or(InventoryError::ItemNotFound(unique_id))?;

    if part != -1 {
        return unequip_item(inventory, index).map(|change| vec![change]);
    }

    if index >= EQUIP_OFFSET {
        return Err(InventoryError::AlreadyEquipped(unique_id));
    }

    let data = inventory
        .get(index)
        .and_then(|item| item.data.clone())
        .ok_or(InventoryError::ItemNotFound(unique_id))?;

    check_requirements(&data, owner)?;

    let destination = equip_slot(inventory, data.parts).ok_or(InventoryError::InvalidPart(data.parts))?;
    let mut changes = Vec::with_capacity(2);

    let occupied = inventory.get(destination).is_some_and(|cell| !cell.is_empty());
    if occupied {
        changes.push(unequip_item(inventory, destination)?);
    }

    inventory.swap(index, destination);
    let equipped = inventory.items()[destination].snapshot();
    changes.push(EquipChange::Equipped {
        item: equipped,
        parts: data.parts,
    });

    Ok(changes)
}

/// Moves the equipped item at `index` back into the first free managed slot.
pub fn unequip_item(inventory: &mut ItemContainerComponent, index: usize) -> Result<EquipChange, InventoryError> {
    let item = inventory
        .get(index)
        .ok_or(InventoryError::SlotOutOfRange(index as i32))?;

    if item.is_empty() || index < EQUIP_OFFSET {
        return Err(InventoryError::NotEquipped(item.unique_id));
    }

    let available = inventory.available_slot().ok_or(InventoryError::NoSpace)?;
    let parts = (index as i32 - EQUIP_OFFSET as i32).abs();

    inventory.swap(index, available);

    Ok(EquipChange::Unequipped {
        item: inventory.items()[available].snapshot(),
        parts,
    })
}

/// Creates `quantity` single items, stopping early when the backpack is full.
pub fn create_item(
    inventory: &mut ItemContainerComponent,
    data: Arc<ItemData>,
    quantity: i32,
    creator_id: i32,
) -> Result<CreateOutcome, InventoryError> {
    if data.stackable {
        return Err(InventoryError::StackingUnsupported);
    }

    let mut outcome = CreateOutcome {
        requested: quantity,
        created: Vec::new(),
    };

    for _ in 0..quantity {
        let Some(index) = inventory.add(Item::new(data.clone(), 1, creator_id)) else {
            break;
        };
        outcome.created.push(inventory.items()[index].snapshot());
    }

    Ok(outcome)
}

fn check_requirements(data: &ItemData, owner: EquipRequirements) -> Result<(), InventoryError> {
    if data.is_armor() && data.sex.is_some_and(|sex| sex != owner.gender) {
        return Err(InventoryError::WrongGender);
    }
    if owner.level < data.limit_level {
        return Err(InventoryError::LevelTooLow {
            required: data.limit_level,
            level: owner.level,
        });
    }
    Ok(())
}

fn equip_slot(inventory: &ItemContainerComponent, parts: i32) -> Option<usize> {
    let parts = usize::try_from(parts).ok()?;
    let slot = EQUIP_OFFSET + parts;
    (parts < MAX_HUMAN_PARTS && slot < inventory.max_capacity()).then_some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::catalog::{ItemKind, WeaponType};
    use proptest::prelude::{Just, Strategy, any, prop, prop_assert, prop_assert_eq, prop_oneof, proptest};
    use std::collections::HashSet;

    const SWORD: i32 = 21;
    const OTHER_SWORD: i32 = 22;
    const FEMALE_VEST: i32 = 500;
    const HIGH_LEVEL_AXE: i32 = 600;
    const POTION: i32 = 700;

    fn catalog() -> GameCatalog {
        let mut catalog = GameCatalog::new();
        for (id, weapon_type) in [(SWORD, WeaponType::MeleeSword), (OTHER_SWORD, WeaponType::MeleeSword)] {
            catalog.insert_item(ItemData {
                id,
                kind: ItemKind::Weapon,
                weapon_type,
                parts: 10,
                ..Default::default()
            });
        }
        catalog.insert_item(ItemData {
            id: FEMALE_VEST,
            kind: ItemKind::Armor,
            sex: Some(Gender::Female),
            parts: 2,
            ..Default::default()
        });
        catalog.insert_item(ItemData {
            id: HIGH_LEVEL_AXE,
            kind: ItemKind::Weapon,
            weapon_type: WeaponType::MeleeAxe,
            limit_level: 60,
            parts: 10,
            ..Default::default()
        });
        catalog.insert_item(ItemData {
            id: POTION,
            kind: ItemKind::Consumable,
            stackable: true,
            ..Default::default()
        });
        catalog
    }

    fn record(item_id: i32, item_slot: i32) -> ItemRecord {
        ItemRecord {
            item_id,
            item_slot,
            quantity: 1,
            creator_id: -1,
        }
    }

    fn male(level: i32) -> EquipRequirements {
        EquipRequirements {
            gender: Gender::Male,
            level,
        }
    }

    fn unique_id_at(inventory: &ItemContainerComponent, slot: usize) -> i32 {
        inventory.get(slot).unwrap().unique_id
    }

    #[test]
    fn initialize_places_records_and_clears_equip_handles() {
        let catalog = catalog();
        let inventory = initialize_inventory(&[record(SWORD, 3), record(OTHER_SWORD, 52)], &catalog);

        assert_eq!(inventory.items().len(), MAX_ITEMS);
        assert_eq!(inventory.get(3).unwrap().id, SWORD);
        assert_eq!(unique_id_at(&inventory, 3), 3);
        assert_eq!(inventory.get(52).unwrap().id, OTHER_SWORD);
        assert_eq!(unique_id_at(&inventory, 52), 52);

        for slot in EQUIP_OFFSET..MAX_ITEMS {
            let cell = inventory.get(slot).unwrap();
            if cell.is_empty() {
                assert_eq!(cell.unique_id, NO_UNIQUE_ID, "slot {slot}");
            }
        }
        assert!(inventory.has_unique_handles());
    }

    #[test]
    fn initialize_skips_bad_records() {
        let catalog = catalog();
        let inventory = initialize_inventory(
            &[record(SWORD, 99), record(12345, 1), record(SWORD, 2), record(OTHER_SWORD, 2)],
            &catalog,
        );

        assert_eq!(inventory.item_count(), 1);
        assert_eq!(inventory.get(2).unwrap().id, SWORD);
    }

    #[test]
    fn move_twice_restores_arrangement() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0), record(OTHER_SWORD, 5)], &catalog);
        let before: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();

        move_item(&mut inventory, 0, 5).unwrap();
        assert_eq!(inventory.get(5).unwrap().id, SWORD);
        assert_eq!(inventory.get(0).unwrap().id, OTHER_SWORD);

        move_item(&mut inventory, 5, 0).unwrap();
        let after: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn move_into_empty_backpack_slot() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0)], &catalog);
        let handle = unique_id_at(&inventory, 0);

        move_item(&mut inventory, 0, 7).unwrap();

        assert_eq!(inventory.get(7).unwrap().unique_id, handle);
        assert_eq!(inventory.get(7).unwrap().slot, 7);
        assert!(inventory.get(0).unwrap().is_empty());
        assert!(inventory.has_unique_handles());
    }

    #[test]
    fn move_rejections_leave_state_untouched() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0)], &catalog);
        let before: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();

        assert_eq!(move_item(&mut inventory, 0, MAX_ITEMS as i32), Err(InventoryError::SlotOutOfRange(73)));
        assert_eq!(move_item(&mut inventory, 1, 0), Err(InventoryError::EmptySource(1)));
        assert_eq!(move_item(&mut inventory, 0, 50), Err(InventoryError::EquipSlot(50)));

        let after: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn move_never_bypasses_equip_requirements() {
        let catalog = catalog();
        let mut inventory =
            initialize_inventory(&[record(FEMALE_VEST, 0), record(SWORD, 1), record(OTHER_SWORD, 52)], &catalog);
        let before: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();

        assert_eq!(move_item(&mut inventory, 0, 52), Err(InventoryError::EquipSlot(52)));
        assert_eq!(move_item(&mut inventory, 52, 1), Err(InventoryError::EquipSlot(52)));

        let after: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn moving_stackables_onto_each_other_is_a_stub() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(POTION, 0), record(POTION, 1)], &catalog);

        assert_eq!(move_item(&mut inventory, 0, 1), Err(InventoryError::StackingUnsupported));
        assert_eq!(unique_id_at(&inventory, 0), 0);
        assert_eq!(unique_id_at(&inventory, 1), 1);
    }

    #[test]
    fn equip_then_unequip_round_trip() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 4)], &catalog);
        let handle = unique_id_at(&inventory, 4);

        let changes = equip_item(&mut inventory, male(1), handle, -1).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], EquipChange::Equipped { parts: 10, .. }));
        assert_eq!(inventory.get(RIGHT_WEAPON_SLOT).unwrap().unique_id, handle);
        assert!(inventory.has_unique_handles());

        let changes = equip_item(&mut inventory, male(1), handle, 10).unwrap();
        let EquipChange::Unequipped { item, parts } = changes[0] else {
            panic!("expected unequip, got {changes:?}");
        };
        assert_eq!(parts, 10);
        assert_ne!(item.slot, NO_SLOT);
        assert!((item.slot as usize) < EQUIP_OFFSET);
        assert!(inventory.get(RIGHT_WEAPON_SLOT).unwrap().is_empty());
        assert_eq!(inventory.get(RIGHT_WEAPON_SLOT).unwrap().unique_id, NO_UNIQUE_ID);
        assert!(inventory.has_unique_handles());
    }

    #[test]
    fn equip_replaces_occupant() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0), record(OTHER_SWORD, 1)], &catalog);
        let first = unique_id_at(&inventory, 0);
        let second = unique_id_at(&inventory, 1);

        equip_item(&mut inventory, male(1), first, -1).unwrap();
        let changes = equip_item(&mut inventory, male(1), second, -1).unwrap();

        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], EquipChange::Unequipped { item, .. } if item.unique_id == first));
        assert!(matches!(changes[1], EquipChange::Equipped { item, .. } if item.unique_id == second));
        assert_eq!(inventory.get(RIGHT_WEAPON_SLOT).unwrap().id, OTHER_SWORD);
        assert_eq!(inventory.item_count(), 1);
        assert!(inventory.has_unique_handles());
    }

    #[test]
    fn equip_with_full_backpack_and_occupied_slot_is_rejected() {
        let catalog = catalog();
        let mut records: Vec<_> = (0..EQUIP_OFFSET as i32).map(|slot| record(SWORD, slot)).collect();
        records.push(record(OTHER_SWORD, RIGHT_WEAPON_SLOT as i32));
        let mut inventory = initialize_inventory(&records, &catalog);
        let before: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();

        let handle = unique_id_at(&inventory, 0);
        let result = equip_item(&mut inventory, male(1), handle, -1);

        assert_eq!(result, Err(InventoryError::NoSpace));
        let after: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn armor_for_other_gender_is_rejected() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(FEMALE_VEST, 0)], &catalog);
        let before: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();

        let handle = unique_id_at(&inventory, 0);
        let result = equip_item(&mut inventory, male(1), handle, -1);

        assert_eq!(result, Err(InventoryError::WrongGender));
        assert_eq!(result.unwrap_err().feedback(), Some(DefineText::WrongSex));
        let after: Vec<_> = inventory.items().iter().map(Item::snapshot).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn level_requirement_is_enforced() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(HIGH_LEVEL_AXE, 0)], &catalog);
        let handle = unique_id_at(&inventory, 0);

        assert_eq!(
            equip_item(&mut inventory, male(59), handle, -1),
            Err(InventoryError::LevelTooLow { required: 60, level: 59 })
        );
        assert!(equip_item(&mut inventory, male(60), handle, -1).is_ok());
    }

    #[test]
    fn unequip_without_space_keeps_item_equipped() {
        let catalog = catalog();
        let mut records: Vec<_> = (0..EQUIP_OFFSET as i32).map(|slot| record(SWORD, slot)).collect();
        records.push(record(OTHER_SWORD, RIGHT_WEAPON_SLOT as i32));
        let mut inventory = initialize_inventory(&records, &catalog);
        let handle = unique_id_at(&inventory, RIGHT_WEAPON_SLOT);

        assert_eq!(equip_item(&mut inventory, male(1), handle, 10), Err(InventoryError::NoSpace));
        assert_eq!(inventory.get(RIGHT_WEAPON_SLOT).unwrap().unique_id, handle);
    }

    #[test]
    fn unequip_of_backpack_item_is_rejected() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0)], &catalog);
        let handle = unique_id_at(&inventory, 0);

        assert_eq!(equip_item(&mut inventory, male(1), handle, 10), Err(InventoryError::NotEquipped(handle)));
    }

    #[test]
    fn create_stops_when_backpack_fills() {
        let catalog = catalog();
        let records: Vec<_> = (0..EQUIP_OFFSET as i32 - 2).map(|slot| record(SWORD, slot)).collect();
        let mut inventory = initialize_inventory(&records, &catalog);

        let outcome = create_item(&mut inventory, catalog.item(OTHER_SWORD).unwrap(), 5, 9).unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.missing(), 3);
        assert!(!inventory.has_available_slots());
        assert!(outcome.created.iter().all(|item| item.creator_id == 9 && item.quantity == 1));
        assert!(inventory.has_unique_handles());
    }

    #[test]
    fn create_after_equip_never_duplicates_handles() {
        let catalog = catalog();
        let mut inventory = initialize_inventory(&[record(SWORD, 0)], &catalog);
        let handle = unique_id_at(&inventory, 0);
        equip_item(&mut inventory, male(1), handle, -1).unwrap();

        create_item(&mut inventory, catalog.item(OTHER_SWORD).unwrap(), 3, -1).unwrap();

        assert!(inventory.has_unique_handles());
        assert_eq!(inventory.item_count(), 3);
    }

    #[test]
    fn stackable_creation_is_a_stub() {
        let catalog = catalog();
        let mut inventory = ItemContainerComponent::player_inventory();

        let result = create_item(&mut inventory, catalog.item(POTION).unwrap(), 3, -1);

        assert_eq!(result, Err(InventoryError::StackingUnsupported));
        assert_eq!(inventory.item_count(), 0);
    }

    // ------------------------------------------------------------------------
    // Properties over arbitrary operation sequences
    // ------------------------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Move { source: i32, destination: i32 },
        Equip { cell: usize },
        Unequip { cell: usize, part: i32 },
        Create { item_id: i32, quantity: i32 },
    }

    const ITEM_IDS: [i32; 5] = [SWORD, OTHER_SWORD, FEMALE_VEST, HIGH_LEVEL_AXE, POTION];

    fn arb_item_id() -> impl Strategy<Value = i32> {
        prop::sample::select(ITEM_IDS.to_vec())
    }

    fn arb_records() -> impl Strategy<Value = Vec<ItemRecord>> {
        prop::collection::vec(
            (arb_item_id(), -2..MAX_ITEMS as i32 + 3).prop_map(|(item_id, slot)| record(item_id, slot)),
            0..60,
        )
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let slot = -2..MAX_ITEMS as i32 + 3;
        prop_oneof![
            (slot.clone(), slot).prop_map(|(source, destination)| Op::Move { source, destination }),
            (0..MAX_ITEMS).prop_map(|cell| Op::Equip { cell }),
            (0..MAX_ITEMS, 0..MAX_HUMAN_PARTS as i32).prop_map(|(cell, part)| Op::Unequip { cell, part }),
            (arb_item_id(), 0..6i32).prop_map(|(item_id, quantity)| Op::Create { item_id, quantity }),
        ]
    }

    fn arb_owner() -> impl Strategy<Value = EquipRequirements> {
        (prop_oneof![Just(Gender::Male), Just(Gender::Female)], 1..100i32)
            .prop_map(|(gender, level)| EquipRequirements { gender, level })
    }

    fn snapshot(inventory: &ItemContainerComponent) -> Vec<ItemSnapshot> {
        inventory.items().iter().map(Item::snapshot).collect()
    }

    /// Handle and slot bookkeeping every reachable container satisfies.
    fn assert_consistent(inventory: &ItemContainerComponent) -> Result<(), String> {
        let mut handles = HashSet::new();
        for (index, item) in inventory.items().iter().enumerate() {
            if item.is_empty() {
                if item.slot != NO_SLOT {
                    return Err(format!("empty cell {index} claims slot {}", item.slot));
                }
            } else if item.slot != index as i32 {
                return Err(format!("cell {index} claims slot {}", item.slot));
            }
            if index < EQUIP_OFFSET && !item.has_handle() {
                return Err(format!("managed cell {index} lost its handle"));
            }
            if index >= EQUIP_OFFSET && item.is_empty() && item.has_handle() {
                return Err(format!("empty equip cell {index} kept handle {}", item.unique_id));
            }
            if item.has_handle() && !handles.insert(item.unique_id) {
                return Err(format!("handle {} appears twice", item.unique_id));
            }
        }
        if !inventory.has_unique_handles() {
            return Err("occupied cells share a handle".to_string());
        }
        Ok(())
    }

    fn apply(
        inventory: &mut ItemContainerComponent,
        catalog: &GameCatalog,
        owner: EquipRequirements,
        op: &Op,
    ) -> Result<(), InventoryError> {
        match *op {
            Op::Move { source, destination } => move_item(inventory, source, destination),
            Op::Equip { cell } => {
                let handle = unique_id_at(inventory, cell);
                equip_item(inventory, owner, handle, -1).map(|_| ())
            }
            Op::Unequip { cell, part } => {
                let handle = unique_id_at(inventory, cell);
                equip_item(inventory, owner, handle, part).map(|_| ())
            }
            Op::Create { item_id, quantity } => {
                let data = catalog.item(item_id).ok_or(InventoryError::ItemNotFound(item_id))?;
                create_item(inventory, data, quantity, -1).map(|_| ())
            }
        }
    }

    proptest! {
        #[test]
        fn initialized_inventory_is_consistent(records in arb_records()) {
            let inventory = initialize_inventory(&records, &catalog());

            prop_assert_eq!(inventory.items().len(), MAX_ITEMS);
            prop_assert_eq!(assert_consistent(&inventory), Ok(()));
        }

        #[test]
        fn operation_sequences_keep_the_container_consistent(
            records in arb_records(),
            owner in arb_owner(),
            ops in prop::collection::vec(arb_op(), 1..80),
        ) {
            let catalog = catalog();
            let mut inventory = initialize_inventory(&records, &catalog);

            for op in &ops {
                let before = snapshot(&inventory);
                let result = apply(&mut inventory, &catalog, owner, op);

                prop_assert_eq!(assert_consistent(&inventory), Ok(()), "after {:?}", op);
                if result.is_err() {
                    prop_assert_eq!(&before, &snapshot(&inventory), "{:?} failed but changed the container", op);
                }
            }
        }

        #[test]
        fn move_back_restores_arrangement(
            records in arb_records(),
            source in 0..EQUIP_OFFSET as i32,
            destination in 0..EQUIP_OFFSET as i32,
        ) {
            let mut inventory = initialize_inventory(&records, &catalog());
            let before = snapshot(&inventory);

            if move_item(&mut inventory, source, destination).is_ok() {
                prop_assert!(move_item(&mut inventory, destination, source).is_ok());
                prop_assert_eq!(before, snapshot(&inventory));
            }
        }

        #[test]
        fn creation_never_overfills_the_backpack(
            records in arb_records(),
            quantity in 0..80i32,
            armor in any::<bool>(),
        ) {
            let catalog = catalog();
            let mut inventory = initialize_inventory(&records, &catalog);
            let free = inventory.available_slot_count();
            let item_id = if armor { FEMALE_VEST } else { SWORD };

            let outcome = create_item(&mut inventory, catalog.item(item_id).unwrap(), quantity, -1).unwrap();

            prop_assert_eq!(outcome.created.len(), (quantity as usize).min(free));
            prop_assert_eq!(inventory.available_slot_count(), free - outcome.created.len());
            prop_assert_eq!(assert_consistent(&inventory), Ok(()));
        }
    }
}
