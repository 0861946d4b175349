use bevy::prelude::*;
use std::net::SocketAddr;
use tracing::{debug, error, warn};

use crate::ecs::capability::log_identity;
use crate::ecs::components::*;
use crate::ecs::core::error::WorldFault;
use crate::ecs::core::resources::CatalogHandle;
use crate::ecs::dispatch::{EventKind, InventoryEvent, SystemEvent, SystemKind, WorldSystem};
use crate::ecs::plugins::inventory::components::ItemContainerComponent;
use crate::ecs::plugins::inventory::operations::*;
use crate::ecs::plugins::network::components::{DefineText, PacketOutbox, WorldPacket};

/// Player inventory: initialize, move, equip/unequip, create.
pub struct InventorySystem;

/// The player an inventory operation runs for.
struct Owner {
    entity_id: i32,
    name: String,
    remote: Option<SocketAddr>,
    requirements: EquipRequirements,
}

impl Owner {
    fn load(world: &World, entity: Entity) -> Option<Self> {
        let identity = world.get::<WorldEntity>(entity)?;
        if identity.kind != EntityKind::Player {
            return None;
        }
        let object = world.get::<ObjectComponent>(entity)?;
        let appearance = world.get::<VisualAppearanceComponent>(entity)?;
        world.get::<PlayerDataComponent>(entity)?;

        Some(Self {
            entity_id: identity.id,
            name: object.name.clone(),
            remote: world.get::<ClientEndpoint>(entity).map(|endpoint| endpoint.0),
            requirements: EquipRequirements {
                gender: appearance.gender,
                level: object.level,
            },
        })
    }

    /// Logs a failed operation and relays feedback when the player caused it.
    fn reject(&self, outbox: &PacketOutbox, action: &str, err: &InventoryError) {
        if err.is_rejection() {
            debug!(player = %self.name, remote = ?self.remote, action, reason = %err, "Inventory action rejected");
        } else {
            warn!(player = %self.name, remote = ?self.remote, action, reason = %err, "Invalid inventory action");
        }
        if let Some(text) = err.feedback() {
            outbox.feedback(self.entity_id, text);
        }
    }
}

impl WorldSystem for InventorySystem {
    fn kind(&self) -> SystemKind {
        SystemKind::Inventory
    }

    fn filter(&self, kind: EntityKind) -> bool {
        kind == EntityKind::Player
    }

    fn events(&self) -> &'static [EventKind] {
        &[
            EventKind::InventoryInitialize,
            EventKind::InventoryMove,
            EventKind::InventoryEquip,
            EventKind::InventoryCreateItem,
        ]
    }

    fn execute(&self, world: &mut World, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault> {
        let SystemEvent::Inventory(inventory_event) = event else {
            let (name, remote) = log_identity(world, entity);
            warn!(player = %name, ?remote, event = ?event.kind(), "Unknown action for inventory system");
            return Ok(());
        };

        let Some(owner) = Owner::load(world, entity) else {
            let (name, remote) = log_identity(world, entity);
            error!(player = %name, ?remote, "Inventory action on an entity without player capability");
            return Ok(());
        };

        if !event.check_arguments() {
            error!(player = %owner.name, remote = ?owner.remote, event = ?inventory_event, "Invalid arguments for inventory action");
            return Ok(());
        }

        if let InventoryEvent::Initialize { items } = inventory_event {
            let catalog = world
                .get_resource::<CatalogHandle>()
                .ok_or(WorldFault::MissingResource("CatalogHandle"))?
                .clone();
            let inventory = initialize_inventory(items, &catalog);
            debug!(player = %owner.name, items = inventory.item_count(), "Inventory initialized");
            world.entity_mut(entity).insert(inventory);
            return Ok(());
        }

        let outbox = world
            .get_resource::<PacketOutbox>()
            .ok_or(WorldFault::MissingResource("PacketOutbox"))?
            .clone();

        let item_data = match inventory_event {
            InventoryEvent::CreateItem { item_id, .. } => {
                let catalog = world
                    .get_resource::<CatalogHandle>()
                    .ok_or(WorldFault::MissingResource("CatalogHandle"))?;
                match catalog.item(*item_id) {
                    Some(data) => Some(data),
                    None => {
                        error!(player = %owner.name, remote = ?owner.remote, item_id, "Cannot create unknown item");
                        return Ok(());
                    }
                }
            }
            _ => None,
        };

        let Some(mut inventory) = world.get_mut::<ItemContainerComponent>(entity) else {
            error!(player = %owner.name, remote = ?owner.remote, "Player has no inventory");
            return Ok(());
        };

        match inventory_event {
            InventoryEvent::Initialize { .. } => {}
            InventoryEvent::Move {
                source_slot,
                destination_slot,
            } => {
                debug!(player = %owner.name, source_slot, destination_slot, "Move item");
                match move_item(&mut inventory, *source_slot, *destination_slot) {
                    Ok(()) => outbox.publish(WorldPacket::ItemMove {
                        entity_id: owner.entity_id,
                        source_slot: *source_slot,
                        destination_slot: *destination_slot,
                    }),
                    Err(err) => owner.reject(&outbox, "move", &err),
                }
            }
            InventoryEvent::Equip { unique_id, part } => {
                debug!(player = %owner.name, unique_id, part, equip = *part == -1, "Equip item");
                match equip_item(&mut inventory, owner.requirements, *unique_id, *part) {
                    Ok(changes) => {
                        for change in changes {
                            outbox.publish(equip_packet(owner.entity_id, change));
                        }
                    }
                    Err(err) => owner.reject(&outbox, "equip", &err),
                }
            }
            InventoryEvent::CreateItem {
                quantity, creator_id, ..
            } => {
                let Some(data) = item_data else {
                    return Ok(());
                };
                match create_item(&mut inventory, data, *quantity, *creator_id) {
                    Ok(outcome) => {
                        for item in &outcome.created {
                            outbox.publish(WorldPacket::ItemCreation {
                                entity_id: owner.entity_id,
                                item: *item,
                            });
                        }
                        if outcome.missing() > 0 {
                            debug!(player = %owner.name, missing = outcome.missing(), "Inventory full while creating items");
                            outbox.feedback(owner.entity_id, DefineText::LackSpace);
                        }
                    }
                    Err(err) => owner.reject(&outbox, "create", &err),
                }
            }
        }

        Ok(())
    }
}

fn equip_packet(entity_id: i32, change: EquipChange) -> WorldPacket {
    match change {
        EquipChange::Equipped { item, parts } => WorldPacket::ItemEquip {
            entity_id,
            item,
            parts,
            equipped: true,
        },
        EquipChange::Unequipped { item, parts } => WorldPacket::ItemEquip {
            entity_id,
            item,
            parts,
            equipped: false,
        },
    }
}
