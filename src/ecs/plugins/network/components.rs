use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use glam::Vec3;
use serde::Serialize;
use std::net::SocketAddr;
use tracing::trace;

use crate::ecs::components::EntityKind;
use crate::ecs::dispatch::SystemEvent;
use crate::ecs::plugins::inventory::components::ItemSnapshot;
use crate::ecs::plugins::player::systems::{JoinError, JoinRequest};

// ============================================================================
// OUTBOUND
// ============================================================================

/// Feedback messages shown to the player by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefineText {
    /// Inventory has no free slot.
    LackSpace,
    /// Armor is made for the other gender.
    WrongSex,
    /// Character level below the item requirement.
    LowLevel,
}

/// State changes the transport layer serializes and fans out to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldPacket {
    Spawn {
        entity_id: i32,
        kind: EntityKind,
        name: String,
        model_id: i32,
        level: i32,
        map_id: i32,
        layer_id: i32,
        position: Vec3,
        angle: f32,
    },
    Despawn {
        entity_id: i32,
    },
    ItemMove {
        entity_id: i32,
        source_slot: i32,
        destination_slot: i32,
    },
    ItemEquip {
        entity_id: i32,
        item: ItemSnapshot,
        parts: i32,
        equipped: bool,
    },
    ItemCreation {
        entity_id: i32,
        item: ItemSnapshot,
    },
    AddDamage {
        attacker_id: i32,
        target_id: i32,
        damages: i32,
        flags: u32,
        remaining_hp: i32,
    },
    DefinedText {
        entity_id: i32,
        text: DefineText,
    },
}

/// Publishing end of the packet channel. Sending never blocks.
#[derive(Resource, Clone)]
pub struct PacketOutbox {
    sender: Sender<WorldPacket>,
}

impl PacketOutbox {
    pub fn new(sender: Sender<WorldPacket>) -> Self {
        Self { sender }
    }

    pub fn publish(&self, packet: WorldPacket) {
        if let Err(err) = self.sender.send(packet) {
            trace!(packet = ?err.0, "Packet dropped, transport is gone");
        }
    }

    pub fn feedback(&self, entity_id: i32, text: DefineText) {
        self.publish(WorldPacket::DefinedText { entity_id, text });
    }
}

// ============================================================================
// INBOUND
// ============================================================================

pub type JoinReply = Sender<Result<Entity, JoinError>>;

/// Decoded requests handed to the simulation by the transport layer.
#[derive(Debug)]
pub enum WorldCommand {
    Join {
        request: JoinRequest,
        endpoint: Option<SocketAddr>,
        reply: Option<JoinReply>,
    },
    Notify {
        entity: Entity,
        event: SystemEvent,
    },
    Leave {
        entity: Entity,
    },
}

#[derive(Resource, Clone)]
pub struct WorldInbox {
    receiver: Receiver<WorldCommand>,
}

impl WorldInbox {
    pub fn new(receiver: Receiver<WorldCommand>) -> Self {
        Self { receiver }
    }

    pub fn drain(&self) -> Vec<WorldCommand> {
        self.receiver.try_iter().collect()
    }
}

/// The transport's ends of both channels.
#[derive(Resource, Clone)]
pub struct TransportEndpoints {
    pub commands: Sender<WorldCommand>,
    pub packets: Receiver<WorldPacket>,
}

/// Creates both channels. Returns the world's ends and the transport's ends.
pub fn transport_channels() -> (PacketOutbox, WorldInbox, TransportEndpoints) {
    let (packet_tx, packet_rx) = crossbeam_channel::unbounded();
    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    (
        PacketOutbox::new(packet_tx),
        WorldInbox::new(command_rx),
        TransportEndpoints {
            commands: command_tx,
            packets: packet_rx,
        },
    )
}
