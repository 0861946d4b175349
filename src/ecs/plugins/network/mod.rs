pub mod components;
pub mod plugin;
pub mod systems;

pub use components::{
    DefineText, PacketOutbox, TransportEndpoints, WorldCommand, WorldInbox, WorldPacket, transport_channels,
};
pub use plugin::NetworkPlugin;
pub use systems::process_world_commands;
