use bevy::prelude::*;

use crate::ecs::plugins::network::components::{TransportEndpoints, transport_channels};
use crate::ecs::plugins::network::systems::process_world_commands;

// ============================================================================
// PLUGIN DEFINITION
// ============================================================================

/// Channels between the simulation and the transport layer.
///
/// Commands queued by the transport are drained once per fixed tick.
pub struct NetworkPlugin;

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        insert_transport(app.world_mut());
        app.add_systems(FixedUpdate, process_world_commands);
    }
}

/// Installs the world's channel ends and returns the transport's.
pub fn insert_transport(world: &mut World) -> TransportEndpoints {
    let (outbox, inbox, endpoints) = transport_channels();
    world.insert_resource(outbox);
    world.insert_resource(inbox);
    world.insert_resource(endpoints.clone());
    endpoints
}
