use bevy::prelude::*;
use tracing::{debug, error, trace, warn};

use crate::ecs::core::error::WorldFault;
use crate::ecs::dispatch::Notify;
use crate::ecs::plugins::network::components::{WorldCommand, WorldInbox};
use crate::ecs::plugins::player::components::StoreHandle;
use crate::ecs::plugins::player::systems::{JoinError, despawn, join_game};

/// Exclusive system: applies every command the transport queued since the last tick.
///
/// Each command is handled on its own. A fault is logged and the next
/// command still runs.
pub fn process_world_commands(world: &mut World) {
    let Some(inbox) = world.get_resource::<WorldInbox>().cloned() else {
        error!("World inbox is not installed");
        return;
    };

    for command in inbox.drain() {
        match command {
            WorldCommand::Join {
                request,
                endpoint,
                reply,
            } => {
                let result = match world.get_resource::<StoreHandle>().cloned() {
                    Some(store) => join_game(world, &*store, request, endpoint),
                    None => Err(JoinError::Fault(WorldFault::MissingResource("StoreHandle"))),
                };
                if let Err(err) = &result {
                    debug!(remote = ?endpoint, %err, "Join request failed");
                }
                if let Some(reply) = reply {
                    if reply.send(result).is_err() {
                        trace!(remote = ?endpoint, "Join reply dropped, requester is gone");
                    }
                }
            }
            WorldCommand::Notify { entity, event } => {
                if let Err(err) = world.notify(entity, &event) {
                    warn!(?entity, event = ?event.kind(), %err, "Event delivery failed");
                }
            }
            WorldCommand::Leave { entity } => match despawn(world, entity) {
                Ok(true) => debug!(?entity, "Entity left the world"),
                Ok(false) => debug!(?entity, "Leave for an entity that is already gone"),
                Err(err) => warn!(?entity, %err, "Failed to remove entity"),
            },
        }
    }
}
