use bevy::prelude::*;
use tracing::{debug, warn};

use crate::ecs::capability::log_identity;
use crate::ecs::components::{EntityKind, WorldEntity};
use crate::ecs::core::error::WorldFault;
use crate::ecs::dispatch::{EventKind, FriendEvent, SystemEvent, SystemKind, WorldSystem};
use crate::ecs::plugins::directory::{PlayerDirectory, SharedDirectory};
use crate::ecs::plugins::friend::components::FriendComponent;
use crate::ecs::plugins::player::persistence::FriendRecord;

/// Builds a player's friend list from the player directory.
pub struct FriendSystem;

impl WorldSystem for FriendSystem {
    fn kind(&self) -> SystemKind {
        SystemKind::Friend
    }

    fn filter(&self, kind: EntityKind) -> bool {
        kind == EntityKind::Player
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::FriendInitialize]
    }

    fn execute(&self, world: &mut World, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault> {
        let SystemEvent::Friend(friend_event) = event else {
            let (name, remote) = log_identity(world, entity);
            warn!(player = %name, ?remote, event = ?event.kind(), "Unknown action for friend system");
            return Ok(());
        };

        match friend_event {
            FriendEvent::Initialize { friends } => {
                if world.get::<WorldEntity>(entity).is_none() {
                    warn!(?entity, "Cannot initialize friends: entity does not exist");
                    return Ok(());
                }
                let directory = world
                    .get_resource::<SharedDirectory>()
                    .ok_or(WorldFault::MissingResource("SharedDirectory"))?
                    .clone();
                let component = resolve_friends(&directory, friends)?;

                debug!(entity = ?entity, friends = component.len(), "Initialize friends");
                world.entity_mut(entity).insert(component);
            }
        }

        Ok(())
    }
}

/// Resolves each relation by the friend's own character id.
pub fn resolve_friends(directory: &PlayerDirectory, friends: &[FriendRecord]) -> Result<FriendComponent, WorldFault> {
    let mut component = FriendComponent::default();

    for friend in friends {
        match directory.get(friend.friend_id)? {
            Some(data) => {
                component.friends.entry(friend.friend_id).or_insert(data);
            }
            None => {
                warn!(
                    character_id = friend.character_id,
                    friend_id = friend.friend_id,
                    "Friend is not in the player directory"
                );
            }
        }
    }

    Ok(component)
}
