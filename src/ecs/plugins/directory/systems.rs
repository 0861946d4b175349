use bevy::prelude::*;
use tracing::{error, info};

use crate::ecs::components::{ObjectComponent, PlayerDataComponent, VisualAppearanceComponent};
use crate::ecs::core::error::WorldFault;
use crate::ecs::plugins::directory::registry::{PlayerData, PlayerDirectory, SharedDirectory};
use crate::ecs::plugins::player::persistence::CharacterStore;

/// Seeds the directory from every persisted character.
pub fn boot_player_directory(directory: &PlayerDirectory, store: &dyn CharacterStore) -> Result<usize, WorldFault> {
    let characters = match store.characters() {
        Ok(characters) => characters,
        Err(err) => {
            error!(%err, "Unable to load player data from store");
            return Ok(0);
        }
    };
    let added = directory.load(&characters)?;
    info!(added, "Player directory ready");
    Ok(added)
}

/// Adds a freshly joined player to the directory. Known ids are left as they are.
pub fn register_joined_player(world: &World, entity: Entity) -> Result<bool, WorldFault> {
    let directory = world
        .get_resource::<SharedDirectory>()
        .ok_or(WorldFault::MissingResource("SharedDirectory"))?;

    let (Some(object), Some(data), Some(appearance)) = (
        world.get::<ObjectComponent>(entity),
        world.get::<PlayerDataComponent>(entity),
        world.get::<VisualAppearanceComponent>(entity),
    ) else {
        return Err(WorldFault::InvariantBroken(format!(
            "entity {entity:?} joined without player components"
        )));
    };

    directory.add(PlayerData {
        id: data.id,
        name: object.name.clone(),
        gender: appearance.gender,
        job: data.job_id,
        level: object.level,
        status: 0,
    })
}
