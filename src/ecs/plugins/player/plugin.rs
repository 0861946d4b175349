use bevy::prelude::*;
use std::sync::Arc;

use crate::ecs::plugins::directory::{PlayerDirectory, SharedDirectory};
use crate::ecs::plugins::player::components::StoreHandle;
use crate::ecs::plugins::player::persistence::CharacterStore;

/// Player lifecycle services: the character store and the player directory.
pub struct PlayerPlugin {
    pub store: Arc<dyn CharacterStore>,
    pub directory: Arc<PlayerDirectory>,
}

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        insert_player_resources(app.world_mut(), self.directory.clone(), self.store.clone());
    }
}

pub fn insert_player_resources(world: &mut World, directory: Arc<PlayerDirectory>, store: Arc<dyn CharacterStore>) {
    world.insert_resource(SharedDirectory(directory));
    world.insert_resource(StoreHandle(store));
}
