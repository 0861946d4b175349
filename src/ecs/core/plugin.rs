use bevy::prelude::*;
use std::sync::Arc;

use crate::ecs::core::catalog::GameCatalog;
use crate::ecs::core::config::WorldConfig;
use crate::ecs::core::resources::{CatalogHandle, CombatRng, EntityIdAllocator, MapRegistry};

/// Game data, maps, id allocation and the combat random source.
pub struct CorePlugin {
    pub config: WorldConfig,
    pub catalog: Arc<GameCatalog>,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        insert_core_resources(app.world_mut(), &self.config, self.catalog.clone());
    }
}

pub fn insert_core_resources(world: &mut World, config: &WorldConfig, catalog: Arc<GameCatalog>) {
    // TimePlugin already provides the real clock inside an App.
    world.init_resource::<Time<Real>>();
    world.insert_resource(config.clone());
    world.insert_resource(EntityIdAllocator::default());
    world.insert_resource(CombatRng::new(config.rng_seed));
    world.insert_resource(CatalogHandle(catalog));
    world.insert_resource(MapRegistry::from_definitions(&config.maps));
}
