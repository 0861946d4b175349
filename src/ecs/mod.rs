pub mod capability;
pub mod components;
pub mod core;
pub mod dispatch;
pub mod plugins;

use bevy::prelude::*;
use std::sync::Arc;

use crate::ecs::core::catalog::GameCatalog;
use crate::ecs::core::config::WorldConfig;
use crate::ecs::core::error::WorldFault;
use crate::ecs::plugins::directory::PlayerDirectory;
use crate::ecs::plugins::network::TransportEndpoints;
use crate::ecs::plugins::player::persistence::CharacterStore;

pub use plugins::WorldPlugin;

/// Installs every world resource directly, without an `App`.
///
/// Returns the transport's ends of the command and packet channels.
pub fn setup_world(
    world: &mut World,
    config: &WorldConfig,
    catalog: Arc<GameCatalog>,
    directory: Arc<PlayerDirectory>,
    store: Arc<dyn CharacterStore>,
) -> Result<TransportEndpoints, WorldFault> {
    self::core::insert_core_resources(world, config, catalog);
    plugins::player::plugin::insert_player_resources(world, directory, store);
    let endpoints = plugins::network::plugin::insert_transport(world);
    world.insert_resource(plugins::build_system_registry()?);
    Ok(endpoints)
}
