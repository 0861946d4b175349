pub mod battle;
pub mod directory;
pub mod friend;
pub mod inventory;
pub mod network;
pub mod player;

pub use battle::BattleSystem;
pub use friend::FriendSystem;
pub use inventory::InventorySystem;
pub use network::NetworkPlugin;
pub use player::PlayerPlugin;

use bevy::prelude::*;
use std::sync::Arc;
use tracing::info;

use crate::ecs::core::catalog::GameCatalog;
use crate::ecs::core::config::WorldConfig;
use crate::ecs::core::error::WorldFault;
use crate::ecs::core::plugin::CorePlugin;
use crate::ecs::dispatch::SystemRegistry;
use crate::ecs::plugins::directory::PlayerDirectory;
use crate::ecs::plugins::player::persistence::CharacterStore;

/// The static system table: one entry per gameplay system.
pub fn build_system_registry() -> Result<SystemRegistry, WorldFault> {
    SystemRegistry::builder()
        .register(InventorySystem)
        .register(BattleSystem)
        .register(FriendSystem)
        .build()
}

/// Everything the world simulation needs, in one plugin.
///
/// The registry is built by the caller so a broken table stops the process
/// before the app starts ticking.
pub struct WorldPlugin {
    pub config: WorldConfig,
    pub catalog: Arc<GameCatalog>,
    pub directory: Arc<PlayerDirectory>,
    pub store: Arc<dyn CharacterStore>,
    pub registry: SystemRegistry,
}

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CorePlugin {
            config: self.config.clone(),
            catalog: self.catalog.clone(),
        })
        .add_plugins(PlayerPlugin {
            store: self.store.clone(),
            directory: self.directory.clone(),
        })
        .add_plugins(NetworkPlugin)
        .insert_resource(self.registry.clone());

        info!(systems = self.registry.len(), "System registry ready");
    }
}
