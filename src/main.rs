/*!
# MMO World Server

The simulation core of a world server, hosted on Bevy ECS.

## Architecture Overview

- **CorePlugin**: game catalog, maps, entity ids and the combat random source
- **PlayerPlugin**: character store and the process-wide player directory
- **NetworkPlugin**: channels to the transport layer, drained every fixed tick
- **System registry**: inventory, battle and friend systems behind one dispatch table

## How It Works

1. The catalog and the character store are loaded from the paths in the config
2. The player directory is seeded from every persisted character
3. The transport pushes `WorldCommand`s (join, event, leave) into the inbox
4. Each tick the world applies them and publishes `WorldPacket`s to the outbox

Set `WORLD_CONFIG` to a JSON config file and `RUST_LOG` to tune logging.
*/

use bevy::prelude::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use world_server::ecs::WorldPlugin;
use world_server::ecs::core::catalog::GameCatalog;
use world_server::ecs::core::config::WorldConfig;
use world_server::ecs::plugins::build_system_registry;
use world_server::ecs::plugins::directory::{PlayerDirectory, boot_player_directory};
use world_server::ecs::plugins::player::persistence::{CharacterStore, InMemoryStore};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match WorldConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "Unable to load world config");
            return ExitCode::FAILURE;
        }
    };

    let catalog = match &config.catalog_path {
        Some(path) => match GameCatalog::load(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                error!(%err, path = %path.display(), "Unable to load game catalog");
                return ExitCode::FAILURE;
            }
        },
        None => GameCatalog::new(),
    };

    let store: Arc<dyn CharacterStore> = match &config.store_path {
        Some(path) => match InMemoryStore::load(path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                error!(%err, path = %path.display(), "Unable to load character store");
                return ExitCode::FAILURE;
            }
        },
        None => Arc::new(InMemoryStore::new()),
    };

    let registry = match build_system_registry() {
        Ok(registry) => registry,
        Err(err) => {
            error!(%err, "Unable to build the system registry");
            return ExitCode::FAILURE;
        }
    };

    let directory = Arc::new(PlayerDirectory::new());
    if let Err(err) = boot_player_directory(&directory, store.as_ref()) {
        error!(%err, "Unable to seed the player directory");
        return ExitCode::FAILURE;
    }

    info!(
        items = catalog.item_count(),
        maps = config.maps.len(),
        tick_hz = config.tick_hz,
        "Starting world server"
    );

    let tick_hz = config.tick_hz;
    let exit = App::new()
        // Bevy's minimal plugins (no graphics/audio needed for server)
        .add_plugins(MinimalPlugins)
        .add_plugins(WorldPlugin {
            config,
            catalog: Arc::new(catalog),
            directory: directory.clone(),
            store,
            registry,
        })
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .run();

    if let Err(err) = directory.clear() {
        error!(%err, "Unable to clear the player directory");
    }
    info!("World server stopped");
    if exit.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
