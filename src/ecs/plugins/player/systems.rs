use bevy::prelude::*;
use glam::Vec3;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::ecs::components::*;
use crate::ecs::core::error::WorldFault;
use crate::ecs::core::resources::{CatalogHandle, EntityIdAllocator, MapLayer, MapRegistry};
use crate::ecs::dispatch::{FriendEvent, InventoryEvent, Notify, SystemEvent, SystemKind};
use crate::ecs::plugins::directory::register_joined_player;
use crate::ecs::plugins::network::components::{PacketOutbox, WorldPacket};
use crate::ecs::plugins::player::components::{MonsterBundle, PlayerBundle};
use crate::ecs::plugins::player::persistence::{CharacterRecord, CharacterStore, FriendRecord, StoreError};

/// A client asking to enter the world with one of its characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub character_id: i32,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("character {0} does not exist")]
    CharacterNotFound(i32),

    #[error("character does not belong to this account")]
    NotOwner,

    #[error("account is banned")]
    Banned,

    #[error("map {0} is not loaded in this world")]
    MapNotFound(i32),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fault(#[from] WorldFault),
}

/// Builds a player entity from its persisted record.
///
/// The entity comes back with its inventory and friend list initialized and
/// registered in the player directory, but not yet spawned. Nothing is
/// published. On failure the partially built entity is removed again.
pub fn create_player(
    world: &mut World,
    layer: MapLayer,
    record: &CharacterRecord,
    endpoint: Option<SocketAddr>,
    friends: Vec<FriendRecord>,
) -> Result<Entity, WorldFault> {
    let catalog = world
        .get_resource::<CatalogHandle>()
        .ok_or(WorldFault::MissingResource("CatalogHandle"))?
        .clone();
    let id = world
        .get_resource_mut::<EntityIdAllocator>()
        .ok_or(WorldFault::MissingResource("EntityIdAllocator"))?
        .allocate();
    let now = world_clock_millis(world)?;

    let mut entity_mut = world.spawn(PlayerBundle::new(id, layer, record, &catalog, now));
    if let Some(endpoint) = endpoint {
        entity_mut.insert(ClientEndpoint(endpoint));
    }
    let entity = entity_mut.id();

    let initialized = initialize_player(world, entity, record, friends);
    if let Err(err) = initialized {
        world.despawn(entity);
        return Err(err);
    }

    debug!(entity_id = id, character_id = record.id, name = %record.name, "Player entity created");
    Ok(entity)
}

fn initialize_player(
    world: &mut World,
    entity: Entity,
    record: &CharacterRecord,
    friends: Vec<FriendRecord>,
) -> Result<(), WorldFault> {
    world.notify_system(
        entity,
        SystemKind::Inventory,
        &SystemEvent::Inventory(InventoryEvent::Initialize {
            items: record.items.clone(),
        }),
    )?;
    world.notify_system(entity, SystemKind::Friend, &SystemEvent::Friend(FriendEvent::Initialize { friends }))?;
    register_joined_player(world, entity)?;
    Ok(())
}

/// Runs the join checks, creates the player and publishes its spawn.
pub fn join_game(
    world: &mut World,
    store: &dyn CharacterStore,
    request: JoinRequest,
    endpoint: Option<SocketAddr>,
) -> Result<Entity, JoinError> {
    let Some(record) = store.character(request.character_id)? else {
        warn!(
            character_id = request.character_id,
            remote = ?endpoint,
            "[SECURITY] Unable to join: character does not exist"
        );
        return Err(JoinError::CharacterNotFound(request.character_id));
    };

    if !record.username.eq_ignore_ascii_case(&request.username) {
        warn!(
            character_id = record.id,
            username = %request.username,
            remote = ?endpoint,
            "[SECURITY] Unable to join: character is not owned by this account"
        );
        return Err(JoinError::NotOwner);
    }

    if AuthorityType::from_level(record.authority) == AuthorityType::Banned {
        warn!(character_id = record.id, username = %record.username, remote = ?endpoint, "Unable to join: account is banned");
        return Err(JoinError::Banned);
    }

    let layer = world
        .get_resource::<MapRegistry>()
        .ok_or(WorldFault::MissingResource("MapRegistry"))?
        .resolve(record.map_id, record.map_layer_id);
    let Some(layer) = layer else {
        error!(character_id = record.id, map_id = record.map_id, "Unable to join: map is not loaded");
        return Err(JoinError::MapNotFound(record.map_id));
    };

    let friends = store.friends(record.id)?;
    let entity = create_player(world, layer, &record, endpoint, friends)?;
    if let Err(err) = publish_spawn(world, entity) {
        error!(character_id = record.id, %err, "Unable to join: spawn could not be published");
        world.despawn(entity);
        return Err(err.into());
    }

    info!(
        character_id = record.id,
        name = %record.name,
        map_id = layer.map_id,
        layer_id = layer.layer_id,
        remote = ?endpoint,
        "Player joined the world"
    );
    Ok(entity)
}

/// Creates a monster from the catalog. Unknown monster ids spawn nothing.
pub fn spawn_monster(
    world: &mut World,
    layer: MapLayer,
    monster_id: i32,
    position: Vec3,
) -> Result<Option<Entity>, WorldFault> {
    let catalog = world
        .get_resource::<CatalogHandle>()
        .ok_or(WorldFault::MissingResource("CatalogHandle"))?
        .clone();
    let Some(data) = catalog.monster(monster_id) else {
        warn!(monster_id, "Cannot spawn unknown monster");
        return Ok(None);
    };
    let id = world
        .get_resource_mut::<EntityIdAllocator>()
        .ok_or(WorldFault::MissingResource("EntityIdAllocator"))?
        .allocate();
    let now = world_clock_millis(world)?;

    let entity = world
        .spawn(MonsterBundle::new(id, layer, data, position, &catalog, now))
        .id();
    publish_spawn(world, entity)?;

    debug!(entity_id = id, monster_id, "Monster spawned");
    Ok(Some(entity))
}

/// Milliseconds of real time since the world started.
fn world_clock_millis(world: &World) -> Result<u64, WorldFault> {
    let time = world
        .get_resource::<Time<Real>>()
        .ok_or(WorldFault::MissingResource("Time<Real>"))?;
    Ok(time.elapsed().as_millis() as u64)
}

/// Initial state observers receive for `entity`.
pub fn spawn_packet(world: &World, entity: Entity) -> Option<WorldPacket> {
    let identity = world.get::<WorldEntity>(entity)?;
    let object = world.get::<ObjectComponent>(entity)?;
    Some(WorldPacket::Spawn {
        entity_id: identity.id,
        kind: identity.kind,
        name: object.name.clone(),
        model_id: object.model_id,
        level: object.level,
        map_id: identity.map_id,
        layer_id: identity.layer_id,
        position: object.position,
        angle: object.angle,
    })
}

/// Flags `entity` as spawned. Returns false when it has no object component.
pub fn mark_spawned(world: &mut World, entity: Entity) -> bool {
    match world.get_mut::<ObjectComponent>(entity) {
        Some(mut object) => {
            object.spawned = true;
            true
        }
        None => false,
    }
}

/// Broadcasts the initial state of `entity`, then marks it spawned.
pub fn publish_spawn(world: &mut World, entity: Entity) -> Result<(), WorldFault> {
    let packet = spawn_packet(world, entity)
        .ok_or_else(|| WorldFault::InvariantBroken(format!("{entity:?} has no spawnable state")))?;
    world
        .get_resource::<PacketOutbox>()
        .ok_or(WorldFault::MissingResource("PacketOutbox"))?
        .publish(packet);
    mark_spawned(world, entity);
    Ok(())
}

/// Removes `entity` and every component it holds. Returns false when it was already gone.
pub fn despawn(world: &mut World, entity: Entity) -> Result<bool, WorldFault> {
    let Some(identity) = world.get::<WorldEntity>(entity).copied() else {
        return Ok(false);
    };
    let outbox = world
        .get_resource::<PacketOutbox>()
        .ok_or(WorldFault::MissingResource("PacketOutbox"))?
        .clone();

    world.despawn(entity);
    outbox.publish(WorldPacket::Despawn { entity_id: identity.id });

    debug!(entity_id = identity.id, kind = ?identity.kind, "Entity despawned");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::core::catalog::{GameCatalog, MonsterData};
    use crate::ecs::core::config::WorldConfig;
    use crate::ecs::plugins::directory::{PlayerDirectory, boot_player_directory};
    use crate::ecs::plugins::friend::components::FriendComponent;
    use crate::ecs::plugins::inventory::components::ItemContainerComponent;
    use crate::ecs::plugins::player::components::JOIN_MOVE_DELAY_MILLIS;
    use crate::ecs::plugins::player::persistence::InMemoryStore;
    use crossbeam_channel::Receiver;
    use std::sync::Arc;

    fn world() -> (World, Receiver<WorldPacket>, Arc<PlayerDirectory>) {
        let mut catalog = GameCatalog::new();
        catalog.insert_monster(MonsterData {
            id: 20,
            name: "Aibatt".to_string(),
            level: 1,
            hp: 30,
            attack_min: 1,
            attack_max: 3,
            model_id: 20,
        });
        let directory = Arc::new(PlayerDirectory::new());
        let mut world = World::new();
        let endpoints = crate::ecs::setup_world(
            &mut world,
            &WorldConfig::default(),
            Arc::new(catalog),
            directory.clone(),
            Arc::new(InMemoryStore::new()),
        )
        .unwrap();
        (world, endpoints.packets, directory)
    }

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.insert_character(CharacterRecord {
            id: 5,
            username: "Alice".to_string(),
            name: "Alicia".to_string(),
            gender: Gender::Female,
            ..Default::default()
        });
        store.insert_character(CharacterRecord {
            id: 6,
            username: "mallory".to_string(),
            name: "Mal".to_string(),
            authority: 0,
            ..Default::default()
        });
        store.insert_character(CharacterRecord {
            id: 7,
            username: "bob".to_string(),
            name: "Bob".to_string(),
            map_id: 99,
            ..Default::default()
        });
        store
    }

    fn request(character_id: i32, username: &str) -> JoinRequest {
        JoinRequest {
            character_id,
            username: username.to_string(),
        }
    }

    #[test]
    fn join_builds_a_spawned_player() {
        let (mut world, packets, directory) = world();
        let entity = join_game(&mut world, &store(), request(5, "ALICE"), None).unwrap();

        let object = world.get::<ObjectComponent>(entity).unwrap();
        assert!(object.spawned);
        assert_eq!(object.model_id, 12);
        assert!(world.get::<ItemContainerComponent>(entity).is_some());
        assert!(world.get::<FriendComponent>(entity).is_some());
        assert!(directory.contains(5).unwrap());
        assert!(matches!(packets.try_recv().unwrap(), WorldPacket::Spawn { name, .. } if name == "Alicia"));
    }

    #[test]
    fn join_rejections_create_nothing() {
        let (mut world, packets, directory) = world();
        let store = store();

        assert!(matches!(
            join_game(&mut world, &store, request(42, "alice"), None),
            Err(JoinError::CharacterNotFound(42))
        ));
        assert!(matches!(join_game(&mut world, &store, request(5, "bob"), None), Err(JoinError::NotOwner)));
        assert!(matches!(join_game(&mut world, &store, request(6, "mallory"), None), Err(JoinError::Banned)));
        assert!(matches!(join_game(&mut world, &store, request(7, "bob"), None), Err(JoinError::MapNotFound(99))));

        let mut query = world.query::<&WorldEntity>();
        assert_eq!(query.iter(&world).count(), 0);
        assert!(packets.try_recv().is_err());
        assert!(directory.is_empty().unwrap());
    }

    #[test]
    fn join_resolves_stored_friends() {
        let (mut world, _packets, directory) = world();
        let mut store = store();
        store.insert_friend(FriendRecord {
            id: 1,
            character_id: 5,
            friend_id: 7,
        });
        boot_player_directory(&directory, &store).unwrap();

        let entity = join_game(&mut world, &store, request(5, "alice"), None).unwrap();

        let friends = world.get::<FriendComponent>(entity).unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends.get(7).unwrap().name, "Bob");
    }

    #[test]
    fn failed_spawn_publish_removes_the_player() {
        let (mut world, _packets, _directory) = world();
        world.remove_resource::<PacketOutbox>();

        let result = join_game(&mut world, &store(), request(5, "alice"), None);

        assert!(matches!(result, Err(JoinError::Fault(WorldFault::MissingResource("PacketOutbox")))));
        let mut query = world.query::<&WorldEntity>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn joined_player_waits_before_moving() {
        let (mut world, _packets, _directory) = world();
        let entity = join_game(&mut world, &store(), request(5, "alice"), None).unwrap();

        let movable = world.get::<MovableComponent>(entity).unwrap();
        assert_eq!(movable.next_move_time, movable.last_move_time + JOIN_MOVE_DELAY_MILLIS);
    }

    #[test]
    fn spawning_needs_the_world_clock() {
        let (mut world, _packets, _directory) = world();
        world.remove_resource::<Time<Real>>();
        let layer = MapLayer { map_id: 1, layer_id: 1 };

        assert_eq!(
            spawn_monster(&mut world, layer, 20, Vec3::ZERO),
            Err(WorldFault::MissingResource("Time<Real>"))
        );
    }

    #[test]
    fn entity_ids_are_unique() {
        let (mut world, _packets, _directory) = world();
        let store = store();
        let layer = MapLayer { map_id: 1, layer_id: 1 };
        let first = join_game(&mut world, &store, request(5, "alice"), None).unwrap();
        let second = spawn_monster(&mut world, layer, 20, Vec3::ZERO).unwrap().unwrap();

        let first = world.get::<WorldEntity>(first).unwrap().id;
        let second = world.get::<WorldEntity>(second).unwrap().id;
        assert_ne!(first, second);
    }

    #[test]
    fn monster_spawn_uses_catalog() {
        let (mut world, packets, _directory) = world();
        let layer = MapLayer { map_id: 1, layer_id: 1 };

        let entity = spawn_monster(&mut world, layer, 20, Vec3::new(1.0, 2.0, 3.0)).unwrap().unwrap();

        assert_eq!(world.get::<HealthComponent>(entity).unwrap().hp, 30);
        assert!(world.get::<ItemContainerComponent>(entity).is_none());
        assert!(world.get::<ObjectComponent>(entity).unwrap().spawned);
        assert!(matches!(packets.try_recv().unwrap(), WorldPacket::Spawn { kind: EntityKind::Monster, .. }));
        assert!(spawn_monster(&mut world, layer, 404, Vec3::ZERO).unwrap().is_none());
    }

    #[test]
    fn despawn_removes_entity_once() {
        let (mut world, packets, _directory) = world();
        let layer = MapLayer { map_id: 1, layer_id: 1 };
        let entity = spawn_monster(&mut world, layer, 20, Vec3::ZERO).unwrap().unwrap();
        let _spawn = packets.try_recv().unwrap();

        assert!(despawn(&mut world, entity).unwrap());
        assert!(!despawn(&mut world, entity).unwrap());
        assert!(world.get::<WorldEntity>(entity).is_none());
        assert!(matches!(packets.try_recv().unwrap(), WorldPacket::Despawn { .. }));
        assert!(packets.try_recv().is_err());
    }
}
