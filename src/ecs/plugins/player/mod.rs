pub mod components;
pub mod persistence;
pub mod plugin;
pub mod systems;

pub use components::{MonsterBundle, PlayerBundle, StoreHandle};
pub use persistence::{CharacterRecord, CharacterStore, FriendRecord, InMemoryStore, ItemRecord, StoreError};
pub use plugin::PlayerPlugin;
pub use systems::{JoinError, JoinRequest, create_player, despawn, join_game, spawn_monster};
