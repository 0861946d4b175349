/*!
# Persistence Seam

Records the world core reads from storage, and the store it reads them
through. Lookups are synchronous: the core waits for a complete record (or
an explicit "not found") before it touches any entity.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::ecs::components::{Gender, StatisticsComponent};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse store: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: i32,
    pub item_slot: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default = "default_creator")]
    pub creator_id: i32,
}

fn default_quantity() -> i32 {
    1
}

fn default_creator() -> i32 {
    -1
}

/// A persisted friendship row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRecord {
    /// Row id of the relation itself.
    pub id: i32,
    pub character_id: i32,
    /// Character id of the friend.
    pub friend_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRecord {
    pub id: i32,
    pub username: String,
    pub authority: i32,
    pub name: String,
    pub slot: u8,
    pub gender: Gender,
    pub job_id: u8,
    pub level: i32,
    pub gold: i64,
    pub map_id: i32,
    pub map_layer_id: i32,
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    pub angle: f32,
    pub skin_set_id: i32,
    pub hair_id: i32,
    pub hair_color: u32,
    pub face_id: i32,
    pub hp: i32,
    pub mp: i32,
    pub fp: i32,
    pub statistics: StatisticsComponent,
    pub items: Vec<ItemRecord>,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self {
            id: 0,
            username: String::new(),
            authority: 1,
            name: String::new(),
            slot: 0,
            gender: Gender::Male,
            job_id: 0,
            level: 1,
            gold: 0,
            map_id: 1,
            map_layer_id: 1,
            pos_x: 0.0,
            pos_y: 0.0,
            pos_z: 0.0,
            angle: 0.0,
            skin_set_id: 0,
            hair_id: 0,
            hair_color: 0,
            face_id: 0,
            hp: 100,
            mp: 0,
            fp: 0,
            statistics: StatisticsComponent {
                strength: 15,
                stamina: 15,
                dexterity: 15,
                intelligence: 15,
                stat_points: 0,
            },
            items: Vec::new(),
        }
    }
}

/// Character, item and friend storage as seen from the world core.
pub trait CharacterStore: Send + Sync {
    fn character(&self, id: i32) -> Result<Option<CharacterRecord>, StoreError>;

    /// Every persisted character, used to seed the player directory.
    fn characters(&self) -> Result<Vec<CharacterRecord>, StoreError>;

    fn friends(&self, character_id: i32) -> Result<Vec<FriendRecord>, StoreError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreFile {
    characters: Vec<CharacterRecord>,
    friends: Vec<FriendRecord>,
}

/// Store kept entirely in memory. Backs the binary's demo data and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    characters: HashMap<i32, CharacterRecord>,
    friends: Vec<FriendRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let file: StoreFile = serde_json::from_str(json)?;
        let mut store = Self::new();
        for character in file.characters {
            store.insert_character(character);
        }
        store.friends = file.friends;
        Ok(store)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert_character(&mut self, character: CharacterRecord) {
        self.characters.insert(character.id, character);
    }

    pub fn insert_friend(&mut self, friend: FriendRecord) {
        self.friends.push(friend);
    }
}

impl CharacterStore for InMemoryStore {
    fn character(&self, id: i32) -> Result<Option<CharacterRecord>, StoreError> {
        Ok(self.characters.get(&id).cloned())
    }

    fn characters(&self) -> Result<Vec<CharacterRecord>, StoreError> {
        let mut characters: Vec<_> = self.characters.values().cloned().collect();
        characters.sort_by_key(|character| character.id);
        Ok(characters)
    }

    fn friends(&self, character_id: i32) -> Result<Vec<FriendRecord>, StoreError> {
        Ok(self
            .friends
            .iter()
            .filter(|friend| friend.character_id == character_id)
            .copied()
            .collect())
    }
}
