use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::ecs::components::Gender;
use crate::ecs::core::error::WorldFault;
use crate::ecs::plugins::player::persistence::CharacterRecord;

/// Minimal identity of a player, kept whether or not the player is online.
///
/// Snapshots are taken when the entry is created and are not refreshed when
/// the live character levels up or changes job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerData {
    pub id: i32,
    pub name: String,
    pub gender: Gender,
    pub job: u8,
    pub level: i32,
    pub status: u8,
}

impl From<&CharacterRecord> for PlayerData {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            gender: record.gender,
            job: record.job_id,
            level: record.level,
            status: 0,
        }
    }
}

/// Process-wide directory of players.
///
/// Every read and write goes through the internal lock. Lifecycle: filled
/// by [`PlayerDirectory::load`] at boot, grown by [`PlayerDirectory::add`]
/// on each join, emptied by [`PlayerDirectory::clear`] at shutdown. Entries
/// are never removed in between.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: Mutex<HashMap<i32, PlayerData>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<i32, PlayerData>>, WorldFault> {
        self.players
            .lock()
            .map_err(|_| WorldFault::RegistryPoisoned("player directory"))
    }

    /// Seeds the directory from persisted characters. Returns how many were new.
    pub fn load<'a>(&self, records: impl IntoIterator<Item = &'a CharacterRecord>) -> Result<usize, WorldFault> {
        let mut players = self.lock()?;
        let mut added = 0;
        for record in records {
            if !players.contains_key(&record.id) {
                players.insert(record.id, PlayerData::from(record));
                added += 1;
            }
        }
        info!(added, total = players.len(), "Player data loaded");
        Ok(added)
    }

    /// Inserts `data` unless its id is already known. Returns whether it was inserted.
    pub fn add(&self, data: PlayerData) -> Result<bool, WorldFault> {
        let mut players = self.lock()?;
        if players.contains_key(&data.id) {
            return Ok(false);
        }
        debug!(player_id = data.id, name = %data.name, "Player added to directory");
        players.insert(data.id, data);
        Ok(true)
    }

    pub fn get(&self, id: i32) -> Result<Option<PlayerData>, WorldFault> {
        Ok(self.lock()?.get(&id).cloned())
    }

    pub fn contains(&self, id: i32) -> Result<bool, WorldFault> {
        Ok(self.lock()?.contains_key(&id))
    }

    pub fn len(&self) -> Result<usize, WorldFault> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, WorldFault> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of every entry, sorted by id.
    pub fn snapshot(&self) -> Result<Vec<PlayerData>, WorldFault> {
        let players = self.lock()?;
        let mut entries: Vec<_> = players.values().cloned().collect();
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }

    pub fn clear(&self) -> Result<(), WorldFault> {
        self.lock()?.clear();
        Ok(())
    }
}

/// World-side handle to the process-wide directory.
#[derive(Resource, Debug, Clone)]
pub struct SharedDirectory(pub Arc<PlayerDirectory>);

impl Deref for SharedDirectory {
    type Target = PlayerDirectory;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
