use bevy::prelude::*;
use std::collections::HashMap;

use crate::ecs::plugins::directory::PlayerData;

/// Friends of a player, keyed by the friend's character id.
#[derive(Component, Debug, Clone, Default)]
pub struct FriendComponent {
    pub friends: HashMap<i32, PlayerData>,
}

impl FriendComponent {
    pub fn get(&self, character_id: i32) -> Option<&PlayerData> {
        self.friends.get(&character_id)
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }
}
