use bevy::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::ecs::core::catalog::{JobData, MonsterData};

// ============================================================================
// IDENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Monster,
    Npc,
    Other,
}

/// Identity every world entity carries: id, type tag, map and layer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldEntity {
    pub id: i32,
    pub kind: EntityKind,
    pub map_id: i32,
    pub layer_id: i32,
}

/// Remote address of the owning connection. Only ever used in log fields.
#[derive(Component, Debug, Clone, Copy)]
pub struct ClientEndpoint(pub SocketAddr);

// ============================================================================
// OBJECT COMPONENTS
// ============================================================================

#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct ObjectComponent {
    pub model_id: i32,
    pub name: String,
    pub level: i32,
    pub position: Vec3,
    pub angle: f32,
    pub size: i16,
    /// Set once the initial state has been published.
    pub spawned: bool,
}

impl Default for ObjectComponent {
    fn default() -> Self {
        Self {
            model_id: 0,
            name: String::new(),
            level: 1,
            position: Vec3::ZERO,
            angle: 0.0,
            size: 100,
            spawned: false,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthComponent {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub fp: i32,
}

impl HealthComponent {
    pub fn new(max_hp: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: 0,
            fp: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Removes `damages` hit points, never going below zero.
    pub fn apply_damage(&mut self, damages: i32) -> i32 {
        self.hp = (self.hp - damages.max(0)).max(0);
        self.hp
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsComponent {
    pub strength: i32,
    pub stamina: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub stat_points: i32,
}

// ============================================================================
// PLAYER COMPONENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualAppearanceComponent {
    pub gender: Gender,
    pub skin_set_id: i32,
    pub hair_id: i32,
    pub hair_color: u32,
    pub face_id: i32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MovableComponent {
    pub speed: f32,
    pub destination_position: Vec3,
    pub last_move_time: u64,
    pub next_move_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthorityType {
    Banned,
    Player,
    GameMaster,
    Administrator,
}

impl AuthorityType {
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => AuthorityType::Banned,
            1..=79 => AuthorityType::Player,
            80..=99 => AuthorityType::GameMaster,
            _ => AuthorityType::Administrator,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerDataComponent {
    /// Persisted character id; the player directory key.
    pub id: i32,
    pub slot: u8,
    pub gold: i64,
    pub authority: AuthorityType,
    pub job_id: u8,
    /// Job multipliers used by the weapon attack formulas.
    pub job: JobData,
}

// ============================================================================
// MONSTER COMPONENTS
// ============================================================================

#[derive(Component, Debug, Clone)]
pub struct MonsterComponent {
    pub data: Arc<MonsterData>,
}
