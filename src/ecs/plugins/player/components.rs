use bevy::prelude::*;
use glam::Vec3;
use std::ops::Deref;
use std::sync::Arc;

use crate::ecs::components::*;
use crate::ecs::core::catalog::{GameCatalog, MonsterData};
use crate::ecs::core::resources::MapLayer;
use crate::ecs::plugins::player::persistence::{CharacterRecord, CharacterStore};

/// Model ids of the two player bodies.
pub const MALE_MODEL_ID: i32 = 11;
pub const FEMALE_MODEL_ID: i32 = 12;

/// A joining player may not move before this many milliseconds have passed.
pub const JOIN_MOVE_DELAY_MILLIS: u64 = 10;

#[derive(Bundle)]
pub struct PlayerBundle {
    pub identity: WorldEntity,
    pub object: ObjectComponent,
    pub appearance: VisualAppearanceComponent,
    pub data: PlayerDataComponent,
    pub movable: MovableComponent,
    pub statistics: StatisticsComponent,
    pub health: HealthComponent,
}

impl PlayerBundle {
    /// `now` is the world clock in milliseconds.
    pub fn new(id: i32, layer: MapLayer, record: &CharacterRecord, catalog: &GameCatalog, now: u64) -> Self {
        let model_id = match record.gender {
            Gender::Male => MALE_MODEL_ID,
            Gender::Female => FEMALE_MODEL_ID,
        };
        let position = Vec3::new(record.pos_x, record.pos_y, record.pos_z);

        Self {
            identity: WorldEntity {
                id,
                kind: EntityKind::Player,
                map_id: layer.map_id,
                layer_id: layer.layer_id,
            },
            object: ObjectComponent {
                model_id,
                name: record.name.clone(),
                level: record.level,
                position,
                angle: record.angle,
                size: 100,
                spawned: false,
            },
            appearance: VisualAppearanceComponent {
                gender: record.gender,
                skin_set_id: record.skin_set_id,
                hair_id: record.hair_id,
                hair_color: record.hair_color,
                face_id: record.face_id,
            },
            data: PlayerDataComponent {
                id: record.id,
                slot: record.slot,
                gold: record.gold,
                authority: AuthorityType::from_level(record.authority),
                job_id: record.job_id,
                job: catalog.job(record.job_id),
            },
            movable: MovableComponent {
                speed: catalog.mover_speed(model_id),
                destination_position: position,
                last_move_time: now,
                next_move_time: now + JOIN_MOVE_DELAY_MILLIS,
            },
            statistics: record.statistics,
            health: HealthComponent {
                hp: record.hp,
                max_hp: record.hp.max(1),
                mp: record.mp,
                fp: record.fp,
            },
        }
    }
}

#[derive(Bundle)]
pub struct MonsterBundle {
    pub identity: WorldEntity,
    pub object: ObjectComponent,
    pub movable: MovableComponent,
    pub statistics: StatisticsComponent,
    pub health: HealthComponent,
    pub monster: MonsterComponent,
}

impl MonsterBundle {
    pub fn new(
        id: i32,
        layer: MapLayer,
        data: Arc<MonsterData>,
        position: Vec3,
        catalog: &GameCatalog,
        now: u64,
    ) -> Self {
        Self {
            identity: WorldEntity {
                id,
                kind: EntityKind::Monster,
                map_id: layer.map_id,
                layer_id: layer.layer_id,
            },
            object: ObjectComponent {
                model_id: data.model_id,
                name: data.name.clone(),
                level: data.level,
                position,
                ..Default::default()
            },
            movable: MovableComponent {
                speed: catalog.mover_speed(data.model_id),
                destination_position: position,
                last_move_time: now,
                next_move_time: now,
            },
            statistics: StatisticsComponent::default(),
            health: HealthComponent::new(data.hp),
            monster: MonsterComponent { data },
        }
    }
}

/// World-side handle to the character store.
#[derive(Resource, Clone)]
pub struct StoreHandle(pub Arc<dyn CharacterStore>);

impl Deref for StoreHandle {
    type Target = dyn CharacterStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
