/*!
# Static Game Catalog

Read-only definitions for items, monsters, jobs and mover models.

The catalog is loaded once when the server boots and shared behind an `Arc`
for the rest of the process. Nothing in the simulation ever writes to it.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::ecs::components::Gender;
use crate::ecs::core::error::CatalogError;

/// Catalog id of the unarmed pseudo-weapon.
pub const HAND_ITEM_ID: i32 = 11;

/// Speed used when a model has no mover entry.
pub const DEFAULT_MOVER_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Accessory,
    Consumable,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    None,
    Hand,
    MeleeSword,
    MeleeAxe,
    MeleeStaff,
    MeleeStick,
    MeleeKnuckle,
    MagicWand,
    MeleeYoyo,
    RangeBow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub id: i32,
    pub name: String,
    pub kind: ItemKind,
    pub weapon_type: WeaponType,
    pub ability_min: i32,
    pub ability_max: i32,
    pub stackable: bool,
    /// `None` means the item can be worn by either gender.
    pub sex: Option<Gender>,
    pub limit_level: i32,
    /// Equip part index, added to the equip offset to get the equip slot.
    pub parts: i32,
}

impl Default for ItemData {
    fn default() -> Self {
        Self {
            id: -1,
            name: String::new(),
            kind: ItemKind::General,
            weapon_type: WeaponType::None,
            ability_min: 0,
            ability_max: 0,
            stackable: false,
            sex: None,
            limit_level: 0,
            parts: -1,
        }
    }
}

impl ItemData {
    /// Bare-handed attack used when nothing sits in the right weapon slot.
    pub fn hand() -> Self {
        Self {
            id: HAND_ITEM_ID,
            name: "Hand".to_string(),
            kind: ItemKind::Weapon,
            weapon_type: WeaponType::Hand,
            ability_min: 1,
            ability_max: 4,
            ..Default::default()
        }
    }

    pub fn is_armor(&self) -> bool {
        self.kind == ItemKind::Armor
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterData {
    pub id: i32,
    pub name: String,
    pub level: i32,
    pub hp: i32,
    pub attack_min: i32,
    pub attack_max: i32,
    pub model_id: i32,
}

/// Per-job damage multipliers, one per weapon family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobData {
    pub id: u8,
    pub melee_sword: f32,
    pub melee_axe: f32,
    pub melee_staff: f32,
    pub melee_stick: f32,
    pub melee_knuckle: f32,
    pub magic_wand: f32,
    pub melee_yoyo: f32,
}

impl Default for JobData {
    fn default() -> Self {
        Self {
            id: 0,
            melee_sword: 1.0,
            melee_axe: 1.0,
            melee_staff: 1.0,
            melee_stick: 1.0,
            melee_knuckle: 1.0,
            magic_wand: 1.0,
            melee_yoyo: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoverData {
    pub model_id: i32,
    pub speed: f32,
}

/// On-disk shape of the catalog.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    items: Vec<ItemData>,
    monsters: Vec<MonsterData>,
    jobs: Vec<JobData>,
    movers: Vec<MoverData>,
}

#[derive(Debug, Default)]
pub struct GameCatalog {
    items: HashMap<i32, Arc<ItemData>>,
    monsters: HashMap<i32, Arc<MonsterData>>,
    jobs: HashMap<u8, JobData>,
    movers: HashMap<i32, MoverData>,
    hand: Arc<ItemData>,
}

impl GameCatalog {
    pub fn new() -> Self {
        Self {
            hand: Arc::new(ItemData::hand()),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();

        for item in file.items {
            if catalog.items.contains_key(&item.id) {
                return Err(CatalogError::Duplicate { kind: "item", id: item.id });
            }
            catalog.insert_item(item);
        }
        for monster in file.monsters {
            if catalog.monsters.contains_key(&monster.id) {
                return Err(CatalogError::Duplicate { kind: "monster", id: monster.id });
            }
            catalog.insert_monster(monster);
        }
        for job in file.jobs {
            catalog.insert_job(job);
        }
        for mover in file.movers {
            catalog.movers.insert(mover.model_id, mover);
        }

        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn insert_item(&mut self, item: ItemData) {
        if item.id == HAND_ITEM_ID {
            self.hand = Arc::new(item.clone());
        }
        self.items.insert(item.id, Arc::new(item));
    }

    pub fn insert_monster(&mut self, monster: MonsterData) {
        self.monsters.insert(monster.id, Arc::new(monster));
    }

    pub fn insert_job(&mut self, job: JobData) {
        self.jobs.insert(job.id, job);
    }

    pub fn item(&self, id: i32) -> Option<Arc<ItemData>> {
        self.items.get(&id).cloned()
    }

    pub fn monster(&self, id: i32) -> Option<Arc<MonsterData>> {
        self.monsters.get(&id).cloned()
    }

    /// Unknown jobs fall back to neutral multipliers.
    pub fn job(&self, id: u8) -> JobData {
        self.jobs.get(&id).copied().unwrap_or(JobData { id, ..Default::default() })
    }

    pub fn mover_speed(&self, model_id: i32) -> f32 {
        self.movers
            .get(&model_id)
            .map(|mover| mover.speed)
            .unwrap_or(DEFAULT_MOVER_SPEED)
    }

    pub fn hand(&self) -> Arc<ItemData> {
        self.hand.clone()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
