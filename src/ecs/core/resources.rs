use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use crate::ecs::core::catalog::GameCatalog;
use crate::ecs::core::config::MapDefinition;

/// Hands out entity ids, starting at 1.
#[derive(Resource, Debug)]
pub struct EntityIdAllocator {
    next_id: i32,
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Random source for combat rolls. Seeded in tests so rolls are reproducible.
#[derive(Resource, Debug)]
pub struct CombatRng(pub StdRng);

impl CombatRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct CatalogHandle(pub Arc<GameCatalog>);

impl Deref for CatalogHandle {
    type Target = GameCatalog;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A map and one of its layers, as resolved for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLayer {
    pub map_id: i32,
    pub layer_id: i32,
}

#[derive(Debug, Clone)]
pub struct MapInstance {
    pub id: i32,
    pub layers: Vec<i32>,
    pub default_layer: i32,
}

impl MapInstance {
    /// Falls back to the default layer when `layer_id` does not exist.
    pub fn layer(&self, layer_id: i32) -> MapLayer {
        let layer_id = if self.layers.contains(&layer_id) {
            layer_id
        } else {
            self.default_layer
        };
        MapLayer { map_id: self.id, layer_id }
    }
}

/// Maps loaded into this world process.
#[derive(Resource, Debug, Default)]
pub struct MapRegistry {
    maps: HashMap<i32, MapInstance>,
}

impl MapRegistry {
    pub fn from_definitions(definitions: &[MapDefinition]) -> Self {
        let maps = definitions
            .iter()
            .map(|def| {
                (def.id, MapInstance {
                    id: def.id,
                    layers: def.layers.clone(),
                    default_layer: def.default_layer,
                })
            })
            .collect();
        Self { maps }
    }

    pub fn get(&self, map_id: i32) -> Option<&MapInstance> {
        self.maps.get(&map_id)
    }

    pub fn resolve(&self, map_id: i32, layer_id: i32) -> Option<MapLayer> {
        self.get(map_id).map(|map| map.layer(layer_id))
    }
}
