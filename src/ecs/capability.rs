/*!
# Capabilities

Typed, read-only views over an entity's components.

Systems ask for the capability they need once, at the top of an operation,
and bail out when the entity does not have it. A player view is only handed
out for entities tagged `Player`, a monster view only for `Monster`, so a
view never contradicts the type tag.
*/

use bevy::prelude::*;

use crate::ecs::components::*;
use crate::ecs::plugins::inventory::components::ItemContainerComponent;

#[derive(Debug, Clone, Copy)]
pub struct LivingView<'w> {
    pub entity: Entity,
    pub identity: WorldEntity,
    pub object: &'w ObjectComponent,
    pub health: &'w HealthComponent,
    pub statistics: &'w StatisticsComponent,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'w> {
    pub living: LivingView<'w>,
    pub data: &'w PlayerDataComponent,
    pub inventory: &'w ItemContainerComponent,
    pub appearance: &'w VisualAppearanceComponent,
}

#[derive(Debug, Clone, Copy)]
pub struct MonsterView<'w> {
    pub living: LivingView<'w>,
    pub monster: &'w MonsterComponent,
}

/// Anything that can land a melee hit.
#[derive(Debug, Clone, Copy)]
pub enum Combatant<'w> {
    Player(PlayerView<'w>),
    Monster(MonsterView<'w>),
}

impl<'w> Combatant<'w> {
    pub fn living(&self) -> &LivingView<'w> {
        match self {
            Combatant::Player(player) => &player.living,
            Combatant::Monster(monster) => &monster.living,
        }
    }
}

pub fn living(world: &World, entity: Entity) -> Option<LivingView<'_>> {
    Some(LivingView {
        entity,
        identity: *world.get::<WorldEntity>(entity)?,
        object: world.get::<ObjectComponent>(entity)?,
        health: world.get::<HealthComponent>(entity)?,
        statistics: world.get::<StatisticsComponent>(entity)?,
    })
}

pub fn player(world: &World, entity: Entity) -> Option<PlayerView<'_>> {
    let living = living(world, entity)?;
    if living.identity.kind != EntityKind::Player {
        return None;
    }
    Some(PlayerView {
        living,
        data: world.get::<PlayerDataComponent>(entity)?,
        inventory: world.get::<ItemContainerComponent>(entity)?,
        appearance: world.get::<VisualAppearanceComponent>(entity)?,
    })
}

pub fn monster(world: &World, entity: Entity) -> Option<MonsterView<'_>> {
    let living = living(world, entity)?;
    if living.identity.kind != EntityKind::Monster {
        return None;
    }
    Some(MonsterView {
        living,
        monster: world.get::<MonsterComponent>(entity)?,
    })
}

pub fn combatant(world: &World, entity: Entity) -> Option<Combatant<'_>> {
    match world.get::<WorldEntity>(entity)?.kind {
        EntityKind::Player => player(world, entity).map(Combatant::Player),
        EntityKind::Monster => monster(world, entity).map(Combatant::Monster),
        EntityKind::Npc | EntityKind::Other => None,
    }
}

/// Name and endpoint used in log lines.
pub fn log_identity(world: &World, entity: Entity) -> (String, Option<std::net::SocketAddr>) {
    let name = world
        .get::<ObjectComponent>(entity)
        .map(|object| object.name.clone())
        .unwrap_or_else(|| format!("{entity:?}"));
    let remote = world.get::<ClientEndpoint>(entity).map(|endpoint| endpoint.0);
    (name, remote)
}
