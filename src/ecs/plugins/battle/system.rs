use bevy::prelude::*;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::ecs::capability::{self, log_identity};
use crate::ecs::components::{EntityKind, HealthComponent};
use crate::ecs::core::error::WorldFault;
use crate::ecs::core::resources::{CatalogHandle, CombatRng};
use crate::ecs::dispatch::{BattleEvent, EventKind, SystemEvent, SystemKind, WorldSystem};
use crate::ecs::plugins::battle::arbiter::{AttackResult, MeleeAttackArbiter};
use crate::ecs::plugins::network::components::{PacketOutbox, WorldPacket};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("target is already dead")]
    TargetDead,
    #[error("target does not exist or cannot be hit")]
    TargetMissing,
    #[error("attacker cannot fight")]
    NotLiving,
    #[error("an entity cannot attack itself")]
    SelfAttack,
}

/// Melee combat between players and monsters.
pub struct BattleSystem;

struct ResolvedAttack {
    attacker_id: i32,
    target_id: i32,
    result: AttackResult,
}

impl WorldSystem for BattleSystem {
    fn kind(&self) -> SystemKind {
        SystemKind::Battle
    }

    fn filter(&self, kind: EntityKind) -> bool {
        matches!(kind, EntityKind::Player | EntityKind::Monster)
    }

    fn events(&self) -> &'static [EventKind] {
        &[EventKind::MeleeAttack]
    }

    fn execute(&self, world: &mut World, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault> {
        let SystemEvent::Battle(battle_event) = event else {
            let (name, remote) = log_identity(world, entity);
            warn!(attacker = %name, ?remote, event = ?event.kind(), "Unknown action for battle system");
            return Ok(());
        };

        if !event.check_arguments() {
            let (name, remote) = log_identity(world, entity);
            error!(attacker = %name, ?remote, event = ?battle_event, "Invalid arguments for battle action");
            return Ok(());
        }

        match battle_event {
            BattleEvent::MeleeAttack { target, motion } => {
                debug!(attacker = ?entity, ?target, motion, "Melee attack");
                melee_attack(world, entity, *target)
            }
        }
    }
}

/// Resolves one melee hit and applies it to the target.
///
/// Rejected attacks are logged and leave the world untouched.
pub fn melee_attack(world: &mut World, attacker: Entity, target: Entity) -> Result<(), WorldFault> {
    let outbox = world
        .get_resource::<PacketOutbox>()
        .ok_or(WorldFault::MissingResource("PacketOutbox"))?
        .clone();
    let hand = world
        .get_resource::<CatalogHandle>()
        .ok_or(WorldFault::MissingResource("CatalogHandle"))?
        .hand();

    if !world.contains_resource::<CombatRng>() {
        return Err(WorldFault::MissingResource("CombatRng"));
    }
    let resolved = world.resource_scope(|world, mut rng: Mut<CombatRng>| -> Result<ResolvedAttack, BattleError> {
        if attacker == target {
            return Err(BattleError::SelfAttack);
        }
        let attacker_view = capability::combatant(world, attacker).ok_or(BattleError::NotLiving)?;
        let defender = capability::living(world, target).ok_or(BattleError::TargetMissing)?;
        if defender.health.is_dead() {
            return Err(BattleError::TargetDead);
        }

        let result = MeleeAttackArbiter::new(&attacker_view, &defender).on_damage(&mut rng.0, &hand);
        Ok(ResolvedAttack {
            attacker_id: attacker_view.living().identity.id,
            target_id: defender.identity.id,
            result,
        })
    });

    let attack = match resolved {
        Ok(attack) => attack,
        Err(err) => {
            let (name, remote) = log_identity(world, attacker);
            let (target_name, _) = log_identity(world, target);
            match err {
                BattleError::TargetDead | BattleError::SelfAttack => {
                    error!(attacker = %name, ?remote, target = %target_name, reason = %err, "Melee attack rejected")
                }
                BattleError::TargetMissing | BattleError::NotLiving => {
                    warn!(attacker = %name, ?remote, target = %target_name, reason = %err, "Melee attack rejected")
                }
            }
            return Ok(());
        }
    };

    let remaining_hp = world
        .get_mut::<HealthComponent>(target)
        .map(|mut health| health.apply_damage(attack.result.damages))
        .ok_or_else(|| WorldFault::InvariantBroken(format!("{target:?} lost its health during an attack")))?;

    debug!(
        attacker_id = attack.attacker_id,
        target_id = attack.target_id,
        damages = attack.result.damages,
        remaining_hp,
        "Damage applied"
    );

    outbox.publish(WorldPacket::AddDamage {
        attacker_id: attack.attacker_id,
        target_id: attack.target_id,
        damages: attack.result.damages,
        flags: attack.result.flags.bits(),
        remaining_hp,
    });

    Ok(())
}
