/*!
# Melee Arbiter

Stateless damage formulas. Given the same entity snapshots and the same
random source, the arbiter always produces the same result.
*/

use rand::Rng;
use serde::Serialize;

use crate::ecs::capability::{Combatant, LivingView};
use crate::ecs::components::StatisticsComponent;
use crate::ecs::core::catalog::{ItemData, JobData, WeaponType};
use crate::ecs::plugins::inventory::components::RIGHT_WEAPON_SLOT;

/// Attack result flags. Only `GENERIC` is produced for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttackFlags(u32);

impl AttackFlags {
    pub const GENERIC: Self = Self(0x0001);

    pub fn bits(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackResult {
    pub damages: i32,
    pub flags: AttackFlags,
}

/// Flat attack bonus a player gets from the weapon type they fight with.
pub fn weapon_attack(weapon_type: WeaponType, statistics: &StatisticsComponent, level: i32, job: &JobData) -> i32 {
    let level = level as f32;
    let strength = statistics.strength as f32;

    let (attribute, level_factor, job_factor) = match weapon_type {
        WeaponType::MeleeSword => (strength - 12.0, level * 1.1, job.melee_sword),
        WeaponType::MeleeAxe => (strength - 12.0, level * 1.2, job.melee_axe),
        WeaponType::MeleeStaff => (strength - 10.0, level * 1.1, job.melee_staff),
        WeaponType::MeleeStick => (strength - 10.0, level * 1.3, job.melee_stick),
        WeaponType::MeleeKnuckle => (strength - 10.0, level * 1.2, job.melee_knuckle),
        WeaponType::MagicWand => (statistics.intelligence as f32 - 10.0, level * 1.2, job.magic_wand),
        WeaponType::MeleeYoyo => (strength - 10.0, level * 1.1, job.melee_yoyo),
        WeaponType::RangeBow => (
            (statistics.dexterity as f32 - 14.0) * 4.0,
            level * 1.3,
            strength * 0.2 * 0.7,
        ),
        WeaponType::Hand | WeaponType::None => (0.0, 0.0, 1.0),
    };

    (attribute * job_factor + level_factor) as i32
}

/// Inclusive damage range of `weapon` once the weapon attack is added.
pub fn ability_range(weapon: &ItemData, weapon_attack: i32) -> (i32, i32) {
    (
        weapon.ability_min * 2 + weapon_attack,
        weapon.ability_max * 2 + weapon_attack,
    )
}

/// Uniform roll over `min..=max`. An inverted range yields `min`.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Defense of `defender` against `attacker`. Always zero until a defense model exists.
pub fn defense(_attacker: &Combatant<'_>, _defender: &LivingView<'_>) -> i32 {
    0
}

pub struct MeleeAttackArbiter<'a, 'w> {
    attacker: &'a Combatant<'w>,
    defender: &'a LivingView<'w>,
}

impl<'a, 'w> MeleeAttackArbiter<'a, 'w> {
    pub fn new(attacker: &'a Combatant<'w>, defender: &'a LivingView<'w>) -> Self {
        Self { attacker, defender }
    }

    /// Rolls the melee damage. `hand` is used when the attacker holds no weapon.
    pub fn on_damage<R: Rng + ?Sized>(&self, rng: &mut R, hand: &ItemData) -> AttackResult {
        let damages = match self.attacker {
            Combatant::Player(player) => {
                let weapon = player
                    .inventory
                    .get(RIGHT_WEAPON_SLOT)
                    .filter(|item| !item.is_empty())
                    .and_then(|item| item.data.as_deref())
                    .unwrap_or(hand);

                let attack = weapon_attack(
                    weapon.weapon_type,
                    player.living.statistics,
                    player.living.object.level,
                    &player.data.job,
                );
                let (min, max) = ability_range(weapon, attack);
                roll(rng, min, max)
            }
            Combatant::Monster(monster) => {
                let data = &monster.monster.data;
                roll(rng, data.attack_min, data.attack_max)
            }
        };

        let damages = damages - defense(self.attacker, self.defender);

        AttackResult {
            damages: damages.max(0),
            flags: self.attack_flags(),
        }
    }

    fn attack_flags(&self) -> AttackFlags {
        AttackFlags::GENERIC
    }
}
