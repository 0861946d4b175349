pub mod arbiter;
pub mod system;

pub use arbiter::{AttackFlags, AttackResult, MeleeAttackArbiter};
pub use system::{BattleError, BattleSystem};
