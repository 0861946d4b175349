/*!
# System Dispatch

Routes typed events to stateless systems.

The table is built once at startup with [`SystemRegistry::builder`] and
stored as a resource. Delivery is a direct, synchronous call on the
caller's thread through the [`Notify`] extension on `World`: there is no
queue, and `execute` has returned by the time `notify` does.
*/

pub mod events;

pub use events::*;

use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::ecs::components::{EntityKind, WorldEntity};
use crate::ecs::core::error::WorldFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKind {
    Inventory,
    Battle,
    Friend,
}

/// A stateless handler for one family of events.
///
/// Implementations keep no per-call state. Everything they change lives in
/// the target entity's components or in a shared registry with its own lock.
pub trait WorldSystem: Send + Sync + 'static {
    fn kind(&self) -> SystemKind;

    /// Entity types this system accepts.
    fn filter(&self, kind: EntityKind) -> bool;

    /// Event kinds routed to this system by [`Notify::notify`].
    fn events(&self) -> &'static [EventKind];

    /// Runs the system against `entity`.
    ///
    /// Validation failures and rule rejections are logged and return `Ok`.
    /// Only faults the caller must act on come back as `Err`.
    fn execute(&self, world: &mut World, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault>;
}

#[derive(Resource, Clone, Default)]
pub struct SystemRegistry {
    systems: HashMap<SystemKind, Arc<dyn WorldSystem>>,
    routes: HashMap<EventKind, SystemKind>,
}

impl SystemRegistry {
    pub fn builder() -> SystemRegistryBuilder {
        SystemRegistryBuilder::default()
    }

    pub fn get(&self, kind: SystemKind) -> Option<Arc<dyn WorldSystem>> {
        self.systems.get(&kind).cloned()
    }

    pub fn route(&self, event: EventKind) -> Option<SystemKind> {
        self.routes.get(&event).copied()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[derive(Default)]
pub struct SystemRegistryBuilder {
    systems: Vec<Arc<dyn WorldSystem>>,
}

impl SystemRegistryBuilder {
    pub fn register(mut self, system: impl WorldSystem) -> Self {
        self.systems.push(Arc::new(system));
        self
    }

    pub fn build(self) -> Result<SystemRegistry, WorldFault> {
        let mut registry = SystemRegistry::default();

        for system in self.systems {
            let kind = system.kind();
            if registry.systems.contains_key(&kind) {
                return Err(WorldFault::DuplicateSystem { system: kind });
            }
            for event in system.events() {
                if let Some(existing) = registry.routes.insert(*event, kind) {
                    return Err(WorldFault::InvariantBroken(format!(
                        "event {event:?} routed to both {existing:?} and {kind:?}"
                    )));
                }
            }
            registry.systems.insert(kind, system);
        }

        Ok(registry)
    }
}

/// Event delivery entry points on the world.
pub trait Notify {
    /// Delivers `event` to the system of kind `system`.
    fn notify_system(&mut self, entity: Entity, system: SystemKind, event: &SystemEvent) -> Result<(), WorldFault>;

    /// Delivers `event` to the system registered for its kind.
    fn notify(&mut self, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault>;

    /// Delivers `event` to every entity the routed system's filter accepts.
    /// Faults are logged per entity; returns how many entities were visited.
    fn notify_matching(&mut self, event: &SystemEvent) -> Result<usize, WorldFault>;
}

impl Notify for World {
    fn notify_system(&mut self, entity: Entity, system: SystemKind, event: &SystemEvent) -> Result<(), WorldFault> {
        let handler = self
            .get_resource::<SystemRegistry>()
            .ok_or(WorldFault::MissingResource("SystemRegistry"))?
            .get(system)
            .ok_or(WorldFault::NoHandler { system })?;

        let Some(identity) = self.get::<WorldEntity>(entity).copied() else {
            warn!(?entity, ?system, "Cannot notify system: entity does not exist");
            return Ok(());
        };

        if !handler.filter(identity.kind) {
            error!(
                entity_id = identity.id,
                kind = ?identity.kind,
                ?system,
                "Entity does not match system filter"
            );
            return Ok(());
        }

        debug!(entity_id = identity.id, ?system, event = ?event.kind(), "Executing system");
        handler.execute(self, entity, event)
    }

    fn notify(&mut self, entity: Entity, event: &SystemEvent) -> Result<(), WorldFault> {
        let system = self.route_event(event.kind())?;
        self.notify_system(entity, system, event)
    }

    fn notify_matching(&mut self, event: &SystemEvent) -> Result<usize, WorldFault> {
        let system = self.route_event(event.kind())?;
        let handler = self
            .get_resource::<SystemRegistry>()
            .ok_or(WorldFault::MissingResource("SystemRegistry"))?
            .get(system)
            .ok_or(WorldFault::NoHandler { system })?;

        let mut query = self.query::<(Entity, &WorldEntity)>();
        let targets: Vec<Entity> = query
            .iter(self)
            .filter(|(_, identity)| handler.filter(identity.kind))
            .map(|(entity, _)| entity)
            .collect();

        for &entity in &targets {
            if let Err(fault) = handler.execute(self, entity, event) {
                error!(?entity, ?system, %fault, "System fault during broadcast");
            }
        }

        Ok(targets.len())
    }
}

trait RouteEvent {
    fn route_event(&self, event: EventKind) -> Result<SystemKind, WorldFault>;
}

impl RouteEvent for World {
    fn route_event(&self, event: EventKind) -> Result<SystemKind, WorldFault> {
        self.get_resource::<SystemRegistry>()
            .ok_or(WorldFault::MissingResource("SystemRegistry"))?
            .route(event)
            .ok_or_else(|| WorldFault::InvariantBroken(format!("no route for event {event:?}")))
    }
}
