pub mod catalog;
pub mod config;
pub mod error;
pub mod plugin;
pub mod resources;

pub use catalog::GameCatalog;
pub use config::WorldConfig;
pub use error::WorldFault;
pub use plugin::{CorePlugin, insert_core_resources};
pub use resources::{CatalogHandle, CombatRng, EntityIdAllocator, MapLayer, MapRegistry};
