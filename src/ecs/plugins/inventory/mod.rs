pub mod components;
pub mod operations;
pub mod system;

pub use components::{Item, ItemContainerComponent, ItemSnapshot};
pub use operations::InventoryError;
pub use system::InventorySystem;
