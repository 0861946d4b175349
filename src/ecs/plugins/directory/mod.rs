pub mod registry;
pub mod systems;

pub use registry::{PlayerData, PlayerDirectory, SharedDirectory};
pub use systems::{boot_player_directory, register_joined_player};
