pub mod components;
pub mod system;

pub use components::FriendComponent;
pub use system::FriendSystem;
