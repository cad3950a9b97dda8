pub mod cycle;
pub mod manager;
pub mod monitor;

pub use manager::PlayerManager;
