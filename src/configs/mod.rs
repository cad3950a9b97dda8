pub mod base;
pub mod player;

pub use base::*;
pub use player::*;
