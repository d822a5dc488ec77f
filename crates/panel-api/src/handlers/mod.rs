pub mod config;
pub mod health;

pub use config::*;
pub use health::*;
