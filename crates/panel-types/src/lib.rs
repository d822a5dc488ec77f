pub mod camera;
pub mod config;
pub mod room;

pub use camera::{Camera, CameraPreset};
pub use config::ResolvedConfig;
pub use room::{ControlGroup, MappingRecord, RoomDocument};
