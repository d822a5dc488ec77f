pub mod source;

pub use source::{KeyIssuer, MappingSource, RoomConfigSource};
