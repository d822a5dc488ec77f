pub mod client;
pub mod options;

pub use client::CouchClient;
pub use options::{CouchOptions, DEFAULT_PC_MAPPING_DB, DEFAULT_UI_CONFIG_DB};
