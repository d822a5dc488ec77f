use crate::Result;
use async_trait::async_trait;
use panel_types::{MappingRecord, RoomDocument};

/// Hostname to (room, group) mapping store.
#[async_trait]
pub trait MappingSource: Send + Sync {
    /// Look up the mapping record stored under exactly `hostname`.
    ///
    /// # Returns
    /// * `Ok(record)` if a record exists.
    /// * `Err(PanelError::NotFound(_))` if the store definitively has no such record.
    /// * Any other `Err` for I/O, decode or unexpected-status failures.
    async fn mapping(&self, hostname: &str) -> Result<MappingRecord>;
}

/// Room configuration document store.
#[async_trait]
pub trait RoomConfigSource: Send + Sync {
    /// Fetch the configuration document for `room`.
    ///
    /// `Err(PanelError::NotFound(_))` when the room has no document.
    async fn room_document(&self, room: &str) -> Result<RoomDocument>;
}

/// Issues control keys for a (room, group) pair.
#[async_trait]
pub trait KeyIssuer: Send + Sync {
    /// # Returns
    /// * `Ok(Some(key))` when a key was issued.
    /// * `Ok(None)` when the service has no key for this pair.
    /// * `Err(e)` for any network, decode or non-success response.
    async fn control_key(&self, room: &str, group: &str) -> Result<Option<String>>;
}
