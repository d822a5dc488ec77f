use crate::{KeyIssuer, MappingSource, PanelError, Result, RoomConfigSource};
use async_trait::async_trait;
use panel_types::{MappingRecord, RoomDocument};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 内存映射与房间配置存储
///
/// 同时实现 [`MappingSource`] 和 [`RoomConfigSource`]，记录每次映射查询的键，
/// 可注入指定键的后端错误。
#[derive(Clone, Default)]
pub struct MemoryStore {
    mappings: Arc<RwLock<HashMap<String, MappingRecord>>>,
    rooms: Arc<RwLock<HashMap<String, RoomDocument>>>,

    /// 指定键返回 Backend 错误
    mapping_failures: Arc<RwLock<HashMap<String, String>>>,
    room_failures: Arc<RwLock<HashMap<String, String>>>,

    mapping_lookups: Arc<RwLock<Vec<String>>>,
    room_lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_mapping(&self, hostname: impl Into<String>, record: MappingRecord) {
        self.mappings.write().await.insert(hostname.into(), record);
    }

    pub async fn insert_room(&self, room: impl Into<String>, document: RoomDocument) {
        self.rooms.write().await.insert(room.into(), document);
    }

    pub async fn fail_mapping(&self, hostname: impl Into<String>, message: impl Into<String>) {
        self.mapping_failures
            .write()
            .await
            .insert(hostname.into(), message.into());
    }

    pub async fn fail_room(&self, room: impl Into<String>, message: impl Into<String>) {
        self.room_failures
            .write()
            .await
            .insert(room.into(), message.into());
    }

    /// 按顺序返回所有被查询过的主机名
    pub async fn mapping_lookups(&self) -> Vec<String> {
        self.mapping_lookups.read().await.clone()
    }

    pub fn room_lookups(&self) -> usize {
        self.room_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MappingSource for MemoryStore {
    async fn mapping(&self, hostname: &str) -> Result<MappingRecord> {
        self.mapping_lookups.write().await.push(hostname.to_string());

        if let Some(msg) = self.mapping_failures.read().await.get(hostname) {
            return Err(PanelError::backend(msg.clone()));
        }

        self.mappings
            .read()
            .await
            .get(hostname)
            .cloned()
            .ok_or_else(|| PanelError::not_found(format!("missing {}", hostname)))
    }
}

#[async_trait]
impl RoomConfigSource for MemoryStore {
    async fn room_document(&self, room: &str) -> Result<RoomDocument> {
        self.room_lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = self.room_failures.read().await.get(room) {
            return Err(PanelError::backend(msg.clone()));
        }

        self.rooms
            .read()
            .await
            .get(room)
            .cloned()
            .ok_or_else(|| PanelError::not_found("missing"))
    }
}

/// 固定表驱动的控制密钥签发器
#[derive(Clone, Default)]
pub struct StaticKeyIssuer {
    keys: Arc<RwLock<HashMap<(String, String), String>>>,
    failure: Arc<RwLock<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticKeyIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_key(
        &self,
        room: impl Into<String>,
        group: impl Into<String>,
        key: impl Into<String>,
    ) {
        self.keys
            .write()
            .await
            .insert((room.into(), group.into()), key.into());
    }

    /// 之后所有调用都返回 Backend 错误
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyIssuer for StaticKeyIssuer {
    async fn control_key(&self, room: &str, group: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(room = %room, group = %group, "Issuing static control key");

        if let Some(msg) = self.failure.read().await.as_ref() {
            return Err(PanelError::backend(msg.clone()));
        }

        Ok(self
            .keys
            .read()
            .await
            .get(&(room.to_string(), group.to_string()))
            .cloned())
    }
}
