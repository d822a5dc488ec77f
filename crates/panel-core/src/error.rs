use std::time::Duration;
use thiserror::Error;

/// 面板配置统一错误类型
#[derive(Error, Debug)]
pub enum PanelError {
    /// 后端明确返回“记录不存在”
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O、解码、非预期状态码、格式错误的记录
    #[error("backend error: {0}")]
    Backend(String),

    /// 房间文档存在，但没有匹配的控制组
    #[error("no matching control group {group:?} found in room {room:?}")]
    NoMatchingGroup { room: String, group: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unable to get pc mapping for {hostname:?}: {source}")]
    Mapping {
        hostname: String,
        #[source]
        source: Box<PanelError>,
    },

    #[error("unable to get ui config for room {room:?}: {source}")]
    RoomConfig {
        room: String,
        #[source]
        source: Box<PanelError>,
    },

    #[error("unable to get control key: {source}")]
    KeyService {
        #[source]
        source: Box<PanelError>,
    },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, PanelError>;

impl PanelError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        PanelError::NotFound(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        PanelError::Backend(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        PanelError::Validation(msg.into())
    }

    pub fn mapping(hostname: impl Into<String>, source: PanelError) -> Self {
        PanelError::Mapping {
            hostname: hostname.into(),
            source: Box::new(source),
        }
    }

    pub fn room_config(room: impl Into<String>, source: PanelError) -> Self {
        PanelError::RoomConfig {
            room: room.into(),
            source: Box::new(source),
        }
    }

    pub fn key_service(source: PanelError) -> Self {
        PanelError::KeyService {
            source: Box::new(source),
        }
    }

    /// 穿过上下文包装判断是否为 NotFound
    pub fn is_not_found(&self) -> bool {
        match self {
            PanelError::NotFound(_) => true,
            PanelError::Mapping { source, .. }
            | PanelError::RoomConfig { source, .. }
            | PanelError::KeyService { source } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PanelError::Validation(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PanelError::Timeout(_))
    }

    /// 去掉所有上下文包装后的底层错误
    pub fn root(&self) -> &PanelError {
        match self {
            PanelError::Mapping { source, .. }
            | PanelError::RoomConfig { source, .. }
            | PanelError::KeyService { source } => source.root(),
            other => other,
        }
    }

    /// 返回给调用方的错误消息
    ///
    /// 房间和控制组 ID 不是请求的一部分，只出现在日志里。
    pub fn public_message(&self) -> String {
        match self {
            PanelError::NoMatchingGroup { .. } => "no matching control group found".to_string(),
            PanelError::Mapping { hostname, source } => format!(
                "unable to get room/control group for {:?}: {}",
                hostname,
                source.public_message()
            ),
            PanelError::RoomConfig { source, .. } => {
                format!("unable to get/scan ui config: {}", source.public_message())
            }
            PanelError::KeyService { source } => {
                format!("unable to get control key: {}", source.public_message())
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        PanelError::Backend(format!("unable to decode document: {}", err))
    }
}
