use crate::resolver::{HostnameResolver, RoomAndGroup};
use crate::{KeyIssuer, MappingSource, PanelError, Result, RoomConfigSource};
use panel_types::{Camera, ResolvedConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 单个请求的截止时间上限
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// 摄像头与控制密钥两路查询的失败策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// 两路都必须成功；任一失败会取消另一路
    Strict,

    /// 摄像头失败是致命的；控制密钥失败只记录日志，响应中不带密钥
    #[default]
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Strict => write!(f, "strict"),
            FailurePolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "best-effort" | "best_effort" | "besteffort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "unknown failure policy '{}', expected 'strict' or 'best-effort'",
                other
            )),
        }
    }
}

/// 面板配置聚合器
///
/// 解析主机名后并发查询摄像头列表和控制密钥，按 [`FailurePolicy`] 合并结果。
/// 整个请求受 `timeout` 约束，超时后所有进行中的后端调用都会被丢弃。
pub struct ConfigAggregator {
    resolver: HostnameResolver,
    rooms: Arc<dyn RoomConfigSource>,
    keys: Arc<dyn KeyIssuer>,
    policy: FailurePolicy,
    timeout: Duration,
}

impl ConfigAggregator {
    pub fn new(
        mappings: Arc<dyn MappingSource>,
        rooms: Arc<dyn RoomConfigSource>,
        keys: Arc<dyn KeyIssuer>,
    ) -> Self {
        Self {
            resolver: HostnameResolver::new(mappings),
            rooms,
            keys,
            policy: FailurePolicy::default(),
            timeout: MAX_REQUEST_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 超过 [`MAX_REQUEST_TIMEOUT`] 的值会被截断
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_REQUEST_TIMEOUT);
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 为主机名生成面板配置
    pub async fn build_config(&self, hostname: &str) -> Result<ResolvedConfig> {
        if hostname.trim().is_empty() {
            return Err(PanelError::validation("hostname must not be empty"));
        }

        match tokio::time::timeout(self.timeout, self.build(hostname)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(hostname = %hostname, timeout = ?self.timeout, "Config request timed out");
                Err(PanelError::Timeout(self.timeout))
            }
        }
    }

    async fn build(&self, hostname: &str) -> Result<ResolvedConfig> {
        let RoomAndGroup { room, group } = self.resolver.resolve(hostname).await?;

        let cameras = self.cameras(&room, &group);
        let control_key = self.control_key(&room, &group);

        let config = match self.policy {
            FailurePolicy::Strict => {
                let (cameras, control_key) = tokio::try_join!(cameras, control_key)?;
                ResolvedConfig::new(cameras, control_key)
            }
            FailurePolicy::BestEffort => {
                let (cameras, control_key) = tokio::join!(cameras, control_key);
                let cameras = cameras?;
                let control_key = control_key.unwrap_or_else(|e| {
                    warn!(hostname = %hostname, error = %e, "Returning config without control key");
                    None
                });
                ResolvedConfig::new(cameras, control_key)
            }
        };

        info!(
            hostname = %hostname,
            cameras = config.cameras.len(),
            control_key = config.control_key.is_some(),
            "Built panel config"
        );

        Ok(config)
    }

    /// 查找房间文档中与控制组精确匹配的摄像头列表
    pub async fn cameras(&self, room: &str, group: &str) -> Result<Vec<Camera>> {
        let document = self
            .rooms
            .room_document(room)
            .await
            .map_err(|e| PanelError::room_config(room, e))?;

        match document.group(group) {
            Some(found) => Ok(found.cameras.clone()),
            None => {
                debug!(
                    room = %room,
                    group = %group,
                    group_count = document.groups.len(),
                    "No matching control group"
                );
                Err(PanelError::NoMatchingGroup {
                    room: room.to_string(),
                    group: group.to_string(),
                })
            }
        }
    }

    async fn control_key(&self, room: &str, group: &str) -> Result<Option<String>> {
        self.keys
            .control_key(room, group)
            .await
            .map(|key| key.filter(|k| !k.is_empty()))
            .map_err(PanelError::key_service)
    }
}
