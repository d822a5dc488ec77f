use crate::{MappingSource, PanelError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// 截断回退的最小主机名长度
pub const MIN_HOSTNAME_LEN: usize = 4;

/// 解析结果：房间 + 控制组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAndGroup {
    pub room: String,
    pub group: String,
}

/// 主机名解析器
///
/// 先按主机名精确查找映射记录；记录不存在时去掉末尾一个字符再试，
/// 直到找到记录或下一个候选短于 [`MIN_HOSTNAME_LEN`]。
/// 非 NotFound 的错误立即返回，不再重试。
pub struct HostnameResolver {
    source: Arc<dyn MappingSource>,
    min_len: usize,
}

impl HostnameResolver {
    pub fn new(source: Arc<dyn MappingSource>) -> Self {
        Self {
            source,
            min_len: MIN_HOSTNAME_LEN,
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len.max(1);
        self
    }

    pub async fn resolve(&self, hostname: &str) -> Result<RoomAndGroup> {
        let mut candidate = hostname.to_string();
        let mut remaining = candidate.chars().count();
        let mut attempts = 0usize;

        loop {
            attempts += 1;

            let err = match self.source.mapping(&candidate).await {
                Ok(record) if record.is_complete() => {
                    info!(
                        hostname = %hostname,
                        matched = %candidate,
                        room = %record.room,
                        group = %record.group,
                        attempts,
                        "Resolved hostname"
                    );
                    return Ok(RoomAndGroup {
                        room: record.room,
                        group: record.group,
                    });
                }
                Ok(_) => {
                    return Err(PanelError::mapping(
                        hostname,
                        PanelError::backend(format!("malformed mapping record {:?}", candidate)),
                    ));
                }
                Err(err) if matches!(err, PanelError::NotFound(_)) => err,
                Err(err) => return Err(PanelError::mapping(hostname, err)),
            };

            if remaining <= self.min_len {
                debug!(hostname = %hostname, attempts, "No mapping at any prefix");
                return Err(PanelError::mapping(hostname, err));
            }

            candidate.pop();
            remaining -= 1;
            debug!(hostname = %hostname, next = %candidate, "No mapping, trying shorter prefix");
        }
    }
}
