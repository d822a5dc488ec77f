use crate::camera::Camera;
use serde::{Deserialize, Serialize};

/// 返回给触控面板的配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub cameras: Vec<Camera>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_key: Option<String>,
}

impl ResolvedConfig {
    pub fn new(cameras: Vec<Camera>, control_key: Option<String>) -> Self {
        Self {
            cameras,
            control_key,
        }
    }
}
