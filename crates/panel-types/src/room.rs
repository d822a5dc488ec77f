use crate::camera::Camera;
use serde::{Deserialize, Serialize};

/// 主机名映射记录（pc-mapping 库中的文档）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// 房间配置文档 ID
    #[serde(rename = "uiConfig", default)]
    pub room: String,

    /// 控制组 ID
    #[serde(rename = "controlGroup", default)]
    pub group: String,
}

impl MappingRecord {
    pub fn new(room: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            group: group.into(),
        }
    }

    /// 两个字段都非空才是有效记录
    pub fn is_complete(&self) -> bool {
        !self.room.is_empty() && !self.group.is_empty()
    }
}

/// 房间配置文档（ui-configuration 库中的文档）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDocument {
    #[serde(rename = "presets", default)]
    pub groups: Vec<ControlGroup>,
}

impl RoomDocument {
    /// 按 ID 精确匹配控制组
    pub fn group(&self, id: &str) -> Option<&ControlGroup> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// 控制组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlGroup {
    #[serde(rename = "name")]
    pub id: String,

    #[serde(default)]
    pub cameras: Vec<Camera>,
}

impl ControlGroup {
    pub fn new(id: impl Into<String>, cameras: Vec<Camera>) -> Self {
        Self {
            id: id.into(),
            cameras,
        }
    }
}
