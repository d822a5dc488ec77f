use serde::{Deserialize, Serialize};

/// 摄像头控制配置
///
/// 所有控制端点都是不透明字符串（通常是 URL），由触控面板自行解释。
/// 文档中缺失的字段按空字符串处理。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Camera {
    pub display_name: String,

    pub tilt_up: String,
    pub tilt_down: String,
    pub pan_left: String,
    pub pan_right: String,
    pub pan_tilt_stop: String,

    pub zoom_in: String,
    pub zoom_out: String,
    pub zoom_stop: String,

    pub stream: String,

    pub presets: Vec<CameraPreset>,
}

/// 摄像头预置位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraPreset {
    pub display_name: String,
    pub set_preset: String,
}
