use std::time::Duration;

pub const DEFAULT_UI_CONFIG_DB: &str = "ui-configuration";
pub const DEFAULT_PC_MAPPING_DB: &str = "pc-mapping";

/// CouchDB 客户端选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchOptions {
    /// 主机名映射库
    pub mapping_db: String,

    /// 房间配置库
    pub ui_config_db: String,

    /// 单次请求超时
    pub timeout: Duration,
}

impl Default for CouchOptions {
    fn default() -> Self {
        Self {
            mapping_db: DEFAULT_PC_MAPPING_DB.to_string(),
            ui_config_db: DEFAULT_UI_CONFIG_DB.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl CouchOptions {
    pub fn with_mapping_db(mut self, db: impl Into<String>) -> Self {
        self.mapping_db = db.into();
        self
    }

    pub fn with_ui_config_db(mut self, db: impl Into<String>) -> Self {
        self.ui_config_db = db.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
