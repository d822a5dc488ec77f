use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use panel_core::{FailurePolicy, MAX_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

/// 环境变量前缀，形如 `PANEL__COUCH__ADDRESS`
pub const ENV_PREFIX: &str = "PANEL";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub couch: CouchConfig,
    pub keys: KeyServiceConfig,
    pub aggregator: AggregatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CouchConfig {
    /// 数据库地址，不带协议时按 `insecure` 补全
    pub address: String,

    /// 使用 http 而不是 https
    pub insecure: bool,

    pub mapping_db: String,
    pub ui_config_db: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyServiceConfig {
    /// 为空时不签发控制密钥
    pub address: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub policy: FailurePolicy,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// 命令行覆盖项，优先级最高
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub db_address: Option<String>,
    pub db_insecure: bool,
    pub key_service_address: Option<String>,
    pub policy: Option<FailurePolicy>,
}

// 默认值
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for CouchConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            insecure: false,
            mapping_db: panel_couch::DEFAULT_PC_MAPPING_DB.to_string(),
            ui_config_db: panel_couch::DEFAULT_UI_CONFIG_DB.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for KeyServiceConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            timeout_secs: 3,
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            request_timeout_ms: MAX_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, None)
    }

    /// 与 [`AppConfig::load`] 相同，但从给定的表读取环境变量
    pub fn load_with_env(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        Self::load_layers(path, Some(env))
    }

    fn load_layers(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&AppConfig::default()).context("unable to build default config")?,
        );

        if let Some(path) = path {
            let path = path
                .to_str()
                .ok_or_else(|| anyhow!("Invalid config path: {}", path.display()))?;
            builder = builder.add_source(File::new(path, FileFormat::Toml).required(true));
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(env.map(|vars| vars.into_iter().collect()));

        let settings = builder
            .add_source(environment)
            .build()
            .context("unable to load config")?;

        Ok(settings.try_deserialize()?)
    }

    /// 应用命令行覆盖项
    pub fn apply(&mut self, overrides: &CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        if let Some(address) = &overrides.db_address {
            self.couch.address = address.clone();
        }
        if overrides.db_insecure {
            self.couch.insecure = true;
        }
        if let Some(address) = &overrides.key_service_address {
            self.keys.address = address.clone();
        }
        if let Some(policy) = overrides.policy {
            self.aggregator.policy = policy;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.couch.address.trim().is_empty() {
            return Err(anyhow!("couch.address is required"));
        }
        if self.couch.mapping_db.trim().is_empty() || self.couch.ui_config_db.trim().is_empty() {
            return Err(anyhow!("couch database names must not be empty"));
        }
        if self.couch.timeout_secs == 0 || self.keys.timeout_secs == 0 {
            return Err(anyhow!("backend timeouts must be greater than 0"));
        }
        if self.aggregator.request_timeout_ms == 0 {
            return Err(anyhow!("aggregator.request_timeout_ms must be greater than 0"));
        }
        LevelFilter::from_str(&self.logging.level)
            .map_err(|e| anyhow!("invalid log level {:?}: {}", self.logging.level, e))?;

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl CouchConfig {
    pub fn url(&self) -> String {
        with_scheme(&self.address, self.insecure)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl KeyServiceConfig {
    /// 密钥服务只走 http
    pub fn url(&self) -> Option<String> {
        let address = self.address.trim();
        if address.is_empty() {
            None
        } else {
            Some(with_scheme(address, true))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AggregatorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// 地址没有协议时补上 http:// 或 https://
pub fn with_scheme(address: &str, insecure: bool) -> String {
    let address = address.trim();
    if address.is_empty() || address.contains("://") {
        return address.to_string();
    }

    let scheme = if insecure { "http" } else { "https" };
    format!("{}://{}", scheme, address)
}
