use panel_core::ConfigAggregator;
use std::sync::Arc;

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 面板配置聚合器
    pub aggregator: Arc<ConfigAggregator>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(aggregator: Arc<ConfigAggregator>) -> Self {
        Self { aggregator }
    }
}
