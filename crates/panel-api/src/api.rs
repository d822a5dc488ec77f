use crate::{handlers, state::AppState};
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/healthz", get(handlers::health_check))
        .route("/debug/healthz", get(handlers::health_check))
        // 面板配置
        .route("/:hostname/config", get(handlers::config_for_pc))
        .route("/api/:hostname/config", get(handlers::config_for_pc))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
