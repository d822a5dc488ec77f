use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use panel_types::ResolvedConfig;
use tracing::{debug, error, warn};

/// 获取触控面板配置
pub async fn config_for_pc(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Result<Json<ResolvedConfig>> {
    debug!(hostname = %hostname, "Getting panel config");

    let config = state
        .aggregator
        .build_config(&hostname)
        .await
        .map_err(|e| {
            if e.is_validation() {
                warn!(hostname = %hostname, error = %e, "Rejected config request");
            } else {
                error!(hostname = %hostname, error = %e, "Failed to build panel config");
            }
            e
        })?;

    Ok(Json(config))
}
