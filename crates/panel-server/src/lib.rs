pub mod cli;
pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use axum::Router;
use panel_api::{create_router, AppState};
use panel_core::ConfigAggregator;
use panel_couch::{CouchClient, CouchOptions};
use panel_keys::KeyServiceClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

pub use config::AppConfig;

/// 启动阶段（创建客户端、检查数据库、绑定端口）的截止时间
pub const SETUP_TIMEOUT: Duration = Duration::from_secs(10);

/// 服务运行所需的后端客户端与聚合器
pub struct Services {
    pub couch: CouchClient,
    pub keys: KeyServiceClient,
    pub aggregator: Arc<ConfigAggregator>,
}

impl Services {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let options = CouchOptions::default()
            .with_mapping_db(&config.couch.mapping_db)
            .with_ui_config_db(&config.couch.ui_config_db)
            .with_timeout(config.couch.timeout());
        let couch = CouchClient::new(&config.couch.url(), options)
            .context("unable to create config service")?;

        let key_url = config.keys.url();
        let keys = KeyServiceClient::new(key_url.as_deref(), config.keys.timeout())
            .context("unable to create control key client")?;
        if !keys.enabled() {
            warn!("No key service address configured, control keys will be omitted");
        }

        let couch_source = Arc::new(couch.clone());
        let aggregator = ConfigAggregator::new(couch_source.clone(), couch_source, Arc::new(keys.clone()))
            .with_policy(config.aggregator.policy)
            .with_timeout(config.aggregator.request_timeout());

        info!(
            policy = %aggregator.policy(),
            timeout_ms = aggregator.timeout().as_millis() as u64,
            "Config aggregator created"
        );

        Ok(Self {
            couch,
            keys,
            aggregator: Arc::new(aggregator),
        })
    }

    pub fn router(&self) -> Router {
        create_router(AppState::new(self.aggregator.clone()))
    }
}

/// 创建服务并绑定监听端口
///
/// 数据库不可达只记录警告，服务照常启动。
pub async fn setup(config: &AppConfig) -> Result<(Router, TcpListener)> {
    let services = Services::new(config)?;

    if let Err(e) = services.couch.ping().await {
        warn!(error = %e, "CouchDB is not reachable yet");
    }

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("unable to bind listener on {}", addr))?;

    Ok((services.router(), listener))
}

/// 在 [`SETUP_TIMEOUT`] 内完成 [`setup`]
pub async fn setup_with_deadline(config: &AppConfig) -> Result<(Router, TcpListener)> {
    tokio::time::timeout(SETUP_TIMEOUT, setup(config))
        .await
        .context("setup did not finish in time")?
}

/// 运行 HTTP 服务，直到收到关闭信号
pub async fn serve(router: Router, listener: TcpListener) -> Result<()> {
    info!(on = %listener.local_addr()?, "Starting server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("failed to serve")?;

    info!("Server stopped");
    Ok(())
}

/// 等待 SIGINT 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT"),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
