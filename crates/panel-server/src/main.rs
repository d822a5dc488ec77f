use clap::Parser;
use panel_server::{cli::Args, logging, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply(&args.overrides());
    config.validate()?;

    logging::init_logging(&config.logging)?;
    tracing::info!(
        config = ?args.config,
        couch = %config.couch.url(),
        "Starting panel config service"
    );

    let (router, listener) = panel_server::setup_with_deadline(&config).await?;
    panel_server::serve(router, listener).await
}
