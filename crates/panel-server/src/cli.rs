use crate::config::CliOverrides;
use clap::Parser;
use panel_core::FailurePolicy;
use std::path::PathBuf;

/// 触控面板配置服务
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to run the server on
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Level to log at (trace, debug, info, warn, error)
    #[arg(short = 'L', long)]
    pub log_level: Option<String>,

    /// CouchDB address
    #[arg(long)]
    pub db_address: Option<String>,

    /// Don't use SSL in the database connection
    #[arg(long)]
    pub db_insecure: bool,

    /// Control key service address
    #[arg(long)]
    pub key_service_address: Option<String>,

    /// Failure policy for the camera and control key lookups (strict, best-effort)
    #[arg(long)]
    pub policy: Option<FailurePolicy>,
}

impl Args {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            port: self.port,
            log_level: self.log_level.clone(),
            db_address: self.db_address.clone(),
            db_insecure: self.db_insecure,
            key_service_address: self.key_service_address.clone(),
            policy: self.policy,
        }
    }
}
