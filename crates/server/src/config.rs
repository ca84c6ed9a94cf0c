#![forbid(unsafe_code)]

use clap::{Parser, ValueEnum};
use ob_core::uploads::DEFAULT_MAX_UPLOAD_BYTES;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Command line and environment configuration for the onboarding server.
#[derive(Parser, Debug, Clone)]
#[command(name = "ob_server")]
#[command(about = "Client onboarding form wizard")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "OB_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Directory holding the SQLite database
    #[arg(long, env = "OB_STORAGE_DIR", value_name = "DIR", default_value = ".onboard")]
    pub storage_dir: PathBuf,

    /// Directory for uploaded files [default: <storage-dir>/uploads]
    #[arg(long, env = "OB_UPLOAD_DIR", value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "OB_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[arg(long, env = "OB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| self.storage_dir.join("uploads"))
    }
}
