use clap::Parser;
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD: usize = 1024 * 1024 * 1024;

// --- Command line ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse, download and upload files over HTTP", long_about = None)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The root directory to serve files from
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root_dir: PathBuf,

    /// Interface address to bind to
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Largest accepted upload body, in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_UPLOAD)]
    pub max_upload: usize,
}

// --- Runtime state ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: String,
    pub source_dir: PathBuf,
    /// Filled once at startup.
    pub ip_addresses: Vec<String>,
}

impl ServerConfig {
    pub fn new(
        port: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        ip_addresses: Vec<String>,
    ) -> Self {
        ServerConfig {
            port: port.into(),
            source_dir: source_dir.into(),
            ip_addresses,
        }
    }
}

/// Fields submitted from the control form, trimmed. Blank values mean "leave as is".
#[derive(Debug, Default, Clone)]
pub struct ControlUpdate {
    pub port: Option<String>,
    pub directory: Option<String>,
}

impl ControlUpdate {
    pub fn new(port: Option<String>, directory: Option<String>) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        ControlUpdate {
            port: non_blank(port),
            directory: non_blank(directory),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.port.is_none() && self.directory.is_none()
    }
}

/// Lock-guarded handle to the single mutable [`ServerConfig`].
///
/// The lock is only held to copy or replace fields, never across file I/O.
#[derive(Debug, Clone)]
pub struct SharedConfig(Arc<RwLock<ServerConfig>>);

impl SharedConfig {
    pub fn new(config: ServerConfig) -> Self {
        SharedConfig(Arc::new(RwLock::new(config)))
    }

    pub async fn snapshot(&self) -> ServerConfig {
        self.0.read().await.clone()
    }

    pub async fn source_dir(&self) -> PathBuf {
        self.0.read().await.source_dir.clone()
    }

    /// Applies a control submission all-or-nothing.
    ///
    /// The directory is checked before anything is written; if it is not an
    /// existing directory neither field changes.
    pub async fn apply(&self, update: ControlUpdate) -> Result<ServerConfig, AppError> {
        if let Some(dir) = &update.directory {
            validate_directory(Path::new(dir)).await?;
        }

        let mut config = self.0.write().await;
        if let Some(port) = update.port {
            info!("Port changed: {} -> {}", config.port, port);
            config.port = port;
        }
        if let Some(dir) = update.directory {
            info!(
                "Source directory changed: {} -> {}",
                config.source_dir.display(),
                dir
            );
            config.source_dir = PathBuf::from(dir);
        }
        Ok(config.clone())
    }
}

async fn validate_directory(dir: &Path) -> Result<(), AppError> {
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            warn!("Rejected directory change to non-directory {}", dir.display());
            Err(AppError::InvalidDirectory(dir.display().to_string()))
        }
        Err(e) => {
            warn!("Rejected directory change to {}: {}", dir.display(), e);
            Err(AppError::InvalidDirectory(dir.display().to_string()))
        }
    }
}
