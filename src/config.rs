//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! the `LISTEN` environment variable, then command-line flags.
//!
//! ```yaml
//! server:
//!   listen_addr: "0.0.0.0:4221"
//!   max_request_bytes: 1048576
//! files:
//!   directory: /tmp/data
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::http::connection::DEFAULT_MAX_REQUEST_BYTES;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4221";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub max_request_bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Root for the `/files/` routes; `None` disables them.
    pub directory: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl Config {
    /// Builds the effective configuration for a process.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.apply_args(args);
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("LISTEN") {
            self.server.listen_addr = addr;
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(addr) = &args.listen {
            self.server.listen_addr = addr.clone();
        }
        if let Some(max) = args.max_request_bytes {
            self.server.max_request_bytes = max;
        }
        if let Some(dir) = &args.directory {
            self.files.directory = Some(dir.clone());
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_request_bytes == 0 {
            anyhow::bail!("max_request_bytes must be greater than zero");
        }
        if let Some(dir) = &self.files.directory {
            if !dir.is_dir() {
                tracing::warn!(
                    directory = %dir.display(),
                    "File directory does not exist; /files/ requests will fail"
                );
            }
        }
        Ok(())
    }
}
