use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub data_file: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            data_file: default_data_file(),
            log_format: LogFormat::Compact,
        }
    }
}

/// `todos.json` next to the crate's sources.
pub fn default_data_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("todos.json")
}

impl Config {
    /// Reads `TODO_HOST`, `PORT`, `TODO_DATA_FILE` and `TODO_LOG_FORMAT`,
    /// loading a `.env` file first if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("TODO_HOST") {
            cfg.host = host
                .trim()
                .parse()
                .with_context(|| format!("TODO_HOST is not an IP address: {host}"))?;
        }
        if let Some(port) = var("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
            if cfg.port == 0 {
                return Err(anyhow!("PORT must be in 1..=65535"));
            }
        }
        if let Some(path) = var("TODO_DATA_FILE") {
            cfg.data_file = PathBuf::from(path);
        }
        if let Some(format) = var("TODO_LOG_FORMAT") {
            cfg.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                other => {
                    return Err(anyhow!(
                        "TODO_LOG_FORMAT must be compact or json, got {other}"
                    ))
                }
            };
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
