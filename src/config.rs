use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::site::whitelist::DEFAULT_PATHS;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "PORTICO_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Connections handled at once; further clients wait in the accept backlog.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9999".to_string(),
            max_connections: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    pub whitelist: Vec<String>,
    pub template_path: String,
    pub placeholder: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            whitelist: DEFAULT_PATHS.iter().map(|p| p.to_string()).collect(),
            template_path: "/classic.html".to_string(),
            placeholder: "{time}".to_string(),
        }
    }
}

impl Config {
    /// Loads the YAML file named by `PORTICO_CONFIG` if set, otherwise the
    /// defaults, then applies `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml_str(&raw)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw).context("parsing YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_connections == 0 {
            anyhow::bail!("server.max_connections must be at least 1");
        }
        if let Some(bad) = self.static_files.whitelist.iter().find(|p| !p.starts_with('/')) {
            anyhow::bail!("whitelisted path must start with '/': {}", bad);
        }
        Ok(())
    }
}
